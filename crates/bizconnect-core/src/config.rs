// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use serde::{Deserialize, Serialize};

/// How a collection binding brings its items back in sync after a
/// successful mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPolicy {
    /// Refetch the whole collection once after every create and delete.
    #[default]
    ReloadAfterMutation,
    /// Insert the created record / drop the deleted id locally, no refetch.
    ApplyLocally,
}

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Post-mutation sync strategy for every collection binding.
    pub sync_policy: SyncPolicy,
    /// Disable every delete button while any delete is in flight, instead of
    /// only the one for the record being deleted.
    pub lock_all_deletes: bool,
    /// Insert the featured demo listings into an empty database on startup.
    pub seed_demo_data: bool,
    /// SQLite file name inside the data directory.
    pub database_file: String,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_filter: String,
    /// ISO 4217 code used to display invoice amounts.
    pub currency_code: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sync_policy: SyncPolicy::ReloadAfterMutation,
            lock_all_deletes: true,
            seed_demo_data: true,
            database_file: "bizconnect.db".into(),
            log_filter: "info".into(),
            currency_code: "USD".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "sync_policy": "apply_locally" }"#).unwrap();
        assert_eq!(config.sync_policy, SyncPolicy::ApplyLocally);
        assert_eq!(config.database_file, "bizconnect.db");
        assert!(config.lock_all_deletes);
    }
}
