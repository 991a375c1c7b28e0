// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Local account provider backed by the SQLite store.
//
// There is no credential check: any non-empty email and password signs in,
// creating the account on first use. The signed-in user is remembered in
// the `session` table so the next launch restores it.

use async_trait::async_trait;
use tracing::{info, instrument};

use bizconnect_core::error::{BizError, Result};
use bizconnect_core::types::{Profile, User, UserId};

use crate::sqlite::SqliteStore;
use crate::traits::AuthProvider;

#[derive(Debug, Clone)]
pub struct LocalAuth {
    store: SqliteStore,
}

impl LocalAuth {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }
}

/// Normalize a profile field: trimmed, `None` when blank.
fn clean(field: Option<String>) -> Option<String> {
    field
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[async_trait]
impl AuthProvider for LocalAuth {
    async fn restore(&self) -> Result<Option<User>> {
        self.store.current_user()
    }

    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(BizError::SignIn("enter a valid email address".into()));
        }
        if password.is_empty() {
            return Err(BizError::SignIn("password is required".into()));
        }
        let user = self.store.upsert_user(&email)?;
        self.store.set_current_user(Some(user.id))?;
        info!(user = %user.id, "local sign-in");
        Ok(user)
    }

    async fn sign_out(&self) -> Result<()> {
        self.store.set_current_user(None)
    }

    async fn update_profile(&self, user: UserId, profile: Profile) -> Result<User> {
        let profile = Profile {
            display_name: clean(profile.display_name),
            company_name: clean(profile.company_name),
        };
        self.store.update_profile(user, &profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> LocalAuth {
        LocalAuth::new(SqliteStore::open_in_memory().expect("open"))
    }

    #[tokio::test]
    async fn sign_in_creates_then_reuses_account() {
        let auth = auth();
        let first = auth.sign_in("Ada@Example.com ", "pw").await.unwrap();
        assert_eq!(first.email, "ada@example.com");

        auth.sign_out().await.unwrap();
        assert_eq!(auth.restore().await.unwrap(), None);

        let second = auth.sign_in("ada@example.com", "other").await.unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(auth.restore().await.unwrap().map(|u| u.id), Some(first.id));
    }

    #[tokio::test]
    async fn rejects_blank_credentials() {
        let auth = auth();
        assert!(matches!(auth.sign_in("", "pw").await, Err(BizError::SignIn(_))));
        assert!(matches!(auth.sign_in("not-an-email", "pw").await, Err(BizError::SignIn(_))));
        assert!(matches!(auth.sign_in("ada@example.com", "").await, Err(BizError::SignIn(_))));
        assert_eq!(auth.restore().await.unwrap(), None);
    }

    #[tokio::test]
    async fn profile_fields_are_trimmed_and_blank_cleared() {
        let auth = auth();
        let user = auth.sign_in("ada@example.com", "pw").await.unwrap();
        let updated = auth
            .update_profile(
                user.id,
                Profile {
                    display_name: Some("  Ada ".into()),
                    company_name: Some("   ".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(
            updated.profile,
            Some(Profile {
                display_name: Some("Ada".into()),
                company_name: None,
            })
        );
    }
}
