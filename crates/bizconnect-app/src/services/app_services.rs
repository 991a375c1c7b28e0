// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer: opens the store, owns the session, and hands out
// the signed-in user's collection bindings.
//
// Bindings are created lazily per user and shared by every page, so the
// invoice list sees a create started on the create page. Signing out drops
// them; the session cancels whatever they still had in flight.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use bizconnect_core::AppConfig;
use bizconnect_core::error::{BizError, Result};
use bizconnect_core::types::{Invoice, Profile, Service, User, UserId};
use bizconnect_data::{
    CancelToken, CollectionBinding, LocalAuth, RemoteCollection, ServiceCatalog, Session,
    SessionReader, SqliteStore,
};
use tracing::{info, warn};

use super::data_dir;

/// The signed-in user's bound collections.
#[derive(Debug, Clone)]
pub struct UserBindings {
    pub user: UserId,
    pub services: CollectionBinding<Service>,
    pub invoices: CollectionBinding<Invoice>,
}

/// Shared application services, reached from components via
/// `use_context::<AppServices>()`. Cheap to clone.
#[derive(Clone)]
pub struct AppServices {
    store: SqliteStore,
    session: Arc<Session>,
    bindings: Arc<Mutex<Option<UserBindings>>>,
    config: Arc<Mutex<AppConfig>>,
    data_dir: Option<PathBuf>,
}

/// Two handles are equal when they share a session.
impl PartialEq for AppServices {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.session, &other.session)
    }
}

impl AppServices {
    /// Open the on-disk database in the data directory. Call once at startup.
    pub fn init() -> Result<Self> {
        let dir = data_dir::data_dir()?;
        info!(path = %dir.display(), "initialising app services");

        let config = load_config(&dir).unwrap_or_default();
        let store = SqliteStore::open(data_dir::database_path(&dir, &config.database_file))?;
        Self::assemble(store, config, Some(dir))
    }

    /// In-memory store with default settings; nothing is persisted.
    pub fn fallback() -> Result<Self> {
        warn!("using in-memory storage; changes will not be saved");
        Self::assemble(SqliteStore::open_in_memory()?, AppConfig::default(), None)
    }

    fn assemble(store: SqliteStore, config: AppConfig, data_dir: Option<PathBuf>) -> Result<Self> {
        if config.seed_demo_data {
            store.seed_demo()?;
        }
        let session = Session::new(Arc::new(LocalAuth::new(store.clone())));
        info!("app services initialised");
        Ok(Self {
            store,
            session: Arc::new(session),
            bindings: Arc::new(Mutex::new(None)),
            config: Arc::new(Mutex::new(config)),
            data_dir,
        })
    }

    // -- Session --------------------------------------------------------------

    pub fn session(&self) -> Arc<Session> {
        Arc::clone(&self.session)
    }

    pub fn reader(&self) -> SessionReader {
        self.session.reader()
    }

    /// Cancellation scope for a view; cancel it when the view unmounts.
    pub fn view_scope(&self) -> CancelToken {
        self.session.scope().child()
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        self.drop_bindings();
        self.session.sign_in(email, password).await
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.drop_bindings();
        self.session.sign_out().await
    }

    pub async fn update_profile(&self, profile: Profile) -> Result<User> {
        self.session.update_profile(profile).await
    }

    // -- Collections ----------------------------------------------------------

    /// Bindings for the signed-in user, or `Unauthenticated`.
    pub fn bindings(&self) -> Result<UserBindings> {
        let user = self.reader().require_user()?;
        let policy = self.config().sync_policy;
        let mut guard = lock(&self.bindings);
        if let Some(existing) = guard.as_ref() {
            if existing.user == user.id && existing.services.policy() == policy {
                return Ok(existing.clone());
            }
        }
        let bindings = UserBindings {
            user: user.id,
            services: CollectionBinding::new(
                Arc::new(self.store.services(user.id)) as Arc<dyn RemoteCollection<Service>>,
                policy,
            ),
            invoices: CollectionBinding::new(
                Arc::new(self.store.invoices(user.id)) as Arc<dyn RemoteCollection<Invoice>>,
                policy,
            ),
        };
        info!(user = %user.id, ?policy, "collections bound");
        *guard = Some(bindings.clone());
        Ok(bindings)
    }

    fn drop_bindings(&self) {
        lock(&self.bindings).take();
    }

    /// Public listing of every owner's active services.
    pub fn catalog(&self) -> Arc<dyn ServiceCatalog> {
        Arc::new(self.store.clone())
    }

    // -- Config ---------------------------------------------------------------

    pub fn config(&self) -> AppConfig {
        lock(&self.config).clone()
    }

    /// Update and persist the config. A sync policy change rebinds the
    /// collections on next use.
    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        let previous = std::mem::replace(&mut *lock(&self.config), config.clone());
        if previous.sync_policy != config.sync_policy {
            self.drop_bindings();
        }
        match &self.data_dir {
            Some(dir) => persist_config(dir, config),
            None => Err(BizError::Io(std::io::Error::other(
                "running on in-memory storage; settings apply to this session only",
            ))),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

const CONFIG_FILE: &str = "config.json";

/// Read `config.json` from `data_dir`; `None` if missing or unreadable.
pub fn load_config(data_dir: &Path) -> Option<AppConfig> {
    let data = std::fs::read_to_string(data_dir.join(CONFIG_FILE)).ok()?;
    match serde_json::from_str(&data) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!(error = %e, "ignoring malformed config.json");
            None
        }
    }
}

fn persist_config(data_dir: &Path, config: &AppConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(data_dir.join(CONFIG_FILE), json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bizconnect_core::config::SyncPolicy;

    #[test]
    fn config_round_trips_through_disk() {
        let dir = tempfile_dir();
        assert_eq!(load_config(dir.path()), None);

        let config = AppConfig {
            lock_all_deletes: false,
            currency_code: "EUR".into(),
            ..AppConfig::default()
        };
        persist_config(dir.path(), &config).unwrap();
        assert_eq!(load_config(dir.path()), Some(config));
    }

    #[test]
    fn malformed_config_is_ignored() {
        let dir = tempfile_dir();
        std::fs::write(dir.path().join(CONFIG_FILE), "{ not json").unwrap();
        assert_eq!(load_config(dir.path()), None);
    }

    #[tokio::test]
    async fn bindings_require_sign_in_and_follow_the_user() {
        let svc = AppServices::fallback().unwrap();
        svc.session().init().await;
        assert!(matches!(svc.bindings(), Err(BizError::Unauthenticated)));

        let ada = svc.sign_in("ada@example.com", "pw").await.unwrap();
        let first = svc.bindings().unwrap();
        assert_eq!(first.user, ada.id);
        assert_eq!(svc.bindings().unwrap().invoices, first.invoices);

        svc.sign_out().await.unwrap();
        let bob = svc.sign_in("bob@example.com", "pw").await.unwrap();
        let second = svc.bindings().unwrap();
        assert_eq!(second.user, bob.id);
        assert!(second.invoices != first.invoices);
    }

    #[tokio::test]
    async fn policy_change_rebinds() {
        let svc = AppServices::fallback().unwrap();
        svc.sign_in("ada@example.com", "pw").await.unwrap();
        let before = svc.bindings().unwrap();

        let config = AppConfig {
            sync_policy: SyncPolicy::ApplyLocally,
            ..svc.config()
        };
        assert!(svc.save_config(&config).is_err());
        let after = svc.bindings().unwrap();
        assert_eq!(after.services.policy(), SyncPolicy::ApplyLocally);
        assert!(after.services != before.services);
    }

    #[tokio::test]
    async fn fallback_seeds_browsable_catalog() {
        let svc = AppServices::fallback().unwrap();
        assert_eq!(svc.catalog().browse().await.unwrap().len(), 3);
    }

    fn tempfile_dir() -> tempfile::TempDir {
        tempfile::tempdir().expect("tempdir")
    }
}
