// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory remote collection.
//
// Used by tests and as a scratch backend. Supports injected failures and
// latency so binding behaviour under slow or failing remotes can be
// exercised, and counts every call it receives.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use bizconnect_core::error::{BizError, Result};
use bizconnect_core::types::{Entity, UserId};

use crate::traits::RemoteCollection;

/// Per-operation call counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub fetches: usize,
    pub creates: usize,
    pub deletes: usize,
}

/// A user-scoped collection held in a `Vec`, newest first.
pub struct MemoryCollection<T: Entity> {
    owner: UserId,
    items: Mutex<Vec<T>>,
    latency: Mutex<Duration>,
    fail_fetches: AtomicBool,
    fail_mutations: AtomicBool,
    fetches: AtomicUsize,
    creates: AtomicUsize,
    deletes: AtomicUsize,
}

impl<T: Entity> MemoryCollection<T> {
    pub fn new(owner: UserId) -> Self {
        Self::with_items(owner, Vec::new())
    }

    pub fn with_items(owner: UserId, items: Vec<T>) -> Self {
        Self {
            owner,
            items: Mutex::new(items),
            latency: Mutex::new(Duration::ZERO),
            fail_fetches: AtomicBool::new(false),
            fail_mutations: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
            creates: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        }
    }

    /// Delay every call by `latency` before touching the data.
    pub fn set_latency(&self, latency: Duration) {
        if let Ok(mut guard) = self.latency.lock() {
            *guard = latency;
        }
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    pub fn fail_mutations(&self, fail: bool) {
        self.fail_mutations.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> CallCounts {
        CallCounts {
            fetches: self.fetches.load(Ordering::SeqCst),
            creates: self.creates.load(Ordering::SeqCst),
            deletes: self.deletes.load(Ordering::SeqCst),
        }
    }

    /// Current contents, bypassing counters and latency.
    pub fn contents(&self) -> Vec<T> {
        self.lock().map(|items| items.clone()).unwrap_or_default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<T>>> {
        self.items
            .lock()
            .map_err(|_| BizError::Remote(format!("{} store lock poisoned", T::COLLECTION)))
    }

    async fn delay(&self) {
        let latency = self.latency.lock().map(|l| *l).unwrap_or_default();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    fn check_mutation(&self) -> Result<()> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(BizError::Remote(format!("{} mutation rejected", T::COLLECTION)));
        }
        Ok(())
    }
}

#[async_trait]
impl<T: Entity> RemoteCollection<T> for MemoryCollection<T> {
    async fn fetch_all(&self) -> Result<Vec<T>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        // Read first, then wait: a slow fetch returns data as of its start.
        let items = self.lock()?.clone();
        self.delay().await;
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(BizError::Remote(format!("{} fetch failed", T::COLLECTION)));
        }
        debug!(collection = T::COLLECTION, count = items.len(), "memory fetch");
        Ok(items)
    }

    async fn create(&self, draft: T::Draft) -> Result<T> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        self.check_mutation()?;
        let record = T::materialize(self.owner, draft);
        self.lock()?.insert(0, record.clone());
        debug!(collection = T::COLLECTION, id = %record.id(), "memory create");
        Ok(record)
    }

    async fn delete(&self, id: T::Id) -> Result<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        self.check_mutation()?;
        let mut items = self.lock()?;
        let before = items.len();
        items.retain(|item| item.id() != id);
        if items.len() == before {
            return Err(BizError::NotFound {
                collection: T::COLLECTION,
                id: id.to_string(),
            });
        }
        debug!(collection = T::COLLECTION, %id, "memory delete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bizconnect_core::types::{Invoice, NewInvoice};
    use chrono::NaiveDate;

    fn draft(month: u8) -> NewInvoice {
        NewInvoice {
            month,
            sales_amount: 1_000,
            invoice_date: NaiveDate::from_ymd_opt(2024, month as u32, 1).unwrap(),
            description: None,
        }
    }

    #[tokio::test]
    async fn create_inserts_newest_first_with_owner() {
        let owner = UserId::new();
        let remote = MemoryCollection::<Invoice>::new(owner);
        remote.create(draft(1)).await.unwrap();
        let second = remote.create(draft(2)).await.unwrap();

        let all = remote.fetch_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, second.id);
        assert!(all.iter().all(|i| i.user_id == owner));
        assert_eq!(
            remote.calls(),
            CallCounts {
                fetches: 1,
                creates: 2,
                deletes: 0
            }
        );
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let remote = MemoryCollection::<Invoice>::new(UserId::new());
        let err = remote.delete(Default::default()).await.unwrap_err();
        assert!(matches!(err, BizError::NotFound { collection: "invoices", .. }));
    }

    #[tokio::test]
    async fn injected_failures_surface_as_remote_errors() {
        let remote = MemoryCollection::<Invoice>::new(UserId::new());
        remote.fail_mutations(true);
        assert!(matches!(remote.create(draft(1)).await, Err(BizError::Remote(_))));
        assert!(remote.contents().is_empty());

        remote.fail_fetches(true);
        assert!(matches!(remote.fetch_all().await, Err(BizError::Remote(_))));
    }
}
