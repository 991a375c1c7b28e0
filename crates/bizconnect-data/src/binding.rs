// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Remote collection binding.
//
// A binding mediates between views and one user-scoped remote collection.
// Its whole observable state lives in a `watch` channel and is only changed
// through `send_modify`, so a reader always sees one consistent snapshot:
// never a half-replaced item list, never flags from a different moment.
//
// Rules:
// - `is_loading` starts true and clears when the last `reload()` settles,
//   whatever the outcome. Only `reload()` sets it again; the refetch a sync
//   policy issues after a mutation raises `is_refreshing` instead, so the
//   current items stay on screen.
// - Fetch results are committed in issue order. A fetch that completes
//   after a newer one has already been committed is dropped.
// - Every call takes a `CancelToken`. A cancelled call commits nothing but
//   still settles the flags it raised.
// - After a successful mutation the binding applies its `SyncPolicy`:
//   one reload, or a local insert/remove.
// - Nothing is retried. Failures are kept in `last_error` for display.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use bizconnect_core::config::SyncPolicy;
use bizconnect_core::error::{BizError, Result};
use bizconnect_core::types::Entity;

use crate::cancel::CancelToken;
use crate::traits::RemoteCollection;

/// Everything a view needs to render one collection.
#[derive(Debug, Clone)]
pub struct CollectionSnapshot<T: Entity> {
    items: Arc<Vec<T>>,
    is_loading: bool,
    creating: usize,
    deleting: BTreeMap<T::Id, usize>,
    last_error: Option<Arc<BizError>>,
    loads_in_flight: usize,
    refreshes_in_flight: usize,
    committed_fetch: u64,
}

impl<T: Entity> CollectionSnapshot<T> {
    fn initial() -> Self {
        Self {
            items: Arc::new(Vec::new()),
            is_loading: true,
            creating: 0,
            deleting: BTreeMap::new(),
            last_error: None,
            loads_in_flight: 0,
            refreshes_in_flight: 0,
            committed_fetch: 0,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Loaded, and nothing to show: render the empty-state call to action.
    pub fn is_empty_state(&self) -> bool {
        !self.is_loading && self.items.is_empty()
    }

    /// A post-mutation refetch is in flight. `items` is still current.
    pub fn is_refreshing(&self) -> bool {
        self.refreshes_in_flight > 0
    }

    pub fn is_creating(&self) -> bool {
        self.creating > 0
    }

    /// Any delete in flight.
    pub fn is_deleting(&self) -> bool {
        !self.deleting.is_empty()
    }

    /// A delete for this specific record is in flight.
    pub fn is_deleting_item(&self, id: T::Id) -> bool {
        self.deleting.contains_key(&id)
    }

    pub fn is_mutating(&self) -> bool {
        self.is_creating() || self.is_deleting()
    }

    /// The most recent failure, cleared by the next successful fetch.
    pub fn last_error(&self) -> Option<&BizError> {
        self.last_error.as_deref()
    }

    /// Whether the delete control for `id` should be disabled. With
    /// `lock_all` every control locks while any delete is in flight.
    pub fn delete_locked(&self, id: T::Id, lock_all: bool) -> bool {
        if lock_all {
            self.is_deleting()
        } else {
            self.is_deleting_item(id)
        }
    }
}

struct Inner<T: Entity> {
    remote: Arc<dyn RemoteCollection<T>>,
    policy: SyncPolicy,
    state: watch::Sender<CollectionSnapshot<T>>,
    fetch_seq: AtomicU64,
}

/// Shared handle to one bound collection. Clones observe the same state.
pub struct CollectionBinding<T: Entity> {
    inner: Arc<Inner<T>>,
}

impl<T: Entity> Clone for CollectionBinding<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Two handles are equal when they share state.
impl<T: Entity> PartialEq for CollectionBinding<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Entity> fmt::Debug for CollectionBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snap = self.inner.state.borrow();
        f.debug_struct("CollectionBinding")
            .field("collection", &T::COLLECTION)
            .field("policy", &self.inner.policy)
            .field("items", &snap.items.len())
            .field("is_loading", &snap.is_loading)
            .finish()
    }
}

impl<T: Entity> CollectionBinding<T> {
    /// Bind to `remote`. The binding starts in the loading state with no
    /// items; call `reload` to issue the first fetch.
    pub fn new(remote: Arc<dyn RemoteCollection<T>>, policy: SyncPolicy) -> Self {
        let (state, _rx) = watch::channel(CollectionSnapshot::initial());
        Self {
            inner: Arc::new(Inner {
                remote,
                policy,
                state,
                fetch_seq: AtomicU64::new(0),
            }),
        }
    }

    pub fn policy(&self) -> SyncPolicy {
        self.inner.policy
    }

    /// Current state.
    pub fn snapshot(&self) -> CollectionSnapshot<T> {
        self.inner.state.borrow().clone()
    }

    /// Receiver that wakes on every state change.
    pub fn subscribe(&self) -> watch::Receiver<CollectionSnapshot<T>> {
        self.inner.state.subscribe()
    }

    /// Refetch the whole collection and replace `items` in one step.
    #[instrument(skip_all, fields(collection = T::COLLECTION))]
    pub async fn reload(&self, cancel: &CancelToken) -> Result<()> {
        self.fetch(cancel, true).await
    }

    /// Shared by `reload` and the post-mutation refresh. Only a loading
    /// fetch touches `is_loading`.
    async fn fetch(&self, cancel: &CancelToken, loading: bool) -> Result<()> {
        let seq = self.inner.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.state.send_modify(|s| {
            if loading {
                s.is_loading = true;
                s.loads_in_flight += 1;
            } else {
                s.refreshes_in_flight += 1;
            }
        });

        let mut outcome = cancel.run(self.inner.remote.fetch_all()).await;

        self.inner.state.send_modify(|s| {
            if loading {
                s.loads_in_flight -= 1;
            } else {
                s.refreshes_in_flight -= 1;
            }
            let stale = seq < s.committed_fetch;
            match outcome {
                Ok(ref mut items) if !stale => {
                    s.items = Arc::new(std::mem::take(items));
                    s.committed_fetch = seq;
                    s.last_error = None;
                }
                Ok(_) => debug!(seq, "dropping stale fetch result"),
                Err(BizError::Cancelled) => debug!(seq, "fetch cancelled"),
                Err(ref e) if !stale => {
                    warn!(error = %e, "fetch failed");
                    s.last_error = Some(Arc::new(clone_error(e)));
                }
                Err(_) => {}
            }
            if loading && s.loads_in_flight == 0 {
                s.is_loading = false;
            }
        });

        outcome.map(|_| ())
    }

    /// Create a record. Resolves once the record exists remotely and the
    /// sync policy has been applied, so `items` includes it afterwards.
    #[instrument(skip_all, fields(collection = T::COLLECTION))]
    pub async fn create(&self, draft: T::Draft, cancel: &CancelToken) -> Result<T> {
        self.inner.state.send_modify(|s| s.creating += 1);

        let outcome = cancel.run(self.inner.remote.create(draft)).await;
        let apply_locally = self.inner.policy == SyncPolicy::ApplyLocally;

        self.inner.state.send_modify(|s| {
            s.creating -= 1;
            match outcome {
                Ok(ref record) if apply_locally => {
                    if !s.items.iter().any(|i| i.id() == record.id()) {
                        let mut items = Vec::with_capacity(s.items.len() + 1);
                        items.push(record.clone());
                        items.extend(s.items.iter().cloned());
                        s.items = Arc::new(items);
                    }
                }
                Ok(_) | Err(BizError::Cancelled) => {}
                Err(ref e) => {
                    warn!(error = %e, "create failed");
                    s.last_error = Some(Arc::new(clone_error(e)));
                }
            }
        });

        let record = outcome?;
        info!(id = %record.id(), "record created");
        self.resync(cancel).await;
        Ok(record)
    }

    /// Delete a record. Resolves once it is gone remotely and the sync
    /// policy has been applied.
    #[instrument(skip_all, fields(collection = T::COLLECTION, %id))]
    pub async fn delete(&self, id: T::Id, cancel: &CancelToken) -> Result<()> {
        self.inner
            .state
            .send_modify(|s| *s.deleting.entry(id).or_insert(0) += 1);

        let outcome = cancel.run(self.inner.remote.delete(id)).await;
        let apply_locally = self.inner.policy == SyncPolicy::ApplyLocally;

        self.inner.state.send_modify(|s| {
            if let Some(count) = s.deleting.get_mut(&id) {
                *count -= 1;
                if *count == 0 {
                    s.deleting.remove(&id);
                }
            }
            match outcome {
                Ok(()) if apply_locally => {
                    let items: Vec<T> = s.items.iter().filter(|i| i.id() != id).cloned().collect();
                    s.items = Arc::new(items);
                }
                Ok(()) | Err(BizError::Cancelled) => {}
                Err(ref e) => {
                    warn!(error = %e, "delete failed");
                    s.last_error = Some(Arc::new(clone_error(e)));
                }
            }
        });

        outcome?;
        info!("record deleted");
        self.resync(cancel).await;
        Ok(())
    }

    /// Post-mutation sync. A failed refetch does not fail the mutation that
    /// triggered it; the error is visible in the snapshot instead.
    async fn resync(&self, cancel: &CancelToken) {
        if self.inner.policy == SyncPolicy::ReloadAfterMutation
            && let Err(e) = self.fetch(cancel, false).await
        {
            debug!(error = %e, "post-mutation refetch did not complete");
        }
    }
}

/// `BizError` wraps non-cloneable sources (`io::Error`), so the copy kept
/// in a snapshot carries the message for those variants.
fn clone_error(e: &BizError) -> BizError {
    match e {
        BizError::Unauthenticated => BizError::Unauthenticated,
        BizError::SignIn(d) => BizError::SignIn(d.clone()),
        BizError::NotFound { collection, id } => BizError::NotFound {
            collection: *collection,
            id: id.clone(),
        },
        BizError::Validation(errors) => BizError::Validation(errors.clone()),
        BizError::Remote(d) => BizError::Remote(d.clone()),
        BizError::Cancelled => BizError::Cancelled,
        BizError::Database(d) => BizError::Database(d.clone()),
        BizError::Io(io) => BizError::Io(std::io::Error::new(io.kind(), io.to_string())),
        BizError::Serialization(se) => BizError::Remote(se.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryCollection;
    use bizconnect_core::types::{Invoice, NewInvoice, UserId};
    use chrono::NaiveDate;
    use std::time::Duration;

    fn draft(month: u8, amount: i64) -> NewInvoice {
        NewInvoice {
            month,
            sales_amount: amount,
            invoice_date: NaiveDate::from_ymd_opt(2024, month as u32, 1).unwrap(),
            description: None,
        }
    }

    fn seeded(owner: UserId, n: u8) -> Vec<Invoice> {
        (1..=n).map(|m| Invoice::from_draft(owner, draft(m, 100 * m as i64))).collect()
    }

    fn bind(
        remote: &Arc<MemoryCollection<Invoice>>,
        policy: SyncPolicy,
    ) -> CollectionBinding<Invoice> {
        CollectionBinding::new(remote.clone() as Arc<dyn RemoteCollection<Invoice>>, policy)
    }

    #[tokio::test]
    async fn loading_until_first_fetch_settles() {
        let owner = UserId::new();
        let remote = Arc::new(MemoryCollection::with_items(owner, seeded(owner, 2)));
        let binding = bind(&remote, SyncPolicy::ReloadAfterMutation);
        let cancel = CancelToken::new();

        assert!(binding.snapshot().is_loading());
        assert!(binding.snapshot().items().is_empty());

        binding.reload(&cancel).await.unwrap();
        let snap = binding.snapshot();
        assert!(!snap.is_loading());
        assert_eq!(snap.items().len(), 2);
        assert_eq!(remote.calls().fetches, 1);
    }

    #[tokio::test]
    async fn failed_first_fetch_settles_to_empty_state() {
        let remote = Arc::new(MemoryCollection::<Invoice>::new(UserId::new()));
        remote.fail_fetches(true);
        let binding = bind(&remote, SyncPolicy::ReloadAfterMutation);

        assert!(binding.reload(&CancelToken::new()).await.is_err());
        let snap = binding.snapshot();
        assert!(!snap.is_loading());
        assert!(snap.is_empty_state());
        assert!(matches!(snap.last_error(), Some(BizError::Remote(_))));
        // No automatic retry.
        assert_eq!(remote.calls().fetches, 1);
    }

    #[tokio::test]
    async fn empty_collection_renders_empty_state() {
        let remote = Arc::new(MemoryCollection::<Invoice>::new(UserId::new()));
        let binding = bind(&remote, SyncPolicy::ReloadAfterMutation);
        assert!(!binding.snapshot().is_empty_state());

        binding.reload(&CancelToken::new()).await.unwrap();
        assert!(binding.snapshot().is_empty_state());
    }

    #[tokio::test]
    async fn successive_reloads_are_identical() {
        let owner = UserId::new();
        let remote = Arc::new(MemoryCollection::with_items(owner, seeded(owner, 3)));
        let binding = bind(&remote, SyncPolicy::ReloadAfterMutation);
        let cancel = CancelToken::new();

        binding.reload(&cancel).await.unwrap();
        let first = binding.snapshot().items().to_vec();
        binding.reload(&cancel).await.unwrap();
        assert_eq!(binding.snapshot().items(), first.as_slice());
    }

    #[tokio::test]
    async fn create_reloads_once_and_includes_record() {
        let remote = Arc::new(MemoryCollection::<Invoice>::new(UserId::new()));
        let binding = bind(&remote, SyncPolicy::ReloadAfterMutation);
        let cancel = CancelToken::new();
        binding.reload(&cancel).await.unwrap();

        let created = binding.create(draft(3, 15_000), &cancel).await.unwrap();
        let snap = binding.snapshot();
        assert!(!snap.is_creating());
        assert_eq!(snap.items()[0].id, created.id);
        assert_eq!(remote.calls().fetches, 2);
    }

    #[tokio::test]
    async fn apply_locally_skips_refetch() {
        let owner = UserId::new();
        let remote = Arc::new(MemoryCollection::with_items(owner, seeded(owner, 2)));
        let binding = bind(&remote, SyncPolicy::ApplyLocally);
        let cancel = CancelToken::new();
        binding.reload(&cancel).await.unwrap();

        let created = binding.create(draft(5, 1), &cancel).await.unwrap();
        assert_eq!(binding.snapshot().items()[0].id, created.id);
        assert_eq!(binding.snapshot().items().len(), 3);

        binding.delete(created.id, &cancel).await.unwrap();
        assert!(!binding.snapshot().items().iter().any(|i| i.id == created.id));
        assert_eq!(remote.calls().fetches, 1);
    }

    #[tokio::test]
    async fn failed_mutation_settles_flags_and_keeps_items() {
        let owner = UserId::new();
        let remote = Arc::new(MemoryCollection::with_items(owner, seeded(owner, 2)));
        let binding = bind(&remote, SyncPolicy::ReloadAfterMutation);
        let cancel = CancelToken::new();
        binding.reload(&cancel).await.unwrap();
        let target = binding.snapshot().items()[0].id;

        remote.fail_mutations(true);
        assert!(binding.create(draft(1, 1), &cancel).await.is_err());
        assert!(binding.delete(target, &cancel).await.is_err());

        let snap = binding.snapshot();
        assert!(!snap.is_mutating());
        assert_eq!(snap.items().len(), 2);
        assert!(snap.last_error().is_some());
        assert_eq!(remote.calls().fetches, 1);
    }

    #[tokio::test]
    async fn mutating_flags_cover_in_flight_requests() {
        let owner = UserId::new();
        let remote = Arc::new(MemoryCollection::with_items(owner, seeded(owner, 2)));
        let binding = bind(&remote, SyncPolicy::ReloadAfterMutation);
        let cancel = CancelToken::new();
        binding.reload(&cancel).await.unwrap();
        let items = binding.snapshot().items().to_vec();
        remote.set_latency(Duration::from_millis(50));

        let b = binding.clone();
        let c = cancel.clone();
        let target = items[0].id;
        let pending = tokio::spawn(async move { b.delete(target, &c).await });

        let mut rx = binding.subscribe();
        rx.wait_for(|s| s.is_deleting()).await.unwrap();
        let snap = binding.snapshot();
        assert!(snap.is_deleting_item(target));
        assert!(!snap.is_deleting_item(items[1].id));
        assert!(snap.delete_locked(items[1].id, true));
        assert!(!snap.delete_locked(items[1].id, false));

        pending.await.unwrap().unwrap();
        assert!(!binding.snapshot().is_deleting());
    }

    #[tokio::test]
    async fn mutation_refetch_keeps_list_visible() {
        let owner = UserId::new();
        let remote = Arc::new(MemoryCollection::with_items(owner, seeded(owner, 3)));
        let binding = bind(&remote, SyncPolicy::ReloadAfterMutation);
        let cancel = CancelToken::new();
        binding.reload(&cancel).await.unwrap();
        let target = binding.snapshot().items()[0].id;
        remote.set_latency(Duration::from_millis(20));

        let mut rx = binding.subscribe();
        let watcher = tokio::spawn(async move {
            let (mut saw_loading, mut saw_refresh) = (false, false);
            while rx.changed().await.is_ok() {
                let snap = rx.borrow_and_update().clone();
                saw_loading |= snap.is_loading();
                saw_refresh |= snap.is_refreshing();
                if saw_refresh && !snap.is_refreshing() && !snap.is_deleting() {
                    break;
                }
            }
            (saw_loading, saw_refresh)
        });

        binding.delete(target, &cancel).await.unwrap();
        let (saw_loading, saw_refresh) = watcher.await.unwrap();
        assert!(!saw_loading);
        assert!(saw_refresh);

        let snap = binding.snapshot();
        assert!(!snap.is_loading());
        assert!(!snap.is_refreshing());
        assert_eq!(snap.items().len(), 2);
        assert_eq!(remote.calls().fetches, 2);
    }

    #[tokio::test]
    async fn create_flag_reaches_subscribers() {
        let remote = Arc::new(MemoryCollection::<Invoice>::new(UserId::new()));
        let binding = bind(&remote, SyncPolicy::ReloadAfterMutation);
        let cancel = CancelToken::new();
        binding.reload(&cancel).await.unwrap();
        remote.set_latency(Duration::from_millis(20));

        let mut rx = binding.subscribe();
        let b = binding.clone();
        let c = cancel.clone();
        let pending = tokio::spawn(async move { b.create(draft(4, 400), &c).await });

        rx.wait_for(|s| s.is_creating()).await.unwrap();
        rx.wait_for(|s| !s.is_creating()).await.unwrap();
        pending.await.unwrap().unwrap();
        assert!(!rx.borrow().is_creating());
    }

    #[tokio::test]
    async fn concurrent_creates_are_not_deduplicated() {
        let remote = Arc::new(MemoryCollection::<Invoice>::new(UserId::new()));
        let binding = bind(&remote, SyncPolicy::ReloadAfterMutation);
        let cancel = CancelToken::new();
        binding.reload(&cancel).await.unwrap();

        let (a, b) = tokio::join!(
            binding.create(draft(1, 1), &cancel),
            binding.create(draft(1, 1), &cancel)
        );
        assert_ne!(a.unwrap().id, b.unwrap().id);
        assert_eq!(remote.calls().creates, 2);
        assert_eq!(binding.snapshot().items().len(), 2);
    }

    #[tokio::test]
    async fn cancelled_reload_commits_nothing_and_stops_loading() {
        let owner = UserId::new();
        let remote = Arc::new(MemoryCollection::with_items(owner, seeded(owner, 2)));
        remote.set_latency(Duration::from_secs(30));
        let binding = bind(&remote, SyncPolicy::ReloadAfterMutation);
        let cancel = CancelToken::new();

        let c = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            c.cancel();
        });
        let out = binding.reload(&cancel).await;
        assert!(matches!(out, Err(BizError::Cancelled)));

        let snap = binding.snapshot();
        assert!(!snap.is_loading());
        assert!(snap.items().is_empty());
        assert!(snap.last_error().is_none());
    }

    #[tokio::test]
    async fn stale_fetch_never_overwrites_newer_one() {
        let owner = UserId::new();
        let remote = Arc::new(MemoryCollection::with_items(owner, seeded(owner, 1)));
        let binding = bind(&remote, SyncPolicy::ApplyLocally);
        let cancel = CancelToken::new();

        // First fetch is slow and sees one item.
        remote.set_latency(Duration::from_millis(80));
        let b = binding.clone();
        let c = cancel.clone();
        let slow = tokio::spawn(async move { b.reload(&c).await });
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Meanwhile a second item lands and a fast fetch commits both.
        remote.set_latency(Duration::ZERO);
        remote.create(draft(2, 2)).await.unwrap();
        binding.reload(&cancel).await.unwrap();
        assert_eq!(binding.snapshot().items().len(), 2);
        assert!(binding.snapshot().is_loading());

        slow.await.unwrap().unwrap();
        let snap = binding.snapshot();
        assert_eq!(snap.items().len(), 2);
        assert!(!snap.is_loading());
    }
}
