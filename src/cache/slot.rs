//! Shared cache slot for one entity type

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use log::debug;
use tokio::time::Instant;

use super::entry::CacheEntry;
use super::fetcher::Fetcher;
use super::registry::InvalidationRegistry;
use super::{EntityKind, ScopeId};
use crate::error::FetchError;

type SharedFetch<T> = Shared<BoxFuture<'static, Result<T, FetchError>>>;

struct Flight<T> {
    id: u64,
    epoch: u64,
    future: SharedFetch<T>,
}

struct SlotState<T> {
    entry: Option<CacheEntry<T>>,
    /// Bumped by `invalidate`; results of requests from older epochs are dropped
    epoch: u64,
    next_flight: u64,
    inflight: HashMap<ScopeId, Flight<T>>,
}

/// Point-in-time view of a slot for display.
#[derive(Debug, Clone)]
pub struct SlotSnapshot {
    pub kind: EntityKind,
    pub ttl: Duration,
    pub age: Option<Duration>,
    pub scope: Option<ScopeId>,
    pub fresh: bool,
    pub in_flight: usize,
    pub subscribers: usize,
}

/// The process-wide cache slot for one entity type.
///
/// Holds at most one entry. Concurrent requests for the same organization
/// share a single upstream call, and an entry is only ever replaced by the
/// result of a request that started later than the one that produced it.
pub struct EntitySlot<T> {
    kind: EntityKind,
    ttl: Duration,
    fetch_timeout: Duration,
    state: Mutex<SlotState<T>>,
    registry: InvalidationRegistry,
}

impl<T> EntitySlot<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(kind: EntityKind, ttl: Duration, fetch_timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            kind,
            ttl,
            fetch_timeout,
            state: Mutex::new(SlotState {
                entry: None,
                epoch: 0,
                next_flight: 0,
                inflight: HashMap::new(),
            }),
            registry: InvalidationRegistry::new(),
        })
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn registry(&self) -> &InvalidationRegistry {
        &self.registry
    }

    fn lock(&self) -> MutexGuard<'_, SlotState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fresh entry for `scope`, if any.
    pub fn lookup(&self, scope: &ScopeId) -> Option<T> {
        let state = self.lock();
        let entry = state.entry.as_ref()?;
        entry
            .is_usable(scope, self.ttl, Instant::now())
            .then(|| entry.data.clone())
    }

    /// Entry for `scope` regardless of age.
    pub fn stale(&self, scope: &ScopeId) -> Option<T> {
        let state = self.lock();
        let entry = state.entry.as_ref()?;
        entry.matches_scope(scope).then(|| entry.data.clone())
    }

    /// Read through the slot: a fresh entry is returned as is, otherwise the
    /// caller joins the in-flight request for `scope` or starts one.
    pub async fn fetch(
        self: &Arc<Self>,
        scope: &ScopeId,
        fetcher: Arc<dyn Fetcher<T>>,
    ) -> Result<T, FetchError> {
        if let Some(data) = self.lookup(scope) {
            debug!("Cache hit: {} for {}", self.kind, scope);
            return Ok(data);
        }
        self.join_or_start(scope, fetcher).await
    }

    /// Drop the entry and fetch again regardless of TTL.
    ///
    /// Joins a request already in flight for `scope`, so concurrent
    /// revalidations cost one upstream call.
    pub async fn refetch(
        self: &Arc<Self>,
        scope: &ScopeId,
        fetcher: Arc<dyn Fetcher<T>>,
    ) -> Result<T, FetchError> {
        self.lock().entry = None;
        self.join_or_start(scope, fetcher).await
    }

    /// Drop the entry, discard results of requests already in flight, and
    /// tell every mounted handle to revalidate. Returns the number notified.
    pub fn invalidate(&self) -> usize {
        {
            let mut state = self.lock();
            state.entry = None;
            state.epoch += 1;
        }
        debug!("Invalidated {} cache", self.kind);
        self.registry.notify_all()
    }

    pub fn snapshot(&self) -> SlotSnapshot {
        let now = Instant::now();
        let state = self.lock();
        let entry = state.entry.as_ref();

        SlotSnapshot {
            kind: self.kind,
            ttl: self.ttl,
            age: entry.map(|e| e.age(now)),
            scope: entry.and_then(|e| e.scope_key.clone()),
            fresh: entry.is_some_and(|e| e.is_fresh(self.ttl, now)),
            in_flight: state.inflight.len(),
            subscribers: self.registry.len(),
        }
    }

    fn join_or_start(
        self: &Arc<Self>,
        scope: &ScopeId,
        fetcher: Arc<dyn Fetcher<T>>,
    ) -> SharedFetch<T> {
        let mut state = self.lock();

        if let Some(flight) = state.inflight.get(scope)
            && flight.epoch == state.epoch
        {
            debug!("Joining in-flight {} request for {}", self.kind, scope);
            return flight.future.clone();
        }

        let id = state.next_flight;
        state.next_flight += 1;
        let epoch = state.epoch;

        debug!("Cache miss: {} for {}", self.kind, scope);
        let future = Self::run(
            Arc::downgrade(self),
            scope.clone(),
            fetcher,
            id,
            epoch,
            self.fetch_timeout,
        )
        .boxed()
        .shared();

        state.inflight.insert(
            scope.clone(),
            Flight {
                id,
                epoch,
                future: future.clone(),
            },
        );
        future
    }

    async fn run(
        slot: Weak<Self>,
        scope: ScopeId,
        fetcher: Arc<dyn Fetcher<T>>,
        id: u64,
        epoch: u64,
        timeout: Duration,
    ) -> Result<T, FetchError> {
        let started = Instant::now();
        let outcome = match tokio::time::timeout(timeout, fetcher.fetch(&scope)).await {
            Ok(Ok(data)) => Ok(data),
            Ok(Err(err)) => Err(FetchError::from(err)),
            Err(_) => Err(FetchError::Timeout(timeout)),
        };

        if let Some(slot) = slot.upgrade() {
            slot.complete(&scope, id, epoch, started, &outcome);
        }
        outcome
    }

    fn complete(
        &self,
        scope: &ScopeId,
        id: u64,
        epoch: u64,
        started: Instant,
        outcome: &Result<T, FetchError>,
    ) {
        let mut state = self.lock();

        if state.inflight.get(scope).is_some_and(|f| f.id == id) {
            state.inflight.remove(scope);
        }

        let Ok(data) = outcome else {
            return;
        };
        if state.epoch != epoch {
            debug!("Discarding {} result for {}: invalidated while in flight", self.kind, scope);
            return;
        }
        if state
            .entry
            .as_ref()
            .is_some_and(|current| current.requested_at > started)
        {
            debug!("Discarding {} result for {}: newer entry present", self.kind, scope);
            return;
        }

        state.entry = Some(CacheEntry::new(data.clone(), started, Some(scope.clone())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::fetcher::testing::ScriptedFetcher;

    const TTL: Duration = Duration::from_secs(300);
    const TIMEOUT: Duration = Duration::from_secs(10);

    fn slot() -> Arc<EntitySlot<Vec<String>>> {
        EntitySlot::new(EntityKind::Members, TTL, TIMEOUT)
    }

    fn org(id: &str) -> ScopeId {
        ScopeId::from(id)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_populates_and_hits_within_ttl() {
        let slot = slot();
        let fetcher = ScriptedFetcher::new();

        let first = slot.fetch(&org("a"), fetcher.clone()).await.unwrap();
        assert_eq!(first, vec!["a#1"]);

        tokio::time::advance(Duration::from_secs(60)).await;
        let second = slot.fetch(&org("a"), fetcher.clone()).await.unwrap();
        assert_eq!(second, vec!["a#1"]);
        assert_eq!(fetcher.calls(), 1);

        tokio::time::advance(Duration::from_secs(241)).await;
        let third = slot.fetch(&org("a"), fetcher.clone()).await.unwrap();
        assert_eq!(third, vec!["a#2"]);
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_never_crosses_scopes() {
        let slot = slot();
        let fetcher = ScriptedFetcher::new();

        slot.fetch(&org("a"), fetcher.clone()).await.unwrap();
        assert!(slot.lookup(&org("a")).is_some());
        assert!(slot.lookup(&org("b")).is_none());
        assert!(slot.stale(&org("b")).is_none());

        let b = slot.fetch(&org("b"), fetcher.clone()).await.unwrap();
        assert_eq!(b, vec!["b#2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_fetches_share_one_request() {
        let slot = slot();
        let fetcher = ScriptedFetcher::with_delay(Duration::from_millis(100));
        let scope_a = org("a");

        let (a, b, c) = tokio::join!(
            slot.fetch(&scope_a, fetcher.clone()),
            slot.fetch(&scope_a, fetcher.clone()),
            slot.refetch(&scope_a, fetcher.clone()),
        );

        assert_eq!(fetcher.calls(), 1);
        assert_eq!(a.unwrap(), vec!["a#1"]);
        assert_eq!(b.unwrap(), vec!["a#1"]);
        assert_eq!(c.unwrap(), vec!["a#1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetch_ignores_ttl() {
        let slot = slot();
        let fetcher = ScriptedFetcher::new();

        slot.fetch(&org("a"), fetcher.clone()).await.unwrap();
        let again = slot.refetch(&org("a"), fetcher.clone()).await.unwrap();

        assert_eq!(again, vec!["a#2"]);
        assert_eq!(slot.lookup(&org("a")), Some(vec!["a#2".to_string()]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_older_request_does_not_overwrite_newer_entry() {
        let slot = slot();
        let fetcher = ScriptedFetcher::new();
        fetcher.set_delay_for("a", Duration::from_millis(500));
        fetcher.set_delay_for("b", Duration::from_millis(50));

        let slow = slot.clone();
        let slow_fetcher = fetcher.clone();
        let a = tokio::spawn(async move { slow.fetch(&org("a"), slow_fetcher).await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        let b = slot.fetch(&org("b"), fetcher.clone()).await.unwrap();
        let a = a.await.unwrap().unwrap();

        // Both callers get their own data
        assert_eq!(a, vec!["a#1"]);
        assert_eq!(b, vec!["b#2"]);

        // The slot keeps the result of the request that started last
        assert!(slot.lookup(&org("a")).is_none());
        assert_eq!(slot.lookup(&org("b")), Some(b));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_discards_in_flight_result() {
        let slot = slot();
        let fetcher = ScriptedFetcher::with_delay(Duration::from_millis(100));

        let pending = slot.clone();
        let pending_fetcher = fetcher.clone();
        let task = tokio::spawn(async move { pending.fetch(&org("a"), pending_fetcher).await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        slot.invalidate();

        // The waiting caller still receives the data
        assert_eq!(task.await.unwrap().unwrap(), vec!["a#1"]);
        assert!(slot.lookup(&org("a")).is_none());

        // A request after invalidation does not join the old one
        let fresh = slot.fetch(&org("a"), fetcher.clone()).await.unwrap();
        assert_eq!(fresh, vec!["a#2"]);
        assert_eq!(slot.lookup(&org("a")), Some(fresh));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_a_fetch_failure() {
        let slot: Arc<EntitySlot<Vec<String>>> =
            EntitySlot::new(EntityKind::Members, TTL, Duration::from_secs(1));
        let fetcher = ScriptedFetcher::with_delay(Duration::from_secs(30));

        let err = slot.fetch(&org("a"), fetcher.clone()).await.unwrap_err();
        assert_eq!(err, FetchError::Timeout(Duration::from_secs(1)));
        assert!(slot.stale(&org("a")).is_none());
        assert_eq!(slot.snapshot().in_flight, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_previous_entry() {
        let slot = slot();
        let fetcher = ScriptedFetcher::new();
        slot.fetch(&org("a"), fetcher.clone()).await.unwrap();

        tokio::time::advance(Duration::from_secs(301)).await;
        fetcher.set_failing(true);

        let err = slot.fetch(&org("a"), fetcher.clone()).await.unwrap_err();
        assert_eq!(err, FetchError::Upstream("Operation failed: upstream unavailable".to_string()));
        assert_eq!(slot.stale(&org("a")), Some(vec!["a#1".to_string()]));
        assert!(slot.lookup(&org("a")).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_with_no_handles() {
        let slot = slot();
        assert_eq!(slot.invalidate(), 0);
        assert!(slot.snapshot().age.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_reports_entry() {
        let slot = slot();
        slot.fetch(&org("a"), ScriptedFetcher::new()).await.unwrap();
        tokio::time::advance(Duration::from_secs(5)).await;

        let snapshot = slot.snapshot();
        assert_eq!(snapshot.kind, EntityKind::Members);
        assert_eq!(snapshot.age, Some(Duration::from_secs(5)));
        assert_eq!(snapshot.scope, Some(org("a")));
        assert!(snapshot.fresh);
        assert_eq!(snapshot.subscribers, 0);
    }
}
