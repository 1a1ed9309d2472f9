//! Mounted consumer of an entity slot

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, warn};
use tokio::sync::{Notify, watch};
use tokio::task::{JoinHandle, JoinSet};

use super::fetcher::Fetcher;
use super::registry::Registration;
use super::slot::EntitySlot;
use super::{CacheState, ScopeId};
use crate::error::FetchError;

#[derive(Debug, Clone, Copy)]
enum Load {
    /// Serve a fresh entry if present, otherwise fetch
    ReadThrough,
    /// Fetch regardless of TTL
    Revalidate,
}

struct Progress {
    scope: Option<ScopeId>,
    /// Sequence number of the last load started
    issued: u64,
    /// Sequence number of the last load whose result was applied
    applied: u64,
    /// Whether `data` holds a real value for `scope`
    has_data: bool,
}

struct HandleShared<T> {
    slot: Arc<EntitySlot<T>>,
    fetcher: Arc<dyn Fetcher<T>>,
    state_tx: watch::Sender<CacheState<T>>,
    progress: Mutex<Progress>,
    mounted: AtomicBool,
    revalidations: AtomicU64,
}

/// A mounted view of one entity slot for the active organization.
///
/// Mounting serves a fresh entry immediately or starts a fetch. The handle
/// follows the organization published on its scope channel, revalidates
/// whenever the slot is invalidated, and stops all updates once dropped.
///
/// Must be mounted from within a Tokio runtime.
pub struct EntityHandle<T> {
    shared: Arc<HandleShared<T>>,
    driver: JoinHandle<()>,
    _registration: Registration,
}

impl<T> EntityHandle<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    pub fn mount(
        slot: Arc<EntitySlot<T>>,
        mut scope_rx: watch::Receiver<Option<ScopeId>>,
        fetcher: Arc<dyn Fetcher<T>>,
    ) -> Self {
        let scope = scope_rx.borrow_and_update().clone();

        let (initial, has_data) = match &scope {
            None => (CacheState::empty(), false),
            Some(scope) => match slot.lookup(scope) {
                Some(data) => {
                    debug!("Serving cached {} for {}", slot.kind(), scope);
                    (CacheState::ready(data), true)
                }
                None => (CacheState::pending(), false),
            },
        };
        let needs_load = scope.is_some() && !has_data;

        let (state_tx, _) = watch::channel(initial);
        let shared = Arc::new(HandleShared {
            slot,
            fetcher,
            state_tx,
            progress: Mutex::new(Progress {
                scope,
                issued: 0,
                applied: 0,
                has_data,
            }),
            mounted: AtomicBool::new(true),
            revalidations: AtomicU64::new(0),
        });

        let notify = Arc::new(Notify::new());
        let listener = Arc::downgrade(&notify);
        let registration = shared.slot.registry().register(move || {
            if let Some(notify) = listener.upgrade() {
                notify.notify_one();
            }
        });

        let driver = tokio::spawn(drive(shared.clone(), scope_rx, notify, needs_load));

        Self {
            shared,
            driver,
            _registration: registration,
        }
    }

    /// Current state.
    pub fn state(&self) -> CacheState<T> {
        self.shared.state_tx.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<CacheState<T>> {
        self.shared.state_tx.subscribe()
    }

    /// Wait until no load is pending and return the state.
    pub async fn settled(&self) -> CacheState<T> {
        let mut rx = self.subscribe();
        match rx.wait_for(|state| !state.loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }

    /// Drop the slot's entry and fetch again regardless of TTL.
    ///
    /// Concurrent revalidations of the same organization share one request.
    /// Does nothing while no organization is active.
    pub async fn revalidate(&self) {
        let Some((scope, seq)) = self.shared.begin(Load::Revalidate) else {
            return;
        };
        self.shared.clone().run(scope, seq, Load::Revalidate).await;
    }

    /// Number of revalidations this handle has started.
    pub fn revalidations(&self) -> u64 {
        self.shared.revalidations.load(Ordering::Relaxed)
    }

    /// Stop updates and unregister from invalidation.
    pub fn unmount(self) {
        drop(self);
    }
}

impl<T> Drop for EntityHandle<T> {
    fn drop(&mut self) {
        self.shared.mounted.store(false, Ordering::Release);
        self.driver.abort();
    }
}

async fn drive<T>(
    shared: Arc<HandleShared<T>>,
    mut scope_rx: watch::Receiver<Option<ScopeId>>,
    notify: Arc<Notify>,
    initial_load: bool,
) where
    T: Clone + Default + Send + Sync + 'static,
{
    let mut loads = JoinSet::new();
    let mut scope_open = true;

    if initial_load {
        shared.spawn(&mut loads, Load::ReadThrough);
    }

    loop {
        tokio::select! {
            changed = scope_rx.changed(), if scope_open => {
                if changed.is_err() {
                    scope_open = false;
                    continue;
                }
                let scope = scope_rx.borrow_and_update().clone();
                if shared.switch_scope(scope) {
                    loads.abort_all();
                    shared.spawn(&mut loads, Load::ReadThrough);
                }
            }
            _ = notify.notified() => {
                shared.spawn(&mut loads, Load::Revalidate);
            }
            Some(_) = loads.join_next(), if !loads.is_empty() => {}
        }
    }
}

impl<T> HandleShared<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    fn progress(&self) -> MutexGuard<'_, Progress> {
        self.progress.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reset state for a new organization. Returns whether a load is needed.
    fn switch_scope(&self, scope: Option<ScopeId>) -> bool {
        let mut progress = self.progress();
        if progress.scope == scope {
            return false;
        }

        debug!(
            "{} scope changed: {:?} -> {:?}",
            self.slot.kind(),
            progress.scope,
            scope
        );
        // Loads started for the previous scope can no longer apply
        progress.applied = progress.issued;
        progress.scope = scope.clone();

        let Some(scope) = scope else {
            progress.has_data = false;
            self.state_tx.send_replace(CacheState::empty());
            return false;
        };

        match self.slot.lookup(&scope) {
            Some(data) => {
                progress.has_data = true;
                self.state_tx.send_replace(CacheState::ready(data));
                false
            }
            None => {
                progress.has_data = false;
                self.state_tx.send_replace(CacheState::pending());
                true
            }
        }
    }

    /// Reserve a sequence number for a load of the current scope.
    fn begin(&self, load: Load) -> Option<(ScopeId, u64)> {
        let mut progress = self.progress();
        let scope = progress.scope.clone()?;
        progress.issued += 1;
        let seq = progress.issued;

        if matches!(load, Load::Revalidate) {
            self.revalidations.fetch_add(1, Ordering::Relaxed);
        }
        self.state_tx.send_if_modified(|state| {
            let changed = !state.loading || state.error.is_some();
            state.loading = true;
            state.error = None;
            changed
        });
        Some((scope, seq))
    }

    fn spawn(self: &Arc<Self>, loads: &mut JoinSet<()>, load: Load) {
        if let Some((scope, seq)) = self.begin(load) {
            loads.spawn(self.clone().run(scope, seq, load));
        }
    }

    async fn run(self: Arc<Self>, scope: ScopeId, seq: u64, load: Load) {
        let result = match load {
            Load::ReadThrough => self.slot.fetch(&scope, self.fetcher.clone()).await,
            Load::Revalidate => self.slot.refetch(&scope, self.fetcher.clone()).await,
        };
        self.apply(&scope, seq, result);
    }

    /// Apply a load result unless the handle was unmounted, the scope
    /// changed, or a later load already applied.
    fn apply(&self, scope: &ScopeId, seq: u64, result: Result<T, FetchError>) {
        if !self.mounted.load(Ordering::Acquire) {
            return;
        }

        let mut progress = self.progress();
        if progress.scope.as_ref() != Some(scope) || seq <= progress.applied {
            debug!("Dropping superseded {} result for {}", self.slot.kind(), scope);
            return;
        }
        progress.applied = seq;
        let loading = progress.applied < progress.issued;
        let kind = self.slot.kind();

        match result {
            Ok(data) => {
                progress.has_data = true;
                self.state_tx.send_replace(CacheState {
                    data,
                    loading,
                    error: None,
                });
            }
            Err(err) => {
                if let Some(stale) = self.slot.stale(scope) {
                    warn!("Failed to refresh {} for {}: {}; serving cached data", kind, scope, err);
                    progress.has_data = true;
                    self.state_tx.send_replace(CacheState {
                        data: stale,
                        loading,
                        error: None,
                    });
                } else if progress.has_data {
                    warn!("Failed to refresh {} for {}: {}; keeping last data", kind, scope, err);
                    self.state_tx.send_modify(|state| {
                        state.loading = loading;
                        state.error = None;
                    });
                } else {
                    warn!("Failed to load {} for {}: {}", kind, scope, err);
                    self.state_tx.send_replace(CacheState {
                        data: T::default(),
                        loading,
                        error: Some(format!("Failed to load {}: {}", kind, err)),
                    });
                }
            }
        }
    }
}
