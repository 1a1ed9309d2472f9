//! Invalidation callbacks registered by mounted handles

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use log::{debug, error};

type Callback = Box<dyn Fn() + Send + Sync>;

struct Listener {
    id: u64,
    active: AtomicBool,
    callback: Callback,
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<Arc<Listener>>,
}

/// Callbacks to run when an entity's cached data goes stale.
///
/// Cloning shares the same set of listeners.
#[derive(Clone, Default)]
pub struct InvalidationRegistry {
    inner: Arc<Mutex<Listeners>>,
}

fn lock(inner: &Mutex<Listeners>) -> MutexGuard<'_, Listeners> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InvalidationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a callback. It stays registered until the returned
    /// [`Registration`] is unregistered or dropped.
    pub fn register<F>(&self, callback: F) -> Registration
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut listeners = lock(&self.inner);
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push(Arc::new(Listener {
            id,
            active: AtomicBool::new(true),
            callback: Box::new(callback),
        }));

        Registration {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Run every registered callback and return how many were run.
    ///
    /// Callbacks run outside the lock, so they may register or unregister.
    /// A panicking callback is logged and the remaining callbacks still run.
    pub fn notify_all(&self) -> usize {
        let snapshot: Vec<Arc<Listener>> = lock(&self.inner).entries.clone();

        let mut invoked = 0;
        for listener in snapshot {
            if !listener.active.load(Ordering::Acquire) {
                continue;
            }
            invoked += 1;
            if catch_unwind(AssertUnwindSafe(|| (listener.callback)())).is_err() {
                error!("Invalidation callback {} panicked", listener.id);
            }
        }

        debug!("Notified {} invalidation listeners", invoked);
        invoked
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Keeps a callback registered. Dropping it unregisters.
pub struct Registration {
    id: u64,
    registry: Weak<Mutex<Listeners>>,
}

impl Registration {
    pub fn unregister(self) {
        drop(self);
    }

    fn remove(&self) {
        let Some(inner) = self.registry.upgrade() else {
            return;
        };
        let mut listeners = lock(&inner);
        if let Some(pos) = listeners.entries.iter().position(|l| l.id == self.id) {
            let listener = listeners.entries.remove(pos);
            listener.active.store(false, Ordering::Release);
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.remove();
    }
}
