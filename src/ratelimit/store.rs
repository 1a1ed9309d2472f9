//! Counter stores backing the rate-limit guard

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use tokio::time::Instant;

use super::Quota;
use crate::error::RateLimitError;

/// Keys are swept of fully expired windows once the map grows past this.
const SWEEP_THRESHOLD: usize = 10_000;

/// Minimum time between two sweeps.
const SWEEP_INTERVAL: Duration = Duration::from_secs(30);

/// Result of recording one request against a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowHit {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_after: Duration,
}

/// A store that counts requests per key over a sliding window.
///
/// `hit` must check and record atomically: two concurrent hits on the same
/// key may never both observe the last free slot.
#[async_trait]
pub trait WindowStore: Send + Sync {
    async fn hit(&self, key: &str, quota: Quota) -> Result<WindowHit, RateLimitError>;

    /// Backend name for logs
    fn name(&self) -> &'static str;
}

/// Single-process sliding-window log.
///
/// Each key keeps the instants of its admitted requests within the window.
/// Rejected requests are not recorded, so a caller that keeps retrying
/// regains access as soon as its oldest admitted request ages out.
#[derive(Default)]
pub struct InMemoryWindowStore {
    state: Mutex<Windows>,
}

#[derive(Default)]
struct Windows {
    keys: HashMap<String, KeyWindow>,
    last_sweep: Option<Instant>,
}

/// Admitted hits for one key, with the window they were counted under.
struct KeyWindow {
    window: Duration,
    hits: VecDeque<Instant>,
}

impl KeyWindow {
    fn is_idle(&self, now: Instant) -> bool {
        self.hits
            .back()
            .is_none_or(|t| now.duration_since(*t) >= self.window)
    }
}

impl Windows {
    /// Drop keys whose own window has fully expired. Runs at most once per
    /// `SWEEP_INTERVAL`, and only while more than `SWEEP_THRESHOLD` keys exist.
    fn maybe_sweep(&mut self, now: Instant) {
        if self.keys.len() <= SWEEP_THRESHOLD {
            return;
        }
        if self
            .last_sweep
            .is_some_and(|last| now.duration_since(last) < SWEEP_INTERVAL)
        {
            return;
        }
        self.last_sweep = Some(now);

        let before = self.keys.len();
        self.keys.retain(|_, key| !key.is_idle(now));
        debug!("Swept {} idle rate-limit keys", before - self.keys.len());
    }
}

impl InMemoryWindowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.state.lock().map(|w| w.keys.len()).unwrap_or(0)
    }
}

#[async_trait]
impl WindowStore for InMemoryWindowStore {
    async fn hit(&self, key: &str, quota: Quota) -> Result<WindowHit, RateLimitError> {
        let window = quota.window();
        let now = Instant::now();

        let mut state = self
            .state
            .lock()
            .map_err(|_| RateLimitError::BackendUnavailable("window store poisoned".to_string()))?;

        state.maybe_sweep(now);

        let entry = state.keys.entry(key.to_string()).or_insert_with(|| KeyWindow {
            window,
            hits: VecDeque::new(),
        });
        // A key's window follows the quota it was last counted under
        entry.window = window;
        let hits = &mut entry.hits;
        while let Some(oldest) = hits.front() {
            if now.duration_since(*oldest) >= window {
                hits.pop_front();
            } else {
                break;
            }
        }

        let used = hits.len() as u32;
        let allowed = used < quota.limit;
        if allowed {
            hits.push_back(now);
        }

        let remaining = quota.limit.saturating_sub(used + u32::from(allowed));
        let reset_after = hits
            .front()
            .map(|oldest| window.saturating_sub(now.duration_since(*oldest)))
            .unwrap_or(window);

        Ok(WindowHit {
            allowed,
            remaining,
            reset_after,
        })
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
