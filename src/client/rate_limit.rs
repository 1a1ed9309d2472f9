//! Outbound throttling for platform API calls
//!
//! Reactive: a class of endpoints is only throttled after the platform has
//! answered one of its requests with 429. From then on requests in that class
//! are paced to the class quota.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, Ordering};

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota as GovernorQuota, RateLimiter};
use log::debug;

use crate::ratelimit::{EndpointClass, Quota, QuotaTable};

/// Convert a sliding-window quota to a token bucket with the same
/// sustained rate and a burst of the full window.
fn governor_quota(quota: Quota) -> GovernorQuota {
    let limit = NonZeroU32::new(quota.limit).unwrap_or(NonZeroU32::MIN);
    let period = quota.window() / limit.get();

    GovernorQuota::with_period(period)
        .unwrap_or_else(|| GovernorQuota::per_second(limit))
        .allow_burst(limit)
}

/// Pacing state for a single endpoint class.
pub struct EndpointRateLimiter {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    active: AtomicBool,
    class: EndpointClass,
}

impl EndpointRateLimiter {
    pub fn new(class: EndpointClass, quota: Quota) -> Self {
        Self {
            limiter: RateLimiter::direct(governor_quota(quota)),
            active: AtomicBool::new(false),
            class,
        }
    }

    /// Activate throttling for this class.
    pub fn activate(&self) {
        let was_active = self.active.swap(true, Ordering::SeqCst);
        if !was_active {
            debug!("Outbound throttling activated for {}", self.class);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Wait for a permit if throttling is active.
    pub async fn wait_if_active(&self) {
        if self.is_active() {
            debug!("Waiting for {} throttle", self.class);
            self.limiter.until_ready().await;
        }
    }
}

/// One limiter per endpoint class.
pub struct RateLimiterSet {
    limiters: HashMap<EndpointClass, EndpointRateLimiter>,
}

impl Default for RateLimiterSet {
    fn default() -> Self {
        Self::new(&QuotaTable::default())
    }
}

impl RateLimiterSet {
    pub fn new(quotas: &QuotaTable) -> Self {
        let limiters = EndpointClass::ALL
            .into_iter()
            .map(|class| (class, EndpointRateLimiter::new(class, quotas.get(class))))
            .collect();

        Self { limiters }
    }

    pub async fn wait_for(&self, class: EndpointClass) {
        if let Some(limiter) = self.limiters.get(&class) {
            limiter.wait_if_active().await;
        }
    }

    /// Called when the platform answers 429.
    pub fn activate(&self, class: EndpointClass) {
        if let Some(limiter) = self.limiters.get(&class) {
            limiter.activate();
        }
    }

    pub fn is_active(&self, class: EndpointClass) -> bool {
        self.limiters.get(&class).is_some_and(|l| l.is_active())
    }
}
