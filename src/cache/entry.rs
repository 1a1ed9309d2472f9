//! A populated cache slot

use std::time::Duration;

use tokio::time::Instant;

use super::ScopeId;

/// The last successfully fetched value for one entity type.
///
/// Entries are replaced wholesale on every successful fetch and never
/// mutated in place.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub data: T,
    /// When the entry was populated
    pub timestamp: Instant,
    /// When the request that produced it started
    pub requested_at: Instant,
    /// Organization the entry is valid for; `None` means any
    pub scope_key: Option<ScopeId>,
}

impl<T> CacheEntry<T> {
    pub fn new(data: T, requested_at: Instant, scope_key: Option<ScopeId>) -> Self {
        Self {
            data,
            timestamp: Instant::now(),
            requested_at,
            scope_key,
        }
    }

    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.timestamp)
    }

    pub fn matches_scope(&self, scope: &ScopeId) -> bool {
        self.scope_key.as_ref().is_none_or(|key| key == scope)
    }

    pub fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        self.age(now) < ttl
    }

    /// Fresh and valid for `scope`.
    pub fn is_usable(&self, scope: &ScopeId, ttl: Duration, now: Instant) -> bool {
        self.is_fresh(ttl, now) && self.matches_scope(scope)
    }
}
