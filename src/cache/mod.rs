//! Revalidating, tenant-scoped entity cache
//!
//! Each entity type (members, classes, dashboard stats, ...) owns one shared
//! [`EntitySlot`] holding the last fetched collection, when it was fetched and
//! which organization it belongs to. Consumers mount an [`EntityHandle`] on a
//! slot and observe a `{data, loading, error}` state that follows the active
//! organization. Mutations call `invalidate` on the slot, which drops the entry
//! and asks every mounted handle to revalidate.

pub mod entities;
pub mod entry;
pub mod fetcher;
pub mod handle;
pub mod registry;
pub mod slot;

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use entities::{EntityCaches, Mutation};
pub use entry::CacheEntry;
pub use fetcher::{Fetcher, fetcher_fn};
pub use handle::EntityHandle;
pub use registry::{InvalidationRegistry, Registration};
pub use slot::{EntitySlot, SlotSnapshot};

/// Cache TTL per entity type
pub struct CacheTtl;

impl CacheTtl {
    // Collections edited through the dashboard
    pub const MEMBERS: Duration = Duration::from_secs(5 * 60); // 5 min
    pub const CLASSES: Duration = Duration::from_secs(5 * 60); // 5 min
    pub const EVENTS: Duration = Duration::from_secs(5 * 60); // 5 min
    pub const TAGS: Duration = Duration::from_secs(5 * 60); // 5 min

    // Billing data
    pub const TRANSACTIONS: Duration = Duration::from_secs(5 * 60); // 5 min
    pub const MEMBERSHIPS: Duration = Duration::from_secs(5 * 60); // 5 min
    pub const CATALOG: Duration = Duration::from_secs(5 * 60); // 5 min
    pub const COUPONS: Duration = Duration::from_secs(5 * 60); // 5 min

    // Aggregates move with every check-in and payment
    pub const DASHBOARD_STATS: Duration = Duration::from_secs(2 * 60); // 2 min
}

/// Tenant (organization) a cached value belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeId(String);

impl ScopeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScopeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ScopeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Entity types with their own cache slot.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Members,
    DashboardStats,
    Transactions,
    Catalog,
    Classes,
    Memberships,
    Coupons,
    Tags,
    Events,
}

impl EntityKind {
    pub const ALL: [EntityKind; 9] = [
        EntityKind::Members,
        EntityKind::DashboardStats,
        EntityKind::Transactions,
        EntityKind::Catalog,
        EntityKind::Classes,
        EntityKind::Memberships,
        EntityKind::Coupons,
        EntityKind::Tags,
        EntityKind::Events,
    ];

    /// Human-readable name used in messages
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Members => "members",
            EntityKind::DashboardStats => "dashboard stats",
            EntityKind::Transactions => "transactions",
            EntityKind::Catalog => "catalog",
            EntityKind::Classes => "classes",
            EntityKind::Memberships => "memberships",
            EntityKind::Coupons => "coupons",
            EntityKind::Tags => "tags",
            EntityKind::Events => "events",
        }
    }

    pub fn default_ttl(&self) -> Duration {
        match self {
            EntityKind::Members => CacheTtl::MEMBERS,
            EntityKind::DashboardStats => CacheTtl::DASHBOARD_STATS,
            EntityKind::Transactions => CacheTtl::TRANSACTIONS,
            EntityKind::Catalog => CacheTtl::CATALOG,
            EntityKind::Classes => CacheTtl::CLASSES,
            EntityKind::Memberships => CacheTtl::MEMBERSHIPS,
            EntityKind::Coupons => CacheTtl::COUPONS,
            EntityKind::Tags => CacheTtl::TAGS,
            EntityKind::Events => CacheTtl::EVENTS,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Externally visible status of a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Loading,
    Failed,
    Ready,
}

/// What a mounted handle exposes to its consumer.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheState<T> {
    pub data: T,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T: Default> CacheState<T> {
    /// Empty default value, idle.
    pub fn empty() -> Self {
        Self {
            data: T::default(),
            loading: false,
            error: None,
        }
    }

    /// Empty default value, fetch pending.
    pub fn pending() -> Self {
        Self {
            loading: true,
            ..Self::empty()
        }
    }
}

impl<T> CacheState<T> {
    pub fn ready(data: T) -> Self {
        Self {
            data,
            loading: false,
            error: None,
        }
    }

    /// Loading wins over a previous error; an error is only reported once
    /// the handle has settled.
    pub fn status(&self) -> CacheStatus {
        if self.loading {
            CacheStatus::Loading
        } else if self.error.is_some() {
            CacheStatus::Failed
        } else {
            CacheStatus::Ready
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttls() {
        assert_eq!(EntityKind::Members.default_ttl(), Duration::from_secs(300));
        assert_eq!(EntityKind::Events.default_ttl(), Duration::from_secs(300));
        assert_eq!(
            EntityKind::DashboardStats.default_ttl(),
            Duration::from_secs(120)
        );
    }

    #[test]
    fn test_entity_kind_serde_names() {
        let kind: EntityKind = serde_yaml::from_str("dashboard_stats").unwrap();
        assert_eq!(kind, EntityKind::DashboardStats);
        assert_eq!(serde_json::to_string(&EntityKind::Members).unwrap(), "\"members\"");
    }

    #[test]
    fn test_state_status_is_exclusive() {
        let pending: CacheState<Vec<u8>> = CacheState::pending();
        assert_eq!(pending.status(), CacheStatus::Loading);

        let failed: CacheState<Vec<u8>> = CacheState {
            error: Some("boom".to_string()),
            ..CacheState::empty()
        };
        assert_eq!(failed.status(), CacheStatus::Failed);

        let reloading = CacheState {
            loading: true,
            ..failed
        };
        assert_eq!(reloading.status(), CacheStatus::Loading);

        assert_eq!(CacheState::ready(vec![1u8]).status(), CacheStatus::Ready);
    }

    #[test]
    fn test_scope_id_display() {
        let scope = ScopeId::from("org_123");
        assert_eq!(scope.to_string(), "org_123");
        assert_eq!(scope.as_str(), "org_123");
    }
}
