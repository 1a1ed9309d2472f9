//! Cache slot display model

use serde::Serialize;
use tabled::Tabled;

use crate::cache::SlotSnapshot;
use crate::output::formatters::format_age;

/// Cache slot status for `watch` and `--debug` output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct SlotDisplay {
    #[tabled(rename = "ENTITY")]
    pub entity: String,

    #[tabled(rename = "ORG")]
    pub scope: String,

    #[tabled(rename = "AGE")]
    pub age: String,

    #[tabled(rename = "TTL")]
    pub ttl: String,

    #[tabled(rename = "FRESH")]
    pub fresh: String,

    #[tabled(rename = "IN FLIGHT")]
    pub in_flight: usize,

    #[tabled(rename = "HANDLES")]
    pub handles: usize,
}

impl From<SlotSnapshot> for SlotDisplay {
    fn from(snapshot: SlotSnapshot) -> Self {
        Self {
            entity: snapshot.kind.to_string(),
            scope: snapshot
                .scope
                .map_or_else(|| "-".to_string(), |s| s.to_string()),
            age: snapshot.age.map_or_else(|| "-".to_string(), format_age),
            ttl: format_age(snapshot.ttl),
            fresh: if snapshot.fresh { "yes" } else { "no" }.to_string(),
            in_flight: snapshot.in_flight,
            handles: snapshot.subscribers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{EntityKind, ScopeId};
    use std::time::Duration;

    #[test]
    fn test_slot_display() {
        let display = SlotDisplay::from(SlotSnapshot {
            kind: EntityKind::DashboardStats,
            ttl: Duration::from_secs(120),
            age: Some(Duration::from_secs(30)),
            scope: Some(ScopeId::from("org_1")),
            fresh: true,
            in_flight: 0,
            subscribers: 2,
        });

        assert_eq!(display.entity, "dashboard stats");
        assert_eq!(display.scope, "org_1");
        assert_eq!(display.age, "30s");
        assert_eq!(display.ttl, "2m 0s");
    }

    #[test]
    fn test_empty_slot_display() {
        let display = SlotDisplay::from(SlotSnapshot {
            kind: EntityKind::Members,
            ttl: Duration::from_secs(300),
            age: None,
            scope: None,
            fresh: false,
            in_flight: 1,
            subscribers: 0,
        });

        assert_eq!(display.scope, "-");
        assert_eq!(display.age, "-");
        assert_eq!(display.fresh, "no");
    }
}
