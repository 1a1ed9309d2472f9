//! Dojokit API data models
//!
//! Domain types returned by the platform API, organized by resource type.

mod billing;
mod dashboard;
mod member;
mod org;
mod schedule;

pub use billing::{CatalogItem, Coupon, MembershipPlan, Transaction};
pub use dashboard::DashboardStats;
pub use member::{Member, NewMember, Tag};
pub use org::Organization;
pub use schedule::{Event, GymClass, NewClass};

use serde::Deserialize;

/// Response envelope used by every API endpoint
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}
