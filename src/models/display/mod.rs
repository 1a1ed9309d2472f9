//! Display model implementations for table and JSON output
//!
//! Display models transform API response types into CLI-friendly formats
//! with appropriate column names and serialization.

mod billing;
mod cache;
mod common;
mod dashboard;
mod limit;
mod member;
mod org;
mod schedule;

pub use billing::{CatalogDisplay, CouponDisplay, MembershipDisplay, TransactionDisplay};
pub use cache::SlotDisplay;
pub use dashboard::StatDisplay;
pub use limit::LimitDisplay;
pub use member::{MemberDisplay, TagDisplay};
pub use org::OrgDisplay;
pub use schedule::{ClassDisplay, EventDisplay};
