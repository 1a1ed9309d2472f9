//! Display models for CLI output
//!
//! Converts API response types and cache/limiter state into CLI-friendly
//! display formats.

pub mod display;

pub use display::{
    CatalogDisplay, ClassDisplay, CouponDisplay, EventDisplay, LimitDisplay, MemberDisplay,
    MembershipDisplay, OrgDisplay, SlotDisplay, StatDisplay, TagDisplay, TransactionDisplay,
};
