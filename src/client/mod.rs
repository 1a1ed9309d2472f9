//! Dojokit platform API client

use async_trait::async_trait;

use crate::error::Result;

#[cfg(test)]
pub mod mock;
pub mod dojo;
pub mod models;
pub mod rate_limit;

#[cfg(test)]
pub use mock::MockDojoClient;
pub use dojo::DojoClient;
pub use models::{
    CatalogItem, Coupon, DashboardStats, Event, GymClass, Member, MembershipPlan, NewClass,
    NewMember, Organization, Tag, Transaction,
};

/// Dojokit platform API
///
/// Every collection is scoped to one organization. Mutations return the
/// created resource; callers are responsible for invalidating cached views.
#[async_trait]
pub trait DojoApi: Send + Sync {
    /// List organizations the API key can access
    async fn list_orgs(&self) -> Result<Vec<Organization>>;

    async fn list_members(&self, org_id: &str) -> Result<Vec<Member>>;

    async fn dashboard_stats(&self, org_id: &str) -> Result<DashboardStats>;

    async fn list_transactions(&self, org_id: &str) -> Result<Vec<Transaction>>;

    async fn list_catalog(&self, org_id: &str) -> Result<Vec<CatalogItem>>;

    async fn list_classes(&self, org_id: &str) -> Result<Vec<GymClass>>;

    async fn list_memberships(&self, org_id: &str) -> Result<Vec<MembershipPlan>>;

    async fn list_coupons(&self, org_id: &str) -> Result<Vec<Coupon>>;

    async fn list_tags(&self, org_id: &str) -> Result<Vec<Tag>>;

    async fn list_events(&self, org_id: &str) -> Result<Vec<Event>>;

    async fn create_member(&self, org_id: &str, member: &NewMember) -> Result<Member>;

    async fn create_class(&self, org_id: &str, class: &NewClass) -> Result<GymClass>;
}
