//! Mock Dojokit API client for testing
//!
//! Provides a mock implementation of [`DojoApi`] for unit testing without
//! making real API calls.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{
    CatalogItem, Coupon, DashboardStats, DojoApi, Event, GymClass, Member, MembershipPlan,
    NewClass, NewMember, Organization, Tag, Transaction,
};
use crate::error::{ApiError, Result};

/// Mock API client for testing.
///
/// Collections are keyed by organization ID so tenant isolation can be
/// exercised. Configure responses via builder methods, then use in tests.
///
/// # Example
/// ```ignore
/// let mock = MockDojoClient::new()
///     .with_members("org_1", vec![member("m1", "Ada")])
///     .await;
///
/// let members = mock.list_members("org_1").await?;
/// assert_eq!(members.len(), 1);
/// ```
#[derive(Default)]
pub struct MockDojoClient {
    orgs: Arc<Mutex<Vec<Organization>>>,
    members: Arc<Mutex<HashMap<String, Vec<Member>>>>,
    classes: Arc<Mutex<HashMap<String, Vec<GymClass>>>>,
    transactions: Arc<Mutex<HashMap<String, Vec<Transaction>>>>,
    dashboard: Arc<Mutex<HashMap<String, DashboardStats>>>,
    /// Error to return on the next call - consumed on first use
    error: Arc<Mutex<Option<ApiError>>>,
    /// Fail every call while set
    failing: Arc<Mutex<bool>>,
    /// Artificial latency per call
    latency: Arc<Mutex<Duration>>,
    call_count: Arc<Mutex<CallCounts>>,
}

/// Tracks API call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub list_orgs: usize,
    pub list_members: usize,
    pub dashboard_stats: usize,
    pub list_transactions: usize,
    pub list_catalog: usize,
    pub list_classes: usize,
    pub list_memberships: usize,
    pub list_coupons: usize,
    pub list_tags: usize,
    pub list_events: usize,
    pub create_member: usize,
    pub create_class: usize,
}

impl CallCounts {
    /// Get total number of API calls made.
    pub fn total(&self) -> usize {
        self.list_orgs
            + self.list_members
            + self.dashboard_stats
            + self.list_transactions
            + self.list_catalog
            + self.list_classes
            + self.list_memberships
            + self.list_coupons
            + self.list_tags
            + self.list_events
            + self.create_member
            + self.create_class
    }
}

impl MockDojoClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_orgs(self, orgs: Vec<Organization>) -> Self {
        *self.orgs.lock().await = orgs;
        self
    }

    pub async fn with_members(self, org_id: &str, members: Vec<Member>) -> Self {
        self.members.lock().await.insert(org_id.to_string(), members);
        self
    }

    pub async fn with_classes(self, org_id: &str, classes: Vec<GymClass>) -> Self {
        self.classes.lock().await.insert(org_id.to_string(), classes);
        self
    }

    pub async fn with_transactions(self, org_id: &str, transactions: Vec<Transaction>) -> Self {
        self.transactions
            .lock()
            .await
            .insert(org_id.to_string(), transactions);
        self
    }

    pub async fn with_dashboard(self, org_id: &str, stats: DashboardStats) -> Self {
        self.dashboard.lock().await.insert(org_id.to_string(), stats);
        self
    }

    /// Configure an error to return on the next API call.
    /// The error is consumed after one use.
    pub async fn with_error(self, error: ApiError) -> Self {
        *self.error.lock().await = Some(error);
        self
    }

    pub async fn with_latency(self, latency: Duration) -> Self {
        *self.latency.lock().await = latency;
        self
    }

    /// Make every subsequent call fail until cleared.
    pub async fn set_failing(&self, failing: bool) {
        *self.failing.lock().await = failing;
    }

    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    /// Apply latency, then return a pending or persistent error.
    async fn check_error(&self) -> Result<()> {
        let latency = *self.latency.lock().await;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if let Some(e) = self.error.lock().await.take() {
            return Err(e.into());
        }
        if *self.failing.lock().await {
            return Err(ApiError::ServerError("mock failure".to_string()).into());
        }
        Ok(())
    }

    async fn count(&self, f: impl FnOnce(&mut CallCounts)) {
        f(&mut *self.call_count.lock().await);
    }
}

#[async_trait]
impl DojoApi for MockDojoClient {
    async fn list_orgs(&self) -> Result<Vec<Organization>> {
        self.count(|c| c.list_orgs += 1).await;
        self.check_error().await?;
        Ok(self.orgs.lock().await.clone())
    }

    async fn list_members(&self, org_id: &str) -> Result<Vec<Member>> {
        self.count(|c| c.list_members += 1).await;
        self.check_error().await?;
        Ok(self
            .members
            .lock()
            .await
            .get(org_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn dashboard_stats(&self, org_id: &str) -> Result<DashboardStats> {
        self.count(|c| c.dashboard_stats += 1).await;
        self.check_error().await?;
        Ok(self
            .dashboard
            .lock()
            .await
            .get(org_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_transactions(&self, org_id: &str) -> Result<Vec<Transaction>> {
        self.count(|c| c.list_transactions += 1).await;
        self.check_error().await?;
        Ok(self
            .transactions
            .lock()
            .await
            .get(org_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_catalog(&self, _org_id: &str) -> Result<Vec<CatalogItem>> {
        self.count(|c| c.list_catalog += 1).await;
        self.check_error().await?;
        Ok(Vec::new())
    }

    async fn list_classes(&self, org_id: &str) -> Result<Vec<GymClass>> {
        self.count(|c| c.list_classes += 1).await;
        self.check_error().await?;
        Ok(self
            .classes
            .lock()
            .await
            .get(org_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_memberships(&self, _org_id: &str) -> Result<Vec<MembershipPlan>> {
        self.count(|c| c.list_memberships += 1).await;
        self.check_error().await?;
        Ok(Vec::new())
    }

    async fn list_coupons(&self, _org_id: &str) -> Result<Vec<Coupon>> {
        self.count(|c| c.list_coupons += 1).await;
        self.check_error().await?;
        Ok(Vec::new())
    }

    async fn list_tags(&self, _org_id: &str) -> Result<Vec<Tag>> {
        self.count(|c| c.list_tags += 1).await;
        self.check_error().await?;
        Ok(Vec::new())
    }

    async fn list_events(&self, _org_id: &str) -> Result<Vec<Event>> {
        self.count(|c| c.list_events += 1).await;
        self.check_error().await?;
        Ok(Vec::new())
    }

    async fn create_member(&self, org_id: &str, member: &NewMember) -> Result<Member> {
        self.count(|c| c.create_member += 1).await;
        self.check_error().await?;

        let mut members = self.members.lock().await;
        let list = members.entry(org_id.to_string()).or_default();
        let created = Member {
            id: format!("mem_{}", list.len() + 1),
            first_name: member.first_name.clone(),
            last_name: member.last_name.clone(),
            email: member.email.clone(),
            phone: member.phone.clone(),
            status: member.status.clone().unwrap_or_else(|| "active".to_string()),
            membership_plan: None,
            joined_at: None,
            tags: Vec::new(),
        };
        list.push(created.clone());
        Ok(created)
    }

    async fn create_class(&self, org_id: &str, class: &NewClass) -> Result<GymClass> {
        self.count(|c| c.create_class += 1).await;
        self.check_error().await?;

        let mut classes = self.classes.lock().await;
        let list = classes.entry(org_id.to_string()).or_default();
        let created = GymClass {
            id: format!("cls_{}", list.len() + 1),
            name: class.name.clone(),
            instructor: class.instructor.clone(),
            day_of_week: class.day_of_week.clone(),
            start_time: class.start_time.clone(),
            duration_minutes: class.duration_minutes,
            capacity: class.capacity,
            enrolled: 0,
        };
        list.push(created.clone());
        Ok(created)
    }
}

/// Build a member with the given ID and first name.
pub fn member(id: &str, first_name: &str) -> Member {
    Member {
        id: id.to_string(),
        first_name: first_name.to_string(),
        last_name: "Tester".to_string(),
        email: Some(format!("{}@example.com", first_name.to_lowercase())),
        phone: None,
        status: "active".to_string(),
        membership_plan: Some("Unlimited".to_string()),
        joined_at: None,
        tags: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_client_default_empty() {
        let mock = MockDojoClient::new();

        assert!(mock.list_orgs().await.unwrap().is_empty());
        assert!(mock.list_members("org_1").await.unwrap().is_empty());
        assert_eq!(
            mock.dashboard_stats("org_1").await.unwrap(),
            DashboardStats::default()
        );
    }

    #[tokio::test]
    async fn test_members_are_per_org() {
        let mock = MockDojoClient::new()
            .with_members("org_1", vec![member("m1", "Ada")])
            .await
            .with_members("org_2", vec![member("m2", "Grace"), member("m3", "Alan")])
            .await;

        assert_eq!(mock.list_members("org_1").await.unwrap().len(), 1);
        assert_eq!(mock.list_members("org_2").await.unwrap().len(), 2);
        assert_eq!(mock.call_counts().await.list_members, 2);
    }

    #[tokio::test]
    async fn test_error_is_consumed_once() {
        let mock = MockDojoClient::new()
            .with_error(ApiError::Forbidden)
            .await;

        assert!(mock.list_tags("org_1").await.is_err());
        assert!(mock.list_tags("org_1").await.is_ok());
        assert_eq!(mock.call_counts().await.total(), 2);
    }

    #[tokio::test]
    async fn test_persistent_failure() {
        let mock = MockDojoClient::new();
        mock.set_failing(true).await;
        assert!(mock.list_events("org_1").await.is_err());
        assert!(mock.list_events("org_1").await.is_err());

        mock.set_failing(false).await;
        assert!(mock.list_events("org_1").await.is_ok());
    }

    #[tokio::test]
    async fn test_create_member_is_listed() {
        let mock = MockDojoClient::new();
        let created = mock
            .create_member(
                "org_1",
                &NewMember {
                    first_name: "Ada".to_string(),
                    last_name: "Lovelace".to_string(),
                    email: None,
                    phone: None,
                    status: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(created.id, "mem_1");
        assert_eq!(created.status, "active");
        assert_eq!(mock.list_members("org_1").await.unwrap(), vec![created]);
    }
}
