//! Dojokit platform API client implementation

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::models::Envelope;
use super::rate_limit::RateLimiterSet;
use super::{
    CatalogItem, Coupon, DashboardStats, DojoApi, Event, GymClass, Member, MembershipPlan,
    NewClass, NewMember, Organization, Tag, Transaction,
};
use crate::error::{ApiError, Result};
use crate::ratelimit::{EndpointClass, QuotaTable};

/// Request timeout for every API call
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Platform API client
pub struct DojoClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
    rate_limiters: RateLimiterSet,
}

impl DojoClient {
    /// Create a client for `host` (e.g. `https://app.dojokit.dev`).
    pub fn new(api_key: String, host: &str, quotas: &QuotaTable) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("dojokit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: format!("{}/api", host.trim_end_matches('/')),
            api_key,
            rate_limiters: RateLimiterSet::new(quotas),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::GET, path, None::<&()>).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.request(Method::POST, path, Some(body)).await
    }

    async fn request<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let class = EndpointClass::from_path(&format!("/api{}", path), true);
        self.rate_limiters.wait_for(class).await;

        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let mut request = self.http.request(method, &url).bearer_auth(&self.api_key);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(ApiError::from)?;

        let status = response.status();
        match status {
            status if status.is_success() => {
                let envelope = response.json::<Envelope<T>>().await.map_err(|e| {
                    ApiError::InvalidResponse(format!("Failed to parse response: {}", e))
                })?;
                Ok(envelope.data)
            }
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized.into()),
            StatusCode::FORBIDDEN => Err(ApiError::Forbidden.into()),
            StatusCode::NOT_FOUND => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Resource not found".to_string());
                Err(ApiError::NotFound(error_msg).into())
            }
            StatusCode::TOO_MANY_REQUESTS => {
                self.rate_limiters.activate(class);
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                Err(ApiError::RateLimit(Duration::from_secs(retry_after)).into())
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Bad request".to_string());
                Err(ApiError::BadRequest(error_msg).into())
            }
            status if status.is_server_error() => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("Server error: {}", status));
                Err(ApiError::ServerError(error_msg).into())
            }
            _ => {
                let error_msg = format!("Unexpected status code: {}", status);
                Err(ApiError::InvalidResponse(error_msg).into())
            }
        }
    }
}

#[async_trait]
impl DojoApi for DojoClient {
    async fn list_orgs(&self) -> Result<Vec<Organization>> {
        self.get("/orgs").await
    }

    async fn list_members(&self, org_id: &str) -> Result<Vec<Member>> {
        self.get(&format!("/orgs/{}/members", org_id)).await
    }

    async fn dashboard_stats(&self, org_id: &str) -> Result<DashboardStats> {
        self.get(&format!("/orgs/{}/dashboard", org_id)).await
    }

    async fn list_transactions(&self, org_id: &str) -> Result<Vec<Transaction>> {
        self.get(&format!("/orgs/{}/transactions", org_id)).await
    }

    async fn list_catalog(&self, org_id: &str) -> Result<Vec<CatalogItem>> {
        self.get(&format!("/orgs/{}/catalog", org_id)).await
    }

    async fn list_classes(&self, org_id: &str) -> Result<Vec<GymClass>> {
        self.get(&format!("/orgs/{}/classes", org_id)).await
    }

    async fn list_memberships(&self, org_id: &str) -> Result<Vec<MembershipPlan>> {
        self.get(&format!("/orgs/{}/memberships", org_id)).await
    }

    async fn list_coupons(&self, org_id: &str) -> Result<Vec<Coupon>> {
        self.get(&format!("/orgs/{}/coupons", org_id)).await
    }

    async fn list_tags(&self, org_id: &str) -> Result<Vec<Tag>> {
        self.get(&format!("/orgs/{}/tags", org_id)).await
    }

    async fn list_events(&self, org_id: &str) -> Result<Vec<Event>> {
        self.get(&format!("/orgs/{}/events", org_id)).await
    }

    async fn create_member(&self, org_id: &str, member: &NewMember) -> Result<Member> {
        self.post(&format!("/orgs/{}/members", org_id), member).await
    }

    async fn create_class(&self, org_id: &str, class: &NewClass) -> Result<GymClass> {
        self.post(&format!("/orgs/{}/classes", org_id), class).await
    }
}
