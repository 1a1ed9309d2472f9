//! Rate-limit guard for the RPC boundary

use std::sync::Arc;

use log::{Level, debug, warn};
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use serde_json::json;

use super::store::{InMemoryWindowStore, WindowStore};
use super::{EndpointClass, IdentifierType, QuotaTable, RateLimitResult, RequestMeta};
use crate::audit::AuditSink;
use crate::config::{RateLimitBackend, RateLimitSettings};
use crate::error::RateLimitError;

/// Checks requests against per-class sliding-window quotas.
///
/// Without a store (rate limiting disabled or misconfigured) every check is
/// allowed. Store errors are logged and also allowed.
pub struct RateLimitGuard {
    store: Option<Arc<dyn WindowStore>>,
    quotas: QuotaTable,
    audit: Arc<dyn AuditSink>,
}

impl RateLimitGuard {
    pub fn new(
        store: Option<Arc<dyn WindowStore>>,
        quotas: QuotaTable,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            store,
            quotas,
            audit,
        }
    }

    /// Build a guard from configuration. Invalid quotas disable limiting.
    pub fn from_settings(settings: &RateLimitSettings, audit: Arc<dyn AuditSink>) -> Self {
        if let Err(reason) = settings.quotas.validate() {
            warn!("Rate limiting disabled: {}", reason);
            return Self::new(None, settings.quotas.clone(), audit);
        }

        let store: Option<Arc<dyn WindowStore>> = match settings.backend {
            RateLimitBackend::Memory => Some(Arc::new(InMemoryWindowStore::new())),
            RateLimitBackend::Disabled => None,
        };

        Self::new(store, settings.quotas.clone(), audit)
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    pub fn quotas(&self) -> &QuotaTable {
        &self.quotas
    }

    /// Record one request for `identifier` and report whether it is allowed.
    pub async fn check_limit(
        &self,
        identifier_type: IdentifierType,
        identifier: &str,
        class: EndpointClass,
    ) -> RateLimitResult {
        self.evaluate(identifier_type, identifier, class, None).await
    }

    /// Check an inbound request.
    ///
    /// Authenticated RPC calls are counted per organization; everything else
    /// per client address.
    pub async fn guard(
        &self,
        request: &RequestMeta,
        org_id: Option<&str>,
    ) -> Result<RateLimitResult, RateLimitRejection> {
        let authenticated = org_id.is_some();
        let class = EndpointClass::from_path(&request.path(), authenticated);
        let identifier_type = class.identifier_type(authenticated);
        let identifier = match (identifier_type, org_id) {
            (IdentifierType::Org, Some(org)) => org.to_string(),
            _ => request.client_identifier(),
        };

        let result = self
            .evaluate(identifier_type, &identifier, class, Some(request))
            .await;

        if result.allowed {
            Ok(result)
        } else {
            Err(RateLimitRejection {
                identifier_type,
                identifier,
                class,
                result,
            })
        }
    }

    async fn evaluate(
        &self,
        identifier_type: IdentifierType,
        identifier: &str,
        class: EndpointClass,
        request: Option<&RequestMeta>,
    ) -> RateLimitResult {
        let quota = self.quotas.get(class);

        let Some(store) = &self.store else {
            return RateLimitResult::unlimited(quota);
        };

        let key = format!("ratelimit:{}:{}:{}", class, identifier_type, identifier);
        let result = match store.hit(&key, quota).await {
            Ok(hit) => RateLimitResult::from_hit(quota, hit),
            Err(err) => {
                warn!(
                    "Rate limit store '{}' failed for {}, allowing request: {}",
                    store.name(),
                    key,
                    err
                );
                return RateLimitResult::unlimited(quota);
            }
        };

        debug!(
            "Rate limit {}: allowed={} remaining={}/{}",
            key, result.allowed, result.remaining, result.limit
        );

        if !result.allowed {
            let mut fields = json!({
                "identifierType": identifier_type.as_str(),
                "identifier": identifier,
                "endpointClass": class.as_str(),
                "remaining": result.remaining,
                "limit": result.limit,
                "resetAt": result.reset_at.to_rfc3339(),
            });
            if let Some(request) = request {
                fields["method"] = json!(request.method.as_str());
                fields["url"] = json!(request.url);
            }
            self.audit.log(Level::Warn, "Rate limit exceeded", &fields);
        }

        result
    }
}

/// A rejected request, carrying everything needed for the 429 response.
#[derive(Debug, Clone)]
pub struct RateLimitRejection {
    pub identifier_type: IdentifierType,
    pub identifier: String,
    pub class: EndpointClass,
    pub result: RateLimitResult,
}

impl RateLimitRejection {
    pub fn status(&self) -> StatusCode {
        StatusCode::TOO_MANY_REQUESTS
    }

    pub fn retry_after_secs(&self) -> u64 {
        self.result.retry_after_secs()
    }

    pub fn body(&self) -> serde_json::Value {
        json!({
            "error": "Too Many Requests",
            "retryAfter": self.retry_after_secs(),
            "limit": self.result.limit,
            "remaining": self.result.remaining,
        })
    }

    pub fn headers(&self) -> HeaderMap {
        let mut headers = rate_limit_headers(&self.result);
        headers.insert(RETRY_AFTER, HeaderValue::from(self.retry_after_secs()));
        headers
    }
}

impl From<RateLimitRejection> for RateLimitError {
    fn from(rejection: RateLimitRejection) -> Self {
        RateLimitError::Exceeded {
            retry_after_secs: rejection.retry_after_secs(),
            identifier: rejection.identifier,
        }
    }
}

/// `X-RateLimit-*` headers describing `result`. The reset value is a unix
/// timestamp in seconds.
pub fn rate_limit_headers(result: &RateLimitResult) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static("x-ratelimit-limit"),
        HeaderValue::from(result.limit),
    );
    headers.insert(
        HeaderName::from_static("x-ratelimit-remaining"),
        HeaderValue::from(result.remaining),
    );
    headers.insert(
        HeaderName::from_static("x-ratelimit-reset"),
        HeaderValue::from(result.reset_at.timestamp()),
    );
    headers
}
