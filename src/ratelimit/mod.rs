//! Sliding-window rate limiting for the platform RPC boundary
//!
//! Requests are counted per `(endpoint class, identifier)` key over a trailing
//! window. Authenticated RPC traffic is keyed by organization, everything else
//! by client IP. The guard fails open when no counter store is available.

pub mod guard;
pub mod request;
pub mod store;

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use guard::{RateLimitGuard, RateLimitRejection, rate_limit_headers};
pub use request::{RequestMeta, extract_client_identifier};
pub use store::{InMemoryWindowStore, WindowHit, WindowStore};

/// Class of endpoint a request targets. Each class has its own quota.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum EndpointClass {
    /// Authenticated RPC calls, keyed by organization
    Rpc,
    /// Unauthenticated RPC calls, keyed by client IP
    Unauth,
    /// Inbound payment/identity webhooks, keyed by client IP
    Webhook,
    /// Authentication endpoints, keyed by client IP
    Auth,
}

impl EndpointClass {
    pub const ALL: [EndpointClass; 4] = [
        EndpointClass::Rpc,
        EndpointClass::Unauth,
        EndpointClass::Webhook,
        EndpointClass::Auth,
    ];

    /// Classify a request by path and whether the caller is authenticated.
    ///
    /// Query strings are ignored. Webhook and auth routes keep their class
    /// regardless of authentication.
    pub fn from_path(path: &str, authenticated: bool) -> Self {
        let path = path.split('?').next().unwrap_or(path);

        if under(path, "/api/webhooks") {
            return EndpointClass::Webhook;
        }
        if under(path, "/api/auth") {
            return EndpointClass::Auth;
        }

        if authenticated {
            EndpointClass::Rpc
        } else {
            EndpointClass::Unauth
        }
    }

    /// Identifier type used to key this class's counters when the caller is
    /// authenticated. Only RPC traffic is counted per tenant.
    pub fn identifier_type(&self, authenticated: bool) -> IdentifierType {
        match self {
            EndpointClass::Rpc if authenticated => IdentifierType::Org,
            _ => IdentifierType::Ip,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointClass::Rpc => "rpc",
            EndpointClass::Unauth => "unauth",
            EndpointClass::Webhook => "webhook",
            EndpointClass::Auth => "auth",
        }
    }
}

/// `path` is `prefix` itself or a path below it.
fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

impl fmt::Display for EndpointClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a rate-limit counter is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierType {
    Org,
    Ip,
}

impl IdentifierType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentifierType::Org => "org",
            IdentifierType::Ip => "ip",
        }
    }
}

impl fmt::Display for IdentifierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requests allowed per trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quota {
    /// Maximum requests in one window (must be > 0)
    pub limit: u32,
    /// Window length in seconds
    pub window_secs: u64,
}

impl Quota {
    pub const fn new(limit: u32, window_secs: u64) -> Self {
        Self { limit, window_secs }
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// Quota per endpoint class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaTable {
    #[serde(default = "default_rpc_quota")]
    pub rpc: Quota,
    #[serde(default = "default_unauth_quota")]
    pub unauth: Quota,
    #[serde(default = "default_webhook_quota")]
    pub webhook: Quota,
    #[serde(default = "default_auth_quota")]
    pub auth: Quota,
}

// 100 req/min per tenant
fn default_rpc_quota() -> Quota {
    Quota::new(100, 60)
}

// 10 req/min per IP
fn default_unauth_quota() -> Quota {
    Quota::new(10, 60)
}

// 100 req/min per IP
fn default_webhook_quota() -> Quota {
    Quota::new(100, 60)
}

// 5 req / 15 min per IP
fn default_auth_quota() -> Quota {
    Quota::new(5, 15 * 60)
}

impl Default for QuotaTable {
    fn default() -> Self {
        Self {
            rpc: default_rpc_quota(),
            unauth: default_unauth_quota(),
            webhook: default_webhook_quota(),
            auth: default_auth_quota(),
        }
    }
}

impl QuotaTable {
    pub fn get(&self, class: EndpointClass) -> Quota {
        match class {
            EndpointClass::Rpc => self.rpc,
            EndpointClass::Unauth => self.unauth,
            EndpointClass::Webhook => self.webhook,
            EndpointClass::Auth => self.auth,
        }
    }

    /// Reject quotas that can never admit a request or never expire.
    pub fn validate(&self) -> std::result::Result<(), String> {
        for class in EndpointClass::ALL {
            let quota = self.get(class);
            if quota.limit == 0 {
                return Err(format!("quota for '{}' must allow at least 1 request", class));
            }
            if quota.window_secs == 0 {
                return Err(format!("quota window for '{}' must be at least 1s", class));
            }
        }
        Ok(())
    }
}

/// Outcome of a single rate-limit check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitResult {
    pub allowed: bool,
    /// Requests left in the current window after this one (never above `limit`)
    pub remaining: u32,
    pub limit: u32,
    /// Wall-clock time at which the oldest counted request leaves the window
    pub reset_at: DateTime<Utc>,
    /// Time until `reset_at`
    #[serde(skip)]
    pub reset_after: Duration,
}

impl RateLimitResult {
    /// Result used when rate limiting is disabled or its store failed.
    pub fn unlimited(quota: Quota) -> Self {
        Self::from_hit(
            quota,
            WindowHit {
                allowed: true,
                remaining: quota.limit,
                reset_after: quota.window(),
            },
        )
    }

    pub(crate) fn from_hit(quota: Quota, hit: WindowHit) -> Self {
        let reset_at = Utc::now()
            + chrono::Duration::from_std(hit.reset_after).unwrap_or(chrono::Duration::zero());
        Self {
            allowed: hit.allowed,
            remaining: hit.remaining.min(quota.limit),
            limit: quota.limit,
            reset_at,
            reset_after: hit.reset_after,
        }
    }

    /// Whole seconds a rejected caller should wait, rounded up.
    pub fn retry_after_secs(&self) -> u64 {
        let millis = self.reset_after.as_millis() as u64;
        millis.div_ceil(1000)
    }
}
