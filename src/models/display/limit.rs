//! Rate-limit decision display model

use serde::Serialize;
use tabled::Tabled;

use crate::ratelimit::{EndpointClass, RateLimitResult};

/// Outcome of one simulated request.
#[derive(Debug, Clone, Tabled, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitDisplay {
    #[tabled(rename = "#")]
    pub attempt: u32,

    #[tabled(rename = "CLASS")]
    pub class: String,

    #[tabled(rename = "KEY")]
    pub identifier: String,

    #[tabled(rename = "ALLOWED")]
    pub allowed: bool,

    #[tabled(rename = "REMAINING")]
    pub remaining: String,

    #[tabled(rename = "RESET")]
    pub reset_at: String,

    /// Seconds to wait, only when rejected
    #[tabled(rename = "RETRY AFTER")]
    pub retry_after: String,
}

impl LimitDisplay {
    pub fn new(
        attempt: u32,
        class: EndpointClass,
        identifier: &str,
        result: &RateLimitResult,
    ) -> Self {
        Self {
            attempt,
            class: class.to_string(),
            identifier: identifier.to_string(),
            allowed: result.allowed,
            remaining: format!("{}/{}", result.remaining, result.limit),
            reset_at: result.reset_at.format("%H:%M:%S").to_string(),
            retry_after: if result.allowed {
                "-".to_string()
            } else {
                format!("{}s", result.retry_after_secs())
            },
        }
    }
}
