//! Organization models

use serde::{Deserialize, Serialize};

/// Organization (tenant) the API key can access
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// Organization ID
    pub id: String,

    /// Organization name
    pub name: String,

    /// URL slug
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    /// Caller's role in the organization (owner, admin, staff)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Number of members (optional, may not be in all responses)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_count: Option<usize>,
}
