//! Organization display model

use serde::Serialize;
use tabled::Tabled;

use crate::client::models::Organization;
use crate::output::formatters::or_dash;

/// Organization display model for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct OrgDisplay {
    /// Organization ID
    #[tabled(rename = "ORG ID")]
    pub id: String,

    /// Organization name
    #[tabled(rename = "NAME")]
    pub name: String,

    /// Caller's role in the organization
    #[tabled(rename = "ROLE")]
    pub role: String,

    #[tabled(rename = "MEMBERS")]
    pub members: String,
}

impl From<Organization> for OrgDisplay {
    fn from(org: Organization) -> Self {
        Self {
            id: org.id,
            name: org.name,
            role: org.role.unwrap_or_else(|| "-".to_string()),
            members: or_dash(org.member_count),
        }
    }
}
