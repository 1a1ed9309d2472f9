//! Member and tag display models

use serde::Serialize;
use tabled::Tabled;

use super::common::{status_label, truncate_string};
use crate::client::models::{Member, Tag};
use crate::output::formatters::format_date_local;

/// Member display model for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct MemberDisplay {
    #[tabled(rename = "MEMBER ID")]
    pub id: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "EMAIL")]
    pub email: String,

    #[tabled(rename = "STATUS")]
    pub status: String,

    #[tabled(rename = "PLAN")]
    pub plan: String,

    /// Join date (local)
    #[tabled(rename = "JOINED")]
    pub joined: String,

    #[tabled(rename = "TAGS")]
    pub tags: String,
}

impl From<Member> for MemberDisplay {
    fn from(member: Member) -> Self {
        Self {
            name: member.full_name(),
            id: member.id,
            email: member.email.unwrap_or_else(|| "-".to_string()),
            status: status_label(&member.status),
            plan: member.membership_plan.unwrap_or_else(|| "-".to_string()),
            joined: format_date_local(member.joined_at),
            tags: truncate_string(&member.tags.join(", "), 30),
        }
    }
}

/// Tag display model.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct TagDisplay {
    #[tabled(rename = "TAG ID")]
    pub id: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "MEMBERS")]
    pub members: usize,
}

impl From<Tag> for TagDisplay {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            members: tag.member_count,
        }
    }
}
