//! Dashboard aggregate models

use serde::{Deserialize, Serialize};

/// Headline numbers for the organization dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub total_members: u32,

    pub active_members: u32,

    pub new_members_this_month: u32,

    pub revenue_this_month_cents: i64,

    pub currency: String,

    pub classes_this_week: u32,

    /// Share of booked spots attended, 0.0 - 1.0
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendance_rate: Option<f64>,
}
