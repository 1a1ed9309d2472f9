//! Dashboard display model

use serde::Serialize;
use tabled::Tabled;

use crate::client::models::DashboardStats;
use crate::output::formatters::{format_money, format_percent};

/// One headline metric.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct StatDisplay {
    #[tabled(rename = "METRIC")]
    pub metric: String,

    #[tabled(rename = "VALUE")]
    pub value: String,
}

impl StatDisplay {
    fn new(metric: &str, value: impl ToString) -> Self {
        Self {
            metric: metric.to_string(),
            value: value.to_string(),
        }
    }

    /// Flatten dashboard stats into metric rows.
    pub fn rows(stats: DashboardStats) -> Vec<Self> {
        let currency = if stats.currency.is_empty() {
            "usd"
        } else {
            stats.currency.as_str()
        };

        vec![
            Self::new("Total members", stats.total_members),
            Self::new("Active members", stats.active_members),
            Self::new("New this month", stats.new_members_this_month),
            Self::new(
                "Revenue this month",
                format_money(stats.revenue_this_month_cents, currency),
            ),
            Self::new("Classes this week", stats.classes_this_week),
            Self::new("Attendance rate", format_percent(stats.attendance_rate)),
        ]
    }
}
