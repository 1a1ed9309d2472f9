//! Class schedule and event models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Recurring class on the weekly schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GymClass {
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,

    /// Day of week (monday..sunday)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<String>,

    /// Local start time, HH:MM
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,

    #[serde(default)]
    pub duration_minutes: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,

    #[serde(default)]
    pub enrolled: u32,
}

/// Request body for creating a class
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClass {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,

    pub duration_minutes: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
}

/// Scheduled occurrence (class session, seminar, grading)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,

    pub starts_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default)]
    pub attendees: u32,
}
