//! Class and event display models

use serde::Serialize;
use tabled::Tabled;

use crate::client::models::{Event, GymClass};
use crate::output::formatters::{format_timestamp_local, or_dash};

/// Class display model for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct ClassDisplay {
    #[tabled(rename = "CLASS ID")]
    pub id: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "INSTRUCTOR")]
    pub instructor: String,

    /// Day and start time, e.g. `Mon 18:30`
    #[tabled(rename = "WHEN")]
    pub when: String,

    #[tabled(rename = "LENGTH")]
    pub length: String,

    /// Enrolled over capacity
    #[tabled(rename = "SPOTS")]
    pub spots: String,
}

impl From<GymClass> for ClassDisplay {
    fn from(class: GymClass) -> Self {
        let when = match (class.day_of_week, class.start_time) {
            (Some(day), Some(time)) => format!("{} {}", day, time),
            (Some(day), None) => day,
            (None, Some(time)) => time,
            (None, None) => "-".to_string(),
        };
        let spots = match class.capacity {
            Some(cap) => format!("{}/{}", class.enrolled, cap),
            None => class.enrolled.to_string(),
        };

        Self {
            id: class.id,
            name: class.name,
            instructor: or_dash(class.instructor),
            when,
            length: format!("{} min", class.duration_minutes),
            spots,
        }
    }
}

/// Event display model.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct EventDisplay {
    #[tabled(rename = "EVENT ID")]
    pub id: String,

    #[tabled(rename = "TITLE")]
    pub title: String,

    #[tabled(rename = "STARTS")]
    pub starts: String,

    #[tabled(rename = "LOCATION")]
    pub location: String,

    #[tabled(rename = "ATTENDEES")]
    pub attendees: u32,
}

impl From<Event> for EventDisplay {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            title: event.title,
            starts: format_timestamp_local(Some(event.starts_at)),
            location: or_dash(event.location),
            attendees: event.attendees,
        }
    }
}
