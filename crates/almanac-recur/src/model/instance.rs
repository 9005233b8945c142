//! Materialized occurrences of a recurring event.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::event::{EventDetails, Notification};

/// ## Summary
/// One displayable occurrence of a recurring event.
///
/// Owns a by-value copy of the series' display details with the start and end
/// pinned to the occurrence; changing it never touches the series. Instances
/// are recomputed on every query and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceInstance {
    /// `{series id}-{YYYY-MM-DD}`; stable across recomputation.
    pub id: String,
    pub parent_event_id: Uuid,
    #[serde(flatten)]
    pub details: EventDetails,
}

impl OccurrenceInstance {
    #[must_use]
    pub const fn start_date(&self) -> NaiveDateTime {
        self.details.start_date
    }

    #[must_use]
    pub fn end_date(&self) -> NaiveDateTime {
        self.details.end_date.unwrap_or(self.details.start_date)
    }

    #[must_use]
    pub fn occurrence_date(&self) -> NaiveDate {
        self.details.start_date.date()
    }

    /// Instances never recur on their own.
    #[must_use]
    pub const fn is_recurring(&self) -> bool {
        false
    }

    /// Enabled reminders for this occurrence and the moment each one fires.
    pub fn reminders(&self) -> impl Iterator<Item = (&Notification, NaiveDateTime)> {
        let start = self.details.start_date;
        self.details
            .notifications
            .iter()
            .filter(|notification| notification.is_enabled)
            .map(move |notification| (notification, notification.fire_at(start)))
    }
}
