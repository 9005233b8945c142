//! Stored calendar events and the display data they carry.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::rule::RecurrenceRule;

/// Notification delivery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Popup,
    Email,
    Push,
}

/// A reminder attached to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
    /// Minutes before the event start.
    pub timing: u32,
    pub message: String,
    #[serde(default = "enabled_by_default")]
    pub is_enabled: bool,
}

const fn enabled_by_default() -> bool {
    true
}

impl Notification {
    #[must_use]
    pub fn new(kind: NotificationKind, timing: u32, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            kind,
            timing,
            message: message.into(),
            is_enabled: true,
        }
    }

    /// When this reminder fires for an occurrence starting at `start`.
    #[must_use]
    pub fn fire_at(&self, start: NaiveDateTime) -> NaiveDateTime {
        start - TimeDelta::minutes(i64::from(self.timing))
    }
}

/// Invitation response of a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
    Accepted,
    Declined,
    #[default]
    Pending,
    Maybe,
}

/// A person invited to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Profile picture URL.
    #[serde(default)]
    pub avatar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default)]
    pub status: ParticipantStatus,
}

/// ## Summary
/// Display fields shared by stored events and materialized instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_date: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub all_day: bool,
    pub color: String,
    #[serde(default = "default_text_color")]
    pub text_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

fn default_text_color() -> String {
    "#ffffff".to_string()
}

impl EventDetails {
    #[must_use]
    pub fn new(title: impl Into<String>, start_date: NaiveDateTime) -> Self {
        Self {
            title: title.into(),
            description: None,
            start_date,
            end_date: None,
            all_day: false,
            color: "#3788d8".to_string(),
            text_color: default_text_color(),
            location: None,
            category_id: None,
            notifications: Vec::new(),
            participants: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_end_date(mut self, end_date: NaiveDateTime) -> Self {
        self.end_date = Some(end_date);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>, text_color: impl Into<String>) -> Self {
        self.color = color.into();
        self.text_color = text_color.into();
        self
    }

    #[must_use]
    pub const fn with_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub const fn all_day(mut self) -> Self {
        self.all_day = true;
        self
    }

    #[must_use]
    pub fn with_notification(mut self, notification: Notification) -> Self {
        self.notifications.push(notification);
        self
    }

    #[must_use]
    pub fn with_participant(mut self, participant: Participant) -> Self {
        self.participants.push(participant);
        self
    }

    /// Length of the event; zero without an end date or when the end precedes the start.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.end_date
            .map_or(TimeDelta::zero(), |end| end - self.start_date)
            .max(TimeDelta::zero())
    }
}

/// ## Summary
/// A stored event, optionally owning a recurrence rule.
///
/// The event recurs exactly when `recurrence` is present. `excluded_dates`
/// lists occurrence dates suppressed from expansion; it only grows through
/// the exclusion operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseEvent {
    pub id: Uuid,
    #[serde(flatten)]
    pub details: EventDetails,
    /// Series this event overrides a single occurrence of.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_event_id: Option<Uuid>,
    #[serde(default)]
    pub excluded_dates: BTreeSet<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrenceRule>,
}

impl BaseEvent {
    /// Creates a one-off event with a fresh id.
    #[must_use]
    pub fn new(details: EventDetails) -> Self {
        Self {
            id: Uuid::now_v7(),
            details,
            parent_event_id: None,
            excluded_dates: BTreeSet::new(),
            recurrence: None,
        }
    }

    /// Creates a recurring event with a fresh id.
    #[must_use]
    pub fn recurring(details: EventDetails, rule: RecurrenceRule) -> Self {
        Self::new(details).with_recurrence(rule)
    }

    #[must_use]
    pub const fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    #[must_use]
    pub fn with_recurrence(mut self, rule: RecurrenceRule) -> Self {
        self.recurrence = Some(rule);
        self
    }

    #[must_use]
    pub fn with_excluded_date(mut self, date: NaiveDate) -> Self {
        self.excluded_dates.insert(date);
        self
    }

    #[must_use]
    pub const fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    #[must_use]
    pub fn is_excluded(&self, date: NaiveDate) -> bool {
        self.excluded_dates.contains(&date)
    }
}
