//! Event, rule and instance types.

mod event;
mod instance;
mod rule;

pub use event::{BaseEvent, EventDetails, Notification, NotificationKind, Participant, ParticipantStatus};
pub use instance::OccurrenceInstance;
pub use rule::{Frequency, RecurrencePattern, RecurrenceRule, RecurrenceRuleDto, WeekdaySet};
