//! Almanac recurrence engine.
//!
//! Expands a stored event and its recurrence rule into the concrete
//! occurrence instances that fall inside a queried window, and manages the
//! per-date exclusions used to edit or delete a single occurrence.

pub mod describe;
pub mod error;
pub mod exclusion;
pub mod expand;
pub mod model;

pub use describe::{Preset, presets};
pub use error::{RecurError, RecurResult};
pub use exclusion::{OccurrenceEdit, add_exclusion, edit_occurrence, parse_calendar_date, remove_exclusion};
pub use expand::{
    ExpansionOptions, ExpansionWindow, Occurrences, SeedMode, expand, expand_instances,
    instance_id, materialize, next_occurrence,
};
pub use model::{
    BaseEvent, EventDetails, Frequency, Notification, NotificationKind, OccurrenceInstance,
    Participant, ParticipantStatus, RecurrencePattern, RecurrenceRule, RecurrenceRuleDto,
    WeekdaySet,
};
