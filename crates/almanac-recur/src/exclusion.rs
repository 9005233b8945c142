//! Single-occurrence edits and deletions.
//!
//! A series is never rewritten to change one occurrence. Instead the
//! occurrence date is excluded from the series and, for edits, a standalone
//! event pointing back at the series takes its place.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{RecurError, RecurResult};
use crate::model::{BaseEvent, EventDetails};

/// Result of editing one occurrence of a series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurrenceEdit {
    /// The series with the edited date excluded.
    pub base: BaseEvent,
    /// The new one-off event replacing the occurrence.
    pub standalone: BaseEvent,
}

/// ## Summary
/// Parses an occurrence date as sent by clients.
///
/// Accepts `YYYY-MM-DD` or a date-time, of which only the date is kept.
///
/// ## Errors
/// Returns `RecurError::InvalidDate` if the value does not parse.
pub fn parse_calendar_date(raw: &str) -> RecurResult<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| raw.parse::<NaiveDateTime>().map(|instant| instant.date()))
        .or_else(|_| {
            chrono::DateTime::parse_from_rfc3339(raw).map(|instant| instant.date_naive())
        })
        .map_err(|e| RecurError::InvalidDate(format!("{raw:?}: {e}")))
}

/// ## Summary
/// Suppresses `date` from the series' expansion.
///
/// Idempotent: excluding an already excluded date is a no-op. Returns whether
/// the date was newly added.
///
/// ## Errors
/// Returns `RecurError::NotRecurring` if the event has no recurrence rule.
pub fn add_exclusion(event: &mut BaseEvent, date: NaiveDate) -> RecurResult<bool> {
    if !event.is_recurring() {
        return Err(RecurError::NotRecurring(event.id));
    }

    let added = event.excluded_dates.insert(date);
    if added {
        tracing::debug!(event_id = %event.id, date = %date, "Added exclusion date");
    } else {
        tracing::trace!(event_id = %event.id, date = %date, "Exclusion date already present");
    }
    Ok(added)
}

/// ## Summary
/// Restores a previously excluded occurrence. Returns whether it was excluded.
///
/// ## Errors
/// Returns `RecurError::NotRecurring` if the event has no recurrence rule.
pub fn remove_exclusion(event: &mut BaseEvent, date: NaiveDate) -> RecurResult<bool> {
    if !event.is_recurring() {
        return Err(RecurError::NotRecurring(event.id));
    }

    let removed = event.excluded_dates.remove(&date);
    if removed {
        tracing::debug!(event_id = %event.id, date = %date, "Removed exclusion date");
    }
    Ok(removed)
}

/// ## Summary
/// Replaces the occurrence on `date` with a standalone event carrying
/// `details`.
///
/// The standalone event gets a fresh id, no recurrence and
/// `parent_event_id = base.id`; the base gets `date` excluded.
///
/// ## Errors
/// Returns `RecurError::NotRecurring` if the base has no recurrence rule.
pub fn edit_occurrence(
    mut base: BaseEvent,
    date: NaiveDate,
    details: EventDetails,
) -> RecurResult<OccurrenceEdit> {
    add_exclusion(&mut base, date)?;

    let mut standalone = BaseEvent::new(details);
    standalone.parent_event_id = Some(base.id);

    tracing::debug!(
        event_id = %base.id,
        standalone_id = %standalone.id,
        date = %date,
        "Detached occurrence into standalone event"
    );

    Ok(OccurrenceEdit { base, standalone })
}
