//! Turns occurrence date-times into displayable instances.

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use super::expander::{ExpansionOptions, expand};
use super::window::ExpansionWindow;
use crate::error::RecurResult;
use crate::model::{BaseEvent, OccurrenceInstance};

/// ## Summary
/// Deterministic instance id for one occurrence of a series.
///
/// The same `(series, date)` pair always yields the same id, which keeps
/// client-side diffing and drag-and-drop stable across re-expansion.
#[must_use]
pub fn instance_id(event_id: Uuid, date: NaiveDate) -> String {
    format!("{event_id}-{}", date.format("%Y-%m-%d"))
}

/// ## Summary
/// Builds the instance of `event` pinned to `occurrence`.
///
/// The end is shifted by the series' duration (zero when the series has no
/// end), saturating at `NaiveDateTime::MAX`. All display fields are copied by
/// value.
#[must_use]
pub fn materialize(event: &BaseEvent, occurrence: NaiveDateTime) -> OccurrenceInstance {
    let mut details = event.details.clone();
    details.end_date = Some(
        occurrence
            .checked_add_signed(event.details.duration())
            .unwrap_or(NaiveDateTime::MAX),
    );
    details.start_date = occurrence;

    OccurrenceInstance {
        id: instance_id(event.id, occurrence.date()),
        parent_event_id: event.id,
        details,
    }
}

/// ## Summary
/// Expands `event` inside `window` and materializes every occurrence.
///
/// ## Errors
/// Returns `RecurError::NotRecurring` if the event has no recurrence rule.
pub fn expand_instances(
    event: &BaseEvent,
    window: &ExpansionWindow,
    options: &ExpansionOptions,
) -> RecurResult<Vec<OccurrenceInstance>> {
    let mut occurrences = expand(event, window, options)?;
    let instances: Vec<_> = occurrences
        .by_ref()
        .map(|occurrence| materialize(event, occurrence))
        .collect();

    tracing::debug!(
        event_id = %event.id,
        instances = instances.len(),
        iterations = occurrences.iterations(),
        exhausted = occurrences.exhausted(),
        truncated = occurrences.truncated(),
        "Expanded recurring event"
    );

    Ok(instances)
}
