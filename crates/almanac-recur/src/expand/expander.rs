//! Recurrence expansion over a query window.
//!
//! Drives the stepper from a seed date, applying exclusions, the rule's
//! count/end-date termination and the iteration safety bound.

use std::collections::BTreeSet;
use std::iter::FusedIterator;

use almanac_core::config::{DEFAULT_MAX_ITERATIONS, RecurrenceConfig};
use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use super::stepper::next_occurrence;
use super::window::ExpansionWindow;
use crate::error::{RecurError, RecurResult};
use crate::model::{BaseEvent, RecurrenceRule};

/// Where the expansion starts stepping from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedMode {
    /// Seed at the later of the series start and the window start.
    #[default]
    Window,
    /// Seed at the series start and step silently up to the window.
    ///
    /// Keeps the series phase and time of day when the window starts after
    /// the series, and counts earlier occurrences toward the rule's `count`.
    ///
    /// The silent steps before the window use up `max_iterations` like any
    /// other step. A daily series that began more than `max_iterations` days
    /// before the window yields nothing and reports `exhausted()`; raise the
    /// bound or use `SeedMode::Window` for long-running series.
    SeriesStart,
}

/// Options for recurrence expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionOptions {
    /// Maximum number of stepper iterations before giving up.
    pub max_iterations: usize,

    /// Optional cap on emitted occurrences. `None` by default, leaving the
    /// window, the rule's `count` and end date, and `max_iterations` as the
    /// only limits.
    pub max_instances: Option<usize>,

    pub seed_mode: SeedMode,
}

impl Default for ExpansionOptions {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_instances: None,
            seed_mode: SeedMode::Window,
        }
    }
}

impl ExpansionOptions {
    /// Sets the iteration safety bound.
    #[must_use]
    pub const fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Caps the number of emitted instances.
    #[must_use]
    pub const fn with_max_instances(mut self, max: usize) -> Self {
        self.max_instances = Some(max);
        self
    }

    #[must_use]
    pub const fn with_seed_mode(mut self, seed_mode: SeedMode) -> Self {
        self.seed_mode = seed_mode;
        self
    }
}

impl TryFrom<&RecurrenceConfig> for ExpansionOptions {
    type Error = RecurError;

    fn try_from(config: &RecurrenceConfig) -> RecurResult<Self> {
        config.validate()?;
        Ok(Self {
            max_instances: config.max_instances,
            ..Self::default().with_max_iterations(config.max_iterations)
        })
    }
}

/// ## Summary
/// Lazy, finite sequence of occurrence date-times for one event.
///
/// Yields strictly increasing date-times. The sequence borrows the event's
/// exclusion set and never mutates it; clone it before consuming to replay
/// the same expansion.
#[derive(Debug, Clone)]
pub struct Occurrences<'a> {
    event_id: Uuid,
    rule: RecurrenceRule,
    excluded: &'a BTreeSet<NaiveDate>,
    window: ExpansionWindow,
    max_iterations: usize,
    max_instances: Option<usize>,
    current: Option<NaiveDateTime>,
    iterations: usize,
    counted: u32,
    emitted: usize,
    exhausted: bool,
    truncated: bool,
}

impl Occurrences<'_> {
    /// True when the iteration safety bound cut the sequence short.
    #[must_use]
    pub const fn exhausted(&self) -> bool {
        self.exhausted
    }

    /// True when the configured instance cap cut the sequence short.
    #[must_use]
    pub const fn truncated(&self) -> bool {
        self.truncated
    }

    /// True when either bound withheld occurrences the rule and window allow.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        self.exhausted || self.truncated
    }

    /// Number of stepper iterations performed so far.
    #[must_use]
    pub const fn iterations(&self) -> usize {
        self.iterations
    }

    fn finish(&mut self) {
        self.current = None;
    }

    fn advance(&mut self, from: NaiveDateTime) {
        let next = next_occurrence(from, &self.rule);
        if next > from {
            self.current = Some(next);
        } else {
            tracing::warn!(
                event_id = %self.event_id,
                current = %from,
                "Stepper did not advance, stopping expansion"
            );
            self.finish();
        }
    }

    fn count_reached(&self) -> bool {
        self.rule
            .count
            .is_some_and(|count| self.counted >= count.get())
    }

    fn past_end_date(&self, current: NaiveDateTime) -> bool {
        self.rule.end_date.is_some_and(|end| current > end)
    }
}

impl Iterator for Occurrences<'_> {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let current = self.current?;

            if current > self.window.end {
                self.finish();
                return None;
            }

            if self.iterations >= self.max_iterations {
                tracing::warn!(
                    event_id = %self.event_id,
                    iterations = self.iterations,
                    emitted = self.emitted,
                    "Recurrence expansion hit the iteration bound, returning partial result"
                );
                self.exhausted = true;
                self.finish();
                return None;
            }
            self.iterations += 1;

            if self.excluded.contains(&current.date()) {
                tracing::trace!(event_id = %self.event_id, date = %current.date(), "Skipping excluded date");
                self.advance(current);
                continue;
            }

            if self.count_reached() {
                tracing::trace!(event_id = %self.event_id, counted = self.counted, "Count reached");
                self.finish();
                return None;
            }

            if self.past_end_date(current) {
                tracing::trace!(event_id = %self.event_id, current = %current, "Rule end date passed");
                self.finish();
                return None;
            }

            self.advance(current);
            self.counted = self.counted.saturating_add(1);

            // Only reachable in `SeedMode::SeriesStart`.
            if current < self.window.start {
                continue;
            }

            if self.max_instances.is_some_and(|max| self.emitted >= max) {
                tracing::warn!(
                    event_id = %self.event_id,
                    max_instances = ?self.max_instances,
                    emitted = self.emitted,
                    "Recurrence expansion hit the instance cap, returning partial result"
                );
                self.truncated = true;
                self.finish();
                return None;
            }

            self.emitted += 1;
            return Some(current);
        }
    }
}

impl FusedIterator for Occurrences<'_> {}

/// ## Summary
/// Expands a recurring event into its occurrence date-times inside `window`.
///
/// Monthly and yearly rules without an explicit day (or month) take it from
/// the event's start, so a series begun on the 31st keeps returning to the
/// 31st.
///
/// ## Errors
/// Returns `RecurError::NotRecurring` if the event has no recurrence rule.
///
/// ## Side Effects
/// None; the event is only read.
pub fn expand<'a>(
    event: &'a BaseEvent,
    window: &ExpansionWindow,
    options: &ExpansionOptions,
) -> RecurResult<Occurrences<'a>> {
    let rule = event
        .recurrence
        .as_ref()
        .ok_or(RecurError::NotRecurring(event.id))?;

    let start = event.details.start_date;
    let seed = match options.seed_mode {
        SeedMode::Window => start.max(window.start),
        SeedMode::SeriesStart => start,
    };

    tracing::trace!(
        event_id = %event.id,
        frequency = %rule.frequency(),
        seed = %seed,
        window_start = %window.start,
        window_end = %window.end,
        "Starting recurrence expansion"
    );

    Ok(Occurrences {
        event_id: event.id,
        rule: rule.anchored_to(start),
        excluded: &event.excluded_dates,
        window: *window,
        max_iterations: options.max_iterations,
        max_instances: options.max_instances,
        current: Some(seed),
        iterations: 0,
        counted: 0,
        emitted: 0,
        exhausted: false,
        truncated: false,
    })
}
