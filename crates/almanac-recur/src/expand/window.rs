//! Query windows.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{RecurError, RecurResult};

/// Which end of the window a boundary string describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Start,
    End,
}

/// ## Summary
/// The inclusive `[start, end]` range an expansion is queried for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExpansionWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ExpansionWindow {
    /// ## Summary
    /// Creates a window from two inclusive boundaries.
    ///
    /// ## Errors
    /// Returns `RecurError::InvalidWindow` if `end` is before `start`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> RecurResult<Self> {
        if end < start {
            return Err(RecurError::InvalidWindow(format!(
                "end {end} is before start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// ## Summary
    /// Creates a window covering whole calendar days, `start` 00:00 through
    /// the last instant of `end`.
    ///
    /// ## Errors
    /// Returns `RecurError::InvalidWindow` if `end` is before `start`.
    pub fn days(start: NaiveDate, end: NaiveDate) -> RecurResult<Self> {
        Self::new(start_of_day(start), end_of_day(end)?)
    }

    /// ## Summary
    /// Parses ISO boundaries as sent by clients.
    ///
    /// Accepts `YYYY-MM-DD` (start of day for `start`, end of day for `end`),
    /// naive date-times such as `2024-01-01T09:00:00`, and RFC 3339
    /// date-times, of which only the wall-clock part is kept.
    ///
    /// ## Errors
    /// Returns `RecurError::InvalidWindow` if a boundary does not parse or the
    /// window is inverted.
    pub fn parse(start: &str, end: &str) -> RecurResult<Self> {
        let start = parse_boundary(start, Bound::Start)?;
        let end = parse_boundary(end, Bound::End)?;
        Self::new(start, end)
    }

    #[must_use]
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant <= self.end
    }
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn end_of_day(date: NaiveDate) -> RecurResult<NaiveDateTime> {
    date.and_hms_nano_opt(23, 59, 59, 999_999_999)
        .ok_or_else(|| RecurError::InvalidWindow(format!("no end of day for {date}")))
}

fn parse_boundary(raw: &str, bound: Bound) -> RecurResult<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return match bound {
            Bound::Start => Ok(start_of_day(date)),
            Bound::End => end_of_day(date),
        };
    }

    if let Ok(instant) = raw.parse::<NaiveDateTime>() {
        return Ok(instant);
    }

    if let Ok(instant) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return Ok(instant);
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|instant| instant.naive_local())
        .map_err(|e| RecurError::InvalidWindow(format!("unparseable boundary {raw:?}: {e}")))
}
