//! Recurrence rules.
//!
//! `RecurrenceRuleDto` is the flat record shape exchanged with clients and
//! the record store. `RecurrenceRule` is the validated form: one pattern
//! variant per frequency, each carrying only the fields that frequency uses.

use std::num::NonZeroU32;

use chrono::{Datelike, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{RecurError, RecurResult};

/// Recurrence frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ## Summary
/// A set of weekdays numbered from Sunday (0) to Saturday (6).
///
/// Stored as a bitmask so iteration is always in ascending weekday order,
/// regardless of the order days were supplied in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    const MASK: u8 = 0b0111_1111;

    /// Monday through Friday.
    pub const WEEKDAYS: Self = Self(0b0011_1110);

    /// Saturday and Sunday.
    pub const WEEKENDS: Self = Self(0b0100_0001);

    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Builds a set from raw bits; bits above Saturday are dropped.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::MASK)
    }

    /// ## Summary
    /// Builds a set from day numbers (0 = Sunday).
    ///
    /// ## Errors
    /// Returns `RecurError::InvalidRule` if any day is outside `0..=6`.
    pub fn from_days(days: &[u8]) -> RecurResult<Self> {
        days.iter().try_fold(Self::empty(), |set, &day| {
            if day > 6 {
                return Err(RecurError::InvalidRule(format!(
                    "day of week {day} is outside 0..=6"
                )));
            }
            Ok(Self(set.0 | (1 << day)))
        })
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn contains(self, day: u8) -> bool {
        day <= 6 && self.0 & (1 << day) != 0
    }

    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub fn contains_weekday(self, weekday: Weekday) -> bool {
        self.contains(weekday.num_days_from_sunday() as u8)
    }

    /// Lowest selected day.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub const fn first(self) -> Option<u8> {
        if self.is_empty() {
            None
        } else {
            Some(self.0.trailing_zeros() as u8)
        }
    }

    /// Smallest selected day strictly greater than `day`.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub const fn next_after(self, day: u8) -> Option<u8> {
        if day >= 6 {
            return None;
        }
        let above = self.0 & (Self::MASK << (day + 1));
        if above == 0 {
            None
        } else {
            Some(above.trailing_zeros() as u8)
        }
    }

    pub fn iter(self) -> impl Iterator<Item = u8> {
        (0..=6).filter(move |&day| self.contains(day))
    }

    #[must_use]
    pub fn to_vec(self) -> Vec<u8> {
        self.iter().collect()
    }
}

/// ## Summary
/// The frequency-specific part of a recurrence rule.
///
/// A weekday set inside `Daily`/`Weekly` is never empty; an empty list in the
/// record form is normalized to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecurrencePattern {
    /// Every `interval` days, or every day matching `days_of_week`.
    Daily {
        interval: NonZeroU32,
        days_of_week: Option<WeekdaySet>,
    },
    /// Every `interval` weeks, optionally on the selected weekdays.
    Weekly {
        interval: NonZeroU32,
        days_of_week: Option<WeekdaySet>,
    },
    /// Every `interval` months, optionally pinned to a day of month (1-31).
    Monthly {
        interval: NonZeroU32,
        day_of_month: Option<u8>,
    },
    /// Every `interval` years, optionally pinned to a month (0-11) and day.
    Yearly {
        interval: NonZeroU32,
        month_of_year: Option<u8>,
        day_of_month: Option<u8>,
    },
}

impl RecurrencePattern {
    #[must_use]
    pub const fn frequency(&self) -> Frequency {
        match self {
            Self::Daily { .. } => Frequency::Daily,
            Self::Weekly { .. } => Frequency::Weekly,
            Self::Monthly { .. } => Frequency::Monthly,
            Self::Yearly { .. } => Frequency::Yearly,
        }
    }

    #[must_use]
    pub const fn interval(&self) -> NonZeroU32 {
        match self {
            Self::Daily { interval, .. }
            | Self::Weekly { interval, .. }
            | Self::Monthly { interval, .. }
            | Self::Yearly { interval, .. } => *interval,
        }
    }
}

/// Validated recurrence rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RecurrenceRuleDto", into = "RecurrenceRuleDto")]
pub struct RecurrenceRule {
    pub pattern: RecurrencePattern,
    /// Inclusive upper bound on occurrence date-times.
    pub end_date: Option<NaiveDateTime>,
    /// Maximum number of emitted occurrences.
    pub count: Option<NonZeroU32>,
}

impl RecurrenceRule {
    #[must_use]
    pub const fn new(pattern: RecurrencePattern) -> Self {
        Self {
            pattern,
            end_date: None,
            count: None,
        }
    }

    #[must_use]
    pub const fn with_end_date(mut self, end_date: NaiveDateTime) -> Self {
        self.end_date = Some(end_date);
        self
    }

    #[must_use]
    pub const fn with_count(mut self, count: NonZeroU32) -> Self {
        self.count = Some(count);
        self
    }

    #[must_use]
    pub const fn frequency(&self) -> Frequency {
        self.pattern.frequency()
    }

    /// ## Summary
    /// Fills the implicit day (and month, for yearly rules) from the series
    /// start so month-length clamping never drifts the series.
    ///
    /// A monthly series starting on the 31st returns to the 31st after
    /// February instead of staying on the 28th.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub fn anchored_to(&self, start: NaiveDateTime) -> Self {
        let start_day = start.day() as u8;
        let pattern = match self.pattern {
            RecurrencePattern::Monthly {
                interval,
                day_of_month,
            } => RecurrencePattern::Monthly {
                interval,
                day_of_month: day_of_month.or(Some(start_day)),
            },
            RecurrencePattern::Yearly {
                interval,
                month_of_year,
                day_of_month,
            } => RecurrencePattern::Yearly {
                interval,
                month_of_year: month_of_year.or(Some(start.month0() as u8)),
                day_of_month: day_of_month.or(Some(start_day)),
            },
            other => other,
        };
        Self { pattern, ..*self }
    }
}

/// ## Summary
/// Flat recurrence rule record, as stored and exchanged with clients.
///
/// Convert into a `RecurrenceRule` with [`RecurrenceRuleDto::validate`] (or
/// `TryFrom`) before use; fields irrelevant to the frequency are rejected
/// there rather than silently ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRuleDto {
    pub frequency: Frequency,
    #[serde(default = "default_interval")]
    pub interval: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month_of_year: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

const fn default_interval() -> u32 {
    1
}

impl RecurrenceRuleDto {
    #[must_use]
    pub const fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            interval: 1,
            days_of_week: None,
            day_of_month: None,
            month_of_year: None,
            end_date: None,
            count: None,
        }
    }

    #[must_use]
    pub const fn daily() -> Self {
        Self::new(Frequency::Daily)
    }

    #[must_use]
    pub const fn weekly() -> Self {
        Self::new(Frequency::Weekly)
    }

    #[must_use]
    pub const fn monthly() -> Self {
        Self::new(Frequency::Monthly)
    }

    #[must_use]
    pub const fn yearly() -> Self {
        Self::new(Frequency::Yearly)
    }

    #[must_use]
    pub const fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub fn with_days_of_week(mut self, days: &[u8]) -> Self {
        self.days_of_week = Some(days.to_vec());
        self
    }

    #[must_use]
    pub const fn with_day_of_month(mut self, day: u8) -> Self {
        self.day_of_month = Some(day);
        self
    }

    #[must_use]
    pub const fn with_month_of_year(mut self, month: u8) -> Self {
        self.month_of_year = Some(month);
        self
    }

    #[must_use]
    pub const fn with_end_date(mut self, end_date: NaiveDateTime) -> Self {
        self.end_date = Some(end_date);
        self
    }

    #[must_use]
    pub const fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// ## Summary
    /// Validates the record and converts it into a `RecurrenceRule`.
    ///
    /// ## Errors
    /// Returns `RecurError::InvalidRule` if:
    /// - `interval` or `count` is zero
    /// - a weekday, day of month or month is out of range
    /// - a field is set that the frequency does not use
    pub fn validate(self) -> RecurResult<RecurrenceRule> {
        RecurrenceRule::try_from(self)
    }

    fn reject_field(&self, field: &str) -> RecurError {
        RecurError::InvalidRule(format!(
            "{field} is not supported for {} recurrence",
            self.frequency
        ))
    }

    fn weekday_set(&self) -> RecurResult<Option<WeekdaySet>> {
        let Some(days) = &self.days_of_week else {
            return Ok(None);
        };
        let set = WeekdaySet::from_days(days)?;
        Ok((!set.is_empty()).then_some(set))
    }

    fn checked_day_of_month(&self) -> RecurResult<Option<u8>> {
        match self.day_of_month {
            Some(day) if !(1..=31).contains(&day) => Err(RecurError::InvalidRule(format!(
                "day of month {day} is outside 1..=31"
            ))),
            other => Ok(other),
        }
    }

    fn checked_month_of_year(&self) -> RecurResult<Option<u8>> {
        match self.month_of_year {
            Some(month) if month > 11 => Err(RecurError::InvalidRule(format!(
                "month of year {month} is outside 0..=11"
            ))),
            other => Ok(other),
        }
    }

    fn has_days_of_week(&self) -> bool {
        self.days_of_week.as_ref().is_some_and(|days| !days.is_empty())
    }
}

impl TryFrom<RecurrenceRuleDto> for RecurrenceRule {
    type Error = RecurError;

    fn try_from(dto: RecurrenceRuleDto) -> RecurResult<Self> {
        let interval = NonZeroU32::new(dto.interval)
            .ok_or_else(|| RecurError::InvalidRule("interval must be at least 1".to_string()))?;

        let count = match dto.count {
            Some(count) => Some(
                NonZeroU32::new(count)
                    .ok_or_else(|| RecurError::InvalidRule("count must be at least 1".to_string()))?,
            ),
            None => None,
        };

        let pattern = match dto.frequency {
            Frequency::Daily | Frequency::Weekly => {
                if dto.day_of_month.is_some() {
                    return Err(dto.reject_field("dayOfMonth"));
                }
                if dto.month_of_year.is_some() {
                    return Err(dto.reject_field("monthOfYear"));
                }
                let days_of_week = dto.weekday_set()?;
                if dto.frequency == Frequency::Daily {
                    RecurrencePattern::Daily {
                        interval,
                        days_of_week,
                    }
                } else {
                    RecurrencePattern::Weekly {
                        interval,
                        days_of_week,
                    }
                }
            }
            Frequency::Monthly => {
                if dto.has_days_of_week() {
                    return Err(dto.reject_field("daysOfWeek"));
                }
                if dto.month_of_year.is_some() {
                    return Err(dto.reject_field("monthOfYear"));
                }
                RecurrencePattern::Monthly {
                    interval,
                    day_of_month: dto.checked_day_of_month()?,
                }
            }
            Frequency::Yearly => {
                if dto.has_days_of_week() {
                    return Err(dto.reject_field("daysOfWeek"));
                }
                RecurrencePattern::Yearly {
                    interval,
                    month_of_year: dto.checked_month_of_year()?,
                    day_of_month: dto.checked_day_of_month()?,
                }
            }
        };

        Ok(Self {
            pattern,
            end_date: dto.end_date,
            count,
        })
    }
}

impl From<RecurrenceRule> for RecurrenceRuleDto {
    fn from(rule: RecurrenceRule) -> Self {
        let mut dto = Self::new(rule.frequency());
        dto.interval = rule.pattern.interval().get();
        dto.end_date = rule.end_date;
        dto.count = rule.count.map(NonZeroU32::get);

        match rule.pattern {
            RecurrencePattern::Daily { days_of_week, .. }
            | RecurrencePattern::Weekly { days_of_week, .. } => {
                dto.days_of_week = days_of_week.map(WeekdaySet::to_vec);
            }
            RecurrencePattern::Monthly { day_of_month, .. } => {
                dto.day_of_month = day_of_month;
            }
            RecurrencePattern::Yearly {
                month_of_year,
                day_of_month,
                ..
            } => {
                dto.month_of_year = month_of_year;
                dto.day_of_month = day_of_month;
            }
        }

        dto
    }
}
