//! Occurrence stepping.
//!
//! Given one occurrence and a rule, computes the next candidate occurrence.
//! Time of day is always preserved; only the calendar date moves.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};

use crate::model::{RecurrencePattern, RecurrenceRule, WeekdaySet};

/// ## Summary
/// Returns the next candidate occurrence after `current` under `rule`.
///
/// Total: never fails and never loops. A result beyond chrono's supported
/// date range saturates to `NaiveDateTime::MAX`, which ends any expansion.
///
/// A daily rule with a weekday filter advances one day at a time to the next
/// selected weekday; its interval is not applied in that mode.
#[must_use]
pub fn next_occurrence(current: NaiveDateTime, rule: &RecurrenceRule) -> NaiveDateTime {
    match rule.pattern {
        RecurrencePattern::Daily {
            days_of_week: Some(days),
            ..
        } => next_matching_day(current, days),
        RecurrencePattern::Daily {
            interval,
            days_of_week: None,
        } => add_days(current, u64::from(interval.get())),
        RecurrencePattern::Weekly {
            interval,
            days_of_week: Some(days),
        } => next_weekly_day(current, interval.get(), days),
        RecurrencePattern::Weekly {
            interval,
            days_of_week: None,
        } => add_days(current, 7 * u64::from(interval.get())),
        RecurrencePattern::Monthly {
            interval,
            day_of_month,
        } => shift_months(current, interval.get(), day_of_month),
        RecurrencePattern::Yearly {
            interval,
            month_of_year,
            day_of_month,
        } => shift_years(current, interval.get(), month_of_year, day_of_month),
    }
}

fn add_days(current: NaiveDateTime, days: u64) -> NaiveDateTime {
    current
        .checked_add_days(Days::new(days))
        .unwrap_or(NaiveDateTime::MAX)
}

#[expect(clippy::cast_possible_truncation)]
fn weekday_number(date: NaiveDateTime) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

fn next_matching_day(current: NaiveDateTime, days: WeekdaySet) -> NaiveDateTime {
    let mut next = current;
    for _ in 0..7 {
        next = add_days(next, 1);
        if days.contains(weekday_number(next)) {
            return next;
        }
    }
    // Unreachable for a non-empty set; still advance so callers make progress.
    add_days(current, 1)
}

fn next_weekly_day(current: NaiveDateTime, interval: u32, days: WeekdaySet) -> NaiveDateTime {
    let weekday = weekday_number(current);

    if let Some(next_day) = days.next_after(weekday) {
        return add_days(current, u64::from(next_day - weekday));
    }

    let Some(first_day) = days.first() else {
        return add_days(current, 7 * u64::from(interval));
    };

    // Back to the first selected weekday of the block `interval` weeks on.
    let offset = u64::from(7 - weekday) + u64::from(first_day) + 7 * u64::from(interval - 1);
    add_days(current, offset)
}

fn shift_months(current: NaiveDateTime, months: u32, day_of_month: Option<u8>) -> NaiveDateTime {
    let total = i64::from(current.year()) * 12 + i64::from(current.month0()) + i64::from(months);
    let Ok(year) = i32::try_from(total.div_euclid(12)) else {
        return NaiveDateTime::MAX;
    };
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let month0 = total.rem_euclid(12) as u32;

    with_clamped_day(current, year, month0, day_of_month)
}

fn shift_years(
    current: NaiveDateTime,
    years: u32,
    month_of_year: Option<u8>,
    day_of_month: Option<u8>,
) -> NaiveDateTime {
    let Ok(year) = i32::try_from(i64::from(current.year()) + i64::from(years)) else {
        return NaiveDateTime::MAX;
    };
    let month0 = month_of_year.map_or(current.month0(), u32::from);

    with_clamped_day(current, year, month0, day_of_month)
}

/// Builds `year-month` with the target day clamped to the month's length.
fn with_clamped_day(
    current: NaiveDateTime,
    year: i32,
    month0: u32,
    day_of_month: Option<u8>,
) -> NaiveDateTime {
    let month = month0 + 1;
    let target_day = day_of_month.map_or(current.day(), u32::from);
    let day = target_day.min(days_in_month(year, month));

    NaiveDate::from_ymd_opt(year, month, day)
        .map_or(NaiveDateTime::MAX, |date| date.and_time(current.time()))
}

/// Returns the number of days in a month.
fn days_in_month(year: i32, month: u32) -> u32 {
    NaiveDate::from_ymd_opt(year, month + 1, 1)
        .or_else(|| NaiveDate::from_ymd_opt(year + 1, 1, 1))
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map_or(31, |last| last.day())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecurrenceRuleDto;
    use chrono::Weekday;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(10, 30, 0))
            .unwrap()
    }

    fn rule(dto: RecurrenceRuleDto) -> RecurrenceRule {
        dto.validate().unwrap()
    }

    #[test]
    fn test_daily_interval() {
        let rule = rule(RecurrenceRuleDto::daily().with_interval(3));
        assert_eq!(next_occurrence(at(2024, 1, 30), &rule), at(2024, 2, 2));
    }

    #[test]
    fn test_daily_weekday_filter_ignores_interval() {
        // Tue/Thu filter with interval 5: still the very next Tue or Thu.
        let rule = rule(
            RecurrenceRuleDto::daily()
                .with_interval(5)
                .with_days_of_week(&[2, 4]),
        );
        let tuesday = at(2024, 1, 2);
        assert_eq!(tuesday.weekday(), Weekday::Tue);
        assert_eq!(next_occurrence(tuesday, &rule), at(2024, 1, 4));
        assert_eq!(next_occurrence(at(2024, 1, 4), &rule), at(2024, 1, 9));
    }

    #[test]
    fn test_weekly_without_days() {
        let rule = rule(RecurrenceRuleDto::weekly().with_interval(2));
        assert_eq!(next_occurrence(at(2024, 1, 1), &rule), at(2024, 1, 15));
    }

    #[test]
    fn test_weekly_same_week() {
        let rule = rule(RecurrenceRuleDto::weekly().with_days_of_week(&[1, 3, 5]));
        let wednesday = at(2024, 1, 3);
        assert_eq!(wednesday.weekday(), Weekday::Wed);
        assert_eq!(next_occurrence(wednesday, &rule), at(2024, 1, 5));
    }

    #[test]
    fn test_weekly_wraps_to_next_week() {
        let rule = rule(RecurrenceRuleDto::weekly().with_days_of_week(&[1, 3, 5]));
        let friday = at(2024, 1, 5);
        let next = next_occurrence(friday, &rule);
        assert_eq!(next, at(2024, 1, 8));
        assert_eq!(next.weekday(), Weekday::Mon);
    }

    #[test]
    fn test_weekly_wrap_honors_interval() {
        let rule = rule(
            RecurrenceRuleDto::weekly()
                .with_interval(2)
                .with_days_of_week(&[2, 4]),
        );
        // Thursday 2024-01-04 -> Tuesday of the block two weeks later.
        assert_eq!(next_occurrence(at(2024, 1, 4), &rule), at(2024, 1, 16));
    }

    #[test]
    fn test_weekly_wrap_from_saturday_to_sunday() {
        let rule = rule(RecurrenceRuleDto::weekly().with_days_of_week(&[0, 6]));
        let saturday = at(2024, 1, 6);
        assert_eq!(next_occurrence(saturday, &rule), at(2024, 1, 7));
        assert_eq!(next_occurrence(at(2024, 1, 7), &rule), at(2024, 1, 13));
    }

    #[test]
    fn test_monthly_clamps_to_february() {
        let rule = rule(RecurrenceRuleDto::monthly().with_day_of_month(31));
        assert_eq!(next_occurrence(at(2023, 1, 31), &rule), at(2023, 2, 28));
        assert_eq!(next_occurrence(at(2024, 1, 31), &rule), at(2024, 2, 29));
        assert_eq!(next_occurrence(at(2024, 2, 29), &rule), at(2024, 3, 31));
    }

    #[test]
    fn test_monthly_crosses_year() {
        let rule = rule(RecurrenceRuleDto::monthly().with_interval(3));
        assert_eq!(next_occurrence(at(2024, 11, 15), &rule), at(2025, 2, 15));
    }

    #[test]
    fn test_monthly_without_day_clamps_current_day() {
        let rule = rule(RecurrenceRuleDto::monthly());
        assert_eq!(next_occurrence(at(2024, 1, 31), &rule), at(2024, 2, 29));
    }

    #[test]
    fn test_yearly_sets_month_and_day() {
        let rule = rule(
            RecurrenceRuleDto::yearly()
                .with_month_of_year(1)
                .with_day_of_month(29),
        );
        assert_eq!(next_occurrence(at(2024, 2, 29), &rule), at(2025, 2, 28));
        assert_eq!(next_occurrence(at(2027, 2, 28), &rule), at(2028, 2, 29));
    }

    #[test]
    fn test_yearly_interval() {
        let rule = rule(RecurrenceRuleDto::yearly().with_interval(2));
        assert_eq!(next_occurrence(at(2024, 7, 4), &rule), at(2026, 7, 4));
    }

    #[test]
    fn test_overflow_saturates() {
        let rule = rule(RecurrenceRuleDto::yearly().with_interval(u32::MAX));
        assert_eq!(next_occurrence(at(2024, 1, 1), &rule), NaiveDateTime::MAX);
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 12), 31);
    }

    #[test]
    fn test_always_advances() {
        let rules = [
            rule(RecurrenceRuleDto::daily()),
            rule(RecurrenceRuleDto::daily().with_days_of_week(&[0])),
            rule(RecurrenceRuleDto::weekly().with_days_of_week(&[0, 1, 2, 3, 4, 5, 6])),
            rule(RecurrenceRuleDto::monthly().with_day_of_month(1)),
            rule(RecurrenceRuleDto::yearly().with_month_of_year(0).with_day_of_month(1)),
        ];
        let mut current = at(2024, 12, 31);
        for rule in &rules {
            for _ in 0..50 {
                let next = next_occurrence(current, rule);
                assert!(next > current, "{rule:?} did not advance from {current}");
                current = next;
            }
        }
    }
}
