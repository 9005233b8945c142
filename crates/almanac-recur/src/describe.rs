//! Human-readable rule summaries and the preset rules offered to users.

use std::fmt;
use std::num::NonZeroU32;

use crate::model::{RecurrencePattern, RecurrenceRule, WeekdaySet};

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A named rule users can pick without building one by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preset {
    pub label: &'static str,
    pub rule: RecurrenceRule,
}

/// ## Summary
/// The common rules offered in recurrence pickers, in display order.
#[must_use]
pub fn presets() -> Vec<Preset> {
    let one = NonZeroU32::MIN;
    let two = one.saturating_add(1);
    let three = one.saturating_add(2);

    let preset = |label, pattern| Preset {
        label,
        rule: RecurrenceRule::new(pattern),
    };

    vec![
        preset("Daily", RecurrencePattern::Daily { interval: one, days_of_week: None }),
        preset("Weekly", RecurrencePattern::Weekly { interval: one, days_of_week: None }),
        preset("Monthly", RecurrencePattern::Monthly { interval: one, day_of_month: None }),
        preset(
            "Yearly",
            RecurrencePattern::Yearly {
                interval: one,
                month_of_year: None,
                day_of_month: None,
            },
        ),
        preset(
            "Weekdays",
            RecurrencePattern::Weekly {
                interval: one,
                days_of_week: Some(WeekdaySet::WEEKDAYS),
            },
        ),
        preset(
            "Weekends",
            RecurrencePattern::Weekly {
                interval: one,
                days_of_week: Some(WeekdaySet::WEEKENDS),
            },
        ),
        preset("Every 2 weeks", RecurrencePattern::Weekly { interval: two, days_of_week: None }),
        preset("Every 3 months", RecurrencePattern::Monthly { interval: three, day_of_month: None }),
    ]
}

fn ordinal_suffix(n: u8) -> &'static str {
    if (11..=13).contains(&(n % 100)) {
        return "th";
    }
    match n % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

fn write_every(f: &mut fmt::Formatter<'_>, interval: NonZeroU32, single: &str, unit: &str) -> fmt::Result {
    if interval.get() == 1 {
        f.write_str(single)
    } else {
        write!(f, "Every {interval} {unit}")
    }
}

fn write_days(f: &mut fmt::Formatter<'_>, days: WeekdaySet) -> fmt::Result {
    f.write_str(" on ")?;
    for (i, day) in days.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        f.write_str(DAY_NAMES[usize::from(day)])?;
    }
    Ok(())
}

fn write_day_of_month(f: &mut fmt::Formatter<'_>, day: u8) -> fmt::Result {
    write!(f, " on the {day}{}", ordinal_suffix(day))
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pattern {
            RecurrencePattern::Daily {
                interval,
                days_of_week,
            } => match days_of_week {
                // The interval is not applied when a weekday filter is set.
                Some(days) => {
                    f.write_str("Daily")?;
                    write_days(f, days)?;
                }
                None => write_every(f, interval, "Daily", "days")?,
            },
            RecurrencePattern::Weekly {
                interval,
                days_of_week,
            } => {
                write_every(f, interval, "Weekly", "weeks")?;
                if let Some(days) = days_of_week {
                    write_days(f, days)?;
                }
            }
            RecurrencePattern::Monthly {
                interval,
                day_of_month,
            } => {
                write_every(f, interval, "Monthly", "months")?;
                if let Some(day) = day_of_month {
                    write_day_of_month(f, day)?;
                }
            }
            RecurrencePattern::Yearly {
                interval,
                month_of_year,
                day_of_month,
            } => {
                write_every(f, interval, "Yearly", "years")?;
                let month = month_of_year.and_then(|m| MONTH_NAMES.get(usize::from(m)));
                match (month, day_of_month) {
                    (Some(month), Some(day)) => write!(f, " on {month} {day}{}", ordinal_suffix(day))?,
                    (Some(month), None) => write!(f, " in {month}")?,
                    (None, Some(day)) => write_day_of_month(f, day)?,
                    (None, None) => {}
                }
            }
        }

        if let Some(count) = self.count {
            if count.get() == 1 {
                f.write_str(", once")?;
            } else {
                write!(f, ", {count} times")?;
            }
        }
        if let Some(end) = self.end_date {
            write!(f, ", until {}", end.format("%Y-%m-%d"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecurrenceRuleDto;
    use chrono::NaiveDate;

    fn describe(dto: RecurrenceRuleDto) -> String {
        dto.validate().unwrap().to_string()
    }

    #[test]
    fn test_describe_daily() {
        assert_eq!(describe(RecurrenceRuleDto::daily()), "Daily");
        assert_eq!(describe(RecurrenceRuleDto::daily().with_interval(3)), "Every 3 days");
        assert_eq!(
            describe(RecurrenceRuleDto::daily().with_days_of_week(&[2, 1])),
            "Daily on Monday, Tuesday"
        );
    }

    #[test]
    fn test_describe_weekly() {
        assert_eq!(
            describe(RecurrenceRuleDto::weekly().with_days_of_week(&[3, 1])),
            "Weekly on Monday, Wednesday"
        );
        assert_eq!(
            describe(RecurrenceRuleDto::weekly().with_interval(2).with_days_of_week(&[5])),
            "Every 2 weeks on Friday"
        );
    }

    #[test]
    fn test_describe_monthly() {
        assert_eq!(describe(RecurrenceRuleDto::monthly().with_day_of_month(31)), "Monthly on the 31st");
        assert_eq!(
            describe(RecurrenceRuleDto::monthly().with_interval(2).with_day_of_month(12)),
            "Every 2 months on the 12th"
        );
        assert_eq!(describe(RecurrenceRuleDto::monthly().with_day_of_month(22)), "Monthly on the 22nd");
    }

    #[test]
    fn test_describe_yearly() {
        assert_eq!(
            describe(RecurrenceRuleDto::yearly().with_month_of_year(2).with_day_of_month(1)),
            "Yearly on March 1st"
        );
        assert_eq!(describe(RecurrenceRuleDto::yearly().with_month_of_year(2)), "Yearly in March");
        assert_eq!(describe(RecurrenceRuleDto::yearly().with_interval(4)), "Every 4 years");
    }

    #[test]
    fn test_describe_termination() {
        assert_eq!(describe(RecurrenceRuleDto::daily().with_count(5)), "Daily, 5 times");
        assert_eq!(describe(RecurrenceRuleDto::weekly().with_count(1)), "Weekly, once");

        let end = NaiveDate::from_ymd_opt(2024, 6, 30)
            .and_then(|d| d.and_hms_opt(23, 0, 0))
            .unwrap();
        assert_eq!(
            describe(RecurrenceRuleDto::monthly().with_end_date(end)),
            "Monthly, until 2024-06-30"
        );
    }

    #[test]
    fn test_ordinal_suffix() {
        let cases = [(1, "st"), (2, "nd"), (3, "rd"), (4, "th"), (11, "th"), (12, "th"), (13, "th"), (21, "st"), (23, "rd"), (30, "th")];
        for (n, suffix) in cases {
            assert_eq!(ordinal_suffix(n), suffix, "{n}");
        }
    }

    #[test]
    fn test_presets() {
        let presets = presets();
        let labels: Vec<_> = presets.iter().map(|p| p.label).collect();
        assert_eq!(
            labels,
            vec!["Daily", "Weekly", "Monthly", "Yearly", "Weekdays", "Weekends", "Every 2 weeks", "Every 3 months"]
        );

        let weekdays = &presets[4].rule;
        assert_eq!(weekdays.to_string(), "Weekly on Monday, Tuesday, Wednesday, Thursday, Friday");
        assert_eq!(presets[5].rule.to_string(), "Weekly on Sunday, Saturday");
        assert_eq!(presets[6].rule.to_string(), "Every 2 weeks");
    }

    #[test]
    fn test_presets_round_trip_through_record_form() {
        for preset in presets() {
            let dto = RecurrenceRuleDto::from(preset.rule.clone());
            assert_eq!(dto.validate().unwrap(), preset.rule, "{}", preset.label);
        }
    }
}
