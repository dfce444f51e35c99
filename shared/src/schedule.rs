//! Recurring collection dates
//!
//! A subscription stores a single reference date, e.g. the 4th Thursday of
//! December. Each month's collection is the same "Nth weekday" in that
//! month, falling back to the last such weekday when the month is short.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::types::DateRange;

/// "Nth occurrence of a weekday in its month"
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecurrencePattern {
    pub weekday: Weekday,
    /// 1-based, at most 5
    pub occurrence: u32,
}

impl RecurrencePattern {
    /// Pattern described by `date` within its own month
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            weekday: date.weekday(),
            // days 1-7 hold the 1st occurrence, 8-14 the 2nd, ...
            occurrence: (date.day() - 1) / 7 + 1,
        }
    }

    /// Date of this pattern in the given month
    pub fn resolve(&self, year: i32, month: u32) -> Result<NaiveDate, ScheduleError> {
        let range = month_bounds(year, month)?;
        let days_in_month = range.end.signed_duration_since(range.start).num_days() as u32;

        let first_offset = days_until(range.start.weekday(), self.weekday);
        let nth = 1 + first_offset + 7 * (self.occurrence.max(1) - 1);

        let day = if nth <= days_in_month {
            nth
        } else {
            // Fewer occurrences than asked for: use the last one
            let last = NaiveDate::from_ymd_opt(year, month, days_in_month)
                .ok_or(ScheduleError::InvalidYear(year))?;
            days_in_month - days_until(self.weekday, last.weekday())
        };

        NaiveDate::from_ymd_opt(year, month, day).ok_or(ScheduleError::InvalidYear(year))
    }
}

impl std::fmt::Display for RecurrencePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let suffix = match self.occurrence {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        };
        write!(f, "{}{} {}", self.occurrence, suffix, weekday_name(self.weekday))
    }
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Days to step forward from `from` to reach `to` (0-6)
fn days_until(from: Weekday, to: Weekday) -> u32 {
    (to.num_days_from_monday() + 7 - from.num_days_from_monday()) % 7
}

/// Same "Nth weekday" as `reference`, in the target month.
///
/// Always yields a date for a valid month: when the target month has fewer
/// occurrences of the weekday, the last occurrence is returned.
pub fn recurring_date(
    reference: NaiveDate,
    target_year: i32,
    target_month: u32,
) -> Result<NaiveDate, ScheduleError> {
    RecurrencePattern::from_date(reference).resolve(target_year, target_month)
}

/// `[first day of month, first day of next month)`
pub fn month_bounds(year: i32, month: u32) -> Result<DateRange, ScheduleError> {
    if !(1..=12).contains(&month) {
        return Err(ScheduleError::InvalidMonth(month));
    }
    let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or(ScheduleError::InvalidYear(year))?;
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1).ok_or(ScheduleError::InvalidYear(year))?, 1)
    } else {
        (year, month + 1)
    };
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .ok_or(ScheduleError::InvalidYear(next_year))?;
    Ok(DateRange { start, end })
}

/// Step forward `days` Monday-to-Friday days from `start`
pub fn add_working_days(start: NaiveDate, days: u32) -> Result<NaiveDate, ScheduleError> {
    let mut current = start;
    let mut added = 0;
    while added < days {
        current = current
            .succ_opt()
            .ok_or(ScheduleError::DateOverflow(start))?;
        if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            added += 1;
        }
    }
    Ok(current)
}

/// First collection on or after `from` following the reference pattern
pub fn next_collection_on_or_after(
    reference: NaiveDate,
    from: NaiveDate,
) -> Result<NaiveDate, ScheduleError> {
    let pattern = RecurrencePattern::from_date(reference);
    let this_month = pattern.resolve(from.year(), from.month())?;
    if this_month >= from {
        return Ok(this_month);
    }

    let (year, month) = if from.month() == 12 {
        (
            from.year()
                .checked_add(1)
                .ok_or(ScheduleError::DateOverflow(from))?,
            1,
        )
    } else {
        (from.year(), from.month() + 1)
    };
    pattern.resolve(year, month)
}
