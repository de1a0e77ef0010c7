use crate::utils::{end_of_day, first_day_of_month, last_day_of_month, start_of_day};
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Weekday};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The named reporting windows a caller can ask for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportPeriod {
    Today,
    ThisWeek,
    ThisMonth,
    ThisQuarter,
    ThisYear,
    AllTime,
}

impl ReportPeriod {
    pub const ALL: [ReportPeriod; 6] = [
        ReportPeriod::Today,
        ReportPeriod::ThisWeek,
        ReportPeriod::ThisMonth,
        ReportPeriod::ThisQuarter,
        ReportPeriod::ThisYear,
        ReportPeriod::AllTime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportPeriod::Today => "today",
            ReportPeriod::ThisWeek => "this_week",
            ReportPeriod::ThisMonth => "this_month",
            ReportPeriod::ThisQuarter => "this_quarter",
            ReportPeriod::ThisYear => "this_year",
            ReportPeriod::AllTime => "all_time",
        }
    }

    /// Bucket size used when charting this period.
    pub fn granularity(&self) -> Granularity {
        match self {
            ReportPeriod::Today | ReportPeriod::ThisWeek | ReportPeriod::ThisMonth => {
                Granularity::Day
            }
            ReportPeriod::ThisQuarter | ReportPeriod::ThisYear | ReportPeriod::AllTime => {
                Granularity::Month
            }
        }
    }
}

impl Default for ReportPeriod {
    fn default() -> Self {
        Self::ThisMonth
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Day,
    Month,
}

/// Inclusive on both ends.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Whole calendar days from `first` through `last`.
    pub fn days(first: NaiveDate, last: NaiveDate) -> Self {
        Self {
            start: start_of_day(first),
            end: end_of_day(last),
        }
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodBounds {
    Bounded(TimeRange),
    /// `all_time`: nothing is filtered out.
    Unbounded,
}

impl PeriodBounds {
    pub fn range(&self) -> Option<TimeRange> {
        match self {
            PeriodBounds::Bounded(range) => Some(*range),
            PeriodBounds::Unbounded => None,
        }
    }
}

/// Maps a period token and a reference instant to an absolute window.
pub fn resolve_period(period: ReportPeriod, now: NaiveDateTime) -> PeriodBounds {
    let today = now.date();

    let range = match period {
        ReportPeriod::Today => TimeRange::days(today, today),
        ReportPeriod::ThisWeek => {
            let start = week_start(today);
            let end = start.checked_add_days(Days::new(6)).unwrap_or(start);
            TimeRange::days(start, end)
        }
        ReportPeriod::ThisMonth => TimeRange::days(
            first_day_of_month(today),
            last_day_of_month(today.year(), today.month()),
        ),
        ReportPeriod::ThisQuarter => {
            let first_month = (today.month0() / 3) * 3 + 1;
            let last_month = first_month + 2;
            let start = NaiveDate::from_ymd_opt(today.year(), first_month, 1).unwrap_or(today);
            TimeRange::days(start, last_day_of_month(today.year(), last_month))
        }
        ReportPeriod::ThisYear => {
            let start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
            TimeRange::days(start, last_day_of_month(today.year(), 12))
        }
        ReportPeriod::AllTime => return PeriodBounds::Unbounded,
    };

    PeriodBounds::Bounded(range)
}

/// Monday of the week containing `date`; Sunday belongs to the week that started six days earlier.
fn week_start(date: NaiveDate) -> NaiveDate {
    let back = match date.weekday() {
        Weekday::Sun => 6,
        other => other.number_from_monday() as u64 - 1,
    };
    date.checked_sub_days(Days::new(back)).unwrap_or(date)
}
