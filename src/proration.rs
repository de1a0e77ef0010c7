use crate::period::{Granularity, ReportPeriod};
use crate::schema::Money;
use crate::utils::{days_in_month_of, months_between};
use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// Inputs the prorator needs besides the period itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProrationContext {
    pub now: NaiveDateTime,
    /// Earliest dated record in the reported scope, used by `all_time`.
    pub earliest_record: Option<NaiveDateTime>,
}

impl ProrationContext {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now,
            earliest_record: None,
        }
    }

    pub fn with_earliest_record(mut self, earliest: Option<NaiveDateTime>) -> Self {
        self.earliest_record = earliest;
        self
    }
}

/// Converts a recurring monthly total into the comparable figure for `period`.
///
/// Quarter and year use linear multiples of one month and ignore the
/// day-count differences between months.
pub fn prorate_fixed_costs(period: ReportPeriod, monthly_total: Money, ctx: &ProrationContext) -> Money {
    let today = ctx.now.date();
    let daily = monthly_total / days_in_month_of(today) as f64;

    match period {
        ReportPeriod::Today => daily,
        ReportPeriod::ThisWeek => daily * 7.0,
        ReportPeriod::ThisMonth => monthly_total,
        ReportPeriod::ThisQuarter => monthly_total * 3.0,
        ReportPeriod::ThisYear => monthly_total * elapsed_months_in_year(today),
        ReportPeriod::AllTime => monthly_total * months_covered(ctx.earliest_record, today),
    }
}

/// Fixed-cost share of a single chart bucket that starts on `bucket_start`.
pub fn prorate_for_bucket(granularity: Granularity, bucket_start: NaiveDate, monthly_total: Money) -> Money {
    match granularity {
        Granularity::Day => monthly_total / days_in_month_of(bucket_start) as f64,
        Granularity::Month => monthly_total,
    }
}

/// Completed months of the year plus the elapsed fraction of the current one.
fn elapsed_months_in_year(today: NaiveDate) -> f64 {
    let day_fraction = today.day() as f64 / days_in_month_of(today) as f64;
    today.month0() as f64 + day_fraction
}

/// Calendar months from the earliest record through `today`, never less than one.
fn months_covered(earliest: Option<NaiveDateTime>, today: NaiveDate) -> f64 {
    match earliest {
        Some(first) => (months_between(first.date(), today) + 1).max(1) as f64,
        None => 1.0,
    }
}
