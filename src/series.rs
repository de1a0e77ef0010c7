use crate::filter::filter_refs_by_period;
use crate::period::{resolve_period, Granularity, PeriodBounds, ReportPeriod, TimeRange};
use crate::proration::prorate_for_bucket;
use crate::schema::{Money, Order, VariableCost};
use crate::utils::{
    end_of_day, first_day_of_month, last_day_of_month, month_starts_in_period, start_of_day,
};
use chrono::{Datelike, FixedOffset, NaiveDate, NaiveDateTime};
use log::debug;
use serde::{Deserialize, Serialize};

/// One sub-interval of a reporting window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub label: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub granularity: Granularity,
}

impl Bucket {
    pub fn day(date: NaiveDate) -> Self {
        Self {
            label: format!("{}/{}", date.day(), date.month()),
            start: start_of_day(date),
            end: end_of_day(date),
            granularity: Granularity::Day,
        }
    }

    pub fn month(month_start: NaiveDate) -> Self {
        let first = first_day_of_month(month_start);
        Self {
            label: format!("{}/{}", first.month(), first.year()),
            start: start_of_day(first),
            end: end_of_day(last_day_of_month(first.year(), first.month())),
            granularity: Granularity::Month,
        }
    }

    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitChartDataPoint {
    pub label: String,
    pub revenue: Money,
    pub total_costs: Money,
    pub profit: Money,
    pub variable_costs: Money,
    pub fixed_costs: Money,
}

impl ProfitChartDataPoint {
    /// Builds a point with `total_costs` and `profit` derived from the parts.
    pub fn new(label: String, revenue: Money, variable_costs: Money, fixed_costs: Money) -> Self {
        let total_costs = variable_costs + fixed_costs;
        Self {
            label,
            revenue,
            total_costs,
            profit: revenue - total_costs,
            variable_costs,
            fixed_costs,
        }
    }

    pub fn has_activity(&self) -> bool {
        self.revenue != 0.0 || self.variable_costs != 0.0
    }
}

/// Splits `range` into consecutive day or month buckets covering it.
pub fn bucketize(range: &TimeRange, granularity: Granularity) -> Vec<Bucket> {
    let first = range.start.date();
    let last = range.end.date();
    if first > last {
        return Vec::new();
    }

    match granularity {
        Granularity::Day => first
            .iter_days()
            .take_while(|d| *d <= last)
            .map(Bucket::day)
            .collect(),
        Granularity::Month => month_starts_in_period(first, last)
            .into_iter()
            .map(Bucket::month)
            .collect(),
    }
}

/// The window charted for `period`.
///
/// Bounded periods chart their resolved range. `all_time` runs from the month
/// of the earliest dated record (or the current month when there is none)
/// through the end of the current month. The earliest record is taken over
/// orders and variable costs alike, not orders only, so the buckets hold every
/// dated cost the `all_time` total counts.
pub fn series_range(
    period: ReportPeriod,
    now: NaiveDateTime,
    earliest_record: Option<NaiveDateTime>,
) -> TimeRange {
    match resolve_period(period, now) {
        PeriodBounds::Bounded(range) => range,
        PeriodBounds::Unbounded => {
            let today = now.date();
            let first = earliest_record
                .map(|e| e.date())
                .filter(|d| *d <= today)
                .unwrap_or(today);
            TimeRange::days(
                first_day_of_month(first),
                last_day_of_month(today.year(), today.month()),
            )
        }
    }
}

/// Computes one data point per bucket. Empty buckets stay in the series as zero points.
pub fn profit_series(
    buckets: &[Bucket],
    orders: &[&Order],
    variable_costs: &[&VariableCost],
    monthly_fixed_total: Money,
    reporting_offset: FixedOffset,
) -> Vec<ProfitChartDataPoint> {
    debug!(
        "Computing {} bucket(s) over {} order(s) and {} variable cost(s)",
        buckets.len(),
        orders.len(),
        variable_costs.len()
    );

    buckets
        .iter()
        .map(|bucket| {
            bucket_point(bucket, orders, variable_costs, monthly_fixed_total, reporting_offset)
        })
        .collect()
}

fn bucket_point(
    bucket: &Bucket,
    orders: &[&Order],
    variable_costs: &[&VariableCost],
    monthly_fixed_total: Money,
    reporting_offset: FixedOffset,
) -> ProfitChartDataPoint {
    let bounds = PeriodBounds::Bounded(bucket.range());

    let revenue: Money =
        filter_refs_by_period(orders.iter().copied(), &bounds, reporting_offset)
            .iter()
            .map(|o| o.total_amount)
            .sum();
    let variable: Money =
        filter_refs_by_period(variable_costs.iter().copied(), &bounds, reporting_offset)
            .iter()
            .map(|c| c.amount)
            .sum();
    let fixed = prorate_for_bucket(bucket.granularity, bucket.start.date(), monthly_fixed_total);

    ProfitChartDataPoint::new(bucket.label.clone(), revenue, variable, fixed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CostCategory;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn order(id: &str, date: &str, amount: Money) -> Order {
        Order {
            id: id.to_string(),
            created_at: Some(date.to_string()),
            total_amount: amount,
            owner_id: "A".to_string(),
            items: Vec::new(),
        }
    }

    fn cost(id: &str, date: &str, amount: Money) -> VariableCost {
        VariableCost {
            id: id.to_string(),
            date: Some(date.to_string()),
            amount,
            owner_id: "A".to_string(),
            category: CostCategory::Utilities,
        }
    }

    #[test]
    fn test_day_buckets_for_month() {
        let range = series_range(ReportPeriod::ThisMonth, at(2024, 2, 10), None);
        let buckets = bucketize(&range, Granularity::Day);

        assert_eq!(buckets.len(), 29);
        assert_eq!(buckets[0].label, "1/2");
        assert_eq!(buckets[28].label, "29/2");
        assert!(buckets.windows(2).all(|w| w[0].end < w[1].start));
    }

    #[test]
    fn test_week_buckets_cross_month() {
        // Sunday 2024-03-03, week starts Monday 2024-02-26
        let range = series_range(ReportPeriod::ThisWeek, at(2024, 3, 3), None);
        let labels: Vec<String> = bucketize(&range, Granularity::Day)
            .into_iter()
            .map(|b| b.label)
            .collect();
        assert_eq!(
            labels,
            vec!["26/2", "27/2", "28/2", "29/2", "1/3", "2/3", "3/3"]
        );
    }

    #[test]
    fn test_month_buckets_for_year() {
        let range = series_range(ReportPeriod::ThisYear, at(2024, 6, 15), None);
        let buckets = bucketize(&range, Granularity::Month);

        assert_eq!(buckets.len(), 12);
        assert_eq!(buckets[0].label, "1/2024");
        assert_eq!(buckets[11].label, "12/2024");
        assert_eq!(buckets[1].end.date(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_all_time_range_starts_at_earliest_month() {
        let range = series_range(ReportPeriod::AllTime, at(2024, 3, 20), Some(at(2023, 11, 5)));
        let buckets = bucketize(&range, Granularity::Month);
        let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["11/2023", "12/2023", "1/2024", "2/2024", "3/2024"]);
    }

    #[test]
    fn test_all_time_without_records_is_current_month() {
        let range = series_range(ReportPeriod::AllTime, at(2024, 3, 20), None);
        let buckets = bucketize(&range, Granularity::Month);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].label, "3/2024");
    }

    #[test]
    fn test_points_keep_empty_buckets() {
        let range = series_range(ReportPeriod::ThisMonth, at(2024, 4, 10), None);
        let buckets = bucketize(&range, Granularity::Day);
        let orders = [order("o1", "2024-04-02T10:00:00", 500.0)];
        let order_refs: Vec<&Order> = orders.iter().collect();

        let points = profit_series(&buckets, &order_refs, &[], 3_000.0, utc());

        assert_eq!(points.len(), 30);
        assert_eq!(points[1].revenue, 500.0);
        assert_eq!(points[0].revenue, 0.0);
        for p in &points {
            assert_eq!(p.fixed_costs, 100.0);
            assert_eq!(p.total_costs, p.variable_costs + p.fixed_costs);
            assert_eq!(p.profit, p.revenue - p.total_costs);
        }
    }

    #[test]
    fn test_bucket_sums_match_inputs() {
        let range = series_range(ReportPeriod::ThisYear, at(2024, 6, 15), None);
        let buckets = bucketize(&range, Granularity::Month);
        let orders = [
            order("o1", "2024-01-31T23:59:59", 100.0),
            order("o2", "2024-02-01", 200.0),
            order("o3", "2024-12-31T18:00:00", 50.0),
        ];
        let costs = [cost("c1", "2024-05-05", 30.0), cost("c2", "2024-05-06", 20.0)];
        let order_refs: Vec<&Order> = orders.iter().collect();
        let cost_refs: Vec<&VariableCost> = costs.iter().collect();

        let points = profit_series(&buckets, &order_refs, &cost_refs, 0.0, utc());

        assert_eq!(points[0].revenue, 100.0);
        assert_eq!(points[1].revenue, 200.0);
        assert_eq!(points[11].revenue, 50.0);
        assert_eq!(points[4].variable_costs, 50.0);
        let revenue: Money = points.iter().map(|p| p.revenue).sum();
        assert_eq!(revenue, 350.0);
    }

    #[test]
    fn test_same_instant_lands_in_same_bucket() {
        let bangkok = FixedOffset::east_opt(7 * 3600).unwrap();
        let range = series_range(ReportPeriod::ThisYear, at(2024, 4, 1), None);
        let buckets = bucketize(&range, Granularity::Month);
        let orders = [
            order("utc", "2024-03-31T20:00:00Z", 10.0),
            order("local", "2024-04-01T03:00:00+07:00", 20.0),
        ];
        let order_refs: Vec<&Order> = orders.iter().collect();

        let points = profit_series(&buckets, &order_refs, &[], 0.0, bangkok);
        assert_eq!(points[2].revenue, 0.0);
        assert_eq!(points[3].label, "4/2024");
        assert_eq!(points[3].revenue, 30.0);

        let points = profit_series(&buckets, &order_refs, &[], 0.0, utc());
        assert_eq!(points[2].revenue, 30.0);
    }

    #[test]
    fn test_inverted_range_yields_no_buckets() {
        let range = TimeRange::new(at(2024, 3, 2), at(2024, 3, 1));
        assert!(bucketize(&range, Granularity::Day).is_empty());
    }
}
