//! Hand-off formats for the table and printable-report collaborators.
//!
//! Both consume figures that were already computed; nothing here aggregates.

use crate::engine::{AggregateResult, ReportEngine};
use crate::error::Result;
use crate::period::ReportPeriod;
use crate::schema::{Money, TenantId};
use crate::scope::TenantScope;
use crate::series::ProfitChartDataPoint;
use crate::store::RecordStore;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::io::Write;

pub const SERIES_HEADER: [&str; 6] = [
    "Period",
    "Revenue",
    "TotalCosts",
    "Profit",
    "VariableCosts",
    "FixedCosts",
];

/// Writes one row per bucket under [`SERIES_HEADER`], amounts with two decimals.
pub fn write_series_csv<W: Write>(points: &[ProfitChartDataPoint], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(SERIES_HEADER)?;

    for point in points {
        csv_writer.write_record([
            point.label.clone(),
            money(point.revenue),
            money(point.total_costs),
            money(point.profit),
            money(point.variable_costs),
            money(point.fixed_costs),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

pub fn series_to_csv_string(points: &[ProfitChartDataPoint]) -> Result<String> {
    let mut buffer = Vec::new();
    write_series_csv(points, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn money(value: Money) -> String {
    format!("{:.2}", value)
}

/// Everything the printable report shows: summary figures plus the bucket table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDocument {
    pub organization_name: String,
    pub period: ReportPeriod,
    pub generated_at: NaiveDateTime,
    pub tenants: Vec<TenantId>,
    pub summary: AggregateResult,
    pub average_order_value: Money,
    pub profit_margin: f64,
    pub series: Vec<ProfitChartDataPoint>,
}

impl ReportDocument {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn series_csv(&self) -> Result<String> {
        series_to_csv_string(&self.series)
    }
}

impl<'a, S: RecordStore + ?Sized> ReportEngine<'a, S> {
    pub fn report(&self, scope: &TenantScope, period: ReportPeriod, now: NaiveDateTime) -> ReportDocument {
        let summary = self.aggregate(scope, period, now);
        let series = self.profit_series(scope, period, now);

        ReportDocument {
            organization_name: self.config().organization_name.clone(),
            period,
            generated_at: now,
            tenants: scope.iter().cloned().collect(),
            average_order_value: summary.average_order_value(),
            profit_margin: summary.profit_margin(),
            summary,
            series,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Order, RecordSet};
    use chrono::NaiveDate;

    #[test]
    fn test_csv_header_and_rows() {
        let points = vec![
            ProfitChartDataPoint::new("1/3".to_string(), 100.0, 10.0, 5.0),
            ProfitChartDataPoint::new("2/3".to_string(), 0.0, 0.0, 5.0),
        ];

        let csv = series_to_csv_string(&points).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Period,Revenue,TotalCosts,Profit,VariableCosts,FixedCosts");
        assert_eq!(lines[1], "1/3,100.00,15.00,85.00,10.00,5.00");
        assert_eq!(lines[2], "2/3,0.00,5.00,-5.00,0.00,5.00");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_empty_series_is_header_only() {
        let csv = series_to_csv_string(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn test_report_document() {
        let records = RecordSet {
            orders: vec![Order {
                id: "o1".to_string(),
                created_at: Some("2024-03-05T10:00:00".to_string()),
                total_amount: 400.0,
                owner_id: "A".to_string(),
                items: Vec::new(),
            }],
            ..Default::default()
        };
        let now = NaiveDate::from_ymd_opt(2024, 3, 20)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();

        let engine = ReportEngine::with_defaults(&records);
        let doc = engine.report(&TenantScope::single("A"), ReportPeriod::ThisQuarter, now);

        assert_eq!(doc.tenants, vec!["A".to_string()]);
        assert_eq!(doc.series.len(), 3);
        assert_eq!(doc.summary.total_revenue, 400.0);
        assert_eq!(doc.average_order_value, 400.0);
        assert_eq!(doc.profit_margin, 1.0);

        let json = doc.to_json_pretty().unwrap();
        assert!(json.contains("\"totalRevenue\": 400.0"));
        assert!(json.contains("\"period\": \"this_quarter\""));
        assert_eq!(doc.series_csv().unwrap().lines().count(), 4);
    }
}
