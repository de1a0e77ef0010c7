use crate::engine::{AggregateResult, ReportEngine};
use crate::filter::filter_refs_by_period;
use crate::period::{resolve_period, ReportPeriod};
use crate::schema::{StaffKpi, TenantId};
use crate::scope::TenantScope;
use crate::store::RecordStore;
use chrono::NaiveDateTime;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Mean staff performance over a period; all zero when nothing was recorded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffKpiAverages {
    pub on_time_rate: f64,
    pub rating: f64,
    pub orders_processed: f64,
    pub sample_count: usize,
}

impl StaffKpiAverages {
    pub fn from_records(records: &[&StaffKpi]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let n = records.len() as f64;
        Self {
            on_time_rate: records.iter().map(|k| k.on_time_rate).sum::<f64>() / n,
            rating: records.iter().map(|k| k.rating).sum::<f64>() / n,
            orders_processed: records.iter().map(|k| k.orders_processed as f64).sum::<f64>() / n,
            sample_count: records.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantComparison {
    pub tenant_id: TenantId,
    pub aggregate: AggregateResult,
    pub staff: StaffKpiAverages,
}

impl<'a, S: RecordStore + ?Sized> ReportEngine<'a, S> {
    /// Aggregates each tenant on its own, in the order given.
    ///
    /// No cap is applied here; callers that need one check their selection
    /// with [`crate::ReportingConfig::check_comparison_selection`] first.
    pub fn compare(
        &self,
        tenants: &[TenantId],
        period: ReportPeriod,
        now: NaiveDateTime,
    ) -> Vec<TenantComparison> {
        if tenants.is_empty() {
            return Vec::new();
        }
        info!("Comparing {} tenant(s) over {}", tenants.len(), period);

        tenants
            .iter()
            .map(|tenant| TenantComparison {
                tenant_id: tenant.clone(),
                aggregate: self.aggregate(&TenantScope::single(tenant.as_str()), period, now),
                staff: self.staff_kpi_averages(tenant, period, now),
            })
            .collect()
    }

    /// Averages the KPI records of the tenant's staff roster within `period`.
    pub fn staff_kpi_averages(
        &self,
        tenant: &str,
        period: ReportPeriod,
        now: NaiveDateTime,
    ) -> StaffKpiAverages {
        let scope = TenantScope::single(tenant);
        let roster: HashSet<&str> = self
            .store()
            .staff()
            .iter()
            .filter(|member| scope.owns(*member))
            .map(|member| member.id.as_str())
            .collect();

        let kpis = self
            .store()
            .staff_kpis()
            .iter()
            .filter(|kpi| roster.contains(kpi.staff_id.as_str()));
        let in_period = filter_refs_by_period(
            kpis,
            &resolve_period(period, now),
            self.config().reporting_offset(),
        );

        StaffKpiAverages::from_records(&in_period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FixedCostItem, Order, RecordSet, StaffMember};
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 20)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn order(owner: &str, date: &str, amount: f64) -> Order {
        Order {
            id: format!("{}-{}", owner, date),
            created_at: Some(date.to_string()),
            total_amount: amount,
            owner_id: owner.to_string(),
            items: Vec::new(),
        }
    }

    fn kpi(id: &str, staff_id: &str, date: &str, on_time: f64, rating: f64, processed: u32) -> StaffKpi {
        StaffKpi {
            id: id.to_string(),
            staff_id: staff_id.to_string(),
            date: Some(date.to_string()),
            on_time_rate: on_time,
            rating,
            orders_processed: processed,
        }
    }

    fn member(id: &str, owner: &str) -> StaffMember {
        StaffMember {
            id: id.to_string(),
            name: id.to_uppercase(),
            owner_id: owner.to_string(),
        }
    }

    fn records() -> RecordSet {
        RecordSet {
            orders: vec![
                order("A", "2024-03-01", 100.0),
                order("A", "2024-03-02", 50.0),
                order("B", "2024-03-03", 70.0),
            ],
            fixed_costs: vec![FixedCostItem {
                id: "rent".to_string(),
                name: "Rent".to_string(),
                amount: 40.0,
                owner_id: "B".to_string(),
            }],
            staff: vec![member("s1", "A"), member("s2", "A"), member("s3", "B")],
            staff_kpis: vec![
                kpi("k1", "s1", "2024-03-05", 90.0, 4.0, 10),
                kpi("k2", "s2", "2024-03-06", 70.0, 5.0, 20),
                kpi("k3", "s1", "2024-01-05", 10.0, 1.0, 1),
                kpi("k4", "s3", "2024-03-07", 100.0, 4.5, 8),
                kpi("k5", "ghost", "2024-03-07", 0.0, 0.0, 0),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_selection_returns_nothing() {
        let records = records();
        let engine = ReportEngine::with_defaults(&records);
        assert!(engine.compare(&[], ReportPeriod::ThisMonth, now()).is_empty());
    }

    #[test]
    fn test_tenants_are_isolated() {
        let records = records();
        let engine = ReportEngine::with_defaults(&records);
        let tenants = vec!["A".to_string(), "B".to_string()];

        let results = engine.compare(&tenants, ReportPeriod::ThisMonth, now());
        assert_eq!(results.len(), 2);

        assert_eq!(results[0].tenant_id, "A");
        assert_eq!(results[0].aggregate.total_revenue, 150.0);
        assert_eq!(results[0].aggregate.prorated_fixed_costs, 0.0);

        assert_eq!(results[1].tenant_id, "B");
        assert_eq!(results[1].aggregate.total_revenue, 70.0);
        assert_eq!(results[1].aggregate.profit, 30.0);

        let single = engine.aggregate(&TenantScope::single("A"), ReportPeriod::ThisMonth, now());
        assert_eq!(results[0].aggregate, single);
    }

    #[test]
    fn test_staff_averages_follow_roster_and_period() {
        let records = records();
        let engine = ReportEngine::with_defaults(&records);

        let a = engine.staff_kpi_averages("A", ReportPeriod::ThisMonth, now());
        assert_eq!(a.sample_count, 2);
        assert_eq!(a.on_time_rate, 80.0);
        assert_eq!(a.rating, 4.5);
        assert_eq!(a.orders_processed, 15.0);

        let a_all = engine.staff_kpi_averages("A", ReportPeriod::AllTime, now());
        assert_eq!(a_all.sample_count, 3);
    }

    #[test]
    fn test_tenant_without_staff_gets_zero_averages() {
        let records = records();
        let engine = ReportEngine::with_defaults(&records);
        let tenants = vec!["C".to_string()];

        let results = engine.compare(&tenants, ReportPeriod::ThisMonth, now());
        assert_eq!(results[0].staff, StaffKpiAverages::default());
        assert_eq!(results[0].aggregate, AggregateResult::default());
    }
}
