use crate::config::ReportingConfig;
use crate::filter::filter_refs_by_period;
use crate::period::{resolve_period, ReportPeriod};
use crate::proration::{prorate_fixed_costs, ProrationContext};
use crate::schema::{CostCategory, DatedRecord, Money, Order, TenantOwned, VariableCost};
use crate::scope::{ScopeResolver, TenantScope, UserContext};
use crate::series::{bucketize, profit_series, series_range, ProfitChartDataPoint};
use crate::store::RecordStore;
use chrono::{Local, NaiveDateTime};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRevenue {
    pub name: String,
    pub revenue: Money,
    /// Units sold across all line items for this service.
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCost {
    pub category: CostCategory,
    pub amount: Money,
}

/// Top-line figures for one scope and period.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    pub total_revenue: Money,
    pub order_count: usize,
    pub total_variable_costs: Money,
    pub prorated_fixed_costs: Money,
    pub total_costs: Money,
    pub profit: Money,
    pub revenue_by_service: Vec<ServiceRevenue>,
    pub variable_costs_by_category: Vec<CategoryCost>,
}

impl AggregateResult {
    pub fn average_order_value(&self) -> Money {
        if self.order_count == 0 {
            0.0
        } else {
            self.total_revenue / self.order_count as f64
        }
    }

    /// Profit as a fraction of revenue; zero when there is no revenue.
    pub fn profit_margin(&self) -> f64 {
        if self.total_revenue == 0.0 {
            0.0
        } else {
            self.profit / self.total_revenue
        }
    }
}

/// Orders and variable costs of one scope, already narrowed to a period.
struct ScopedActivity<'a> {
    orders: Vec<&'a Order>,
    variable_costs: Vec<&'a VariableCost>,
}

/// Computes period totals and chart series over a record store.
///
/// Every call takes the reference instant explicitly; nothing here reads the
/// clock except the `*_now` conveniences.
pub struct ReportEngine<'a, S: RecordStore + ?Sized> {
    store: &'a S,
    config: ReportingConfig,
}

impl<'a, S: RecordStore + ?Sized> ReportEngine<'a, S> {
    pub fn new(store: &'a S, config: ReportingConfig) -> Self {
        Self { store, config }
    }

    pub fn with_defaults(store: &'a S) -> Self {
        Self::new(store, ReportingConfig::default())
    }

    pub fn config(&self) -> &ReportingConfig {
        &self.config
    }

    pub(crate) fn store(&self) -> &'a S {
        self.store
    }

    pub fn aggregate(
        &self,
        scope: &TenantScope,
        period: ReportPeriod,
        now: NaiveDateTime,
    ) -> AggregateResult {
        info!("Aggregating {} for tenants {}", period, scope);

        let activity = self.scoped_activity(scope, period, now);

        let total_revenue: Money = activity.orders.iter().map(|o| o.total_amount).sum();
        let total_variable_costs: Money =
            activity.variable_costs.iter().map(|c| c.amount).sum();

        let monthly_fixed = self.monthly_fixed_total(scope);
        let ctx = ProrationContext::new(now).with_earliest_record(self.earliest_record(scope));
        let prorated_fixed_costs = prorate_fixed_costs(period, monthly_fixed, &ctx);
        debug!(
            "Prorated monthly fixed costs {:.2} to {:.2} for {}",
            monthly_fixed, prorated_fixed_costs, period
        );

        let total_costs = total_variable_costs + prorated_fixed_costs;

        AggregateResult {
            total_revenue,
            order_count: activity.orders.len(),
            total_variable_costs,
            prorated_fixed_costs,
            total_costs,
            profit: total_revenue - total_costs,
            revenue_by_service: revenue_by_service(&activity.orders),
            variable_costs_by_category: costs_by_category(&activity.variable_costs),
        }
    }

    pub fn aggregate_now(&self, scope: &TenantScope, period: ReportPeriod) -> AggregateResult {
        self.aggregate(scope, period, Local::now().naive_local())
    }

    /// [`Self::aggregate`] for a signed-in user. Without an explicit scope the
    /// user's default scope from `resolver` is used; without a period, the
    /// configured `default_period`.
    pub fn aggregate_for<R: ScopeResolver + ?Sized>(
        &self,
        user: &UserContext,
        resolver: &R,
        scope: Option<&TenantScope>,
        period: Option<ReportPeriod>,
        now: NaiveDateTime,
    ) -> AggregateResult {
        let (scope, period) = self.request_defaults(user, resolver, scope, period);
        self.aggregate(&scope, period, now)
    }

    /// Day or month series for `period`, one point per bucket.
    pub fn profit_series(
        &self,
        scope: &TenantScope,
        period: ReportPeriod,
        now: NaiveDateTime,
    ) -> Vec<ProfitChartDataPoint> {
        let range = series_range(period, now, self.earliest_record(scope));
        let buckets = bucketize(&range, period.granularity());
        debug!(
            "Series for {} spans {} .. {} in {} bucket(s)",
            period,
            range.start,
            range.end,
            buckets.len()
        );

        let activity = self.scoped_activity(scope, period, now);
        let points = profit_series(
            &buckets,
            &activity.orders,
            &activity.variable_costs,
            self.monthly_fixed_total(scope),
            self.config.reporting_offset(),
        );

        if self.config.prune_empty_buckets {
            points.into_iter().filter(|p| p.has_activity()).collect()
        } else {
            points
        }
    }

    /// [`Self::profit_series`] with the same fallbacks as [`Self::aggregate_for`].
    pub fn profit_series_for<R: ScopeResolver + ?Sized>(
        &self,
        user: &UserContext,
        resolver: &R,
        scope: Option<&TenantScope>,
        period: Option<ReportPeriod>,
        now: NaiveDateTime,
    ) -> Vec<ProfitChartDataPoint> {
        let (scope, period) = self.request_defaults(user, resolver, scope, period);
        self.profit_series(&scope, period, now)
    }

    pub fn profit_series_now(
        &self,
        scope: &TenantScope,
        period: ReportPeriod,
    ) -> Vec<ProfitChartDataPoint> {
        self.profit_series(scope, period, Local::now().naive_local())
    }

    /// Sum of the monthly amounts of every fixed-cost item in scope.
    pub fn monthly_fixed_total(&self, scope: &TenantScope) -> Money {
        self.store
            .fixed_costs()
            .iter()
            .filter(|item| scope.owns(*item))
            .map(|item| item.amount)
            .sum()
    }

    /// Earliest parsable date among the scope's orders and variable costs.
    pub fn earliest_record(&self, scope: &TenantScope) -> Option<NaiveDateTime> {
        let offset = self.config.reporting_offset();
        let order_dates = in_scope(self.store.orders(), scope)
            .into_iter()
            .filter_map(|o| o.recorded_at(offset));
        let cost_dates = in_scope(self.store.variable_costs(), scope)
            .into_iter()
            .filter_map(|c| c.recorded_at(offset));
        order_dates.chain(cost_dates).min()
    }

    fn request_defaults<R: ScopeResolver + ?Sized>(
        &self,
        user: &UserContext,
        resolver: &R,
        scope: Option<&TenantScope>,
        period: Option<ReportPeriod>,
    ) -> (TenantScope, ReportPeriod) {
        let scope = match scope {
            Some(scope) => scope.clone(),
            None => {
                let resolved = resolver.resolve_scope(user);
                debug!("No scope selected, {} defaults to {}", user.user_id, resolved);
                resolved
            }
        };
        (scope, period.unwrap_or(self.config.default_period))
    }

    fn scoped_activity(
        &self,
        scope: &TenantScope,
        period: ReportPeriod,
        now: NaiveDateTime,
    ) -> ScopedActivity<'a> {
        let bounds = resolve_period(period, now);
        if let Some(range) = bounds.range() {
            debug!("Resolved {} to {} .. {}", period, range.start, range.end);
        }

        let offset = self.config.reporting_offset();
        let store: &'a S = self.store;
        ScopedActivity {
            orders: filter_refs_by_period(in_scope(store.orders(), scope), &bounds, offset),
            variable_costs: filter_refs_by_period(
                in_scope(store.variable_costs(), scope),
                &bounds,
                offset,
            ),
        }
    }
}

pub(crate) fn in_scope<'r, R: TenantOwned>(records: &'r [R], scope: &TenantScope) -> Vec<&'r R> {
    records.iter().filter(|r| scope.owns(*r)).collect()
}

/// Groups line items by service, billing each at least its minimum price,
/// highest revenue first.
fn revenue_by_service(orders: &[&Order]) -> Vec<ServiceRevenue> {
    let mut grouped: BTreeMap<&str, (Money, u64)> = BTreeMap::new();
    for item in orders.iter().flat_map(|o| o.items.iter()) {
        let entry = grouped.entry(item.service_name.as_str()).or_default();
        entry.0 += item.billed_amount();
        entry.1 += u64::from(item.quantity);
    }

    let mut services: Vec<ServiceRevenue> = grouped
        .into_iter()
        .map(|(name, (revenue, count))| ServiceRevenue {
            name: name.to_string(),
            revenue,
            count,
        })
        .collect();
    services.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    services
}

fn costs_by_category(costs: &[&VariableCost]) -> Vec<CategoryCost> {
    let mut grouped: BTreeMap<CostCategory, Money> = BTreeMap::new();
    for cost in costs {
        *grouped.entry(cost.category).or_default() += cost.amount;
    }

    let mut categories: Vec<CategoryCost> = grouped
        .into_iter()
        .map(|(category, amount)| CategoryCost { category, amount })
        .collect();
    categories.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    categories
}
