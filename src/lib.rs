//! # Financial Report Engine
//!
//! Turns dated business records (orders, variable costs, monthly fixed costs)
//! into revenue/cost/profit figures for a reporting window, and into a
//! day- or month-bucketed series for charts and table export.
//!
//! ## Core Concepts
//!
//! - **Report Period**: a named window (`today` .. `all_time`) resolved against an explicit `now`
//! - **Tenant Scope**: one or more `ownerId`s; every aggregate is computed inside a scope
//! - **Proration**: fixed costs are stored monthly and scaled to whatever window is shown
//! - **Buckets**: the continuous day/month sub-intervals a series is charted over
//!
//! Everything is a pure computation over in-memory records. Malformed record
//! dates never fail a report; those records just fall out of bounded windows.
//!
//! ## Example
//!
//! ```rust
//! use financial_report_engine::*;
//! use chrono::NaiveDate;
//!
//! let records = RecordSet {
//!     orders: vec![Order {
//!         id: "o1".to_string(),
//!         created_at: Some("2024-03-01T10:00:00".to_string()),
//!         total_amount: 100_000.0,
//!         owner_id: "store-a".to_string(),
//!         items: vec![],
//!     }],
//!     fixed_costs: vec![FixedCostItem {
//!         id: "rent".to_string(),
//!         name: "Rent".to_string(),
//!         amount: 3_100_000.0,
//!         owner_id: "store-a".to_string(),
//!     }],
//!     ..Default::default()
//! };
//!
//! let now = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap().and_hms_opt(12, 0, 0).unwrap();
//! let engine = ReportEngine::with_defaults(&records);
//! let scope = TenantScope::single("store-a");
//!
//! let totals = engine.aggregate(&scope, ReportPeriod::ThisMonth, now);
//! assert_eq!(totals.total_revenue, 100_000.0);
//! assert_eq!(totals.prorated_fixed_costs, 3_100_000.0);
//!
//! let series = engine.profit_series(&scope, ReportPeriod::ThisMonth, now);
//! assert_eq!(series.len(), 31);
//! ```

pub mod comparison;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod filter;
pub mod period;
pub mod proration;
pub mod schema;
pub mod scope;
pub mod series;
pub mod store;
pub mod utils;

pub use comparison::{StaffKpiAverages, TenantComparison};
pub use config::{ReportingConfig, DEFAULT_MAX_COMPARISON_SCOPES};
pub use engine::{AggregateResult, CategoryCost, ReportEngine, ServiceRevenue};
pub use error::{FinancialReportError, Result};
pub use export::{series_to_csv_string, write_series_csv, ReportDocument, SERIES_HEADER};
pub use filter::{filter_by_period, filter_refs_by_period};
pub use period::{resolve_period, Granularity, PeriodBounds, ReportPeriod, TimeRange};
pub use proration::{prorate_fixed_costs, prorate_for_bucket, ProrationContext};
pub use schema::*;
pub use scope::{Role, RoleScopeResolver, ScopeResolver, TenantScope, UserContext};
pub use series::{bucketize, profit_series, series_range, Bucket, ProfitChartDataPoint};
pub use store::RecordStore;
pub use utils::*;
