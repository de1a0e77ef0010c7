use crate::error::{FinancialReportError, Result};
use crate::utils::parse_instant;
use chrono::{FixedOffset, NaiveDateTime};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub type Money = f64;
pub type TenantId = String;

/// Any record carrying the single date field used for period filtering.
pub trait DatedRecord {
    /// The raw date as held by the record store.
    fn raw_date(&self) -> Option<&str>;

    /// The instant on the reporting calendar, or `None` when the date is
    /// missing or malformed.
    fn recorded_at(&self, reporting_offset: FixedOffset) -> Option<NaiveDateTime> {
        self.raw_date()
            .and_then(|raw| parse_instant(raw, reporting_offset))
    }
}

/// Records partitioned by the store (business unit) that owns them.
pub trait TenantOwned {
    fn owner_id(&self) -> &str;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[schemars(description = "Nominal price of one unit")]
    pub unit_price: Money,

    #[serde(default)]
    #[schemars(
        description = "Minimum amount this line bills regardless of unit price times quantity"
    )]
    pub min_price: Option<Money>,

    #[schemars(description = "Number of units, always positive")]
    pub quantity: u32,

    #[schemars(description = "Name of the service sold, used for the revenue breakdown")]
    pub service_name: String,
}

impl OrderItem {
    /// Line revenue under the floor-price rule: at least `min_price`.
    pub fn billed_amount(&self) -> Money {
        let nominal = self.unit_price * self.quantity as f64;
        nominal.max(self.min_price.unwrap_or(0.0))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,

    #[serde(default)]
    #[schemars(description = "Creation timestamp (RFC 3339 or YYYY-MM-DD[ HH:MM:SS])")]
    pub created_at: Option<String>,

    pub total_amount: Money,

    pub owner_id: TenantId,

    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl DatedRecord for Order {
    fn raw_date(&self) -> Option<&str> {
        self.created_at.as_deref()
    }
}

impl TenantOwned for Order {
    fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CostCategory {
    Materials,
    Utilities,
    Marketing,
    Salaries,
    Maintenance,
    Transport,
    #[serde(other)]
    Other,
}

impl Default for CostCategory {
    fn default() -> Self {
        Self::Other
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariableCost {
    pub id: String,

    #[serde(default)]
    #[schemars(description = "Date the cost was incurred")]
    pub date: Option<String>,

    pub amount: Money,

    pub owner_id: TenantId,

    #[serde(default)]
    pub category: CostCategory,
}

impl DatedRecord for VariableCost {
    fn raw_date(&self) -> Option<&str> {
        self.date.as_deref()
    }
}

impl TenantOwned for VariableCost {
    fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

/// A recurring monthly cost. Period figures are always derived from `amount`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FixedCostItem {
    pub id: String,

    pub name: String,

    #[schemars(description = "Monthly amount")]
    pub amount: Money,

    pub owner_id: TenantId,
}

impl TenantOwned for FixedCostItem {
    fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub id: String,

    pub name: String,

    #[schemars(description = "Tenant that employs this staff member")]
    pub owner_id: TenantId,
}

impl TenantOwned for StaffMember {
    fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffKpi {
    pub id: String,

    pub staff_id: String,

    #[serde(default)]
    pub date: Option<String>,

    #[schemars(description = "Share of orders delivered on time, 0..=100")]
    pub on_time_rate: f64,

    #[schemars(description = "Average customer rating")]
    pub rating: f64,

    pub orders_processed: u32,
}

impl DatedRecord for StaffKpi {
    fn raw_date(&self) -> Option<&str> {
        self.date.as_deref()
    }
}

/// Every collection the engine reads, as exported from the record store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordSet {
    #[serde(default)]
    pub orders: Vec<Order>,

    #[serde(default)]
    pub variable_costs: Vec<VariableCost>,

    #[serde(default)]
    pub fixed_costs: Vec<FixedCostItem>,

    #[serde(default)]
    pub staff: Vec<StaffMember>,

    #[serde(default)]
    pub staff_kpis: Vec<StaffKpi>,
}

impl RecordSet {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(RecordSet)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }

    /// Checks amount and quantity invariants. Dates are not checked here:
    /// malformed dates are tolerated and simply drop out of period filters.
    pub fn validate(&self) -> Result<()> {
        for order in &self.orders {
            if !(order.total_amount >= 0.0) {
                return Err(invalid(&order.id, "totalAmount must be >= 0"));
            }
            if let Some(idx) = order.items.iter().position(|i| i.quantity == 0) {
                return Err(invalid(
                    &order.id,
                    &format!("item #{} has quantity 0", idx),
                ));
            }
        }

        for cost in &self.variable_costs {
            if !(cost.amount >= 0.0) {
                return Err(invalid(&cost.id, "amount must be >= 0"));
            }
        }

        for item in &self.fixed_costs {
            if !(item.amount >= 0.0) {
                return Err(invalid(&item.id, "monthly amount must be >= 0"));
            }
        }

        Ok(())
    }
}

fn invalid(record_id: &str, details: &str) -> FinancialReportError {
    FinancialReportError::InvalidRecord {
        record_id: record_id.to_string(),
        details: details.to_string(),
    }
}
