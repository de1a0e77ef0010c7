use crate::error::{FinancialReportError, Result};
use crate::period::ReportPeriod;
use crate::schema::TenantId;
use chrono::{FixedOffset, Offset, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MAX_COMPARISON_SCOPES: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct ReportingConfig {
    #[serde(default)]
    #[schemars(description = "Name printed on generated reports")]
    pub organization_name: String,

    #[serde(default)]
    #[schemars(description = "Period used when the caller does not pick one")]
    pub default_period: ReportPeriod,

    #[serde(default = "default_max_comparison_scopes")]
    #[schemars(
        description = "How many tenants a comparison view may select at once. Must be at least 1."
    )]
    pub max_comparison_scopes: usize,

    #[serde(default)]
    #[schemars(
        description = "Offset of the business's local calendar from UTC, in minutes. Record dates carrying an offset are converted into it; dates without one are taken as already local."
    )]
    pub utc_offset_minutes: i32,

    #[serde(default)]
    #[schemars(
        description = "Drop buckets with no revenue and no variable costs from chart series. Off by default, which yields a continuous zero-filled series."
    )]
    pub prune_empty_buckets: bool,
}

fn default_max_comparison_scopes() -> usize {
    DEFAULT_MAX_COMPARISON_SCOPES
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            organization_name: String::new(),
            default_period: ReportPeriod::default(),
            max_comparison_scopes: DEFAULT_MAX_COMPARISON_SCOPES,
            utc_offset_minutes: 0,
            prune_empty_buckets: false,
        }
    }
}

impl ReportingConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_comparison_scopes == 0 {
            return Err(FinancialReportError::InvalidConfig(
                "max_comparison_scopes must be at least 1".to_string(),
            ));
        }
        if self.offset().is_none() {
            return Err(FinancialReportError::InvalidConfig(format!(
                "utc_offset_minutes {} is outside -1439..=1439",
                self.utc_offset_minutes
            )));
        }
        Ok(())
    }

    /// The calendar every record date is read in. Falls back to UTC when the
    /// configured offset is out of range.
    pub fn reporting_offset(&self) -> FixedOffset {
        self.offset().unwrap_or_else(|| Utc.fix())
    }

    fn offset(&self) -> Option<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
    }

    /// Rejects a comparison selection larger than the configured cap.
    pub fn check_comparison_selection(&self, scopes: &[TenantId]) -> Result<()> {
        if scopes.len() > self.max_comparison_scopes {
            return Err(FinancialReportError::TooManyScopes {
                requested: scopes.len(),
                max: self.max_comparison_scopes,
            });
        }
        Ok(())
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ReportingConfig)
    }
}
