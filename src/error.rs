use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinancialReportError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid record {record_id}: {details}")]
    InvalidRecord { record_id: String, details: String },

    #[error("Too many tenants selected for comparison: {requested} (maximum {max})")]
    TooManyScopes { requested: usize, max: usize },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV export error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FinancialReportError>;
