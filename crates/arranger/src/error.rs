use thiserror::Error;

pub type Result<T> = std::result::Result<T, ArrangerError>;

#[derive(Debug, Error)]
pub enum ArrangerError {
    #[error("Invalid duration '{0}': expected formats like 4:30, 4m30s, or 4.5")]
    InvalidDuration(String),

    #[error("Unknown section '{name}'. Available: {available}")]
    UnknownSection { name: String, available: String },

    #[error("Unknown output format '{0}'. Must be 'text', 'csv', or 'json'")]
    UnknownFormat(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV output error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),
}
