use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightsError {
    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Invalid CSV format: missing required headers ({})", .missing.join(", "))]
    MalformedInput { missing: Vec<&'static str> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, InsightsError>;
