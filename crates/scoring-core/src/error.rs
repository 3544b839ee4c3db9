use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The data provider returned nothing usable for the symbol. Callers
    /// must report this as its own condition and never treat it as a low
    /// score.
    #[error("Data unavailable for {0}")]
    DataUnavailable(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
