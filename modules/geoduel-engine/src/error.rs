use thiserror::Error;

use countries_client::CountriesError;

/// Failures that stop a game from starting. Surfaced to the player as a reload prompt.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Data source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Not enough countries with valid data: found {found}, need at least 2")]
    InsufficientData { found: usize },
}

impl From<CountriesError> for DataError {
    fn from(err: CountriesError) -> Self {
        DataError::SourceUnavailable(err.to_string())
    }
}

/// Key-value store failures. Never reach the player; callers log and fall back.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to read score store: {0}")]
    Read(String),

    #[error("Failed to write score store: {0}")]
    Write(String),
}
