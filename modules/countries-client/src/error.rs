use thiserror::Error;

pub type Result<T> = std::result::Result<T, CountriesError>;

#[derive(Debug, Error)]
pub enum CountriesError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unexpected response shape: {0}")]
    Shape(String),
}

impl From<reqwest::Error> for CountriesError {
    fn from(err: reqwest::Error) -> Self {
        CountriesError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for CountriesError {
    fn from(err: serde_json::Error) -> Self {
        CountriesError::Parse(err.to_string())
    }
}
