/// Error types for the weather explorer core
use thiserror::Error;

/// Main error type for query construction and API calls
#[derive(Error, Debug)]
pub enum WeatherError {
    /// The request never produced a response (connection refused, DNS, TLS...)
    #[cfg(feature = "api")]
    #[error("Failed to reach weather service: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("{operation} failed: {status_text}")]
    Status {
        operation: &'static str,
        status: u16,
        status_text: String,
    },

    /// Response body was not the expected JSON shape
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Response decoded but breaks a data-model invariant
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Request rejected before submission
    #[error("{0}")]
    Validation(String),

    /// Variable id outside the supported set
    #[error("Unknown weather variable: {0}")]
    UnknownVariable(String),

    /// Export/download format other than csv or json
    #[error("Unknown export format: {0}")]
    UnknownFormat(String),

    /// Threshold key not in the supported set
    #[error("Unknown threshold: {0}")]
    UnknownThreshold(String),
}

/// Type alias for Results using WeatherError
pub type Result<T> = std::result::Result<T, WeatherError>;
