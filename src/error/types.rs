// src/error/types.rs
use crate::domain::DomainError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(String),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport-level failure. The message keeps the wording the retry
    /// classifier matches on ("Network request failed").
    #[error("{0}")]
    Network(String),

    #[error("Remote API returned status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Resource not found")]
    NotFound,

    #[error("Other error: {0}")]
    Other(String),
}

impl AppError {
    /// Builds the error every transport failure is reported as.
    pub fn network_request_failed(cause: impl std::fmt::Display) -> Self {
        AppError::Network(format!("Network request failed: {}", cause))
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<r2d2::Error> for AppError {
    fn from(err: r2d2::Error) -> Self {
        AppError::Pool(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::Other(format!("Failed to decode response: {}", err))
        } else {
            AppError::network_request_failed(err)
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error_message() {
        let err = AppError::network_request_failed("connection refused");
        assert_eq!(err.to_string(), "Network request failed: connection refused");
    }

    #[test]
    fn test_serializes_as_display_string() {
        let json = serde_json::to_string(&AppError::NotFound).unwrap();
        assert_eq!(json, "\"Resource not found\"");
    }
}
