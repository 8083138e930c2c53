//! Domain error types
//!
//! This module defines the error hierarchy for fund. Errors never expose
//! third-party driver or HTTP client types; adapters convert them into
//! one of the variants below at their boundary.

use thiserror::Error;

/// Main fund error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum FundError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The configuration document could not be written
    #[error("Failed to write configuration file: {0}")]
    ConfigIo(String),

    /// The configuration document could not be parsed
    ///
    /// Only produced internally; the store recovers by starting empty.
    #[error("Failed to parse configuration file: {0}")]
    ConfigParse(String),

    /// Network/driver failure while opening or using a database session
    #[error("Connection error: {0}")]
    Connectivity(String),

    /// A SQL statement failed on an open session
    #[error("Query error: {0}")]
    Query(String),

    /// Input rejected before any remote call was attempted
    #[error("Validation error: {0}")]
    Validation(String),

    /// Market-data provider errors
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl FundError {
    /// Whether the error was raised before contacting any remote system
    pub fn is_validation(&self) -> bool {
        matches!(self, FundError::Validation(_) | FundError::Configuration(_))
    }
}

/// Market-data provider errors
///
/// Errors that occur when talking to Yahoo Finance or FRED.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Failed to reach the provider
    #[error("Failed to connect to {provider}: {message}")]
    ConnectionFailed { provider: String, message: String },

    /// The provider refused the session handshake
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Non-success HTTP status
    #[error("{provider} returned HTTP {status}: {message}")]
    Status {
        provider: String,
        status: u16,
        message: String,
    },

    /// Payload did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The provider knows nothing about the requested symbol or series
    #[error("No data returned for {0}")]
    NoData(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for FundError {
    fn from(err: std::io::Error) -> Self {
        FundError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for FundError {
    fn from(err: serde_json::Error) -> Self {
        FundError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fund_error_display() {
        let err = FundError::Validation("database name is not configured".to_string());
        assert_eq!(
            err.to_string(),
            "Validation error: database name is not configured"
        );
    }

    #[test]
    fn test_provider_error_conversion() {
        let provider_err = ProviderError::NoData("AAPL".to_string());
        let fund_err: FundError = provider_err.into();
        assert!(matches!(fund_err, FundError::Provider(_)));
        assert_eq!(fund_err.to_string(), "Provider error: No data returned for AAPL");
    }

    #[test]
    fn test_status_error_display() {
        let err = ProviderError::Status {
            provider: "FRED".to_string(),
            status: 400,
            message: "Bad Request".to_string(),
        };
        assert_eq!(err.to_string(), "FRED returned HTTP 400: Bad Request");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let fund_err: FundError = io_err.into();
        assert!(matches!(fund_err, FundError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let fund_err: FundError = json_err.into();
        assert!(matches!(fund_err, FundError::Serialization(_)));
    }

    #[test]
    fn test_is_validation() {
        assert!(FundError::Validation("x".into()).is_validation());
        assert!(FundError::Configuration("x".into()).is_validation());
        assert!(!FundError::Connectivity("x".into()).is_validation());
    }

    #[test]
    fn test_fund_error_implements_std_error() {
        let err = FundError::Connectivity("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
