//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Human-readable console logs on stderr, keeping stdout for command output
//! - Configurable log levels (`--log-level`, `FUND_LOG_LEVEL` or `RUST_LOG`)
//! - JSON file logging with rotation when `FUND_LOG_DIR` is set
//!
//! # Example
//!
//! ```no_run
//! use fund::logging::init_logging;
//! use fund::config::LoggingConfig;
//!
//! let config = LoggingConfig::from_env();
//! let _guard = init_logging("warn", &config).expect("Failed to initialize logging");
//!
//! // Use tracing macros for logging
//! tracing::info!("Application started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use fund::log_error_with_context;
/// use fund::domain::FundError;
///
/// let error = FundError::Connectivity("connection refused".to_string());
/// log_error_with_context!(&error, "Failed to list tables");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
