//! Result type alias for fund
//!
//! Every database-facing and provider-facing operation reports its outcome
//! through this alias: `Ok` carries the payload, `Err` carries a
//! [`FundError`] whose `Display` is the user-facing failure text.

use super::errors::FundError;

/// Result type alias for fund operations
///
/// # Examples
///
/// ```
/// use fund::domain::result::Result;
/// use fund::domain::errors::FundError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(FundError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, FundError>;
