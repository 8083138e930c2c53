//! CLI command implementations
//!
//! This module contains all CLI command implementations plus the helpers
//! they share: exit code mapping and the `y/n` confirmation prompt.

pub mod add;
pub mod db;
pub mod fred;

use crate::domain::FundError;
use std::io::{self, BufRead, Write};

/// Exit code for a successful run
pub const EXIT_OK: i32 = 0;

/// Exit code for configuration and validation failures
pub const EXIT_CONFIG: i32 = 2;

/// Exit code for database and provider failures
pub const EXIT_CONNECTION: i32 = 4;

/// Exit code for anything else
pub const EXIT_FATAL: i32 = 5;

/// Maps an error to the process exit code
pub fn exit_code(error: &FundError) -> i32 {
    match error {
        FundError::Validation(_)
        | FundError::Configuration(_)
        | FundError::ConfigIo(_)
        | FundError::ConfigParse(_) => EXIT_CONFIG,
        FundError::Connectivity(_) | FundError::Query(_) | FundError::Provider(_) => {
            EXIT_CONNECTION
        }
        FundError::Serialization(_) | FundError::Io(_) | FundError::Other(_) => EXIT_FATAL,
    }
}

/// Keeps the first non-zero exit code seen
pub(crate) fn merge_exit_code(current: i32, next: i32) -> i32 {
    if current == EXIT_OK {
        next
    } else {
        current
    }
}

/// Asks `prompt` on stdout and reads the answer from stdin
///
/// Only `y` or `Y` confirms.
pub fn confirm(prompt: &str) -> io::Result<bool> {
    let stdin = io::stdin();
    confirm_with(&mut stdin.lock(), &mut io::stdout(), prompt)
}

pub(crate) fn confirm_with<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> io::Result<bool> {
    write!(output, "{prompt} (y/n): ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProviderError;
    use std::io::Cursor;

    #[test]
    fn test_exit_code_mapping() {
        assert_eq!(exit_code(&FundError::Validation("x".into())), EXIT_CONFIG);
        assert_eq!(exit_code(&FundError::ConfigIo("x".into())), EXIT_CONFIG);
        assert_eq!(exit_code(&FundError::Connectivity("x".into())), EXIT_CONNECTION);
        assert_eq!(
            exit_code(&ProviderError::NoData("AAPL".into()).into()),
            EXIT_CONNECTION
        );
        assert_eq!(exit_code(&FundError::Other("x".into())), EXIT_FATAL);
    }

    #[test]
    fn test_merge_exit_code_keeps_first_failure() {
        assert_eq!(merge_exit_code(EXIT_OK, EXIT_OK), EXIT_OK);
        assert_eq!(merge_exit_code(EXIT_OK, EXIT_CONNECTION), EXIT_CONNECTION);
        assert_eq!(merge_exit_code(EXIT_CONFIG, EXIT_CONNECTION), EXIT_CONFIG);
    }

    #[test]
    fn test_confirm_with_answers() {
        let mut out = Vec::new();
        assert!(confirm_with(&mut Cursor::new("y\n"), &mut out, "Clear?").unwrap());
        assert!(confirm_with(&mut Cursor::new(" Y \n"), &mut out, "Clear?").unwrap());
        assert!(!confirm_with(&mut Cursor::new("yes\n"), &mut out, "Clear?").unwrap());
        assert!(!confirm_with(&mut Cursor::new(""), &mut out, "Clear?").unwrap());
        assert!(String::from_utf8(out).unwrap().starts_with("Clear? (y/n): "));
    }
}
