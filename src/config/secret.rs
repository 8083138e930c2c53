//! Secure credential handling using the secrecy crate
//!
//! The database password and the FRED API key are held as [`SecretString`]:
//! memory is zeroed on drop, `Debug` output is redacted, and the clear text
//! is only reachable through `expose_secret()`. The display helpers at the
//! bottom of this module are the only way secrets reach the terminal.

use secrecy::{CloneableSecret, DebugSecret, ExposeSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// Token shown for any setting that has no value
pub const NOT_CONFIGURED: &str = "Not configured";

/// Token shown in place of a password, or of an API key too short to partially reveal
pub const SECRET_MASK: &str = "***";

/// Number of characters revealed at each end of a masked API key
const REVEALED_CHARS: usize = 4;

/// Newtype wrapper for String that implements the required traits for Secret
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    /// Borrow the clear text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if the secret value is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// Type alias for a secret string
pub type SecretString = Secret<SecretValue>;

/// Helper function to create a SecretString from a String
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

/// Helper function to create an optional SecretString from an optional String
#[inline]
pub fn secret_string_opt(value: Option<String>) -> Option<SecretString> {
    value.map(secret_string)
}

/// Display form of a password: the fixed mask when set, [`NOT_CONFIGURED`] otherwise
pub fn mask_password(password: Option<&SecretString>) -> String {
    match password {
        Some(p) if !p.expose_secret().is_empty() => SECRET_MASK.to_string(),
        _ => NOT_CONFIGURED.to_string(),
    }
}

/// Display form of an API key
///
/// Keys longer than eight characters show their first and last four
/// characters (`abcd...efgh`); shorter keys collapse to [`SECRET_MASK`].
pub fn mask_api_key(key: Option<&SecretString>) -> String {
    let Some(key) = key else {
        return NOT_CONFIGURED.to_string();
    };

    let value = key.expose_secret();
    let len = value.char_len();
    if len > REVEALED_CHARS * 2 {
        let head: String = value.as_str().chars().take(REVEALED_CHARS).collect();
        let tail: String = value
            .as_str()
            .chars()
            .skip(len - REVEALED_CHARS)
            .collect();
        format!("{head}...{tail}")
    } else {
        SECRET_MASK.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_secret_string_creation() {
        let secret = secret_string("test-password".to_string());
        assert_eq!(secret.expose_secret(), "test-password");
    }

    #[test]
    fn test_secret_string_opt_none() {
        assert!(secret_string_opt(None).is_none());
        assert!(secret_string_opt(Some("x".to_string())).is_some());
    }

    #[test]
    fn test_secret_debug_redacted() {
        let secret = secret_string("sensitive-data".to_string());
        let debug_output = format!("{secret:?}");

        assert!(!debug_output.contains("sensitive-data"));
        assert!(debug_output.contains("REDACTED") || debug_output.contains("Secret"));
    }

    #[test]
    fn test_secret_serde_round_trip() {
        #[derive(Serialize, Deserialize)]
        struct Doc {
            fred_api_key: SecretString,
        }

        let json = serde_json::to_string(&Doc {
            fred_api_key: secret_string("k3y".to_string()),
        })
        .unwrap();
        assert_eq!(json, r#"{"fred_api_key":"k3y"}"#);

        let doc: Doc = serde_json::from_str(&json).unwrap();
        assert_eq!(doc.fred_api_key.expose_secret(), "k3y");
    }

    #[test_case("abcd1234efgh", "abcd...efgh" ; "twelve characters")]
    #[test_case("123456789", "1234...6789" ; "nine characters")]
    #[test_case("12345678", "***" ; "exactly eight characters")]
    #[test_case("ab", "***" ; "two characters")]
    #[test_case("金融資料金鑰測試值", "金融資料...鑰測試值" ; "multibyte characters")]
    fn test_mask_api_key(key: &str, expected: &str) {
        let secret = secret_string(key.to_string());
        assert_eq!(mask_api_key(Some(&secret)), expected);
    }

    #[test]
    fn test_mask_api_key_absent() {
        assert_eq!(mask_api_key(None), NOT_CONFIGURED);
    }

    #[test]
    fn test_mask_password() {
        let secret = secret_string("hunter2".to_string());
        assert_eq!(mask_password(Some(&secret)), SECRET_MASK);
        assert_eq!(mask_password(None), NOT_CONFIGURED);
    }
}
