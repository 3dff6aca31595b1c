use std::fmt;

use http::HeaderValue;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::MtdError;

/// Secure wrapper for sensitive string data that automatically zeroes memory on drop.
///
/// Used for the OAuth client secret and the tokens themselves. `Debug` is
/// redacted and `Display` only shows a masked hint, so values are safe to log.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureString(String);

impl SecureString {
    /// Creates a new secure string from the provided value.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Returns a reference to the inner string value.
    ///
    /// # Security Note
    /// The returned reference should not be stored for extended periods
    /// to minimize exposure time of sensitive data.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` when the wrapped value is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Checks if the secure string equals the given string slice.
    pub fn equals_str(&self, other: &str) -> bool {
        self.0 == other
    }

    /// Builds an `Authorization: Bearer <token>` header value from this secret.
    ///
    /// The header value is marked sensitive so `http` never prints it.
    pub(crate) fn to_bearer_header(&self) -> Result<HeaderValue, MtdError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.0)).map_err(|err| {
            MtdError::InvalidBearerToken {
                message: err.to_string(),
            }
        })?;
        value.set_sensitive(true);
        Ok(value)
    }

    fn mask_sensitive(value: &str) -> String {
        let count = value.chars().count();
        if count <= 8 {
            return "***".to_string();
        }
        let head: String = value.chars().take(4).collect();
        let tail: String = value.chars().skip(count - 4).collect();
        format!("{head}...{tail}")
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureString")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Self::mask_sensitive(&self.0))
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_redact_debug_output() {
        let secret = SecureString::from("client-secret-value");
        let debug = format!("{secret:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("client-secret-value"));
    }

    #[test]
    fn should_mask_display_output() {
        assert_eq!(SecureString::from("short").to_string(), "***");
        assert_eq!(
            SecureString::from("abcdefghijklmnop").to_string(),
            "abcd...mnop"
        );
    }

    #[test]
    fn should_mask_multibyte_values_without_panicking() {
        assert_eq!(SecureString::from("ééééééééééé").to_string(), "éééé...éééé");
    }

    #[test]
    fn should_build_sensitive_bearer_header() {
        let header = SecureString::from("token-123")
            .to_bearer_header()
            .expect("valid header");
        assert_eq!(header, "Bearer token-123");
        assert!(header.is_sensitive());
    }

    #[test]
    fn should_reject_bearer_with_newline() {
        let result = SecureString::from("bad\ntoken").to_bearer_header();
        assert!(matches!(result, Err(MtdError::InvalidBearerToken { .. })));
    }
}
