//! API key handling for keyed providers.

use secrecy::{ExposeSecret, SecretString};

/// An API key for a keyed provider (ipapi.com, abstractapi.com, ipinfo.io).
///
/// The key only leaves its [`SecretString`] when a request URL is built, and
/// never shows up in `Debug` output.
#[derive(Clone)]
pub struct ApiKey {
    key: SecretString,
}

impl ApiKey {
    /// Wrap an API key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: SecretString::from(key.into()),
        }
    }

    /// Read an API key from an environment variable.
    ///
    /// Returns `None` if the variable is unset or empty.
    pub fn from_env(var: &str) -> Option<Self> {
        let key = std::env::var(var).ok()?;
        if key.trim().is_empty() {
            return None;
        }
        Some(Self::new(key.trim()))
    }

    /// Get the raw key for building a request.
    ///
    /// This method exposes the secret - use carefully.
    pub fn expose(&self) -> &str {
        self.key.expose_secret()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ApiKey").field(&"[REDACTED]").finish()
    }
}

impl From<&str> for ApiKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ApiKey {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_debug_redacted() {
        let key = ApiKey::new("super_secret");
        let debug_str = format!("{:?}", key);
        assert!(!debug_str.contains("super_secret"));
        assert!(debug_str.contains("[REDACTED]"));
        assert_eq!(key.expose(), "super_secret");
    }

    #[test]
    fn test_api_key_from_missing_env() {
        assert!(ApiKey::from_env("COOL_IP_API_SURELY_UNSET_VARIABLE").is_none());
    }
}
