//! Credential handling with secure memory.
//!
//! Uses the `secrecy` crate to prevent accidental logging of API keys.

use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

use crate::error::{ScrapeError, ScrapeResult};

/// Environment variable holding the scraping API key.
pub const SCRAPE_API_KEY_VAR: &str = "FIRECRAWL_API_KEY";

/// Environment variable holding the text-cleaning model key.
pub const CLEANER_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// A secret string that won't be logged or displayed.
///
/// Uses `secrecy::SecretBox` to ensure API keys are never accidentally
/// exposed in logs, debug output, or error messages.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    /// Create a new secret string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Expose the secret value for use.
    ///
    /// Only call this when actually using the secret (e.g., in an API request).
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_string())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Credentials for the external services a crawl talks to.
///
/// The scraping key is always required. The cleaner key is only
/// required when markdown cleaning is enabled for the crawl.
#[derive(Clone)]
pub struct Credentials {
    /// API key for the scraping service
    pub scrape_api_key: SecretString,

    /// API key for the text-cleaning model, if available
    pub cleaner_api_key: Option<SecretString>,
}

impl Credentials {
    /// Load credentials from the process environment.
    ///
    /// Fails before any network activity when the scraping key is
    /// missing, or when `require_cleaner` is set and the cleaner key
    /// is missing.
    pub fn from_env(require_cleaner: bool) -> ScrapeResult<Self> {
        let scrape_api_key = std::env::var(SCRAPE_API_KEY_VAR)
            .map_err(|_| ScrapeError::Config(format!("{SCRAPE_API_KEY_VAR} is not set")))?;

        let cleaner_api_key = std::env::var(CLEANER_API_KEY_VAR).ok();
        if require_cleaner && cleaner_api_key.is_none() {
            return Err(ScrapeError::Config(format!(
                "{CLEANER_API_KEY_VAR} is not set (required when cleaning is enabled)"
            )));
        }

        Ok(Self {
            scrape_api_key: SecretString::new(scrape_api_key),
            cleaner_api_key: cleaner_api_key.map(SecretString::new),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("scrape_api_key", &"[REDACTED]")
            .field(
                "cleaner_api_key",
                &self.cleaner_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}
