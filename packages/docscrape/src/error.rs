//! Typed errors for the docscrape library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. `ScrapeError` covers the
//! external APIs; `CrawlError` covers whole-crawl failures.

use thiserror::Error;

/// Errors from the external scraping and cleaning APIs.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Missing or invalid configuration (credentials, URLs)
    #[error("config error: {0}")]
    Config(String),

    /// HTTP transport failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// API returned an error status other than rate limiting
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// API signalled that the caller must slow down (HTTP 429)
    #[error("rate limited")]
    RateLimited,

    /// Rate-limit retries were exhausted
    #[error("rate limit retries exhausted after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    /// URL could not be parsed or has no host
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// API returned a success envelope with no usable payload
    #[error("empty response from API")]
    EmptyResponse,

    /// JSON serialization or parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that fail an entire crawl.
///
/// Per-page fetch failures are not errors at this level; they become
/// failed manifest entries and the crawl continues.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// An API call failed in a context where the crawl cannot continue
    #[error("scrape failed: {0}")]
    Scrape(#[from] ScrapeError),

    /// Site mapping failed after retries; there is no partial site map
    #[error("site map failed: {0}")]
    SiteMapFailed(#[source] Box<ScrapeError>),

    /// Output directory or file could not be written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Root URL could not be parsed
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
}

/// Result type alias for API operations.
pub type ScrapeResult<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for crawl operations.
pub type Result<T> = std::result::Result<T, CrawlError>;
