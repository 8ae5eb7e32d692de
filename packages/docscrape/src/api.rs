//! Collaborator traits for the external scraping API and the
//! text-cleaning model.
//!
//! The scraping service is consumed as two capabilities: map a site
//! into a list of URLs, and scrape one URL into markdown/HTML. The
//! cleaning model is a single `clean(text) -> text` capability.
//! Neither is reimplemented here; the traits exist so crawl logic can
//! be tested against mocks.

use async_trait::async_trait;

use crate::error::ScrapeResult;

/// A page as returned by the scraping service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedPage {
    /// Final URL of the page, after any redirects the service followed
    pub url: String,

    pub markdown: Option<String>,
    pub html: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl ScrapedPage {
    /// Create a page with no content.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            markdown: None,
            html: None,
            title: None,
            description: None,
        }
    }

    /// Set the markdown content.
    pub fn with_markdown(mut self, markdown: impl Into<String>) -> Self {
        self.markdown = Some(markdown.into());
        self
    }

    /// Set the HTML content.
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether the page carries any usable content.
    pub fn has_content(&self) -> bool {
        self.markdown.as_deref().is_some_and(|m| !m.trim().is_empty())
            || self.html.as_deref().is_some_and(|h| !h.trim().is_empty())
    }
}

/// Parameters for a site-mapping call.
#[derive(Debug, Clone)]
pub struct MapRequest {
    /// Root URL to map from
    pub url: String,

    /// Maximum number of URLs to return
    pub limit: usize,

    /// Maximum traversal depth
    pub max_depth: usize,

    /// Whether subdomains count as part of the site
    pub include_subdomains: bool,

    /// Skip the sitemap and discover by traversal only
    pub ignore_sitemap: bool,
}

impl MapRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            limit: 1000,
            max_depth: 5,
            include_subdomains: false,
            ignore_sitemap: true,
        }
    }

    /// Set the URL limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the traversal depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Parameters for scraping a single URL.
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub url: String,

    /// Also return raw HTML alongside markdown
    pub want_html: bool,

    /// Let the service strip navigation chrome before extraction
    pub only_main_content: bool,

    /// How long the service waits for dynamic content to settle
    pub wait_for_ms: u64,
}

impl ScrapeRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            want_html: false,
            only_main_content: true,
            wait_for_ms: 2000,
        }
    }

    /// Request raw HTML alongside markdown.
    pub fn with_html(mut self, want_html: bool) -> Self {
        self.want_html = want_html;
        self
    }

    /// Set the dynamic-content wait interval.
    pub fn with_wait_for_ms(mut self, wait_for_ms: u64) -> Self {
        self.wait_for_ms = wait_for_ms;
        self
    }
}

/// The external scraping service.
#[async_trait]
pub trait ScrapeApi: Send + Sync {
    /// Enumerate URLs reachable from the request's root.
    async fn map_site(&self, request: &MapRequest) -> ScrapeResult<Vec<String>>;

    /// Scrape one URL into markdown (and optionally HTML).
    async fn scrape(&self, request: &ScrapeRequest) -> ScrapeResult<ScrapedPage>;

    /// Service name for logging.
    fn name(&self) -> &str {
        "unknown"
    }
}

/// The external text-cleaning model.
#[async_trait]
pub trait TextCleaner: Send + Sync {
    /// Strip navigation, ads, and boilerplate from scraped markdown.
    async fn clean(&self, markdown: &str) -> ScrapeResult<String>;

    /// Cleaner name for logging.
    fn name(&self) -> &str {
        "unknown"
    }
}
