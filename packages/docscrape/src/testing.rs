//! Testing utilities including mock implementations.
//!
//! These are useful for testing crawl logic without making real API
//! or network calls.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::api::{MapRequest, ScrapeApi, ScrapeRequest, ScrapedPage, TextCleaner};
use crate::error::{ScrapeError, ScrapeResult};

/// Record of a call made to [`MockScrapeApi`].
#[derive(Debug, Clone)]
pub enum MockApiCall {
    MapSite { url: String },
    Scrape { url: String },
}

/// A mock scraping service with predefined site maps and pages,
/// per-URL failure injection, and rate-limit injection.
#[derive(Default)]
pub struct MockScrapeApi {
    site_map: Arc<RwLock<Vec<String>>>,
    pages: Arc<RwLock<HashMap<String, ScrapedPage>>>,
    fail_urls: Arc<RwLock<Vec<String>>>,
    /// URL → number of 429 responses still to serve before succeeding
    rate_limits: Arc<RwLock<HashMap<String, u32>>>,
    map_rate_limits: Arc<RwLock<u32>>,
    map_fails: Arc<RwLock<bool>>,
    calls: Arc<RwLock<Vec<MockApiCall>>>,
}

impl MockScrapeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the URLs the mapping call returns.
    pub fn with_site_map<I, S>(self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.site_map.write().unwrap() = urls.into_iter().map(Into::into).collect();
        self
    }

    /// Add a page, keyed by its own URL.
    pub fn with_page(self, page: ScrapedPage) -> Self {
        self.pages.write().unwrap().insert(page.url.clone(), page);
        self
    }

    /// Add a page served for a different requested URL (redirects).
    pub fn with_page_for(self, requested_url: impl Into<String>, page: ScrapedPage) -> Self {
        self.pages.write().unwrap().insert(requested_url.into(), page);
        self
    }

    /// Add multiple pages keyed by their own URLs.
    pub fn with_pages(self, pages: impl IntoIterator<Item = ScrapedPage>) -> Self {
        {
            let mut store = self.pages.write().unwrap();
            for page in pages {
                store.insert(page.url.clone(), page);
            }
        }
        self
    }

    /// Make scrapes of a URL fail with a server error.
    pub fn fail_url(self, url: impl Into<String>) -> Self {
        self.fail_urls.write().unwrap().push(url.into());
        self
    }

    /// Serve `times` 429 responses for a URL before letting it through.
    pub fn rate_limit_url(self, url: impl Into<String>, times: u32) -> Self {
        self.rate_limits.write().unwrap().insert(url.into(), times);
        self
    }

    /// Serve `times` 429 responses for mapping calls.
    pub fn rate_limit_map(self, times: u32) -> Self {
        *self.map_rate_limits.write().unwrap() = times;
        self
    }

    /// Make mapping calls fail with a server error.
    pub fn fail_map(self) -> Self {
        *self.map_fails.write().unwrap() = true;
        self
    }

    /// All calls made to this mock.
    pub fn calls(&self) -> Vec<MockApiCall> {
        self.calls.read().unwrap().clone()
    }

    /// Number of mapping calls made.
    pub fn map_call_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, MockApiCall::MapSite { .. }))
            .count()
    }

    /// Number of scrape calls made for a URL.
    pub fn scrape_call_count(&self, url: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, MockApiCall::Scrape { url: u } if u == url))
            .count()
    }
}

#[async_trait]
impl ScrapeApi for MockScrapeApi {
    async fn map_site(&self, request: &MapRequest) -> ScrapeResult<Vec<String>> {
        self.calls.write().unwrap().push(MockApiCall::MapSite {
            url: request.url.clone(),
        });

        {
            let mut remaining = self.map_rate_limits.write().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ScrapeError::RateLimited);
            }
        }
        if *self.map_fails.read().unwrap() {
            return Err(ScrapeError::Api {
                status: 500,
                message: "mock map failure".to_string(),
            });
        }

        Ok(self
            .site_map
            .read()
            .unwrap()
            .iter()
            .take(request.limit)
            .cloned()
            .collect())
    }

    async fn scrape(&self, request: &ScrapeRequest) -> ScrapeResult<ScrapedPage> {
        self.calls.write().unwrap().push(MockApiCall::Scrape {
            url: request.url.clone(),
        });

        {
            let mut limits = self.rate_limits.write().unwrap();
            if let Some(remaining) = limits.get_mut(&request.url) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(ScrapeError::RateLimited);
                }
            }
        }
        if self.fail_urls.read().unwrap().contains(&request.url) {
            return Err(ScrapeError::Api {
                status: 500,
                message: "mock scrape failure".to_string(),
            });
        }

        self.pages
            .read()
            .unwrap()
            .get(&request.url)
            .cloned()
            .ok_or_else(|| ScrapeError::InvalidUrl {
                url: request.url.clone(),
            })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A mock text cleaner with canned responses and call tracking.
///
/// Returns its input unchanged unless a response is configured.
#[derive(Default)]
pub struct MockCleaner {
    responses: Arc<RwLock<HashMap<String, String>>>,
    fails: Arc<RwLock<bool>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockCleaner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `output` when asked to clean `input`.
    pub fn with_response(self, input: impl Into<String>, output: impl Into<String>) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(input.into(), output.into());
        self
    }

    /// Make all cleaning calls fail.
    pub fn failing(self) -> Self {
        *self.fails.write().unwrap() = true;
        self
    }

    /// Inputs this cleaner was asked to clean.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl TextCleaner for MockCleaner {
    async fn clean(&self, markdown: &str) -> ScrapeResult<String> {
        self.calls.write().unwrap().push(markdown.to_string());

        if *self.fails.read().unwrap() {
            return Err(ScrapeError::Api {
                status: 500,
                message: "mock cleaner failure".to_string(),
            });
        }

        Ok(self
            .responses
            .read()
            .unwrap()
            .get(markdown)
            .cloned()
            .unwrap_or_else(|| markdown.to_string()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
