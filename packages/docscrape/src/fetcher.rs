//! Fetching single pages through the scraping API.

use chrono::Utc;
use url::Url;

use crate::api::{ScrapeApi, ScrapeRequest, TextCleaner};
use crate::retry::{retry_rate_limited, RetryPolicy};
use crate::types::{CrawlJob, PageResult};

/// Default wait for dynamic content to settle before extraction.
const DEFAULT_WAIT_FOR_MS: u64 = 2000;

/// Fetches one page at a time through the scraping API, with backoff
/// on rate limits and optional markdown cleaning.
///
/// `fetch` never fails at the type level: errors become a
/// [`PageResult`] marked failed with the source URL preserved, so the
/// crawl can continue and the manifest stays complete.
pub struct PageFetcher<'a, A: ScrapeApi + ?Sized, C: TextCleaner + ?Sized> {
    api: &'a A,
    cleaner: &'a C,
    policy: RetryPolicy,
    root_host: String,
    keep_html: bool,
    clean: bool,
    wait_for_ms: u64,
}

impl<'a, A: ScrapeApi + ?Sized, C: TextCleaner + ?Sized> PageFetcher<'a, A, C> {
    pub fn new(api: &'a A, cleaner: &'a C, job: &CrawlJob) -> Self {
        Self {
            api,
            cleaner,
            policy: RetryPolicy::default(),
            root_host: job.root_host().to_string(),
            keep_html: job.keep_html,
            clean: job.clean,
            wait_for_ms: DEFAULT_WAIT_FOR_MS,
        }
    }

    /// Set the retry policy for scrape calls.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the dynamic-content wait interval.
    pub fn with_wait_for_ms(mut self, wait_for_ms: u64) -> Self {
        self.wait_for_ms = wait_for_ms;
        self
    }

    /// Fetch one URL. Writes no files; the result is handed to the
    /// output writer.
    pub async fn fetch(&self, url: &str) -> PageResult {
        let request = ScrapeRequest::new(url)
            .with_html(self.keep_html)
            .with_wait_for_ms(self.wait_for_ms);

        let scraped = match retry_rate_limited(&self.policy, || self.api.scrape(&request)).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(url, error = %e, "page fetch failed");
                return PageResult::failed(url, e.to_string());
            }
        };

        // The service resolves redirects; a final URL off the root
        // domain is recorded as a failure, not silently dropped.
        if self.redirected_off_domain(&scraped.url) {
            tracing::warn!(url, final_url = %scraped.url, "redirected off-domain");
            return PageResult::failed(url, format!("redirected off-domain to {}", scraped.url));
        }

        if !scraped.has_content() {
            tracing::warn!(url, "page returned no content");
            return PageResult::failed(url, "no content returned");
        }

        let markdown = match scraped.markdown {
            Some(md) if self.clean => Some(self.clean_markdown(url, md).await),
            other => other,
        };

        let mut result = PageResult::fetched(url);
        result.markdown = markdown;
        result.html = scraped.html;
        result.title = scraped.title;
        result.description = scraped.description;
        result.fetched_at = Utc::now();
        result
    }

    fn redirected_off_domain(&self, final_url: &str) -> bool {
        match Url::parse(final_url) {
            Ok(u) => u
                .host_str()
                .is_some_and(|h| !h.eq_ignore_ascii_case(&self.root_host)),
            // Unparseable final URL: keep the page rather than guess
            Err(_) => false,
        }
    }

    /// Cleaning failures degrade to the raw markdown; a cleaner outage
    /// must not fail pages that were fetched successfully.
    async fn clean_markdown(&self, url: &str, markdown: String) -> String {
        match self.cleaner.clean(&markdown).await {
            Ok(cleaned) => cleaned,
            Err(e) => {
                tracing::warn!(
                    url,
                    cleaner = self.cleaner.name(),
                    error = %e,
                    "cleaning failed, keeping raw markdown"
                );
                markdown
            }
        }
    }
}
