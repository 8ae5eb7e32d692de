//! Documentation site extraction library.
//!
//! Crawls a documentation website into a local bundle of markdown
//! files plus a JSON manifest. Site mapping, page scraping, and
//! HTML-to-markdown conversion are delegated to an external scraping
//! API; optional boilerplate removal is delegated to an external text
//! model. What this library owns is the part with actual decisions in
//! it: classifying which discovered URLs are documentation, backing
//! off on rate limits, and keeping the manifest an exact index of the
//! output directory.
//!
//! # Usage
//!
//! ```rust,ignore
//! use docscrape::{CrawlJob, Crawler, Credentials, FirecrawlClient, NoopCleaner};
//!
//! let credentials = Credentials::from_env(false)?;
//! let api = FirecrawlClient::new(credentials.scrape_api_key.clone())?;
//!
//! let job = CrawlJob::new("https://docs.example.com")?.with_test_mode(true);
//! let summary = Crawler::new(&api, &NoopCleaner).run(&job).await?;
//! println!("{} pages written", summary.pages_written);
//! ```
//!
//! # Modules
//!
//! - [`patterns`] - Which URLs count as documentation pages
//! - [`retry`] - Exponential backoff around rate-limited API calls
//! - [`mapper`] - Site discovery through the scraping API
//! - [`fetcher`] - Per-page scraping and optional cleaning
//! - [`output`] - Files on disk plus the crawl manifest
//! - [`testing`] - Mock implementations for testing

pub mod api;
pub mod cleaner;
pub mod crawl;
pub mod credentials;
pub mod error;
pub mod fetcher;
pub mod firecrawl;
pub mod mapper;
pub mod output;
pub mod patterns;
pub mod retry;
pub mod testing;
pub mod types;
pub mod urls;

// Re-export core types at crate root
pub use api::{MapRequest, ScrapeApi, ScrapeRequest, ScrapedPage, TextCleaner};
pub use cleaner::{NoopCleaner, OpenAiCleaner};
pub use crawl::{CrawlSummary, Crawler};
pub use credentials::{Credentials, SecretString};
pub use error::{CrawlError, Result, ScrapeError, ScrapeResult};
pub use fetcher::PageFetcher;
pub use firecrawl::FirecrawlClient;
pub use mapper::SiteMapper;
pub use output::OutputWriter;
pub use retry::{retry_rate_limited, RetryPolicy};
pub use types::{
    CrawlJob, CrawlMode, DiscoveredUrl, Manifest, ManifestEntry, PageResult, PageStatus,
};
