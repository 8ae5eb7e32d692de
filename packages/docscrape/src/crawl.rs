//! The crawl orchestrator: map, fetch, write, one URL at a time.

use std::path::PathBuf;

use crate::api::{ScrapeApi, TextCleaner};
use crate::fetcher::PageFetcher;
use crate::mapper::SiteMapper;
use crate::output::OutputWriter;
use crate::retry::RetryPolicy;
use crate::types::{CrawlJob, CrawlMode, PageStatus};

/// What a finished crawl produced.
#[derive(Debug)]
pub struct CrawlSummary {
    pub pages_written: usize,
    pub pages_failed: usize,
    pub manifest_path: PathBuf,
}

/// Runs a [`CrawlJob`] end to end.
///
/// Processing is intentionally sequential: one URL at a time through
/// mapper → fetcher → writer, suspending only on network calls and
/// backoff sleeps. Per-page failures are recorded in the manifest and
/// the crawl continues; only site-map failures and output I/O errors
/// abort it.
pub struct Crawler<'a, A: ScrapeApi + ?Sized, C: TextCleaner + ?Sized> {
    api: &'a A,
    cleaner: &'a C,
    policy: RetryPolicy,
}

impl<'a, A: ScrapeApi + ?Sized, C: TextCleaner + ?Sized> Crawler<'a, A, C> {
    pub fn new(api: &'a A, cleaner: &'a C) -> Self {
        Self {
            api,
            cleaner,
            policy: RetryPolicy::default(),
        }
    }

    /// Set the retry policy used for all API calls.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn run(&self, job: &CrawlJob) -> crate::error::Result<CrawlSummary> {
        tracing::info!(
            url = %job.root_url,
            output = %job.output_dir.display(),
            mode = ?job.mode,
            test_mode = job.test_mode,
            "starting crawl"
        );

        // Fail on an unusable output directory before any network call.
        let mut writer = OutputWriter::create(&job.output_dir, job.root_host())?;
        let fetcher =
            PageFetcher::new(self.api, self.cleaner, job).with_policy(self.policy.clone());

        match job.mode {
            CrawlMode::SinglePage => {
                let result = fetcher.fetch(job.root_url.as_str()).await;
                writer.record(&result)?;
            }
            CrawlMode::FullSite => {
                let mapper = SiteMapper::new(self.api).with_policy(self.policy.clone());
                let discovered = mapper.map(job).await?;

                for page in discovered {
                    tracing::info!(
                        url = %page.url,
                        pattern = page.matched.unwrap_or("fallback"),
                        "fetching page"
                    );
                    let result = fetcher.fetch(&page.url).await;
                    if let PageStatus::Failed { reason } = &result.status {
                        tracing::warn!(url = %page.url, reason = %reason, "page recorded as failed");
                    }
                    writer.record(&result)?;
                }
            }
        }

        let pages_written = writer.pages_written();
        let pages_failed = writer.pages_failed();
        let manifest_path = writer.finalize()?;

        tracing::info!(pages_written, pages_failed, "crawl finished");
        Ok(CrawlSummary {
            pages_written,
            pages_failed,
            manifest_path,
        })
    }
}
