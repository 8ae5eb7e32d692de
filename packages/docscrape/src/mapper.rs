//! Site mapping: discover, normalize, and filter a site's URLs.

use std::collections::BTreeSet;

use crate::api::{MapRequest, ScrapeApi};
use crate::error::{CrawlError, Result};
use crate::patterns;
use crate::retry::{retry_rate_limited, RetryPolicy};
use crate::types::{CrawlJob, DiscoveredUrl};
use crate::urls;

// Limits from the original tool: full crawls go wide, test mode stays
// small enough for a quick validation run.
const FULL_LIMIT: usize = 1000;
const FULL_DEPTH: usize = 5;
const TEST_LIMIT: usize = 10;
const TEST_DEPTH: usize = 2;

/// Discovers the documentation URLs of a site via the scraping API's
/// mapping capability, filtered through [`patterns`].
pub struct SiteMapper<'a, A: ScrapeApi + ?Sized> {
    api: &'a A,
    policy: RetryPolicy,
}

impl<'a, A: ScrapeApi + ?Sized> SiteMapper<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            policy: RetryPolicy::default(),
        }
    }

    /// Set the retry policy for the mapping call.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Map the job's site into an ordered list of documentation URLs.
    ///
    /// The homepage is always first, so its output slug is `index`.
    /// A mapping failure after retries fails the whole crawl; there is
    /// no partial site map.
    pub async fn map(&self, job: &CrawlJob) -> Result<Vec<DiscoveredUrl>> {
        let root_host = job.root_host().to_string();
        let (limit, depth) = if job.test_mode {
            (TEST_LIMIT, TEST_DEPTH)
        } else {
            (FULL_LIMIT, FULL_DEPTH)
        };
        let request = MapRequest::new(job.root_url.as_str())
            .with_limit(limit)
            .with_max_depth(depth);

        tracing::info!(
            url = %job.root_url,
            api = self.api.name(),
            limit,
            depth,
            "mapping site structure"
        );

        let links = retry_rate_limited(&self.policy, || self.api.map_site(&request))
            .await
            .map_err(|e| CrawlError::SiteMapFailed(Box::new(e)))?;

        // Normalize, keep same-domain only, dedup.
        let mut seen = BTreeSet::new();
        let mut internal = Vec::new();
        for link in links {
            let Some(normalized) = urls::normalize(&link) else {
                tracing::debug!(url = %link, "skipping unparseable discovered URL");
                continue;
            };
            let same_domain = normalized
                .host_str()
                .is_some_and(|h| h.eq_ignore_ascii_case(&root_host));
            if !same_domain {
                continue;
            }
            if seen.insert(normalized.as_str().to_string()) {
                internal.push(normalized);
            }
        }
        tracing::debug!(count = internal.len(), "unique internal URLs discovered");

        let mut selected: Vec<DiscoveredUrl> = internal
            .iter()
            .filter_map(|u| {
                patterns::classify(u, &root_host).map(|tag| DiscoveredUrl {
                    url: u.as_str().to_string(),
                    matched: Some(tag),
                })
            })
            .collect();

        if selected.is_empty() {
            // Sites with unconventional doc paths: keep everything
            // internal rather than crawling nothing.
            tracing::info!("no URLs matched documentation patterns, keeping all internal URLs");
            selected = internal
                .iter()
                .map(|u| DiscoveredUrl {
                    url: u.as_str().to_string(),
                    matched: None,
                })
                .collect();
        }

        // Homepage first.
        let root = job.root_url.as_str().to_string();
        selected.retain(|d| d.url != root);
        selected.insert(
            0,
            DiscoveredUrl {
                url: root,
                matched: Some("root"),
            },
        );

        if job.test_mode && selected.len() > TEST_LIMIT {
            // Deterministic selection: sort everything after the
            // homepage, then cut.
            selected[1..].sort_by(|a, b| a.url.cmp(&b.url));
            selected.truncate(TEST_LIMIT);
        }

        tracing::info!(count = selected.len(), "documentation pages selected");
        Ok(selected)
    }
}
