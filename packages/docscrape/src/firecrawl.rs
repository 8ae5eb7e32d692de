//! Firecrawl-backed implementation of [`ScrapeApi`].
//!
//! Talks to the Firecrawl v1 REST API: `/map` to enumerate a site's
//! URLs and `/scrape` to fetch one page as markdown/HTML. HTTP 429
//! maps to [`ScrapeError::RateLimited`] so the retry wrapper can back
//! off; every other non-success status is a non-transient API error.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::api::{MapRequest, ScrapeApi, ScrapeRequest, ScrapedPage};
use crate::credentials::{SecretString, SCRAPE_API_KEY_VAR};
use crate::error::{ScrapeError, ScrapeResult};

const FIRECRAWL_API_URL: &str = "https://api.firecrawl.dev/v1";

/// Client for the Firecrawl scraping service.
pub struct FirecrawlClient {
    client: Client,
    api_key: SecretString,
    base_url: String,
}

// Request/response types for the Firecrawl API

#[derive(Serialize)]
struct MapRequestBody {
    url: String,
    limit: u32,
    #[serde(rename = "maxDepth")]
    max_depth: u32,
    #[serde(rename = "includeSubdomains")]
    include_subdomains: bool,
    #[serde(rename = "ignoreSitemap")]
    ignore_sitemap: bool,
}

#[derive(Deserialize)]
struct MapResponseBody {
    success: bool,
    links: Option<Vec<String>>,
}

#[derive(Serialize)]
struct ScrapeRequestBody {
    url: String,
    formats: Vec<String>,
    #[serde(rename = "onlyMainContent")]
    only_main_content: bool,
    #[serde(rename = "waitFor")]
    wait_for: u64,
}

#[derive(Deserialize)]
struct ScrapeResponseBody {
    success: bool,
    data: Option<ScrapeData>,
}

#[derive(Deserialize)]
struct ScrapeData {
    markdown: Option<String>,
    html: Option<String>,
    metadata: Option<PageMetadata>,
}

#[derive(Default, Deserialize)]
struct PageMetadata {
    title: Option<String>,
    description: Option<String>,
    #[serde(rename = "sourceURL")]
    source_url: Option<String>,
}

impl FirecrawlClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: SecretString) -> ScrapeResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| ScrapeError::Http(Box::new(e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: FIRECRAWL_API_URL.to_string(),
        })
    }

    /// Create from the `FIRECRAWL_API_KEY` environment variable.
    pub fn from_env() -> ScrapeResult<Self> {
        let api_key = std::env::var(SCRAPE_API_KEY_VAR)
            .map_err(|_| ScrapeError::Config(format!("{SCRAPE_API_KEY_VAR} is not set")))?;
        Self::new(SecretString::new(api_key))
    }

    /// Point the client at a different endpoint (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn post<T: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> ScrapeResult<R> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose())
            .json(body)
            .send()
            .await
            .map_err(|e| ScrapeError::Http(Box::new(e)))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ScrapeError::RateLimited);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ScrapeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ScrapeError::Http(Box::new(e)))
    }
}

#[async_trait]
impl ScrapeApi for FirecrawlClient {
    async fn map_site(&self, request: &MapRequest) -> ScrapeResult<Vec<String>> {
        tracing::debug!(url = %request.url, limit = request.limit, "mapping site");

        let body = MapRequestBody {
            url: request.url.clone(),
            limit: request.limit as u32,
            max_depth: request.max_depth as u32,
            include_subdomains: request.include_subdomains,
            ignore_sitemap: request.ignore_sitemap,
        };
        let response: MapResponseBody = self.post("/map", &body).await?;

        if !response.success {
            return Err(ScrapeError::Api {
                status: 200,
                message: "map request was not successful".to_string(),
            });
        }

        Ok(response.links.unwrap_or_default())
    }

    async fn scrape(&self, request: &ScrapeRequest) -> ScrapeResult<ScrapedPage> {
        tracing::debug!(url = %request.url, "scraping page");

        let mut formats = vec!["markdown".to_string()];
        if request.want_html {
            formats.push("html".to_string());
        }
        let body = ScrapeRequestBody {
            url: request.url.clone(),
            formats,
            only_main_content: request.only_main_content,
            wait_for: request.wait_for_ms,
        };
        let response: ScrapeResponseBody = self.post("/scrape", &body).await?;

        if !response.success {
            return Err(ScrapeError::Api {
                status: 200,
                message: "scrape request was not successful".to_string(),
            });
        }
        let data = response.data.ok_or(ScrapeError::EmptyResponse)?;
        let metadata = data.metadata.unwrap_or_default();

        let mut page = ScrapedPage::new(
            metadata
                .source_url
                .unwrap_or_else(|| request.url.clone()),
        );
        page.markdown = data.markdown;
        page.html = data.html;
        page.title = metadata.title;
        page.description = metadata.description;
        Ok(page)
    }

    fn name(&self) -> &str {
        "firecrawl"
    }
}
