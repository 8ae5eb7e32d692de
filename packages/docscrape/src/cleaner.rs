//! Markdown cleanup via an external text model.
//!
//! [`OpenAiCleaner`] sends scraped markdown through a chat-completions
//! endpoint with a fixed system prompt that strips navigation, ads,
//! and other boilerplate. [`NoopCleaner`] is the passthrough used when
//! cleaning is disabled.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::api::TextCleaner;
use crate::credentials::{SecretString, CLEANER_API_KEY_VAR};
use crate::error::{ScrapeError, ScrapeResult};

const OPENAI_API_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

const CLEANING_PROMPT: &str = "You clean scraped documentation pages. Remove navigation menus, \
    cookie banners, advertisements, footers, and other boilerplate from the markdown you are \
    given. Keep headings, prose, code blocks, links, and tables intact. Reply with the cleaned \
    markdown only.";

/// Text cleaner backed by an OpenAI-compatible chat-completions API.
pub struct OpenAiCleaner {
    client: Client,
    api_key: SecretString,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct ChatRequestBody {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponseBody {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl OpenAiCleaner {
    /// Create a new cleaner with the given API key.
    pub fn new(api_key: SecretString) -> ScrapeResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| ScrapeError::Http(Box::new(e)))?;

        Ok(Self {
            client,
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: OPENAI_API_URL.to_string(),
        })
    }

    /// Create from the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> ScrapeResult<Self> {
        let api_key = std::env::var(CLEANER_API_KEY_VAR)
            .map_err(|_| ScrapeError::Config(format!("{CLEANER_API_KEY_VAR} is not set")))?;
        Self::new(SecretString::new(api_key))
    }

    /// Use a different model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the cleaner at a different endpoint (tests, proxies,
    /// compatible servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl TextCleaner for OpenAiCleaner {
    async fn clean(&self, markdown: &str) -> ScrapeResult<String> {
        let body = ChatRequestBody {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: CLEANING_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: markdown.to_string(),
                },
            ],
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose())
            .json(&body)
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

        let parsed: ChatResponseBody = response
            .json()
            .await
            .map_err(|e| ScrapeError::Http(Box::new(e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ScrapeError::EmptyResponse)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Passthrough cleaner used when cleaning is disabled.
pub struct NoopCleaner;

#[async_trait]
impl TextCleaner for NoopCleaner {
    async fn clean(&self, markdown: &str) -> ScrapeResult<String> {
        Ok(markdown.to_string())
    }

    fn name(&self) -> &str {
        "noop"
    }
}
