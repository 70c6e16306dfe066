//! Firecrawl web-scraper client.
//!
//! Scrapes a web page into markdown through the hosted Firecrawl API, for
//! ingestion with `SourceKind::Webpage` and the URL as the source
//! identifier.
//!
//! This module is only available when the `firecrawl` feature is enabled.

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{RagError, Result};

const SCRAPE_URL: &str = "https://api.firecrawl.dev/v1/scrape";

/// A client for the Firecrawl scrape API.
///
/// # Example
///
/// ```rust,ignore
/// use hrkb_rag::scraper::FirecrawlScraper;
///
/// let scraper = FirecrawlScraper::from_env()?;
/// let markdown = scraper.scrape("https://example.com/hr-faq").await?;
/// ```
pub struct FirecrawlScraper {
    client: reqwest::Client,
    api_key: String,
}

impl FirecrawlScraper {
    /// Create a new scraper with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::Load {
                path: SCRAPE_URL.to_string(),
                message: "Firecrawl API key must not be empty".to_string(),
            });
        }
        Ok(Self { client: reqwest::Client::new(), api_key })
    }

    /// Create a new scraper using the `FIRECRAWL_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("FIRECRAWL_API_KEY").map_err(|_| RagError::Load {
            path: SCRAPE_URL.to_string(),
            message: "FIRECRAWL_API_KEY environment variable not set".to_string(),
        })?;
        Self::new(api_key)
    }

    /// Scrape a web page and return its content as markdown.
    ///
    /// An empty scrape result is a [`RagError::Load`], matching the
    /// "no content retrieved" failure of the admin path.
    pub async fn scrape(&self, url: &str) -> Result<String> {
        debug!(url, "scraping web page");

        let request_body = ScrapeRequest { url, formats: vec!["markdown"] };

        let response = self
            .client
            .post(SCRAPE_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(url, error = %e, "scrape request failed");
                RagError::Load { path: url.to_string(), message: format!("request failed: {e}") }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(url, %status, "scrape API error");
            return Err(RagError::Load {
                path: url.to_string(),
                message: format!("API returned {status}: {body}"),
            });
        }

        let parsed: ScrapeResponse = response.json().await.map_err(|e| RagError::Load {
            path: url.to_string(),
            message: format!("failed to parse response: {e}"),
        })?;

        let markdown = parsed.data.and_then(|d| d.markdown).unwrap_or_default();
        if markdown.trim().is_empty() {
            return Err(RagError::Load {
                path: url.to_string(),
                message: "failed to scrape - no content retrieved".to_string(),
            });
        }

        debug!(url, chars = markdown.len(), "scraped web page");
        Ok(markdown)
    }
}

#[derive(Serialize)]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: Vec<&'a str>,
}

#[derive(Deserialize)]
struct ScrapeResponse {
    data: Option<ScrapeData>,
}

#[derive(Deserialize)]
struct ScrapeData {
    markdown: Option<String>,
}
