use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use spider_client::shapes::request::{ReturnFormat, ReturnFormatHandling};
use spider_client::{RequestParams, Spider};
use tracing::{debug, warn};

use super::{ContentType, FetchedPage, PageFetcher};
use crate::error::{CollabResult, CollaboratorError};

const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF_MS: u64 = 2000;

/// Plain HTTP GET with a browser-like user agent.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> CollabResult<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(HttpFetcher { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> CollabResult<FetchedPage> {
        let start = Instant::now();
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollaboratorError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ContentType::from_header)
            .unwrap_or(ContentType::Other);
        let body = response.text().await?;

        debug!(url, bytes = body.len(), latency_ms = start.elapsed().as_millis() as u64, "fetched");
        Ok(FetchedPage {
            url: url.to_string(),
            body,
            content_type,
        })
    }
}

/// spider.cloud scrape returning raw HTML, retried with backoff on rate limits.
pub struct SpiderFetcher {
    spider: Spider,
}

impl SpiderFetcher {
    pub fn new(api_key: &str) -> CollabResult<Self> {
        if api_key.trim().is_empty() {
            return Err(CollaboratorError::MissingKey("spider_api_key"));
        }
        let spider = Spider::new(Some(api_key.to_string())).map_err(|e| {
            CollaboratorError::Provider(format!("Failed to create Spider client: {}", e))
        })?;
        Ok(SpiderFetcher { spider })
    }

    async fn scrape_one(&self, url: &str) -> CollabResult<FetchedPage> {
        let params = RequestParams {
            return_format: Some(ReturnFormatHandling::Single(ReturnFormat::Raw)),
            ..Default::default()
        };

        let response = self
            .spider
            .scrape_url(url, Some(params), "application/json")
            .await
            .map_err(|e| CollaboratorError::Provider(format!("Spider scrape failed: {}", e)))?;

        page_from_response(url, response)
    }
}

/// Spider answers with a list of `{content, status, ..}` objects, sometimes
/// wrapped in a JSON string.
fn page_from_response(url: &str, response: serde_json::Value) -> CollabResult<FetchedPage> {
    let parsed: serde_json::Value = match response.as_str() {
        Some(s) => serde_json::from_str(s)?,
        None => response,
    };
    let first = parsed.as_array().and_then(|arr| arr.first());

    if let Some(status) = first.and_then(|obj| obj.get("status")).and_then(|s| s.as_u64()) {
        if !(200..300).contains(&status) {
            return Err(CollaboratorError::Status {
                status: status as u16,
                url: url.to_string(),
            });
        }
    }

    let body = first
        .and_then(|obj| obj.get("content"))
        .and_then(|c| c.as_str())
        .ok_or_else(|| CollaboratorError::Provider("No content in spider response".to_string()))?;

    Ok(FetchedPage {
        url: url.to_string(),
        body: body.to_string(),
        content_type: ContentType::Other,
    })
}

#[async_trait]
impl PageFetcher for SpiderFetcher {
    async fn fetch(&self, url: &str) -> CollabResult<FetchedPage> {
        let mut attempt = 0;
        loop {
            match self.scrape_one(url).await {
                Err(e) if e.is_retryable() && attempt < MAX_RETRIES => {
                    let backoff = Duration::from_millis(BASE_BACKOFF_MS * 2u64.pow(attempt));
                    warn!(
                        "Rate limited on {} (attempt {}/{}), backing off {:.1}s",
                        url,
                        attempt + 1,
                        MAX_RETRIES,
                        backoff.as_secs_f64()
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}
