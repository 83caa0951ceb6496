use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::{SearchHit, WebSearch};
use crate::error::{CollabResult, CollaboratorError};

const SERPER_URL: &str = "https://google.serper.dev/search";

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SearchHit>,
}

/// Google results through serper.dev.
pub struct SerperSearch {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl SerperSearch {
    pub fn new(api_key: &str, timeout: Duration) -> CollabResult<Self> {
        if api_key.trim().is_empty() {
            return Err(CollaboratorError::MissingKey("serper_api_key"));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(SerperSearch {
            client,
            api_key: api_key.to_string(),
            endpoint: SERPER_URL.to_string(),
        })
    }

    async fn try_search(&self, query: &str, max_results: usize) -> CollabResult<Vec<SearchHit>> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&json!({ "q": query, "num": max_results }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollaboratorError::Status {
                status: status.as_u16(),
                url: self.endpoint.clone(),
            });
        }

        let body: SerperResponse = response.json().await?;
        Ok(body.organic)
    }
}

#[async_trait]
impl WebSearch for SerperSearch {
    async fn search(&self, query: &str, max_results: usize) -> Vec<SearchHit> {
        match self.try_search(query, max_results).await {
            Ok(hits) => {
                debug!(query, hits = hits.len(), "search completed");
                hits
            }
            Err(e) => {
                warn!(query, error = %e, "search failed");
                Vec::new()
            }
        }
    }
}
