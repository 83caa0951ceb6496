use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::DocumentSource;
use crate::error::{CollabResult, CollaboratorError};
use crate::text::{html_to_text, looks_like_html};

/// Filings and other trusted documents over HTTP. EDGAR rejects requests
/// without a descriptive user agent.
pub struct HttpDocumentSource {
    client: Client,
}

impl HttpDocumentSource {
    pub fn new(user_agent: &str, timeout: Duration) -> CollabResult<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(HttpDocumentSource { client })
    }
}

#[async_trait]
impl DocumentSource for HttpDocumentSource {
    async fn fetch_document(&self, url: &str) -> CollabResult<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CollaboratorError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        debug!(url, bytes = body.len(), "document fetched");
        Ok(document_text(&body))
    }
}

/// Visible text of an HTML filing, or the body unchanged.
pub fn document_text(body: &str) -> String {
    if looks_like_html(body) {
        html_to_text(body)
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_filing_is_reduced_to_text() {
        let body = "<html><body><p>Mr. John Smith, age 58, has served as our Chief Executive Officer since 2015.</p></body></html>";
        assert_eq!(
            document_text(body),
            "Mr. John Smith, age 58, has served as our Chief Executive Officer since 2015."
        );
    }

    #[test]
    fn plain_text_untouched() {
        assert_eq!(document_text("ITEM 10.\nJane Doe"), "ITEM 10.\nJane Doe");
    }
}
