//! External collaborators: web search, page fetch, model analysis and
//! authoritative document retrieval. The engine only sees these traits.

pub mod documents;
pub mod fetch;
pub mod llm;
pub mod serper;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CollabResult;
use crate::extract::suggested::AnalysisOutput;
use crate::extract::PageContent;
use crate::model::ScopeHint;

pub use documents::HttpDocumentSource;
pub use fetch::{HttpFetcher, SpiderFetcher};
pub use llm::ChatAnalyzer;
pub use serper::SerperSearch;

/// One organic search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Html,
    Text,
    Other,
}

impl ContentType {
    /// From a Content-Type header value.
    pub fn from_header(value: &str) -> ContentType {
        let v = value.to_ascii_lowercase();
        if v.contains("html") {
            ContentType::Html
        } else if v.starts_with("text/") {
            ContentType::Text
        } else {
            ContentType::Other
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub body: String,
    pub content_type: ContentType,
}

impl FetchedPage {
    /// Hand the page to the extractors, sniffing when the type is unknown.
    pub fn into_content(self) -> PageContent {
        match self.content_type {
            ContentType::Html => PageContent::html(&self.url, self.body),
            ContentType::Text => PageContent::text(&self.url, self.body),
            ContentType::Other => PageContent::sniffed(&self.url, self.body),
        }
    }
}

/// Never fails past this boundary: errors are logged and become no hits.
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Vec<SearchHit>;
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> CollabResult<FetchedPage>;
}

#[async_trait]
pub trait ModelAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        page_text: &str,
        company: &str,
        scope: Option<&ScopeHint>,
    ) -> CollabResult<AnalysisOutput>;
}

/// Returns document text; HTML documents are reduced to visible text.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch_document(&self, url: &str) -> CollabResult<String>;
}
