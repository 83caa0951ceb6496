pub mod filing;
pub mod free_text;
pub mod headings;
pub mod structured;
pub mod suggested;

use std::collections::HashSet;

use serde::Serialize;

use crate::model::CandidateRecord;
use crate::text::{html_to_text, looks_like_html};

/// Seniority keywords that make a text span title-like.
pub const TITLE_KEYWORDS: &[&str] = &[
    "chief", "officer", "director", "president", "vice", "senior", "head", "executive",
    "chairman", "founder",
];

/// Executive title keywords recognised in headings and model output.
pub const EXECUTIVE_TITLE_KEYWORDS: &[&str] = &[
    "ceo", "chief executive", "cfo", "chief financial", "cto", "chief technology", "coo",
    "chief operating", "cio", "chief information", "cmo", "chief marketing", "chro",
    "chief human resources", "clo", "chief legal", "cso", "chief strategy", "chief security",
    "cdo", "chief data", "chief digital", "cro", "chief revenue", "chief risk", "cpo",
    "chief product", "chief people", "cco", "chief compliance", "chief commercial",
    "chief customer", "cao", "chief administrative", "chief innovation", "chief investment",
    "chief transformation", "president", "chairman", "vice chairman", "founder", "co-founder",
    "managing director", "executive director", "executive vice president", "evp",
    "senior vice president", "svp", "vice president", "vp",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Html,
    Text,
}

/// Fetched page or document content handed to extractors.
#[derive(Debug, Clone)]
pub struct PageContent {
    pub locator: String,
    pub kind: ContentKind,
    pub body: String,
}

impl PageContent {
    pub fn html(locator: &str, body: impl Into<String>) -> Self {
        PageContent {
            locator: locator.to_string(),
            kind: ContentKind::Html,
            body: body.into(),
        }
    }

    pub fn text(locator: &str, body: impl Into<String>) -> Self {
        PageContent {
            locator: locator.to_string(),
            kind: ContentKind::Text,
            body: body.into(),
        }
    }

    /// Sniffs the body when the transport gave no usable content type.
    pub fn sniffed(locator: &str, body: impl Into<String>) -> Self {
        let body = body.into();
        if looks_like_html(&body) {
            PageContent::html(locator, body)
        } else {
            PageContent::text(locator, body)
        }
    }

    pub fn is_html(&self) -> bool {
        self.kind == ContentKind::Html
    }

    pub fn plain_text(&self) -> String {
        match self.kind {
            ContentKind::Html => html_to_text(&self.body),
            ContentKind::Text => self.body.clone(),
        }
    }
}

pub fn is_title_like(text: &str) -> bool {
    if text.is_empty() || text.chars().count() > 100 {
        return false;
    }
    let lower = text.to_lowercase();
    TITLE_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Word-aware check for executive title keywords ("vp" must not match "mvp").
pub fn contains_executive_title(text: &str) -> bool {
    let lower = text.to_lowercase();
    let padded = format!(
        " {} ",
        lower
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' { c } else { ' ' })
            .collect::<String>()
    );
    EXECUTIVE_TITLE_KEYWORDS
        .iter()
        .any(|kw| padded.contains(&format!(" {} ", kw)))
}

/// One extraction strategy. Strategies are independent and order-free;
/// every record they return has already passed the name validator.
pub trait CandidateExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract(&self, page: &PageContent) -> Vec<CandidateRecord>;
}

/// Per-strategy yield for a single page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyYield {
    pub strategy: &'static str,
    pub count: usize,
}

#[derive(Debug, Default)]
pub struct ChainOutcome {
    pub records: Vec<CandidateRecord>,
    pub yields: Vec<StrategyYield>,
}

/// Ordered composition of extractors, assembled by the caller.
pub struct ExtractorChain {
    links: Vec<Box<dyn CandidateExtractor>>,
}

impl ExtractorChain {
    pub fn new() -> Self {
        ExtractorChain { links: Vec::new() }
    }

    pub fn with(mut self, extractor: impl CandidateExtractor + 'static) -> Self {
        self.links.push(Box::new(extractor));
        self
    }

    /// Structured sections, then headings, then free text.
    pub fn site_default() -> Self {
        ExtractorChain::new()
            .with(structured::StructuredSections)
            .with(headings::HeadingProximity)
            .with(free_text::FreeTextPatterns::site())
    }

    /// Free-text and narrative patterns tagged as authoritative.
    pub fn documents_default() -> Self {
        ExtractorChain::new()
            .with(free_text::FreeTextPatterns::authoritative())
            .with(filing::FilingNarrative)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Run every link over `page`, concatenating their records in chain order.
    pub fn run(&self, page: &PageContent) -> ChainOutcome {
        let mut outcome = ChainOutcome::default();
        for link in &self.links {
            let records = link.extract(page);
            outcome.yields.push(StrategyYield {
                strategy: link.name(),
                count: records.len(),
            });
            outcome.records.extend(records);
        }
        outcome
    }
}

impl Default for ExtractorChain {
    fn default() -> Self {
        ExtractorChain::site_default()
    }
}

/// Drops repeat (identity, title) sightings within one strategy pass.
#[derive(Default)]
pub(crate) struct SeenSet(HashSet<(String, String)>);

impl SeenSet {
    pub(crate) fn first_sighting(&mut self, record: &CandidateRecord) -> bool {
        self.0
            .insert((record.identity_key(), record.raw_title.to_lowercase()))
    }
}

// ── Tests ──
