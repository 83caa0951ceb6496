use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::{is_title_like, CandidateExtractor, PageContent, SeenSet};
use crate::model::{CandidateRecord, SourceKind};
use crate::names::{is_plausible_name, looks_like_name};
use crate::text::{clip, element_text};

static CONTAINER_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div, section, article, li").unwrap());

// Tried in order; the first match wins.
static NAME_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    ["h1", "h2", "h3", "h4", "h5", ".name", ".executive-name", ".person-name", "strong"]
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
});

static BIO_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());

const MIN_BIO_CHARS: usize = 50;
const MAX_BIO_CHARS: usize = 500;

static TITLE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [".title", ".position", ".role", ".job-title", "p", "span"]
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
});

/// class/id fragments that mark a person-profile container.
const CONTAINER_HINTS: &[&str] = &[
    "leadership", "executive", "management", "team", "bio", "profile", "person", "member",
    "staff", "leader", "card",
];

/// Person-profile blocks: first name-like text plus first title-like text.
pub struct StructuredSections;

impl CandidateExtractor for StructuredSections {
    fn name(&self) -> &'static str {
        "structured_section"
    }

    fn extract(&self, page: &PageContent) -> Vec<CandidateRecord> {
        if !page.is_html() {
            return Vec::new();
        }

        let doc = Html::parse_document(&page.body);
        let mut seen = SeenSet::default();
        let mut records = Vec::new();

        for block in doc
            .select(&CONTAINER_SEL)
            .filter(|el| is_profile_container(el) && !has_nested_container(*el))
        {
            let Some(name) = first_text(block, &NAME_SELECTORS, looks_like_name) else {
                continue;
            };
            let Some(title) = first_text(block, &TITLE_SELECTORS, |t| is_title_like(t) && t != name)
            else {
                continue;
            };
            if !is_plausible_name(&name) {
                continue;
            }

            let record =
                CandidateRecord::new(&name, &title, SourceKind::StructuredSection, &page.locator)
                    .with_background(background(block, &title));
            if seen.first_sighting(&record) {
                records.push(record);
            }
        }

        records
    }
}

fn is_profile_container(el: &ElementRef<'_>) -> bool {
    let attrs = format!(
        "{} {}",
        el.value().attr("class").unwrap_or(""),
        el.value().attr("id").unwrap_or("")
    )
    .to_lowercase();
    CONTAINER_HINTS.iter().any(|hint| attrs.contains(hint))
}

/// Wrappers around several cards are skipped; only the innermost card counts.
fn has_nested_container(block: ElementRef<'_>) -> bool {
    block
        .select(&CONTAINER_SEL)
        .any(|inner| inner.id() != block.id() && is_profile_container(&inner))
}

/// First paragraph in the card long enough to be a bio.
fn background(block: ElementRef<'_>, title: &str) -> Option<String> {
    block
        .select(&BIO_SEL)
        .map(element_text)
        .find(|text| text.chars().count() > MIN_BIO_CHARS && text != title)
        .map(|text| clip(&text, MAX_BIO_CHARS))
}

fn first_text(
    block: ElementRef<'_>,
    selectors: &[Selector],
    accept: impl Fn(&str) -> bool,
) -> Option<String> {
    selectors.iter().find_map(|sel| {
        block
            .select(sel)
            .map(element_text)
            .find(|text| accept(text))
    })
}
