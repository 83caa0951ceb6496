use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::{contains_executive_title, CandidateExtractor, PageContent, SeenSet};
use crate::model::{CandidateRecord, SourceKind};
use crate::names::{is_plausible_name, looks_like_name};
use crate::text::element_text;

static HEADING_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").unwrap());

/// Headings that carry an executive title, paired with a name in an adjacent element.
pub struct HeadingProximity;

impl CandidateExtractor for HeadingProximity {
    fn name(&self) -> &'static str {
        "html_heading"
    }

    fn extract(&self, page: &PageContent) -> Vec<CandidateRecord> {
        if !page.is_html() {
            return Vec::new();
        }

        let doc = Html::parse_document(&page.body);
        let mut seen = SeenSet::default();
        let mut records = Vec::new();

        for heading in doc.select(&HEADING_SEL) {
            let title = element_text(heading);
            if title.chars().count() > 100 || !contains_executive_title(&title) {
                continue;
            }
            let Some(name) = name_near(heading) else {
                continue;
            };
            if !is_plausible_name(&name) {
                continue;
            }

            let record = CandidateRecord::new(&name, &title, SourceKind::HtmlHeading, &page.locator);
            if seen.first_sighting(&record) {
                records.push(record);
            }
        }

        records
    }
}

/// Previous sibling, next sibling, then the parent's previous sibling.
fn name_near(heading: ElementRef<'_>) -> Option<String> {
    let prev = heading.prev_siblings().find_map(ElementRef::wrap);
    let next = heading.next_siblings().find_map(ElementRef::wrap);
    let parent_prev = heading
        .parent()
        .and_then(ElementRef::wrap)
        .and_then(|p| p.prev_siblings().find_map(ElementRef::wrap));

    [prev, next, parent_prev]
        .into_iter()
        .flatten()
        .map(element_text)
        .find(|text| looks_like_name(text))
}
