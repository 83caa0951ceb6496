use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::free_text::{best_name, Anchor};
use super::{is_title_like, CandidateExtractor, PageContent, SeenSet};
use crate::model::{CandidateRecord, SourceKind};

/// Two or three capitalised words, optionally with a middle initial.
const NAME: &str = r"([A-Z][a-z]+(?:[ \t]+[A-Z]\.)?(?:[ \t]+[A-Z][a-z]+){1,2})";

const HONORIFIC: &str = r"(?:Mr\.|Ms\.|Mrs\.|Dr\.)\s+";

// Name is group 1, title group 2. Titles are lazy and stop at the first
// clause boundary.
static NARRATIVES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    let build = |src: String| Regex::new(&src).unwrap();
    vec![
        (
            "proxy_biography",
            build(format!(
                r"{HONORIFIC}{NAME},?\s+(?:age\s+\d+,?\s+)?(?:has\s+served\s+as\s+|is\s+)?(?:our\s+|the\s+)?([^,\n]+?)(?:\s+since|\s+effective|\.|,)"
            )),
        ),
        (
            "age_listing",
            build(format!(
                r"{NAME},\s+age\s+\d+,\s+(?:has\s+served\s+as\s+|is\s+)?(?:our\s+)?([^,\n]+?)(?:\s+since|\s+of\s+the\s+Company|\.|,)"
            )),
        ),
        (
            "serves_as",
            build(format!(r"{NAME}\s+serves\s+as\s+(?:our\s+)?([^,\n]+?)(?:\s+and|\.|,)")),
        ),
        (
            "is_the_title_of_company",
            build(format!(
                r"{HONORIFIC}{NAME}\s+is\s+(?:the\s+)?([^,\n]+?)(?:\s+of\s+(?:the\s+)?Company|\.|,)"
            )),
        ),
        (
            "appointed",
            build(format!(
                r"{NAME}\s+was\s+(?:appointed|named)\s+(?:as\s+)?(?:the\s+)?([^,\n]+?)(?:\s+in|\s+effective|\.|,)"
            )),
        ),
    ]
});

/// Biography sentences found in proxy statements and annual reports.
pub struct FilingNarrative;

impl CandidateExtractor for FilingNarrative {
    fn name(&self) -> &'static str {
        "filing_narrative"
    }

    fn extract(&self, page: &PageContent) -> Vec<CandidateRecord> {
        let text = page.plain_text();
        let mut seen = SeenSet::default();
        let mut records = Vec::new();

        for (label, re) in NARRATIVES.iter() {
            for caps in re.captures_iter(&text) {
                let (Some(name), Some(title)) = (caps.get(1), caps.get(2)) else {
                    continue;
                };
                let title = title.as_str().trim();
                if !is_title_like(title) {
                    debug!(pattern = *label, title, "narrative title rejected");
                    continue;
                }
                let Some(name) = best_name(name.as_str(), Anchor::End) else {
                    continue;
                };

                let record = CandidateRecord::new(
                    &name,
                    title,
                    SourceKind::AuthoritativeDocument,
                    &page.locator,
                );
                if seen.first_sighting(&record) {
                    records.push(record);
                }
            }
        }

        records
    }
}
