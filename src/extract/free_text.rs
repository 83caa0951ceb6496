use std::sync::LazyLock;

use regex::Regex;

use super::{contains_executive_title, CandidateExtractor, PageContent, SeenSet};
use crate::model::{CandidateRecord, SourceKind};
use crate::names::is_plausible_name;

/// Executive titles recognised by the text patterns, longest phrasing first.
const TITLES: &str = "President and Chief Executive Officer|President (?:and|&) CEO|\
Chief Executive Officer|Chief Financial Officer|Chief Technology Officer|Chief Operating Officer|\
Chief Information Officer|Chief Marketing Officer|Chief Human Resources Officer|Chief Legal Officer|\
Chief Strategy Officer|Chief Data Officer|Chief Security Officer|Chief Revenue Officer|\
Chief Product Officer|Chief Innovation Officer|Chief Compliance Officer|Chief Risk Officer|\
Chief Administrative Officer|Chief Investment Officer|Chief Commercial Officer|\
Chief Customer Officer|Chief Digital Officer|Chief People Officer|Chief Transformation Officer|\
Executive Vice President|Senior Vice President|Vice Chairman|Chairman|Co-Founder|Founder|\
Managing Director|Executive Director|President|CEO|CFO|CTO|COO|CIO|CMO|CHRO|CLO|CSO|CDO|CRO|\
CPO|CCO|CAO|EVP|SVP";

/// Capitalised tokens on one line ("Jane Doe", "Jean-Luc Picard", "Mary McDonald").
const NAME: &str = r"[A-Z][a-z]+(?:[A-Z][a-z]+)?(?:-[A-Z][a-z]+)?(?:[ \t]+[A-Z][a-z]+(?:[A-Z][a-z]+)?(?:-[A-Z][a-z]+)?){1,3}";

/// Which end of an over-captured name span is trustworthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Name precedes the title: extra words leak in on the left.
    End,
    /// Title precedes the name: extra words leak in on the right.
    Start,
}

pub struct TextPattern {
    pub label: &'static str,
    pub regex: Regex,
    /// Capture group (1 or 2) expected to hold the title.
    pub title_group: usize,
    pub anchor: Anchor,
}

fn pattern(label: &'static str, template: &str, title_group: usize, anchor: Anchor) -> TextPattern {
    let src = template
        .replace("{NAME}", &format!("({})", NAME))
        .replace("{TITLE}", &format!(r"(\b(?i:{})\b)", TITLES));
    TextPattern {
        label,
        regex: Regex::new(&src).unwrap(),
        title_group,
        anchor,
    }
}

static PATTERNS: LazyLock<Vec<TextPattern>> = LazyLock::new(|| {
    vec![
        pattern(
            "name_dash_title",
            r"{NAME}(?:[ \t]*[-–—|:][ \t]*|[ \t]*\r?\n\s*|[ \t]+){TITLE}",
            2,
            Anchor::End,
        ),
        pattern("title_colon_name", r"{TITLE}[ \t]*[:\-–—][ \t]*{NAME}", 1, Anchor::Start),
        pattern("name_paren_title", r"{NAME}\s*[\(\[]\s*{TITLE}\s*[\)\]]", 2, Anchor::End),
        pattern(
            "name_serves_as_title",
            r"{NAME}\s+(?i:serves as|is the|is our|acts as)\s+(?i:(?:our|the)\s+)?{TITLE}",
            2,
            Anchor::End,
        ),
        pattern("name_comma_title", r"{NAME},[ \t]*{TITLE}", 2, Anchor::End),
        pattern("title_name", r"{TITLE}[ \t]+{NAME}", 1, Anchor::Start),
    ]
});

pub fn patterns() -> &'static [TextPattern] {
    &PATTERNS
}

/// Pick (name, title) from the two captures. The declared title group wins
/// unless only the other capture carries a role keyword.
pub fn split_groups<'a>(first: &'a str, second: &'a str, title_group: usize) -> (&'a str, &'a str) {
    let (name, title) = if title_group == 1 {
        (second, first)
    } else {
        (first, second)
    };
    if !contains_executive_title(title) && contains_executive_title(name) {
        (title, name)
    } else {
        (name, title)
    }
}

/// Longest plausible name inside an over-captured span, trimmed from the loose end.
pub fn best_name(span: &str, anchor: Anchor) -> Option<String> {
    let words: Vec<&str> = span.split_whitespace().collect();
    for n in (2..=words.len()).rev() {
        let slice = match anchor {
            Anchor::End => &words[words.len() - n..],
            Anchor::Start => &words[..n],
        };
        let candidate = slice.join(" ");
        if is_plausible_name(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// Apply every pattern to `text`, tagging results with `kind`.
pub fn parse_text(text: &str, locator: &str, kind: SourceKind) -> Vec<CandidateRecord> {
    let mut seen = SeenSet::default();
    let mut records = Vec::new();

    for p in patterns() {
        for caps in p.regex.captures_iter(text) {
            let (Some(a), Some(b)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let (raw_name, title) = split_groups(a.as_str(), b.as_str(), p.title_group);
            let Some(name) = best_name(raw_name, p.anchor) else {
                continue;
            };

            let record = CandidateRecord::new(&name, title, kind, locator);
            if seen.first_sighting(&record) {
                records.push(record);
            }
        }
    }

    records
}

/// Bidirectional "name with title" patterns over the page's plain text.
pub struct FreeTextPatterns {
    kind: SourceKind,
}

impl FreeTextPatterns {
    pub fn site() -> Self {
        FreeTextPatterns {
            kind: SourceKind::FreeText,
        }
    }

    /// Same patterns over trusted documents; results are tagged High.
    pub fn authoritative() -> Self {
        FreeTextPatterns {
            kind: SourceKind::AuthoritativeDocument,
        }
    }
}

impl CandidateExtractor for FreeTextPatterns {
    fn name(&self) -> &'static str {
        match self.kind {
            SourceKind::AuthoritativeDocument => "authoritative_text",
            _ => "free_text",
        }
    }

    fn extract(&self, page: &PageContent) -> Vec<CandidateRecord> {
        parse_text(&page.plain_text(), &page.locator, self.kind)
    }
}
