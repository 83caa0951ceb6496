//! Ranks candidate pages by how likely they are to list company leadership.

use std::collections::HashSet;

const ABOUT_INDICATORS: &[&str] = &["about-us", "/about/", "about us"];
const LEADERSHIP_INDICATORS: &[&str] = &["/leadership/", "leadership"];
const TEAM_INDICATORS: &[&str] = &["/team/", "our team", "management team"];
const EXECUTIVE_TEAM_INDICATORS: &[&str] = &["/executives/", "executive team"];
const BOARD_INDICATORS: &[&str] = &["board of directors", "senior management"];

const CXO_MENTIONS: &[&str] = &[
    "ceo", "chief executive", "cfo", "chief financial", "cto", "chief technology", "coo",
    "chief operating", "cio", "chief information", "cmo", "chief marketing", "chro",
    "chief human resources", "clo", "chief legal", "cso", "chief strategy", "chief security",
    "cdo", "chief data", "chief digital", "cro", "chief revenue", "chief risk", "cpo",
    "chief product", "chief people", "cco", "chief compliance", "chief commercial",
    "chief customer", "cao", "chief administrative",
];

const LOCATION_INDICATORS: &[&str] = &[
    "global leadership", "regional leadership", "international executives",
    "worldwide management", "worldwide", "north america", "europe", "asia",
    "regional executives", "country leadership", "global team", "international team",
];

const STRONG_EXCLUSIONS: &[&str] = &[
    "careers", "jobs", "hiring", "news", "press", "blog", "events", "products", "services",
    "contact", "support", "legal", "privacy", "solutions", "resources", "insights", "guides",
];

const SOFT_EXCLUSIONS: &[&str] = &["podcast", "webinar", "certification", "training", "demo", "trial"];

const HIGH_PRIORITY_INDICATORS: &[&str] = &[
    "about us", "about-us", "/about/", "leadership", "our team", "management team",
    "executive team", "leadership team", "executives", "board of directors",
    "senior management",
];

const MEDIUM_PRIORITY_INDICATORS: &[&str] =
    &["team", "ceo", "cfo", "cto", "board", "directors", "officers", "senior"];

/// A page discovered by search or crawl, before it is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLead {
    pub url: String,
    pub title: String,
    pub snippet: String,
}

impl PageLead {
    pub fn new(url: &str, title: &str, snippet: &str) -> Self {
        PageLead {
            url: url.to_string(),
            title: title.to_string(),
            snippet: snippet.to_string(),
        }
    }

    pub fn is_candidate(&self) -> bool {
        is_leadership_candidate(&self.url, &self.title, &self.snippet)
    }

    pub fn score(&self) -> u32 {
        score_page(&self.url, &self.title, &self.snippet)
    }
}

fn combined_text(url: &str, title: &str, snippet: &str) -> String {
    format!("{} {} {}", url, title, snippet).to_lowercase()
}

fn any_in(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

fn count_in(text: &str, needles: &[&str]) -> usize {
    needles.iter().filter(|n| text.contains(*n)).count()
}

/// Additive relevance score, floored at zero.
pub fn score_page(url: &str, title: &str, snippet: &str) -> u32 {
    let text = combined_text(url, title, snippet);
    let mut score: i32 = 0;

    if any_in(&text, ABOUT_INDICATORS) {
        score += 10;
    }
    if any_in(&text, LEADERSHIP_INDICATORS) {
        score += 10;
    }
    if any_in(&text, TEAM_INDICATORS) {
        score += 8;
    }
    if any_in(&text, EXECUTIVE_TEAM_INDICATORS) {
        score += 8;
    }
    if any_in(&text, BOARD_INDICATORS) {
        score += 6;
    }

    score += match count_in(&text, CXO_MENTIONS) {
        0 => 0,
        1 => 4,
        2 => 6,
        _ => 8,
    };

    score += match count_in(&text, LOCATION_INDICATORS) {
        0 => 0,
        1 => 3,
        _ => 6,
    };

    if any_in(&text, STRONG_EXCLUSIONS) {
        score -= 5;
    }
    if any_in(&text, SOFT_EXCLUSIONS) {
        score -= 3;
    }

    score.max(0) as u32
}

/// Acceptance rule applied before a lead is ranked. Pages carrying an
/// exclusion term with no high-priority indicator are dropped outright;
/// otherwise a page needs one high-priority or two medium indicators.
pub fn is_leadership_candidate(url: &str, title: &str, snippet: &str) -> bool {
    let text = combined_text(url, title, snippet);
    let high = count_in(&text, HIGH_PRIORITY_INDICATORS);
    let medium = count_in(&text, MEDIUM_PRIORITY_INDICATORS);
    let excluded = any_in(&text, STRONG_EXCLUSIONS);

    if excluded && high == 0 {
        return false;
    }
    high > 0 || medium >= 2
}

/// De-duplicate by URL, sort by score descending (stable), keep the top `cap`.
pub fn rank_pages(leads: Vec<PageLead>, cap: usize) -> Vec<(PageLead, u32)> {
    let mut seen = HashSet::new();
    let mut scored: Vec<(PageLead, u32)> = leads
        .into_iter()
        .filter(|lead| seen.insert(lead.url.clone()))
        .map(|lead| {
            let score = lead.score();
            (lead, score)
        })
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.truncate(cap);
    scored
}
