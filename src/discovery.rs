//! Finds the pages on a company site most likely to list its leadership.

use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::{info, warn};
use url::Url;

use crate::collab::{PageFetcher, WebSearch};
use crate::error::CollabResult;
use crate::model::ScopeHint;
use crate::relevance::{rank_pages, PageLead};
use crate::sitemap::fetch_sitemap_urls;
use crate::text::element_text;

/// Search stops issuing queries once this many pages were accepted.
pub const ACCEPTED_LIMIT: usize = 15;
pub const RESULTS_PER_QUERY: usize = 10;

const LEADERSHIP_PATHS: &[&str] = &[
    "/leadership", "/team", "/management", "/executives", "/about/leadership", "/company/team",
    "/our-team", "/about/management", "/corporate/leadership", "/people", "/about/team",
    "/company/leadership", "/company/management", "/corporate/team", "/our-leadership",
    "/our-management", "/about/executives", "/company/executives", "/board", "/governance",
    "/corporate-governance", "/investor-relations",
];

const LEADERSHIP_LINK_KEYWORDS: &[&str] = &[
    "leadership", "team", "management", "executives", "our people", "board of directors",
    "c-suite", "officers", "key personnel", "about us", "governance",
];

static ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Ranked pages plus how they were found.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub via: &'static str,
    pub found: usize,
    pub ranked: Vec<(PageLead, u32)>,
}

impl Discovery {
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.ranked.iter().map(|(lead, _)| lead.url.as_str())
    }
}

/// Accepts bare domains ("acme.com") as well as full URLs.
pub fn parse_website(website: &str) -> CollabResult<Url> {
    let trimmed = website.trim();
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };
    Ok(Url::parse(&with_scheme)?)
}

/// `site:` queries, global-leadership variants first for a global-only hint.
pub fn search_queries(domain: &str, scope: Option<&ScopeHint>) -> Vec<String> {
    let global_only = scope.is_some_and(ScopeHint::is_global_only);
    let terms: &[&str] = if global_only {
        &[
            "\"global leadership\"",
            "\"corporate leadership\"",
            "\"executive leadership\"",
            "\"senior leadership\"",
            "\"board of directors\"",
            "\"executive team\"",
            "\"leadership team\"",
            "\"management team\"",
            "\"about us\"",
            "leadership",
            "\"our team\"",
            "executives",
            "\"chief executive officer\"",
            "\"chief financial officer\"",
            "\"worldwide\" leadership",
        ]
    } else {
        &[
            "\"about us\"",
            "leadership",
            "\"our team\"",
            "\"management team\"",
            "executives",
            "\"executive team\"",
            "\"leadership team\"",
            "\"senior management\"",
            "\"board of directors\"",
            "CEO CFO CTO COO",
            "\"chief executive\" \"chief financial\"",
            "\"global leadership\"",
            "\"regional leadership\"",
        ]
    };
    terms
        .iter()
        .map(|t| format!("site:{} {}", domain, t))
        .collect()
}

/// Query the search collaborator, keep accepted hits, rank and cap them.
pub async fn discover_via_search(
    search: &dyn WebSearch,
    site: &Url,
    scope: Option<&ScopeHint>,
    cap: usize,
) -> Discovery {
    let domain = site.host_str().unwrap_or_default();
    let mut seen = HashSet::new();
    let mut accepted = Vec::new();

    for query in search_queries(domain, scope) {
        for hit in search.search(&query, RESULTS_PER_QUERY).await {
            let lead = PageLead::new(&hit.link, &hit.title, &hit.snippet);
            if lead.url.is_empty() || !lead.is_candidate() || !seen.insert(lead.url.clone()) {
                continue;
            }
            info!(url = %lead.url, score = lead.score(), "search found leadership page");
            accepted.push(lead);
        }
        if accepted.len() >= ACCEPTED_LIMIT {
            break;
        }
    }

    let found = accepted.len();
    Discovery {
        via: "search",
        found,
        ranked: rank_pages(accepted, cap),
    }
}

pub fn is_leadership_path(href: &str) -> bool {
    let lower = href.to_lowercase();
    LEADERSHIP_PATHS.iter().any(|p| lower.contains(p))
}

/// Same-site anchors that point at leadership pages by path or link text.
pub fn leadership_links(html: &str, site: &Url) -> Vec<PageLead> {
    let doc = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut leads = Vec::new();

    for a in doc.select(&ANCHOR_SEL) {
        let href = a.value().attr("href").unwrap_or("").trim();
        let lower = href.to_lowercase();
        if href.is_empty()
            || lower.starts_with('#')
            || lower.starts_with("mailto:")
            || lower.starts_with("tel:")
            || lower.starts_with("javascript:")
        {
            continue;
        }

        let text = element_text(a);
        let text_lower = text.to_lowercase();
        let by_text = LEADERSHIP_LINK_KEYWORDS.iter().any(|k| text_lower.contains(k));
        if !is_leadership_path(href) && !by_text {
            continue;
        }

        let Ok(mut full) = site.join(href) else {
            continue;
        };
        full.set_fragment(None);
        if full.host_str() != site.host_str() || full == *site {
            continue;
        }
        if seen.insert(full.to_string()) {
            leads.push(PageLead::new(full.as_str(), &text, ""));
        }
    }

    leads
}

/// Homepage anchors plus sitemap entries, ranked and capped.
pub async fn discover_via_homepage(
    fetcher: &dyn PageFetcher,
    site: &Url,
    cap: usize,
) -> CollabResult<Discovery> {
    let home = fetcher.fetch(site.as_str()).await?;
    let mut leads = leadership_links(&home.body, site);

    match fetch_sitemap_urls(fetcher, site).await {
        Ok(urls) => leads.extend(
            urls.into_iter()
                .filter(|u| {
                    Url::parse(u)
                        .map(|parsed| {
                            parsed.host_str() == site.host_str() && is_leadership_path(parsed.path())
                        })
                        .unwrap_or(false)
                })
                .map(|u| PageLead::new(&u, "", "")),
        ),
        Err(e) => warn!(site = %site, error = %e, "sitemap unavailable"),
    }

    let ranked = rank_pages(leads, cap);
    Ok(Discovery {
        via: "homepage",
        found: ranked.len(),
        ranked,
    })
}
