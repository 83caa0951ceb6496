use serde::{Deserialize, Serialize};

use crate::roles::CanonicalRole;

/// Where a candidate was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    StructuredSection,
    FreeText,
    HtmlHeading,
    AuthoritativeDocument,
    ModelSuggested,
}

impl SourceKind {
    /// Confidence assigned at extraction time. Model suggestions carry their own.
    pub fn default_confidence(self) -> Confidence {
        match self {
            SourceKind::StructuredSection | SourceKind::AuthoritativeDocument => Confidence::High,
            SourceKind::FreeText | SourceKind::HtmlHeading | SourceKind::ModelSuggested => {
                Confidence::Medium
            }
        }
    }

    /// Precedence among site-derived kinds when two primary records disagree on a role.
    pub fn role_precedence(self) -> u8 {
        match self {
            SourceKind::AuthoritativeDocument => 4,
            SourceKind::StructuredSection => 3,
            SourceKind::HtmlHeading => 2,
            SourceKind::FreeText => 1,
            SourceKind::ModelSuggested => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    fn weight(self) -> u8 {
        match self {
            Confidence::High => 2,
            Confidence::Medium => 1,
            Confidence::Low => 0,
        }
    }

    /// Never lowers: returns whichever of the two is stronger.
    pub fn raise_to(self, other: Confidence) -> Confidence {
        if other.weight() > self.weight() {
            other
        } else {
            self
        }
    }

    /// Sort key with `High` first.
    pub fn sort_rank(self) -> u8 {
        2 - self.weight()
    }

    /// Lenient parse of collaborator-reported values ("high", "Medium", ...).
    pub fn parse_lenient(s: &str) -> Confidence {
        match s.trim().to_lowercase().as_str() {
            "high" => Confidence::High,
            "low" => Confidence::Low,
            _ => Confidence::Medium,
        }
    }
}

/// One raw (name, title) observation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub raw_name: String,
    pub raw_title: String,
    pub source_kind: SourceKind,
    pub source_locator: String,
    pub raw_confidence: Confidence,
    /// Short bio captured next to the name, when the source has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

impl CandidateRecord {
    pub fn new(name: &str, title: &str, kind: SourceKind, locator: &str) -> Self {
        CandidateRecord {
            raw_name: collapse_whitespace(name),
            raw_title: collapse_whitespace(title),
            source_kind: kind,
            source_locator: locator.to_string(),
            raw_confidence: kind.default_confidence(),
            background: None,
        }
    }

    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.raw_confidence = confidence;
        self
    }

    pub fn with_background(mut self, background: Option<String>) -> Self {
        self.background = background.filter(|b| !b.trim().is_empty());
        self
    }

    pub fn identity_key(&self) -> String {
        identity_key(&self.raw_name)
    }
}

/// Case-folded, whitespace-collapsed name used for de-duplication.
pub fn identity_key(name: &str) -> String {
    collapse_whitespace(name).to_lowercase()
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeTag {
    Global,
    Regional,
    Unknown,
}

/// Request-level scope preference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeHint {
    /// Prefer corporate/global leadership over regional executives.
    GlobalOnly,
    /// A location to mention to the model collaborator; no filtering.
    Region(String),
}

impl ScopeHint {
    /// US-located companies get the global-leadership policy.
    pub fn from_location(location: &str) -> Option<ScopeHint> {
        let loc = location.trim();
        if loc.is_empty() {
            None
        } else if loc.eq_ignore_ascii_case("us") || loc.eq_ignore_ascii_case("global") {
            Some(ScopeHint::GlobalOnly)
        } else {
            Some(ScopeHint::Region(loc.to_string()))
        }
    }

    pub fn is_global_only(&self) -> bool {
        matches!(self, ScopeHint::GlobalOnly)
    }
}

/// Which tier first produced a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileOrigin {
    Primary,
    DocumentOnly,
}

/// How a record relates to the profile it was folded into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvidenceNote {
    /// Site-derived sighting.
    Primary,
    /// Document record whose role agrees with the primary role.
    Verified,
    /// Document record whose role disagrees; the primary role stands.
    Discrepancy { observed_role: CanonicalRole },
    /// Document record for a document-only profile.
    Unverified,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub record: CandidateRecord,
    pub note: EvidenceNote,
}

/// A resolved executive.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutiveProfile {
    pub identity_key: String,
    pub display_name: String,
    pub canonical_role: CanonicalRole,
    pub raw_title: String,
    pub confidence: Confidence,
    pub origin: ProfileOrigin,
    /// Every record merged into this profile, in arrival order.
    pub provenance: Vec<Evidence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope_tag: Option<ScopeTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

impl ExecutiveProfile {
    /// Display label: the canonical role, or the raw title for `Other`.
    pub fn role_label(&self) -> String {
        match &self.canonical_role {
            CanonicalRole::Other(_) => self.raw_title.clone(),
            role => role.label().to_string(),
        }
    }

    pub fn render(&self) -> String {
        format!(
            "{} - {}",
            collapse_whitespace(&self.display_name),
            collapse_whitespace(&self.role_label())
        )
    }

    pub fn is_verified(&self) -> bool {
        self.provenance
            .iter()
            .any(|e| matches!(e.note, EvidenceNote::Verified))
    }
}
