use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Fixed executive role vocabulary. `Other` keeps the raw title verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum CanonicalRole {
    Ceo,
    President,
    Cfo,
    Coo,
    Cto,
    Cmo,
    Chro,
    Clo,
    Chairman,
    ViceChairman,
    Cio,
    Cso,
    Cdo,
    Cro,
    Cpo,
    Cco,
    Cao,
    ChiefInnovationOfficer,
    ChiefInvestmentOfficer,
    ChiefTransformationOfficer,
    Founder,
    ManagingDirector,
    ExecutiveDirector,
    Evp,
    Svp,
    VicePresident,
    Other(String),
}

/// Every non-`Other` role in display-priority order.
const DISPLAY_ORDER: &[CanonicalRole] = &[
    CanonicalRole::Ceo,
    CanonicalRole::President,
    CanonicalRole::Cfo,
    CanonicalRole::Coo,
    CanonicalRole::Cto,
    CanonicalRole::Cmo,
    CanonicalRole::Chro,
    CanonicalRole::Clo,
    CanonicalRole::Chairman,
    CanonicalRole::ViceChairman,
    CanonicalRole::Cio,
    CanonicalRole::Cso,
    CanonicalRole::Cdo,
    CanonicalRole::Cro,
    CanonicalRole::Cpo,
    CanonicalRole::Cco,
    CanonicalRole::Cao,
    CanonicalRole::ChiefInnovationOfficer,
    CanonicalRole::ChiefInvestmentOfficer,
    CanonicalRole::ChiefTransformationOfficer,
    CanonicalRole::Founder,
    CanonicalRole::ManagingDirector,
    CanonicalRole::ExecutiveDirector,
    CanonicalRole::Evp,
    CanonicalRole::Svp,
    CanonicalRole::VicePresident,
];

impl CanonicalRole {
    pub fn label(&self) -> &str {
        match self {
            CanonicalRole::Ceo => "CEO",
            CanonicalRole::President => "President",
            CanonicalRole::Cfo => "CFO",
            CanonicalRole::Coo => "COO",
            CanonicalRole::Cto => "CTO",
            CanonicalRole::Cmo => "CMO",
            CanonicalRole::Chro => "CHRO",
            CanonicalRole::Clo => "CLO",
            CanonicalRole::Chairman => "Chairman",
            CanonicalRole::ViceChairman => "Vice Chairman",
            CanonicalRole::Cio => "CIO",
            CanonicalRole::Cso => "CSO",
            CanonicalRole::Cdo => "CDO",
            CanonicalRole::Cro => "CRO",
            CanonicalRole::Cpo => "CPO",
            CanonicalRole::Cco => "CCO",
            CanonicalRole::Cao => "CAO",
            CanonicalRole::ChiefInnovationOfficer => "Chief Innovation Officer",
            CanonicalRole::ChiefInvestmentOfficer => "Chief Investment Officer",
            CanonicalRole::ChiefTransformationOfficer => "Chief Transformation Officer",
            CanonicalRole::Founder => "Founder",
            CanonicalRole::ManagingDirector => "Managing Director",
            CanonicalRole::ExecutiveDirector => "Executive Director",
            CanonicalRole::Evp => "EVP",
            CanonicalRole::Svp => "SVP",
            CanonicalRole::VicePresident => "Vice President",
            CanonicalRole::Other(raw) => raw,
        }
    }

    /// Display priority, 0 = CEO. `Other` sorts last.
    pub fn rank(&self) -> usize {
        DISPLAY_ORDER
            .iter()
            .position(|r| r == self)
            .unwrap_or(DISPLAY_ORDER.len())
    }

    pub fn is_other(&self) -> bool {
        matches!(self, CanonicalRole::Other(_))
    }

    /// C-suite plus the top of the house (President, Chairman).
    pub fn is_c_level(&self) -> bool {
        matches!(
            self,
            CanonicalRole::Ceo
                | CanonicalRole::President
                | CanonicalRole::Cfo
                | CanonicalRole::Coo
                | CanonicalRole::Cto
                | CanonicalRole::Cmo
                | CanonicalRole::Chro
                | CanonicalRole::Clo
                | CanonicalRole::Chairman
                | CanonicalRole::Cio
                | CanonicalRole::Cso
                | CanonicalRole::Cdo
                | CanonicalRole::Cro
                | CanonicalRole::Cpo
                | CanonicalRole::Cco
                | CanonicalRole::Cao
                | CanonicalRole::ChiefInnovationOfficer
                | CanonicalRole::ChiefInvestmentOfficer
                | CanonicalRole::ChiefTransformationOfficer
        )
    }
}

impl From<CanonicalRole> for String {
    fn from(role: CanonicalRole) -> String {
        role.label().to_string()
    }
}

impl From<String> for CanonicalRole {
    fn from(label: String) -> CanonicalRole {
        DISPLAY_ORDER
            .iter()
            .find(|r| r.label() == label)
            .cloned()
            .unwrap_or(CanonicalRole::Other(label))
    }
}

struct RoleRule {
    role: CanonicalRole,
    patterns: Vec<Regex>,
    unless: Option<Regex>,
}

fn rule(role: CanonicalRole, patterns: &[&str]) -> RoleRule {
    RoleRule {
        role,
        patterns: patterns
            .iter()
            .map(|p| Regex::new(&format!("(?i){}", p)).unwrap())
            .collect(),
        unless: None,
    }
}

// Declaration order is match order: specific titles sit above looser ones
// ("Vice Chairman" above "Chairman", EVP/SVP/VP above "President").
static RULES: LazyLock<Vec<RoleRule>> = LazyLock::new(|| {
    let mut md = rule(
        CanonicalRole::ManagingDirector,
        &[r"managing director", r"\bmd\b", r"managing dir\b"],
    );
    md.unless = Some(Regex::new(r"(?i)medical").unwrap());

    vec![
        rule(
            CanonicalRole::Ceo,
            &[
                r"chief executive officer",
                r"\bceo\b",
                r"president (?:and|&) ceo",
                r"chief executive",
            ],
        ),
        rule(
            CanonicalRole::Cfo,
            &[
                r"chief financial officer",
                r"\bcfo\b",
                r"chief finance officer",
                r"finance director",
                r"financial director",
            ],
        ),
        rule(
            CanonicalRole::Cto,
            &[
                r"chief technology officer",
                r"\bcto\b",
                r"chief technical officer",
                r"technology director",
                r"technical director",
            ],
        ),
        rule(
            CanonicalRole::Coo,
            &[
                r"chief operating officer",
                r"\bcoo\b",
                r"chief operations officer",
                r"operations director",
                r"operating officer",
            ],
        ),
        rule(
            CanonicalRole::Cio,
            &[
                r"chief information officer",
                r"\bcio\b",
                r"chief info officer",
                r"information director",
                r"\bit director",
            ],
        ),
        rule(
            CanonicalRole::Cmo,
            &[
                r"chief marketing officer",
                r"\bcmo\b",
                r"marketing director",
                r"chief marketing",
                r"head of marketing",
            ],
        ),
        rule(
            CanonicalRole::Chro,
            &[
                r"chief human resources officer",
                r"\bchro\b",
                r"\bhr director",
                r"human resources director",
                r"people director",
                r"chief people officer",
            ],
        ),
        rule(
            CanonicalRole::Clo,
            &[
                r"chief legal officer",
                r"\bclo\b",
                r"general counsel",
                r"legal director",
                r"head of legal",
                r"chief counsel",
            ],
        ),
        rule(
            CanonicalRole::Cso,
            &[
                r"chief strategy officer",
                r"chief strategy",
                r"strategy director",
                r"chief security officer",
                r"chief security",
                r"security director",
                r"\bcso\b",
            ],
        ),
        rule(
            CanonicalRole::Cdo,
            &[
                r"chief data officer",
                r"\bcdo\b",
                r"chief data",
                r"data director",
                r"chief digital officer",
                r"chief digital",
                r"digital director",
            ],
        ),
        rule(
            CanonicalRole::Cro,
            &[
                r"chief revenue officer",
                r"\bcro\b",
                r"chief revenue",
                r"revenue director",
                r"chief risk officer",
                r"chief risk",
                r"risk director",
            ],
        ),
        rule(
            CanonicalRole::Cpo,
            &[
                r"chief product officer",
                r"chief product",
                r"product director",
                r"chief people",
                r"\bcpo\b",
            ],
        ),
        rule(
            CanonicalRole::Cco,
            &[
                r"chief compliance officer",
                r"\bcco\b",
                r"chief compliance",
                r"compliance director",
                r"chief commercial officer",
                r"chief commercial",
                r"commercial director",
                r"chief customer officer",
                r"chief customer",
                r"customer director",
            ],
        ),
        rule(
            CanonicalRole::Cao,
            &[
                r"chief administrative officer",
                r"\bcao\b",
                r"chief administrative",
                r"administrative director",
            ],
        ),
        rule(
            CanonicalRole::ChiefInnovationOfficer,
            &[r"chief innovation officer", r"chief innovation", r"innovation director"],
        ),
        rule(
            CanonicalRole::ChiefInvestmentOfficer,
            &[r"chief investment officer", r"chief investment", r"investment director"],
        ),
        rule(
            CanonicalRole::ChiefTransformationOfficer,
            &[
                r"chief transformation officer",
                r"chief transformation",
                r"transformation director",
            ],
        ),
        rule(
            CanonicalRole::Evp,
            &[r"executive vice president", r"\bevp\b", r"exec vice president"],
        ),
        rule(
            CanonicalRole::Svp,
            &[r"senior vice president", r"\bsvp\b", r"sr\.? vice president"],
        ),
        rule(
            CanonicalRole::ViceChairman,
            &[r"vice chairman", r"vice chairperson", r"vice chair\b"],
        ),
        rule(
            CanonicalRole::Chairman,
            &[
                r"chairman",
                r"chairperson",
                r"chair of the board",
                r"board chair\b",
                r"executive chair\b",
            ],
        ),
        rule(CanonicalRole::VicePresident, &[r"vice president", r"\bvp\b"]),
        rule(CanonicalRole::President, &[r"\bpresident\b"]),
        rule(
            CanonicalRole::Founder,
            &[r"\bfounder\b", r"co-founder", r"co founder", r"cofounder"],
        ),
        md,
        rule(CanonicalRole::ExecutiveDirector, &[r"executive director", r"exec director"]),
    ]
});

/// Map free-form title text to a canonical role. Total and deterministic:
/// unmatched or empty titles become `Other` with the title preserved.
pub fn standardize_role(title: &str) -> CanonicalRole {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return CanonicalRole::Other(String::new());
    }

    for rule in RULES.iter() {
        if let Some(unless) = &rule.unless {
            if unless.is_match(trimmed) {
                continue;
            }
        }
        if rule.patterns.iter().any(|p| p.is_match(trimmed)) {
            return rule.role.clone();
        }
    }

    CanonicalRole::Other(trimmed.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Phrase families treated as the same role when at least one side falls
/// outside the canonical vocabulary. Matched on word boundaries.
static ROLE_EQUIVALENCES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\b(?:ceo|chief executive officer|chief executive)\b",
        r"\b(?:cfo|chief financial officer|chief finance officer)\b",
        r"\b(?:cto|chief technology officer|chief technical officer)\b",
        r"\b(?:coo|chief operating officer|chief operations officer)\b",
        r"\b(?:chairman of the board|board chairman|executive chairman)\b",
    ]
    .iter()
    .map(|p| Regex::new(&format!("(?i){}", p)).unwrap())
    .collect()
});

/// Whether two titles describe the same role for verification purposes.
/// Two different canonical roles never match.
pub fn roles_match(title_a: &str, title_b: &str) -> bool {
    let role_a = standardize_role(title_a);
    let role_b = standardize_role(title_b);
    if !role_a.is_other() && !role_b.is_other() {
        return role_a == role_b;
    }

    let a = title_a.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    let b = title_b.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    if !a.is_empty() && a == b {
        return true;
    }

    ROLE_EQUIVALENCES
        .iter()
        .any(|family| family.is_match(&a) && family.is_match(&b))
}
