use crate::model::{ExecutiveProfile, ScopeTag};

const GLOBAL_INDICATORS: &[&str] = &[
    "global", "worldwide", "international", "corporate", "chief", "president", "chairman",
    "ceo", "cfo", "cto", "coo", "cio", "cmo", "chro", "clo", "cso", "cdo", "cro", "cpo",
    "cco", "cao", "founder",
];

const REGIONAL_INDICATORS: &[&str] = &[
    "canada", "canadian", "north america", "americas", "europe", "european", "emea", "apac",
    "asia", "asian", "pacific", "latin america", "regional", "country", "local", "division",
    "reno", "nevada", "toronto", "london", "singapore", "tokyo", "sydney", "india", "china",
    "germany", "france", "japan", "australia", "brazil", "mexico", "uk",
];

pub const GLOBAL_THRESHOLD: f64 = 1.0;

/// Profiles kept regardless of score so regional-only data never filters to nothing.
pub const DEFAULT_FLOOR: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScopeScore {
    pub global_hits: usize,
    pub regional_hits: usize,
    pub score: f64,
}

impl ScopeScore {
    pub fn tag(&self) -> ScopeTag {
        if self.regional_hits > 0 {
            ScopeTag::Regional
        } else if self.global_hits > 0 {
            ScopeTag::Global
        } else {
            ScopeTag::Unknown
        }
    }
}

fn count_words(text: &str, needles: &[&str]) -> usize {
    let words: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric() && c != '-')
        .filter(|w| !w.is_empty())
        .collect();
    needles
        .iter()
        .filter(|needle| {
            if needle.contains(' ') {
                text.contains(*needle)
            } else {
                words.iter().any(|w| w == *needle)
            }
        })
        .count()
}

pub fn score_profile(profile: &ExecutiveProfile) -> ScopeScore {
    let context = format!("{} {}", profile.raw_title, profile.display_name).to_lowercase();
    let global_hits = count_words(&context, GLOBAL_INDICATORS);
    let regional_hits = count_words(&context, REGIONAL_INDICATORS);

    let mut score = global_hits as f64 - 0.5 * regional_hits as f64;
    if profile.canonical_role.is_c_level() {
        score += 2.0;
    }

    ScopeScore {
        global_hits,
        regional_hits,
        score,
    }
}

/// Keep globally scoped profiles; below-threshold profiles fill up to `floor`.
///
/// Candidates are visited best score first, so the floor retains the
/// strongest of the regional profiles. Every returned profile carries a scope tag.
pub fn filter_for_global_scope(profiles: Vec<ExecutiveProfile>, floor: usize) -> Vec<ExecutiveProfile> {
    let mut scored: Vec<(ExecutiveProfile, ScopeScore)> = profiles
        .into_iter()
        .map(|p| {
            let s = score_profile(&p);
            (p, s)
        })
        .collect();
    scored.sort_by(|a, b| b.1.score.total_cmp(&a.1.score));

    let mut kept = Vec::with_capacity(scored.len());
    for (mut profile, s) in scored {
        if s.score >= GLOBAL_THRESHOLD || kept.len() < floor {
            profile.scope_tag = Some(s.tag());
            kept.push(profile);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CandidateRecord, Confidence, ProfileOrigin, SourceKind};
    use crate::roles::standardize_role;

    fn profile(name: &str, title: &str) -> ExecutiveProfile {
        let record = CandidateRecord::new(name, title, SourceKind::StructuredSection, "test");
        ExecutiveProfile {
            identity_key: record.identity_key(),
            display_name: name.to_string(),
            canonical_role: standardize_role(title),
            raw_title: title.to_string(),
            confidence: Confidence::High,
            origin: ProfileOrigin::Primary,
            provenance: vec![],
            scope_tag: None,
            background: None,
        }
    }

    #[test]
    fn c_level_scores_global() {
        let s = score_profile(&profile("Jane Doe", "Chief Executive Officer"));
        assert_eq!(s.global_hits, 1);
        assert!(s.score >= GLOBAL_THRESHOLD);
        assert_eq!(s.tag(), ScopeTag::Global);
    }

    #[test]
    fn regional_title_scores_low() {
        let s = score_profile(&profile("Tom Baker", "Country Manager, Canada"));
        assert_eq!(s.global_hits, 0);
        assert_eq!(s.regional_hits, 2);
        assert!(s.score < GLOBAL_THRESHOLD);
        assert_eq!(s.tag(), ScopeTag::Regional);
    }

    #[test]
    fn floor_keeps_some_regional_profiles() {
        let profiles = vec![
            profile("Aaron Able", "Sales Lead, Europe"),
            profile("Bella Brown", "Country Manager, Canada"),
            profile("Cora Clark", "Regional Director, Asia"),
        ];
        let kept = filter_for_global_scope(profiles, 2);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|p| p.scope_tag == Some(ScopeTag::Regional)));
    }

    #[test]
    fn globals_survive_beyond_floor() {
        let profiles = vec![
            profile("Aaron Able", "CEO"),
            profile("Bella Brown", "CFO"),
            profile("Cora Clark", "Global Head of Sales"),
            profile("Dan Drake", "Country Manager, Canada"),
        ];
        let kept = filter_for_global_scope(profiles, 1);
        assert_eq!(kept.len(), 3);
        assert!(!kept.iter().any(|p| p.display_name == "Dan Drake"));
    }
}
