use std::collections::HashMap;

use tracing::debug;

use crate::events::{EventKind, EventLog};
use crate::model::{
    CandidateRecord, Confidence, Evidence, EvidenceNote, ExecutiveProfile, ProfileOrigin,
    ScopeHint,
};
use crate::roles::{roles_match, standardize_role};
use crate::scope::{filter_for_global_scope, DEFAULT_FLOOR};

#[derive(Debug, Clone)]
pub struct MergeOptions {
    pub scope: Option<ScopeHint>,
    pub scope_floor: usize,
}

impl Default for MergeOptions {
    fn default() -> Self {
        MergeOptions {
            scope: None,
            scope_floor: DEFAULT_FLOOR,
        }
    }
}

/// Resolve site records (ground truth) and document records (corroboration)
/// into ranked profiles.
pub fn merge(primary: &[CandidateRecord], verification: &[CandidateRecord]) -> Vec<ExecutiveProfile> {
    merge_with(primary, verification, &MergeOptions::default(), &mut EventLog::new())
}

/// As [`merge`], with a scope policy and an event trail for merge decisions.
pub fn merge_with(
    primary: &[CandidateRecord],
    verification: &[CandidateRecord],
    options: &MergeOptions,
    log: &mut EventLog,
) -> Vec<ExecutiveProfile> {
    let mut book = ProfileBook::default();
    for record in primary {
        book.fold_primary(record);
    }
    for record in verification {
        book.fold_verification(record, log);
    }

    let mut profiles = book.profiles;
    if options.scope.as_ref().is_some_and(ScopeHint::is_global_only) {
        let before = profiles.len();
        profiles = filter_for_global_scope(profiles, options.scope_floor);
        log.record(EventKind::ScopeFiltered {
            before,
            after: profiles.len(),
        });
    }

    rank(&mut profiles);
    profiles
}

/// Primary before document-only, then confidence, then case-insensitive name.
pub fn rank(profiles: &mut [ExecutiveProfile]) {
    profiles.sort_by_cached_key(|p| {
        (
            origin_rank(p.origin),
            p.confidence.sort_rank(),
            p.display_name.to_lowercase(),
        )
    });
}

fn origin_rank(origin: ProfileOrigin) -> u8 {
    match origin {
        ProfileOrigin::Primary => 0,
        ProfileOrigin::DocumentOnly => 1,
    }
}

/// One profile per identity key, in first-sighting order.
#[derive(Default)]
struct ProfileBook {
    profiles: Vec<ExecutiveProfile>,
    index: HashMap<String, usize>,
}

impl ProfileBook {
    fn get_mut(&mut self, key: &str) -> Option<&mut ExecutiveProfile> {
        let idx = *self.index.get(key)?;
        self.profiles.get_mut(idx)
    }

    fn insert(&mut self, profile: ExecutiveProfile) {
        self.index
            .insert(profile.identity_key.clone(), self.profiles.len());
        self.profiles.push(profile);
    }

    fn fold_primary(&mut self, record: &CandidateRecord) {
        let key = record.identity_key();
        if key.is_empty() {
            return;
        }

        let Some(profile) = self.get_mut(&key) else {
            self.insert(new_profile(
                record,
                Confidence::High,
                ProfileOrigin::Primary,
                EvidenceNote::Primary,
            ));
            return;
        };

        if already_seen(profile, record) {
            return;
        }
        // A stronger site source may restate the role; weaker ones only corroborate.
        if !record.raw_title.is_empty()
            && record.source_kind.role_precedence() > role_holder_precedence(profile)
        {
            debug!(identity_key = %key, title = %record.raw_title, "role taken from stronger source");
            profile.canonical_role = standardize_role(&record.raw_title);
            profile.raw_title = record.raw_title.clone();
        }
        profile.confidence = profile.confidence.raise_to(Confidence::High);
        fill_background(profile, record);
        profile.provenance.push(Evidence {
            record: record.clone(),
            note: EvidenceNote::Primary,
        });
    }

    fn fold_verification(&mut self, record: &CandidateRecord, log: &mut EventLog) {
        let key = record.identity_key();
        if key.is_empty() {
            return;
        }

        let Some(profile) = self.get_mut(&key) else {
            self.insert(new_profile(
                record,
                Confidence::Medium,
                ProfileOrigin::DocumentOnly,
                EvidenceNote::Unverified,
            ));
            log.record(EventKind::DocumentOnlyAdded { identity_key: key });
            return;
        };

        if already_seen(profile, record) {
            return;
        }

        let note = match profile.origin {
            ProfileOrigin::DocumentOnly => EvidenceNote::Unverified,
            ProfileOrigin::Primary if roles_match(&profile.raw_title, &record.raw_title) => {
                profile.confidence = profile.confidence.raise_to(Confidence::High);
                log.record(EventKind::ProfileVerified {
                    identity_key: key,
                });
                EvidenceNote::Verified
            }
            ProfileOrigin::Primary => {
                let observed_role = standardize_role(&record.raw_title);
                log.record(EventKind::RoleDiscrepancy {
                    identity_key: key,
                    primary_role: profile.role_label(),
                    observed_role: observed_role.label().to_string(),
                });
                EvidenceNote::Discrepancy { observed_role }
            }
        };
        fill_background(profile, record);
        profile.provenance.push(Evidence {
            record: record.clone(),
            note,
        });
    }
}

/// First background seen wins.
fn fill_background(profile: &mut ExecutiveProfile, record: &CandidateRecord) {
    if profile.background.is_none() {
        profile.background = record.background.clone();
    }
}

fn new_profile(
    record: &CandidateRecord,
    confidence: Confidence,
    origin: ProfileOrigin,
    note: EvidenceNote,
) -> ExecutiveProfile {
    ExecutiveProfile {
        identity_key: record.identity_key(),
        display_name: record.raw_name.clone(),
        canonical_role: standardize_role(&record.raw_title),
        raw_title: record.raw_title.clone(),
        confidence,
        origin,
        provenance: vec![Evidence {
            record: record.clone(),
            note,
        }],
        scope_tag: None,
        background: record.background.clone(),
    }
}

fn already_seen(profile: &ExecutiveProfile, record: &CandidateRecord) -> bool {
    profile.provenance.iter().any(|e| &e.record == record)
}

/// Precedence of the source that currently holds the profile's role.
fn role_holder_precedence(profile: &ExecutiveProfile) -> u8 {
    profile
        .provenance
        .iter()
        .filter(|e| e.note == EvidenceNote::Primary && e.record.raw_title == profile.raw_title)
        .map(|e| e.record.source_kind.role_precedence())
        .max()
        .unwrap_or(0)
}

/// "Name - Role" lines ordered by canonical role rank; ties keep merge order.
pub fn format_for_output(profiles: &[ExecutiveProfile]) -> Vec<String> {
    let mut ordered: Vec<&ExecutiveProfile> = profiles.iter().collect();
    ordered.sort_by_key(|p| p.canonical_role.rank());
    ordered.into_iter().map(ExecutiveProfile::render).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ScopeTag, SourceKind};
    use crate::roles::CanonicalRole;

    fn site(name: &str, title: &str) -> CandidateRecord {
        CandidateRecord::new(name, title, SourceKind::StructuredSection, "https://acme.com/leadership")
    }

    fn doc(name: &str, title: &str) -> CandidateRecord {
        CandidateRecord::new(name, title, SourceKind::AuthoritativeDocument, "def-14a")
    }

    #[test]
    fn same_record_twice_is_one_profile() {
        let r = site("Jane Doe", "CEO");
        let profiles = merge(&[r.clone(), r], &[]);
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].provenance.len(), 1);
    }

    #[test]
    fn identity_ignores_case_and_spacing() {
        let profiles = merge(&[site("Jane Doe", "CEO"), site("JANE  doe", "Chief Executive Officer")], &[]);
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].provenance.len(), 2);
        assert_eq!(profiles[0].display_name, "Jane Doe");
    }

    #[test]
    fn verification_agrees() {
        let mut log = EventLog::new();
        let profiles = merge_with(
            &[site("Jane Doe", "Chief Executive Officer")],
            &[doc("Jane Doe", "CEO")],
            &MergeOptions::default(),
            &mut log,
        );
        assert_eq!(profiles.len(), 1);
        let p = &profiles[0];
        assert_eq!(p.confidence, Confidence::High);
        assert_eq!(p.canonical_role, CanonicalRole::Ceo);
        assert_eq!(p.provenance.len(), 2);
        assert_eq!(p.provenance[1].note, EvidenceNote::Verified);
        assert!(p.is_verified());
        assert!(log
            .kinds()
            .any(|k| matches!(k, EventKind::ProfileVerified { .. })));
    }

    #[test]
    fn verification_disagrees_primary_wins() {
        let mut log = EventLog::new();
        let profiles = merge_with(
            &[site("Jane Doe", "CFO")],
            &[doc("Jane Doe", "COO")],
            &MergeOptions::default(),
            &mut log,
        );
        let p = &profiles[0];
        assert_eq!(p.canonical_role, CanonicalRole::Cfo);
        assert_eq!(p.raw_title, "CFO");
        assert_eq!(p.confidence, Confidence::High);
        assert_eq!(p.provenance.len(), 2);
        assert_eq!(
            p.provenance[1].note,
            EvidenceNote::Discrepancy {
                observed_role: CanonicalRole::Coo
            }
        );
        assert!(log
            .kinds()
            .any(|k| matches!(k, EventKind::RoleDiscrepancy { .. })));
    }

    #[test]
    fn different_directors_are_a_discrepancy() {
        let mut log = EventLog::new();
        let profiles = merge_with(
            &[site("Jane Doe", "Finance Director"), site("John Roe", "Vice Chairman")],
            &[doc("Jane Doe", "Marketing Director"), doc("John Roe", "Chairman")],
            &MergeOptions::default(),
            &mut log,
        );
        let jane = profiles.iter().find(|p| p.display_name == "Jane Doe").unwrap();
        assert_eq!(jane.canonical_role, CanonicalRole::Cfo);
        assert_eq!(
            jane.provenance[1].note,
            EvidenceNote::Discrepancy {
                observed_role: CanonicalRole::Cmo
            }
        );
        assert!(!jane.is_verified());

        let john = profiles.iter().find(|p| p.display_name == "John Roe").unwrap();
        assert!(matches!(john.provenance[1].note, EvidenceNote::Discrepancy { .. }));
        assert!(!log
            .kinds()
            .any(|k| matches!(k, EventKind::ProfileVerified { .. })));
    }

    #[test]
    fn svp_does_not_verify_president_and_ceo() {
        let profiles = merge(
            &[site("Jane Doe", "President and CEO")],
            &[doc("Jane Doe", "Senior Vice President")],
        );
        assert_eq!(profiles[0].canonical_role, CanonicalRole::Ceo);
        assert!(!profiles[0].is_verified());
    }

    #[test]
    fn document_background_fills_site_profile() {
        let bio = "Ms. Doe has led the company since 2015 and previously ran its European arm.";
        let profiles = merge(
            &[site("Jane Doe", "Chief Executive Officer")],
            &[doc("Jane Doe", "CEO").with_background(Some(bio.to_string()))],
        );
        assert_eq!(profiles[0].background.as_deref(), Some(bio));

        let own = "Jane founded the company in her garage and still writes code on weekends.";
        let profiles = merge(
            &[site("Jane Doe", "Chief Executive Officer").with_background(Some(own.to_string()))],
            &[doc("Jane Doe", "CEO").with_background(Some(bio.to_string()))],
        );
        assert_eq!(profiles[0].background.as_deref(), Some(own));
    }

    #[test]
    fn document_only_is_medium() {
        let profiles = merge(&[], &[doc("John Roe", "President")]);
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].confidence, Confidence::Medium);
        assert_eq!(profiles[0].origin, ProfileOrigin::DocumentOnly);
        assert_eq!(profiles[0].canonical_role, CanonicalRole::President);
    }

    #[test]
    fn corroborated_document_only_stays_medium() {
        let profiles = merge(
            &[],
            &[doc("John Roe", "President"), CandidateRecord::new("John Roe", "President", SourceKind::AuthoritativeDocument, "10-k")],
        );
        assert_eq!(profiles[0].confidence, Confidence::Medium);
        assert_eq!(profiles[0].provenance.len(), 2);
    }

    #[test]
    fn ordering_by_tier_then_name() {
        let profiles = merge(
            &[site("Zelda Young", "CFO"), site("Aaron Able", "CEO")],
            &[doc("Bob Brown", "COO")],
        );
        let names: Vec<&str> = profiles.iter().map(|p| p.display_name.as_str()).collect();
        assert_eq!(names, vec!["Aaron Able", "Zelda Young", "Bob Brown"]);
    }

    #[test]
    fn stronger_site_source_restates_role() {
        let heading = CandidateRecord::new("Jane Doe", "Head of Growth", SourceKind::FreeText, "u");
        let card = site("Jane Doe", "Chief Marketing Officer");
        let profiles = merge(&[heading, card], &[]);
        assert_eq!(profiles[0].canonical_role, CanonicalRole::Cmo);

        let card = site("Jane Doe", "Chief Marketing Officer");
        let text = CandidateRecord::new("Jane Doe", "Head of Growth", SourceKind::FreeText, "u");
        let profiles = merge(&[card, text], &[]);
        assert_eq!(profiles[0].canonical_role, CanonicalRole::Cmo);
        assert_eq!(profiles[0].provenance.len(), 2);
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(merge(&[], &[]).is_empty());
    }

    #[test]
    fn global_scope_filters_and_tags() {
        let primary = vec![
            site("Jane Doe", "Chief Executive Officer"),
            site("Aaron Able", "Sales Lead, Europe"),
            site("Bella Brown", "Country Manager, Canada"),
        ];
        let options = MergeOptions {
            scope: Some(ScopeHint::GlobalOnly),
            scope_floor: 2,
        };
        let mut log = EventLog::new();
        let profiles = merge_with(&primary, &[], &options, &mut log);
        assert_eq!(profiles.len(), 2);
        assert!(profiles.iter().any(|p| p.display_name == "Jane Doe"
            && p.scope_tag == Some(ScopeTag::Global)));
        assert!(log
            .kinds()
            .any(|k| *k == EventKind::ScopeFiltered { before: 3, after: 2 }));
    }

    #[test]
    fn regional_hint_does_not_filter() {
        let options = MergeOptions {
            scope: Some(ScopeHint::Region("UK".into())),
            scope_floor: 0,
        };
        let profiles = merge_with(
            &[site("Aaron Able", "Sales Lead, Europe")],
            &[],
            &options,
            &mut EventLog::new(),
        );
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].scope_tag, None);
    }

    #[test]
    fn output_lines_by_role_rank() {
        let profiles = merge(
            &[
                site("Aaron Able", "Chief Financial Officer"),
                site("Cora Clark", "Head of Design"),
                site("Zelda Young", "Chief Executive Officer"),
            ],
            &[],
        );
        assert_eq!(
            format_for_output(&profiles),
            vec![
                "Zelda Young - CEO".to_string(),
                "Aaron Able - CFO".to_string(),
                "Cora Clark - Head of Design".to_string(),
            ]
        );
    }
}
