use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::contains_executive_title;
use super::free_text::parse_text;
use crate::model::{CandidateRecord, Confidence, SourceKind};
use crate::names::is_plausible_name;

/// Line separators tried in order when the reply is not JSON.
const LINE_SEPARATORS: &[&str] = &[" - ", ": ", " – ", " — "];

/// One executive as reported by the analysis collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedExecutive {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub confidence: Option<String>,
    /// "location" in the comprehensive prompt, "scope" in the global one.
    #[serde(default, alias = "scope")]
    pub location: Option<String>,
}

impl SuggestedExecutive {
    /// Title with the reported location appended, e.g. "President (North America)".
    pub fn full_title(&self) -> String {
        let title = self.title.trim();
        match self.location.as_deref().map(str::trim) {
            Some(loc) if !loc.is_empty() => format!("{} ({})", title, loc),
            _ => title.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    executives: Vec<SuggestedExecutive>,
}

/// What the analysis collaborator returned.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutput {
    Structured(Vec<SuggestedExecutive>),
    Raw(String),
}

impl AnalysisOutput {
    /// Reads the JSON object between the first '{' and the last '}' of a
    /// model reply; anything else is kept raw for the text fallback.
    pub fn from_reply(reply: &str) -> AnalysisOutput {
        let (Some(start), Some(end)) = (reply.find('{'), reply.rfind('}')) else {
            return AnalysisOutput::Raw(reply.to_string());
        };
        if end < start {
            return AnalysisOutput::Raw(reply.to_string());
        }
        match serde_json::from_str::<Envelope>(&reply[start..=end]) {
            Ok(envelope) => AnalysisOutput::Structured(envelope.executives),
            Err(e) => {
                warn!(error = %e, "analysis reply is not valid JSON, using text fallback");
                AnalysisOutput::Raw(reply.to_string())
            }
        }
    }
}

/// True when a page produced too few candidates and the model should be asked.
pub fn needs_fallback(found: usize, threshold: usize) -> bool {
    found < threshold
}

/// Turn collaborator output into revalidated `ModelSuggested` records.
pub fn suggested_records(output: &AnalysisOutput, locator: &str) -> Vec<CandidateRecord> {
    match output {
        AnalysisOutput::Structured(list) => from_structured(list, locator),
        AnalysisOutput::Raw(text) => {
            let records = from_lines(text, locator);
            if records.is_empty() {
                parse_text(text, locator, SourceKind::ModelSuggested)
            } else {
                records
            }
        }
    }
}

fn from_structured(list: &[SuggestedExecutive], locator: &str) -> Vec<CandidateRecord> {
    list.iter()
        .filter_map(|exec| {
            let name = exec.name.trim();
            if name.is_empty() || exec.title.trim().is_empty() || !is_plausible_name(name) {
                return None;
            }
            let confidence = exec
                .confidence
                .as_deref()
                .map(Confidence::parse_lenient)
                .unwrap_or(Confidence::Medium);
            debug!(executive = name, title = %exec.full_title(), "model suggestion accepted");
            Some(
                CandidateRecord::new(name, &exec.full_title(), SourceKind::ModelSuggested, locator)
                    .with_confidence(confidence),
            )
        })
        .collect()
}

/// "Name - Title" style lines, markdown emphasis stripped.
fn from_lines(text: &str, locator: &str) -> Vec<CandidateRecord> {
    let mut records = Vec::new();
    for line in text.lines() {
        let line = line.trim().trim_start_matches(['-', '•']).trim_start();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        for sep in LINE_SEPARATORS {
            let Some((name, title)) = line.split_once(sep) else {
                continue;
            };
            let name = strip_emphasis(name);
            let title = strip_emphasis(title);
            if is_plausible_name(&name) && contains_executive_title(&title) {
                records.push(CandidateRecord::new(
                    &name,
                    &title,
                    SourceKind::ModelSuggested,
                    locator,
                ));
                break;
            }
        }
    }
    records
}

fn strip_emphasis(s: &str) -> String {
    s.replace('*', "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_inside_chatter() {
        let reply = r#"Here is what I found:
        {"executives": [
            {"name": "Jane Doe", "title": "Chief Executive Officer", "confidence": "High"},
            {"name": "Our Team", "title": "CFO"},
            {"name": "John Roe", "title": "President", "location": "North America", "confidence": "low"}
        ]}
        Let me know if you need more."#;
        let output = AnalysisOutput::from_reply(reply);
        let records = suggested_records(&output, "https://acme.com/team");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].raw_name, "Jane Doe");
        assert_eq!(records[0].raw_confidence, Confidence::High);
        assert_eq!(records[1].raw_title, "President (North America)");
        assert_eq!(records[1].raw_confidence, Confidence::Low);
        assert!(records.iter().all(|r| r.source_kind == SourceKind::ModelSuggested));
    }

    #[test]
    fn scope_field_is_location() {
        let output = AnalysisOutput::from_reply(
            r#"{"executives":[{"name":"Jane Doe","title":"CEO","scope":"Global/Corporate"}]}"#,
        );
        let records = suggested_records(&output, "u");
        assert_eq!(records[0].raw_title, "CEO (Global/Corporate)");
        assert_eq!(records[0].raw_confidence, Confidence::Medium);
    }

    #[test]
    fn malformed_json_falls_back_to_lines() {
        let reply = "{ executives: oops\n**Jane Doe** - Chief Executive Officer\nJohn Roe: CFO\nnothing here";
        let output = AnalysisOutput::from_reply(reply);
        assert!(matches!(output, AnalysisOutput::Raw(_)));
        let records = suggested_records(&output, "u");
        let pairs: Vec<(&str, &str)> = records
            .iter()
            .map(|r| (r.raw_name.as_str(), r.raw_title.as_str()))
            .collect();
        assert_eq!(pairs, vec![("Jane Doe", "Chief Executive Officer"), ("John Roe", "CFO")]);
    }

    #[test]
    fn prose_falls_back_to_patterns() {
        let output = AnalysisOutput::Raw("The company is led by Jane Doe (CEO) today.".to_string());
        let records = suggested_records(&output, "u");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].raw_name, "Jane Doe");
        assert_eq!(records[0].source_kind, SourceKind::ModelSuggested);
    }

    #[test]
    fn fallback_threshold() {
        assert!(needs_fallback(0, 3));
        assert!(needs_fallback(2, 3));
        assert!(!needs_fallback(3, 3));
    }
}
