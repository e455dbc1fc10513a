//! Per-artifact validation rules.
//!
//! The rule set is fixed and declarative: each required artifact maps to an
//! ordered list of [`ContentRule`] variants evaluated against the parsed
//! representation. Rules yield warnings and, for the event log only, a
//! hard failure. Warnings accumulate and never abort evaluation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::pack::{Artifact, ArtifactFormat, RequiredArtifactSpec};
use crate::parse::{parse_event_log, parse_structured_document, EventLog, StructuredDocument};

/// Word-count floor for the technical domains document.
pub const MIN_TECHNICAL_WORD_COUNT: usize = 50;

/// Sections every persona document should carry.
pub const PERSONA_TOPICS: &[&str] = &["Identity", "Tone", "Behavior", "Self-Understanding"];

/// Primary collaborator expected in the relationship document.
pub const PRIMARY_COLLABORATOR: &str = "John";

/// A single content rule applied to a parsed artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRule {
    /// Warn when the content does not begin with a header marker.
    LeadingHeader,
    /// Warn for each listed topic absent from the content
    /// (case-insensitive substring match).
    RequireTopics(&'static [&'static str]),
    /// Warn when the named collaborator is never mentioned (case-insensitive).
    MentionCollaborator(&'static str),
    /// Warn when the word count falls below the floor.
    MinWordCount(usize),
    /// Hard-fail when the event log contains any malformed line.
    NoInvalidRecords,
}

/// Fixed rule dispatch: artifact name to ordered rule list.
///
/// The generic `LeadingHeader` rule runs first for every structured
/// document; artifact-specific rules follow.
pub fn rules_for(name: &str) -> &'static [ContentRule] {
    match name {
        "persona.md" => &[
            ContentRule::LeadingHeader,
            ContentRule::RequireTopics(PERSONA_TOPICS),
        ],
        "relationship_dynamics.md" => &[
            ContentRule::LeadingHeader,
            ContentRule::MentionCollaborator(PRIMARY_COLLABORATOR),
        ],
        "technical_domains.md" => &[
            ContentRule::LeadingHeader,
            ContentRule::MinWordCount(MIN_TECHNICAL_WORD_COUNT),
        ],
        // No specific rule beyond the generic structural check.
        "stylistic_voice.md" => &[ContentRule::LeadingHeader],
        "runtime_observations.jsonl" => &[ContentRule::NoInvalidRecords],
        _ => &[],
    }
}

/// A non-fatal finding against one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleWarning {
    pub artifact_name: String,
    pub message: String,
}

/// Full validation outcome for one artifact: structure, content, metrics.
///
/// `valid` is false only for a hard-failure condition: the artifact is
/// missing, unreadable, or an event log with at least one malformed line.
/// Warnings alone never flip `valid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactValidation {
    pub artifact_name: String,
    pub description: String,
    pub exists: bool,
    pub readable: bool,
    pub size_bytes: u64,
    pub valid: bool,
    pub warnings: Vec<RuleWarning>,
    pub metrics: BTreeMap<String, u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

enum Parsed {
    Document(StructuredDocument),
    Log(EventLog),
}

/// Evaluate the fixed rule set for one artifact.
///
/// Rules never run on missing or unreadable content; the captured error
/// is the sole finding there, and the artifact hard-fails.
pub fn evaluate_artifact(artifact: &Artifact, spec: &RequiredArtifactSpec) -> ArtifactValidation {
    let mut validation = ArtifactValidation {
        artifact_name: artifact.name.clone(),
        description: spec.description.to_string(),
        exists: artifact.exists,
        readable: artifact.readable,
        size_bytes: artifact.size_bytes,
        valid: true,
        warnings: Vec::new(),
        metrics: BTreeMap::new(),
        error: None,
    };

    if !artifact.exists {
        validation.valid = false;
        validation.error = Some("artifact missing".to_string());
        return validation;
    }

    let Some(content) = artifact.raw_content.as_deref() else {
        validation.valid = false;
        validation.error = Some(
            artifact
                .error
                .clone()
                .unwrap_or_else(|| "artifact unreadable".to_string()),
        );
        return validation;
    };

    let parsed = match spec.format {
        ArtifactFormat::StructuredDocument => {
            let doc = parse_structured_document(content);
            validation
                .metrics
                .insert("header_count".to_string(), doc.headers.len() as u64);
            validation
                .metrics
                .insert("word_count".to_string(), doc.word_count as u64);
            validation
                .metrics
                .insert("line_count".to_string(), doc.line_count as u64);
            Parsed::Document(doc)
        }
        ArtifactFormat::EventLog => {
            let log = parse_event_log(content);
            validation
                .metrics
                .insert("total_lines".to_string(), log.total_lines as u64);
            validation.metrics.insert(
                "valid_json_lines".to_string(),
                log.valid_record_count as u64,
            );
            validation
                .metrics
                .insert("invalid_lines".to_string(), log.invalid_lines.len() as u64);
            Parsed::Log(log)
        }
    };

    for rule in rules_for(&artifact.name) {
        apply_rule(rule, content, &parsed, &mut validation);
    }

    validation
}

fn apply_rule(rule: &ContentRule, content: &str, parsed: &Parsed, out: &mut ArtifactValidation) {
    match (rule, parsed) {
        (ContentRule::LeadingHeader, Parsed::Document(doc)) => {
            if !doc.has_leading_header {
                warn(out, "Missing main header".to_string());
            }
        }
        (ContentRule::RequireTopics(topics), Parsed::Document(_)) => {
            let lower = content.to_lowercase();
            for topic in *topics {
                if !lower.contains(&topic.to_lowercase()) {
                    warn(out, format!("Missing recommended section: {topic}"));
                }
            }
        }
        (ContentRule::MentionCollaborator(name), Parsed::Document(_)) => {
            if !content.to_lowercase().contains(&name.to_lowercase()) {
                warn(out, format!("No reference to primary collaborator {name}"));
            }
        }
        (ContentRule::MinWordCount(floor), Parsed::Document(doc)) => {
            if doc.word_count < *floor {
                warn(out, "Technical domains seem underdeveloped".to_string());
            }
        }
        (ContentRule::NoInvalidRecords, Parsed::Log(log)) => {
            for invalid in &log.invalid_lines {
                warn(
                    out,
                    format!(
                        "Invalid JSON on line {}: {}",
                        invalid.line_number, invalid.message
                    ),
                );
            }
            if !log.is_sound() {
                out.valid = false;
                out.error = Some(format!("{} invalid JSON lines", log.invalid_lines.len()));
            }
        }
        // Rule/format mismatches are unreachable with the fixed dispatch table.
        _ => {}
    }
}

fn warn(out: &mut ArtifactValidation, message: String) {
    out.warnings.push(RuleWarning {
        artifact_name: out.artifact_name.clone(),
        message,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::REQUIRED_ARTIFACTS;

    fn artifact(name: &str, content: &str) -> Artifact {
        Artifact {
            name: name.to_string(),
            exists: true,
            readable: true,
            size_bytes: content.len() as u64,
            raw_content: Some(content.to_string()),
            error: None,
        }
    }

    fn spec(name: &str) -> &'static RequiredArtifactSpec {
        crate::pack::required_artifact(name).unwrap()
    }

    #[test]
    fn persona_with_all_topics_is_clean() {
        let content = "# Persona\n\nIdentity, tone, behavior, and self-understanding.\n";
        let v = evaluate_artifact(&artifact("persona.md", content), spec("persona.md"));
        assert!(v.valid);
        assert!(v.warnings.is_empty(), "warnings: {:?}", v.warnings);
    }

    #[test]
    fn persona_missing_topics_warns_per_topic() {
        let v = evaluate_artifact(
            &artifact("persona.md", "# Persona\n\nIdentity only.\n"),
            spec("persona.md"),
        );
        assert!(v.valid, "warnings never hard-fail structured documents");
        let missing: Vec<_> = v
            .warnings
            .iter()
            .filter(|w| w.message.starts_with("Missing recommended section"))
            .collect();
        assert_eq!(missing.len(), 3);
    }

    #[test]
    fn topic_match_is_case_insensitive() {
        let content = "# P\nIDENTITY TONE BEHAVIOR SELF-UNDERSTANDING\n";
        let v = evaluate_artifact(&artifact("persona.md", content), spec("persona.md"));
        assert!(v.warnings.is_empty());
    }

    #[test]
    fn document_without_leading_header_warns() {
        let v = evaluate_artifact(
            &artifact("stylistic_voice.md", "prose without header\n"),
            spec("stylistic_voice.md"),
        );
        assert!(v.valid);
        assert_eq!(v.warnings.len(), 1);
        assert_eq!(v.warnings[0].message, "Missing main header");
    }

    #[test]
    fn relationship_without_collaborator_warns() {
        let v = evaluate_artifact(
            &artifact("relationship_dynamics.md", "# Bonds\n\nNobody here.\n"),
            spec("relationship_dynamics.md"),
        );
        assert!(v.valid);
        assert!(v
            .warnings
            .iter()
            .any(|w| w.message.contains("primary collaborator John")));
    }

    #[test]
    fn short_technical_domains_warns() {
        let v = evaluate_artifact(
            &artifact("technical_domains.md", "# Domains\n\nten words or so\n"),
            spec("technical_domains.md"),
        );
        assert!(v.valid);
        assert!(v
            .warnings
            .iter()
            .any(|w| w.message.contains("underdeveloped")));
    }

    #[test]
    fn event_log_with_invalid_line_hard_fails() {
        let v = evaluate_artifact(
            &artifact("runtime_observations.jsonl", "{\"bad\":}\n"),
            spec("runtime_observations.jsonl"),
        );
        assert!(!v.valid);
        assert_eq!(v.error.as_deref(), Some("1 invalid JSON lines"));
        assert!(v.warnings[0].message.contains("line 1"));
        assert_eq!(v.metrics["invalid_lines"], 1);
    }

    #[test]
    fn clean_event_log_is_valid() {
        let v = evaluate_artifact(
            &artifact("runtime_observations.jsonl", "{\"seen\":true}\n{\"n\":2}\n"),
            spec("runtime_observations.jsonl"),
        );
        assert!(v.valid);
        assert!(v.warnings.is_empty());
        assert_eq!(v.metrics["valid_json_lines"], 2);
    }

    #[test]
    fn missing_artifact_hard_fails_without_running_rules() {
        let missing = Artifact {
            name: "persona.md".to_string(),
            exists: false,
            readable: false,
            size_bytes: 0,
            raw_content: None,
            error: None,
        };
        let v = evaluate_artifact(&missing, spec("persona.md"));
        assert!(!v.valid);
        assert!(v.warnings.is_empty());
        assert_eq!(v.error.as_deref(), Some("artifact missing"));
    }

    #[test]
    fn unreadable_artifact_keeps_captured_error() {
        let unreadable = Artifact {
            name: "persona.md".to_string(),
            exists: true,
            readable: false,
            size_bytes: 12,
            raw_content: None,
            error: Some("stream did not contain valid UTF-8".to_string()),
        };
        let v = evaluate_artifact(&unreadable, spec("persona.md"));
        assert!(!v.valid);
        assert!(v.error.as_deref().unwrap().contains("UTF-8"));
    }

    #[test]
    fn every_required_artifact_has_rules() {
        for spec in &REQUIRED_ARTIFACTS {
            assert!(
                !rules_for(spec.name).is_empty(),
                "no rules for {}",
                spec.name
            );
        }
    }
}
