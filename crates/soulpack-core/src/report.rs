//! Validation report: aggregation, data model, and persistence.
//!
//! The report is the authoritative machine-readable output of a validation
//! run. It is created once per run, immutable once returned, and persisted
//! wholesale to `<pack>/validation_results.json`. No merge, last writer
//! wins; concurrent runs against one pack are not supported.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crossref::CrossReferenceReport;
use crate::pack::REQUIRED_ARTIFACTS;
use crate::rules::ArtifactValidation;

/// File name of the persisted report within the pack directory.
pub const RESULTS_FILE_NAME: &str = "validation_results.json";

/// Artifacts below this size get an expansion recommendation.
pub const MIN_ARTIFACT_SIZE_BYTES: u64 = 100;

/// Tiered outcome of a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallStatus {
    #[serde(rename = "VALID")]
    Valid,
    #[serde(rename = "VALID_WITH_WARNINGS")]
    ValidWithWarnings,
    #[serde(rename = "INVALID")]
    Invalid,
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Valid => "VALID",
            Self::ValidWithWarnings => "VALID_WITH_WARNINGS",
            Self::Invalid => "INVALID",
        };
        f.write_str(s)
    }
}

/// Complete result of validating one memory pack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub timestamp: DateTime<Utc>,
    pub pack_path: PathBuf,
    pub overall_status: OverallStatus,
    /// Per-artifact outcomes keyed by artifact name.
    pub artifacts: BTreeMap<String, ArtifactValidation>,
    pub cross_references: CrossReferenceReport,
    /// Flattened, ordered, undeduplicated improvement notes.
    pub recommendations: Vec<String>,
}

impl ValidationReport {
    /// Aggregate per-artifact outcomes into the final report.
    ///
    /// Status state machine, evaluated once:
    /// - `Invalid` when any artifact is missing, unreadable, or hard-failed
    /// - else `ValidWithWarnings` when any artifact carries warnings
    /// - else `Valid`
    ///
    /// The cross-reference status never downgrades the result.
    pub fn aggregate(
        pack_path: &Path,
        validations: Vec<ArtifactValidation>,
        cross_references: CrossReferenceReport,
    ) -> Self {
        let any_hard_failure = validations
            .iter()
            .any(|v| !v.exists || !v.readable || !v.valid);
        let any_warnings = validations.iter().any(|v| !v.warnings.is_empty());

        let overall_status = if any_hard_failure {
            OverallStatus::Invalid
        } else if any_warnings {
            OverallStatus::ValidWithWarnings
        } else {
            OverallStatus::Valid
        };

        let recommendations = flatten_recommendations(&validations);

        let artifacts = validations
            .into_iter()
            .map(|v| (v.artifact_name.clone(), v))
            .collect();

        Self {
            timestamp: Utc::now(),
            pack_path: pack_path.to_path_buf(),
            overall_status,
            artifacts,
            cross_references,
            recommendations,
        }
    }

    /// Persist the report as pretty JSON inside the pack directory,
    /// overwriting any previous report. Returns the written path.
    pub fn persist(&self, pack_path: &Path) -> anyhow::Result<PathBuf> {
        let path = pack_path.join(RESULTS_FILE_NAME);
        let content = serde_json::to_string_pretty(self).context("serialize validation report")?;
        std::fs::write(&path, content).with_context(|| format!("write {:?}", path))?;
        Ok(path)
    }
}

/// Flatten recommendations in stable order: one size note per undersized
/// artifact (enumeration order), then every warning message (artifact
/// enumeration order, then emission order). No deduplication.
fn flatten_recommendations(validations: &[ArtifactValidation]) -> Vec<String> {
    let mut recommendations = Vec::new();

    for spec in &REQUIRED_ARTIFACTS {
        if let Some(v) = validations.iter().find(|v| v.artifact_name == spec.name) {
            if v.size_bytes < MIN_ARTIFACT_SIZE_BYTES {
                recommendations.push(format!(
                    "Consider expanding {} - currently very brief",
                    spec.name
                ));
            }
        }
    }

    for spec in &REQUIRED_ARTIFACTS {
        if let Some(v) = validations.iter().find(|v| v.artifact_name == spec.name) {
            for warning in &v.warnings {
                recommendations.push(format!("{}: {}", spec.name, warning.message));
            }
        }
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crossref::check_cross_references;
    use crate::rules::RuleWarning;

    fn validation(name: &str, valid: bool, size: u64, warnings: &[&str]) -> ArtifactValidation {
        ArtifactValidation {
            artifact_name: name.to_string(),
            description: String::new(),
            exists: true,
            readable: true,
            size_bytes: size,
            valid,
            warnings: warnings
                .iter()
                .map(|m| RuleWarning {
                    artifact_name: name.to_string(),
                    message: (*m).to_string(),
                })
                .collect(),
            metrics: BTreeMap::new(),
            error: None,
        }
    }

    fn clean_pack() -> Vec<ArtifactValidation> {
        REQUIRED_ARTIFACTS
            .iter()
            .map(|s| validation(s.name, true, 500, &[]))
            .collect()
    }

    #[test]
    fn clean_pack_is_valid_with_no_recommendations() {
        let report = ValidationReport::aggregate(
            Path::new("/pack"),
            clean_pack(),
            check_cross_references(&[]),
        );
        assert_eq!(report.overall_status, OverallStatus::Valid);
        assert!(report.recommendations.is_empty());
        assert_eq!(report.artifacts.len(), 5);
    }

    #[test]
    fn warnings_downgrade_to_valid_with_warnings() {
        let mut validations = clean_pack();
        let artifact_name = validations[2].artifact_name.clone();
        validations[2].warnings.push(RuleWarning {
            artifact_name,
            message: "Technical domains seem underdeveloped".to_string(),
        });
        let report = ValidationReport::aggregate(
            Path::new("/pack"),
            validations,
            check_cross_references(&[]),
        );
        assert_eq!(report.overall_status, OverallStatus::ValidWithWarnings);
        assert_eq!(report.recommendations.len(), 1);
        assert!(report.recommendations[0].starts_with("technical_domains.md:"));
    }

    #[test]
    fn hard_failure_forces_invalid() {
        let mut validations = clean_pack();
        validations[4].valid = false;
        let report = ValidationReport::aggregate(
            Path::new("/pack"),
            validations,
            check_cross_references(&[]),
        );
        assert_eq!(report.overall_status, OverallStatus::Invalid);
    }

    #[test]
    fn missing_artifact_forces_invalid() {
        let mut validations = clean_pack();
        validations[0].exists = false;
        validations[0].valid = false;
        let report = ValidationReport::aggregate(
            Path::new("/pack"),
            validations,
            check_cross_references(&[]),
        );
        assert_eq!(report.overall_status, OverallStatus::Invalid);
    }

    #[test]
    fn size_notes_precede_warning_notes() {
        let mut validations = clean_pack();
        validations[3].size_bytes = 10;
        validations[0].warnings.push(RuleWarning {
            artifact_name: "persona.md".to_string(),
            message: "Missing main header".to_string(),
        });
        let report = ValidationReport::aggregate(
            Path::new("/pack"),
            validations,
            check_cross_references(&[]),
        );
        assert_eq!(report.recommendations.len(), 2);
        assert!(report.recommendations[0].starts_with("Consider expanding stylistic_voice.md"));
        assert_eq!(report.recommendations[1], "persona.md: Missing main header");
    }

    #[test]
    fn recommendations_are_not_deduplicated() {
        let mut validations = clean_pack();
        for _ in 0..2 {
            validations[0].warnings.push(RuleWarning {
                artifact_name: "persona.md".to_string(),
                message: "Missing main header".to_string(),
            });
        }
        let report = ValidationReport::aggregate(
            Path::new("/pack"),
            validations,
            check_cross_references(&[]),
        );
        assert_eq!(report.recommendations.len(), 2);
        assert_eq!(report.recommendations[0], report.recommendations[1]);
    }

    #[test]
    fn status_serializes_to_screaming_snake() {
        let v = serde_json::to_value(OverallStatus::ValidWithWarnings).unwrap();
        assert_eq!(v, serde_json::json!("VALID_WITH_WARNINGS"));
    }

    #[test]
    fn report_serde_roundtrip() {
        let report = ValidationReport::aggregate(
            Path::new("/pack"),
            clean_pack(),
            check_cross_references(&[]),
        );
        let json = serde_json::to_string(&report).unwrap();
        let back: ValidationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report, back);
    }
}
