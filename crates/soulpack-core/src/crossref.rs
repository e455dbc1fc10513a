//! Cross-artifact consistency checking.
//!
//! Deliberate extension seam: the current check only confirms the pack was
//! enumerated, so callers must not assume deep consistency guarantees
//! (name or tone agreement across documents is future work). The field
//! exists so the report shape stays stable when the check is strengthened,
//! and it never downgrades the overall status.

use serde::{Deserialize, Serialize};

use crate::rules::ArtifactValidation;

/// Outcome of the cross-reference pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossReferenceReport {
    pub status: String,
    pub notes: String,
}

/// Run the (currently shallow) cross-reference check across all artifacts.
pub fn check_cross_references(_artifacts: &[ArtifactValidation]) -> CrossReferenceReport {
    CrossReferenceReport {
        status: "basic_check_passed".to_string(),
        notes: "Advanced cross-reference validation not yet implemented".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_check_always_passes() {
        let report = check_cross_references(&[]);
        assert_eq!(report.status, "basic_check_passed");
        assert!(report.notes.contains("not yet implemented"));
    }
}
