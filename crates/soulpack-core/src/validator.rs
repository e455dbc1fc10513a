//! Memory pack validation engine.
//!
//! Orchestrates one validation run: enumerate the fixed required-artifact
//! list, read and parse each artifact, evaluate its rule set, run the
//! cross-reference check, and aggregate everything into a
//! [`ValidationReport`]. Single-threaded; each artifact is read and
//! validated to completion before the next begins, and no artifact's
//! outcome depends on another's content.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::crossref::check_cross_references;
use crate::error::{PackError, Result};
use crate::pack::{read_artifact, REQUIRED_ARTIFACTS};
use crate::report::ValidationReport;
use crate::rules::{evaluate_artifact, ArtifactValidation};

/// Validator bound to one memory pack directory.
#[derive(Debug)]
pub struct PackValidator {
    pack_path: PathBuf,
}

impl PackValidator {
    /// Bind to a pack directory.
    ///
    /// The only fatal precondition of a run: the directory must exist.
    /// Everything below that is captured as report data.
    pub fn new(pack_path: impl Into<PathBuf>) -> Result<Self> {
        let pack_path = pack_path.into();
        if !pack_path.exists() {
            return Err(PackError::PackNotFound(pack_path));
        }
        Ok(Self { pack_path })
    }

    /// The pack directory under validation.
    pub fn pack_path(&self) -> &Path {
        &self.pack_path
    }

    /// Run the complete validation suite and return the report.
    ///
    /// Read-only with respect to the pack; never modifies artifacts.
    pub fn validate(&self) -> ValidationReport {
        info!(pack = %self.pack_path.display(), "validating memory pack");

        info!("validating file structure and content");
        let mut validations: Vec<ArtifactValidation> = Vec::with_capacity(REQUIRED_ARTIFACTS.len());
        for spec in &REQUIRED_ARTIFACTS {
            let artifact = read_artifact(&self.pack_path, spec);
            debug!(
                artifact = spec.name,
                exists = artifact.exists,
                size_bytes = artifact.size_bytes,
                "read artifact"
            );
            let validation = evaluate_artifact(&artifact, spec);
            debug!(
                artifact = spec.name,
                valid = validation.valid,
                warnings = validation.warnings.len(),
                "evaluated artifact"
            );
            validations.push(validation);
        }

        info!("checking cross-references");
        let cross_references = check_cross_references(&validations);

        let report = ValidationReport::aggregate(&self.pack_path, validations, cross_references);
        info!(status = %report.overall_status, recommendations = report.recommendations.len(), "validation complete");
        report
    }

    /// Validate and persist the report into the pack directory.
    ///
    /// Returns the report together with the path of the written JSON file.
    pub fn validate_and_persist(&self) -> anyhow::Result<(ValidationReport, PathBuf)> {
        let report = self.validate();
        let path = report.persist(&self.pack_path)?;
        Ok((report, path))
    }
}
