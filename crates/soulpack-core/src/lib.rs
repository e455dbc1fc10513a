//! SoulPack Core Library
//!
//! Validation, inheritance tracking, and archival for AI identity memory
//! packs. A memory pack is a directory of five structured artifacts
//! (persona, relationships, technical domains, voice, and a runtime
//! observation log); the validation engine decides whether a directory
//! constitutes a well-formed pack and produces an actionable report.

pub mod archive;
pub mod ceremony;
pub mod crossref;
pub mod error;
pub mod git;
pub mod pack;
pub mod parse;
pub mod report;
pub mod rules;
pub mod telemetry;
pub mod validator;

pub use archive::{create_archive, ArchiveMetadata, ArchiveOutput, ARCHIVE_KEEP_COUNT};
pub use ceremony::{
    render_lineage_tree, ArtifactSnapshot, CeremonyRecord, CeremonyStatus, CeremonyTracker,
    InheritanceLog, LineageEntry, INHERITANCE_LOG_FILE,
};
pub use crossref::{check_cross_references, CrossReferenceReport};
pub use error::{PackError, Result};
pub use git::{capture_context, find_repo_root, is_git_repo, GitContext};
pub use pack::{
    read_artifact, required_artifact, Artifact, ArtifactFormat, RequiredArtifactSpec,
    REQUIRED_ARTIFACTS,
};
pub use parse::{parse_event_log, parse_structured_document, EventLog, StructuredDocument};
pub use report::{
    OverallStatus, ValidationReport, MIN_ARTIFACT_SIZE_BYTES, RESULTS_FILE_NAME,
};
pub use rules::{
    evaluate_artifact, rules_for, ArtifactValidation, ContentRule, RuleWarning,
    MIN_TECHNICAL_WORD_COUNT, PERSONA_TOPICS, PRIMARY_COLLABORATOR,
};
pub use telemetry::init_tracing;
pub use validator::PackValidator;

/// SoulPack version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
