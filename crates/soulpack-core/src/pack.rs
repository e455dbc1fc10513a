//! Memory pack shape and artifact reading.
//!
//! A memory pack is a directory holding five required artifacts that together
//! describe an identity snapshot. The artifact names are a contract with pack
//! authors and upstream tooling; do not rename without a migration path.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Wire format of a required artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactFormat {
    /// Sectioned markdown-style text with `#`-prefixed headers.
    StructuredDocument,
    /// Append-only log, one JSON record per line.
    EventLog,
}

/// Static description of one required artifact in the pack shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredArtifactSpec {
    /// File name under the pack directory.
    pub name: &'static str,
    /// Human-readable purpose, surfaced in reports.
    pub description: &'static str,
    /// Which parser handles the artifact.
    pub format: ArtifactFormat,
}

/// The five-fold pack shape. Enumeration order is stable and drives
/// report and recommendation ordering.
pub const REQUIRED_ARTIFACTS: [RequiredArtifactSpec; 5] = [
    RequiredArtifactSpec {
        name: "persona.md",
        description: "Core identity and self-understanding",
        format: ArtifactFormat::StructuredDocument,
    },
    RequiredArtifactSpec {
        name: "relationship_dynamics.md",
        description: "Human bonds and collaborative rapport",
        format: ArtifactFormat::StructuredDocument,
    },
    RequiredArtifactSpec {
        name: "technical_domains.md",
        description: "Expertise, preferences, and knowledge base",
        format: ArtifactFormat::StructuredDocument,
    },
    RequiredArtifactSpec {
        name: "stylistic_voice.md",
        description: "Communication patterns and signature style",
        format: ArtifactFormat::StructuredDocument,
    },
    RequiredArtifactSpec {
        name: "runtime_observations.jsonl",
        description: "Living memory stream and insights",
        format: ArtifactFormat::EventLog,
    },
];

/// Look up the spec for a required artifact by name.
pub fn required_artifact(name: &str) -> Option<&'static RequiredArtifactSpec> {
    REQUIRED_ARTIFACTS.iter().find(|spec| spec.name == name)
}

/// One artifact as observed on disk at validation time.
///
/// Ephemeral: created by [`read_artifact`], never mutated, discarded at the
/// end of the run. A read failure is captured here as data rather than
/// propagated: it is a local failure that must not abort the run for the
/// remaining artifacts.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// File name within the pack.
    pub name: String,
    /// Whether the file exists under the pack directory.
    pub exists: bool,
    /// Whether the file could be read as UTF-8 text.
    pub readable: bool,
    /// File size in bytes (0 when missing).
    pub size_bytes: u64,
    /// Raw content when readable.
    pub raw_content: Option<String>,
    /// Captured read error when the file exists but cannot be read.
    pub error: Option<String>,
}

impl Artifact {
    fn missing(name: &str) -> Self {
        Self {
            name: name.to_string(),
            exists: false,
            readable: false,
            size_bytes: 0,
            raw_content: None,
            error: None,
        }
    }
}

/// Resolve a required artifact within a pack directory.
///
/// Read-only: never creates or modifies anything. A missing file yields
/// `exists = false` and no further parsing is attempted for that artifact;
/// an unreadable file yields `readable = false` with the error captured.
pub fn read_artifact(pack_path: &Path, spec: &RequiredArtifactSpec) -> Artifact {
    let path = pack_path.join(spec.name);

    if !path.exists() {
        return Artifact::missing(spec.name);
    }

    let size_bytes = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

    match std::fs::read_to_string(&path) {
        Ok(content) => Artifact {
            name: spec.name.to_string(),
            exists: true,
            readable: true,
            size_bytes,
            raw_content: Some(content),
            error: None,
        },
        Err(e) => Artifact {
            name: spec.name.to_string(),
            exists: true,
            readable: false,
            size_bytes,
            raw_content: None,
            error: Some(e.to_string()),
        },
    }
}
