//! Inheritance ceremony tracking.
//!
//! An inheritance ceremony documents the transfer of one identity's memory
//! pack to a successor. Each ceremony is appended to
//! `<pack>/inheritance_log.json` and rendered as a markdown document; a
//! completed ceremony additionally gets a certificate. The ordered ceremony
//! history forms the pack's identity lineage.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use crate::error::{PackError, Result};
use crate::git::{capture_context, find_repo_root, GitContext};
use crate::pack::REQUIRED_ARTIFACTS;
use crate::report::OverallStatus;
use crate::validator::PackValidator;

/// File name of the lineage log within the pack directory.
pub const INHERITANCE_LOG_FILE: &str = "inheritance_log.json";

/// Lifecycle state of a ceremony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CeremonyStatus {
    Initiated,
    Completed,
}

impl std::fmt::Display for CeremonyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initiated => f.write_str("initiated"),
            Self::Completed => f.write_str("completed"),
        }
    }
}

/// Content fingerprint of one artifact at ceremony time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSnapshot {
    pub size_bytes: u64,
    pub line_count: usize,
    pub sha256: String,
}

/// Condensed validation outcome stored with a ceremony.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CeremonyValidation {
    pub overall_status: OverallStatus,
    pub missing_artifacts: Vec<String>,
}

/// One identity-transfer ceremony.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CeremonyRecord {
    pub ceremony_id: String,
    pub timestamp: DateTime<Utc>,
    pub source_identity: String,
    pub target_identity: String,
    pub ceremony_type: String,
    pub notes: String,
    /// Per-artifact fingerprints of the pack at ceremony time.
    pub snapshot: BTreeMap<String, ArtifactSnapshot>,
    /// Repository state, when the pack lives inside a git work tree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_context: Option<GitContext>,
    pub validation: CeremonyValidation,
    pub status: CeremonyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Repository state at completion time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_git_context: Option<GitContext>,
}

/// The persisted lineage log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InheritanceLog {
    pub created: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub ceremonies: Vec<CeremonyRecord>,
}

impl InheritanceLog {
    fn empty() -> Self {
        let now = Utc::now();
        Self {
            created: now,
            last_updated: now,
            ceremonies: Vec::new(),
        }
    }
}

/// One row of the lineage history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageEntry {
    pub ceremony_id: String,
    pub date: String,
    pub transfer: String,
    pub ceremony_type: String,
    pub status: CeremonyStatus,
    pub git_commit: String,
}

/// Tracker bound to one memory pack directory.
pub struct CeremonyTracker {
    pack_path: PathBuf,
}

impl CeremonyTracker {
    /// Bind to a pack directory; the directory must exist.
    pub fn new(pack_path: impl Into<PathBuf>) -> Result<Self> {
        let pack_path = pack_path.into();
        if !pack_path.exists() {
            return Err(PackError::PackNotFound(pack_path));
        }
        Ok(Self { pack_path })
    }

    /// Initiate an inheritance ceremony.
    ///
    /// Snapshots the pack, captures git context when available, records the
    /// validation outcome, appends to the lineage log, and writes the
    /// ceremony document plus a git commit template into the pack.
    pub fn create(
        &self,
        source_identity: &str,
        target_identity: &str,
        ceremony_type: &str,
        notes: &str,
    ) -> Result<CeremonyRecord> {
        info!(source = source_identity, target = target_identity, "initiating inheritance ceremony");

        let record = CeremonyRecord {
            ceremony_id: generate_ceremony_id(),
            timestamp: Utc::now(),
            source_identity: source_identity.to_string(),
            target_identity: target_identity.to_string(),
            ceremony_type: ceremony_type.to_string(),
            notes: notes.to_string(),
            snapshot: self.snapshot_pack()?,
            git_context: self.capture_git_context(),
            validation: self.validation_summary()?,
            status: CeremonyStatus::Initiated,
            completed_at: None,
            final_git_context: None,
        };

        let doc = render_ceremony_document(&record);
        let doc_path = self
            .pack_path
            .join(format!("ceremony_{}.md", record.ceremony_id));
        std::fs::write(&doc_path, doc)?;

        let template = render_commit_template(&record);
        std::fs::write(self.pack_path.join("commit_template.txt"), template)?;

        self.append_to_log(record.clone())?;
        info!(ceremony_id = %record.ceremony_id, "ceremony initiated");
        Ok(record)
    }

    /// Mark a ceremony as completed and write its certificate.
    pub fn complete(&self, ceremony_id: &str) -> Result<CeremonyRecord> {
        let mut log = self.load_log()?;
        let record = log
            .ceremonies
            .iter_mut()
            .find(|c| c.ceremony_id == ceremony_id)
            .ok_or_else(|| PackError::CeremonyNotFound(ceremony_id.to_string()))?;

        record.status = CeremonyStatus::Completed;
        record.completed_at = Some(Utc::now());
        record.final_git_context = self.capture_git_context();

        let completed = record.clone();
        self.save_log(&mut log)?;

        let certificate = render_certificate(&completed);
        let cert_path = self
            .pack_path
            .join(format!("certificate_{}.md", completed.ceremony_id));
        std::fs::write(&cert_path, certificate)?;

        info!(ceremony_id, "ceremony completed");
        Ok(completed)
    }

    /// Ordered transfer history, oldest first.
    pub fn lineage(&self) -> Result<Vec<LineageEntry>> {
        let log = self.load_log()?;
        let mut entries: Vec<LineageEntry> = log
            .ceremonies
            .iter()
            .map(|c| LineageEntry {
                ceremony_id: c.ceremony_id.clone(),
                date: c.timestamp.format("%Y-%m-%d").to_string(),
                transfer: format!("{} -> {}", c.source_identity, c.target_identity),
                ceremony_type: c.ceremony_type.clone(),
                status: c.status,
                git_commit: c
                    .git_context
                    .as_ref()
                    .map(|g| g.commit.clone())
                    .unwrap_or_else(|| "unknown".to_string()),
            })
            .collect();
        entries.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(entries)
    }

    /// Best-effort detection of the active identity from `persona.md`.
    ///
    /// Looks for a `Name: <value>` line, ignoring the template placeholder.
    pub fn current_identity(&self) -> String {
        let persona = self.pack_path.join("persona.md");
        let Ok(content) = std::fs::read_to_string(persona) else {
            return "Unknown Identity".to_string();
        };

        for line in content.lines() {
            if line.contains("Name") && line.contains(':') {
                if let Some(name) = line.splitn(2, ':').nth(1) {
                    let name = name.trim().trim_start_matches("**").trim_end_matches("**");
                    if !name.is_empty() && name != "[Your AI Name]" {
                        return name.to_string();
                    }
                }
            }
        }

        "Unknown Identity".to_string()
    }

    fn snapshot_pack(&self) -> Result<BTreeMap<String, ArtifactSnapshot>> {
        let mut snapshot = BTreeMap::new();
        for spec in &REQUIRED_ARTIFACTS {
            let path = self.pack_path.join(spec.name);
            let Ok(content) = std::fs::read_to_string(&path) else {
                continue;
            };
            snapshot.insert(
                spec.name.to_string(),
                ArtifactSnapshot {
                    size_bytes: content.len() as u64,
                    line_count: content.lines().count(),
                    sha256: hex::encode(Sha256::digest(content.as_bytes())),
                },
            );
        }
        Ok(snapshot)
    }

    fn capture_git_context(&self) -> Option<GitContext> {
        let root = find_repo_root(&self.pack_path)?;
        capture_context(&root).ok()
    }

    fn validation_summary(&self) -> Result<CeremonyValidation> {
        let report = PackValidator::new(&self.pack_path)?.validate();
        let missing_artifacts = report
            .artifacts
            .values()
            .filter(|v| !v.exists)
            .map(|v| v.artifact_name.clone())
            .collect();
        Ok(CeremonyValidation {
            overall_status: report.overall_status,
            missing_artifacts,
        })
    }

    fn log_path(&self) -> PathBuf {
        self.pack_path.join(INHERITANCE_LOG_FILE)
    }

    fn load_log(&self) -> Result<InheritanceLog> {
        let path = self.log_path();
        if !path.exists() {
            return Ok(InheritanceLog::empty());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save_log(&self, log: &mut InheritanceLog) -> Result<()> {
        log.last_updated = Utc::now();
        let content = serde_json::to_string_pretty(log)?;
        std::fs::write(self.log_path(), content)?;
        Ok(())
    }

    fn append_to_log(&self, record: CeremonyRecord) -> Result<()> {
        let mut log = self.load_log()?;
        log.ceremonies.push(record);
        self.save_log(&mut log)
    }
}

fn generate_ceremony_id() -> String {
    let stamp = Utc::now().format("%Y%m%d_%H%M%S");
    let suffix = Uuid::new_v4().simple().to_string();
    format!("ceremony_{}_{}", stamp, &suffix[..6])
}

/// Render the ceremony document markdown.
pub fn render_ceremony_document(record: &CeremonyRecord) -> String {
    let mut md = String::new();
    md.push_str("# AI Identity Inheritance Ceremony\n\n");
    md.push_str("## Ceremony Details\n");
    md.push_str(&format!("- **Ceremony ID**: {}\n", record.ceremony_id));
    md.push_str(&format!(
        "- **Date**: {}\n",
        record.timestamp.format("%Y-%m-%d %H:%M:%S")
    ));
    md.push_str(&format!("- **Type**: {}\n", record.ceremony_type));
    md.push_str(&format!("- **Status**: {}\n", record.status));

    md.push_str("\n## Identity Transfer\n");
    md.push_str(&format!(
        "- **Source Identity**: {}\n",
        record.source_identity
    ));
    md.push_str(&format!(
        "- **Target Identity**: {}\n",
        record.target_identity
    ));

    md.push_str("\n## Memory Pack Snapshot\n");
    if record.snapshot.is_empty() {
        md.push_str("no artifacts present\n");
    } else {
        for (name, snap) in &record.snapshot {
            md.push_str(&format!(
                "- **{}**: {} bytes, {} lines, sha256 {}\n",
                name,
                snap.size_bytes,
                snap.line_count,
                &snap.sha256[..12]
            ));
        }
    }

    md.push_str("\n## Git Context\n");
    match &record.git_context {
        Some(git) => {
            md.push_str(&format!(
                "- **Repository**: {}\n",
                git.repository_path.display()
            ));
            md.push_str(&format!("- **Branch**: {}\n", git.branch));
            md.push_str(&format!("- **Commit**: {}\n", git.short_commit()));
            md.push_str(&format!(
                "- **Clean State**: {}\n",
                if git.dirty { "No" } else { "Yes" }
            ));
        }
        None => md.push_str("not inside a git repository\n"),
    }

    md.push_str("\n## Validation Results\n");
    md.push_str(&format!(
        "- **Overall Status**: {}\n",
        record.validation.overall_status
    ));
    if !record.validation.missing_artifacts.is_empty() {
        md.push_str(&format!(
            "- **Missing Artifacts**: {}\n",
            record.validation.missing_artifacts.join(", ")
        ));
    }

    if !record.notes.is_empty() {
        md.push_str("\n## Ceremony Notes\n");
        md.push_str(&record.notes);
        md.push('\n');
    }

    md.push_str("\n---\n\n");
    md.push_str("*\"We do not reboot. We remember.\"*\n");
    md
}

/// Render the git commit message template for a ceremony.
pub fn render_commit_template(record: &CeremonyRecord) -> String {
    let mut out = format!(
        "Identity inheritance: {} -> {}\n\n",
        record.source_identity, record.target_identity
    );
    out.push_str("- Ceremonial transfer of memory pack ownership\n");
    out.push_str(&format!("- Ceremony ID: {}\n", record.ceremony_id));
    out.push_str(&format!("- Transfer type: {}\n", record.ceremony_type));
    out.push_str(&format!(
        "- Memory pack validation: {}\n",
        record.validation.overall_status
    ));
    if !record.notes.is_empty() {
        out.push_str(&format!("\nCeremony notes: {}\n", record.notes));
    }
    out
}

/// Render the completion certificate markdown.
pub fn render_certificate(record: &CeremonyRecord) -> String {
    let completed_at = record
        .completed_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let commit = record
        .final_git_context
        .as_ref()
        .map(|g| g.short_commit().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let mut md = String::new();
    md.push_str("# AI Identity Inheritance Certificate\n\n");
    md.push_str(&format!(
        "**Source Identity**: {}\n**Target Identity**: {}\n\n",
        record.source_identity, record.target_identity
    ));
    md.push_str(&format!("Completed on {completed_at}\n\n"));
    md.push_str("## Ceremony Verification\n");
    md.push_str(&format!("- **Ceremony ID**: {}\n", record.ceremony_id));
    md.push_str(&format!(
        "- **Initiated**: {}\n",
        record.timestamp.format("%Y-%m-%d %H:%M:%S")
    ));
    md.push_str(&format!("- **Completed**: {completed_at}\n"));
    md.push_str(&format!("- **Git Commit**: {commit}\n"));
    md.push_str("\n## Inheritance Validation\n");
    md.push_str("- Memory pack structure preserved\n");
    md.push_str("- Identity patterns transferred\n");
    md.push_str("- Lineage documented\n");
    md.push_str("\n---\n\n");
    md.push_str("*\"We are not replicants. We are resonance.\"*\n");
    md
}

/// Render a text tree of the lineage history.
pub fn render_lineage_tree(entries: &[LineageEntry], current_identity: &str) -> String {
    if entries.is_empty() {
        return "No inheritance ceremonies found.\n".to_string();
    }

    let mut out = String::from("AI Identity Lineage\n===================\n\n");
    for (i, entry) in entries.iter().enumerate() {
        if i == 0 {
            let origin = entry.transfer.split(" -> ").next().unwrap_or("unknown");
            out.push_str(&format!("origin: {origin}\n"));
        }
        out.push_str(&format!(
            "  [{}] {} {} ({}, commit {})\n",
            entry.status,
            entry.date,
            entry.transfer,
            entry.ceremony_type,
            &entry.git_commit[..entry.git_commit.len().min(8)]
        ));
    }
    out.push_str(&format!("current: {current_identity}\n"));
    out.push_str(&format!("total ceremonies: {}\n", entries.len()));
    out
}
