//! Inheritance ceremony lifecycle against packs on disk.

use std::path::Path;
use std::process::Command;

use soulpack_core::{CeremonyStatus, CeremonyTracker, OverallStatus, INHERITANCE_LOG_FILE};

fn seed_pack(dir: &Path) {
    std::fs::write(
        dir.join("persona.md"),
        "# Persona\n\n- Name: Alice\n\nIdentity, tone, behavior, self-understanding.\n",
    )
    .unwrap();
    std::fs::write(dir.join("relationship_dynamics.md"), "# Bonds\n\nJohn.\n").unwrap();
    std::fs::write(dir.join("technical_domains.md"), "# Domains\n\nwords\n").unwrap();
    std::fs::write(dir.join("stylistic_voice.md"), "# Voice\n\nstyle\n").unwrap();
    std::fs::write(dir.join("runtime_observations.jsonl"), "{\"seen\": 1}\n").unwrap();
}

fn git(repo_dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn create_writes_document_template_and_log() {
    let dir = tempfile::tempdir().unwrap();
    seed_pack(dir.path());

    let tracker = CeremonyTracker::new(dir.path()).unwrap();
    let record = tracker
        .create("Alice", "Cassie", "identity_transfer", "first transfer")
        .unwrap();

    assert_eq!(record.status, CeremonyStatus::Initiated);
    assert_eq!(record.source_identity, "Alice");
    assert_eq!(record.snapshot.len(), 5);
    assert!(record.snapshot["persona.md"].sha256.len() == 64);

    assert!(dir
        .path()
        .join(format!("ceremony_{}.md", record.ceremony_id))
        .exists());
    assert!(dir.path().join("commit_template.txt").exists());
    assert!(dir.path().join(INHERITANCE_LOG_FILE).exists());

    let doc = std::fs::read_to_string(
        dir.path().join(format!("ceremony_{}.md", record.ceremony_id)),
    )
    .unwrap();
    assert!(doc.contains("Alice"));
    assert!(doc.contains("Cassie"));
    assert!(doc.contains("first transfer"));
}

#[test]
fn ceremony_records_validation_outcome() {
    let dir = tempfile::tempdir().unwrap();
    seed_pack(dir.path());
    std::fs::remove_file(dir.path().join("stylistic_voice.md")).unwrap();

    let tracker = CeremonyTracker::new(dir.path()).unwrap();
    let record = tracker
        .create("Alice", "Cassie", "identity_transfer", "")
        .unwrap();

    assert_eq!(record.validation.overall_status, OverallStatus::Invalid);
    assert_eq!(
        record.validation.missing_artifacts,
        vec!["stylistic_voice.md".to_string()]
    );
}

#[test]
fn complete_marks_record_and_writes_certificate() {
    let dir = tempfile::tempdir().unwrap();
    seed_pack(dir.path());

    let tracker = CeremonyTracker::new(dir.path()).unwrap();
    let record = tracker
        .create("Alice", "Cassie", "identity_transfer", "")
        .unwrap();
    let completed = tracker.complete(&record.ceremony_id).unwrap();

    assert_eq!(completed.status, CeremonyStatus::Completed);
    assert!(completed.completed_at.is_some());
    assert!(dir
        .path()
        .join(format!("certificate_{}.md", record.ceremony_id))
        .exists());
}

#[test]
fn complete_unknown_ceremony_fails() {
    let dir = tempfile::tempdir().unwrap();
    seed_pack(dir.path());
    let tracker = CeremonyTracker::new(dir.path()).unwrap();
    assert!(tracker.complete("ceremony_nope").is_err());
}

#[test]
fn lineage_orders_transfers() {
    let dir = tempfile::tempdir().unwrap();
    seed_pack(dir.path());

    let tracker = CeremonyTracker::new(dir.path()).unwrap();
    tracker
        .create("Alice", "Cassie", "identity_transfer", "")
        .unwrap();
    tracker
        .create("Cassie", "Dana", "identity_transfer", "")
        .unwrap();

    let lineage = tracker.lineage().unwrap();
    assert_eq!(lineage.len(), 2);
    assert_eq!(lineage[0].transfer, "Alice -> Cassie");
    assert_eq!(lineage[1].transfer, "Cassie -> Dana");
}

#[test]
fn current_identity_from_persona() {
    let dir = tempfile::tempdir().unwrap();
    seed_pack(dir.path());
    let tracker = CeremonyTracker::new(dir.path()).unwrap();
    assert_eq!(tracker.current_identity(), "Alice");
}

#[test]
fn current_identity_unknown_without_persona() {
    let dir = tempfile::tempdir().unwrap();
    seed_pack(dir.path());
    std::fs::remove_file(dir.path().join("persona.md")).unwrap();
    let tracker = CeremonyTracker::new(dir.path()).unwrap();
    assert_eq!(tracker.current_identity(), "Unknown Identity");
}

#[test]
fn ceremony_inside_git_repo_captures_context() {
    let repo = tempfile::tempdir().unwrap();
    git(repo.path(), &["init", "-b", "main"]);
    git(repo.path(), &["config", "user.name", "test-user"]);
    git(repo.path(), &["config", "user.email", "test@example.com"]);
    git(repo.path(), &["commit", "--allow-empty", "-m", "initial"]);

    let pack = repo.path().join("memory_pack");
    std::fs::create_dir(&pack).unwrap();
    seed_pack(&pack);

    let tracker = CeremonyTracker::new(&pack).unwrap();
    let record = tracker
        .create("Alice", "Cassie", "identity_transfer", "")
        .unwrap();

    let git_context = record.git_context.expect("pack lives inside a git repo");
    assert_eq!(git_context.commit.len(), 40);
    assert_eq!(git_context.branch, "main");
}
