//! SoulPack - Memory Pack Toolkit CLI
//!
//! The `soulpack` command validates, archives, and tracks inheritance of
//! AI identity memory packs.
//!
//! ## Commands
//!
//! - `validate`: Run the validation engine against a pack directory
//! - `archive`: Bundle a pack into a timestamped zip with thumbnail
//! - `ceremony`: Create, complete, and inspect inheritance ceremonies
//!
//! ## Exit codes
//!
//! - 0: success (including a pack that validates with warnings)
//! - 1: operational failure (pack directory missing, I/O error)
//! - 2: validation ran to completion and the pack is INVALID

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use soulpack_core::{
    create_archive, init_tracing, render_lineage_tree, CeremonyTracker, OverallStatus,
    PackValidator,
};

#[derive(Parser)]
#[command(name = "soulpack")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Memory pack validation, archival, and inheritance tracking", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a memory pack and persist validation_results.json
    Validate {
        /// Pack directory to validate
        pack: PathBuf,

        /// Print the full report as JSON instead of the summary
        #[arg(long)]
        report_json: bool,
    },

    /// Bundle a memory pack into a timestamped archive
    Archive {
        /// Pack directory to archive
        pack: PathBuf,

        /// Output directory (default: the pack directory itself)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Inheritance ceremony operations
    Ceremony {
        #[command(subcommand)]
        action: CeremonyAction,
    },
}

#[derive(Subcommand)]
enum CeremonyAction {
    /// Initiate an identity-transfer ceremony
    Create {
        /// Pack directory
        pack: PathBuf,

        /// Identity transferring out
        source: String,

        /// Identity inheriting the pack
        target: String,

        /// Ceremony type label
        #[arg(long, default_value = "identity_transfer")]
        ceremony_type: String,

        /// Free-form ceremony notes
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Mark a ceremony as completed and issue its certificate
    Complete {
        /// Pack directory
        pack: PathBuf,

        /// Ceremony ID from `ceremony create`
        ceremony_id: String,
    },

    /// Print the transfer history as JSON
    Lineage {
        /// Pack directory
        pack: PathBuf,
    },

    /// Print the transfer history as a text tree
    Visualize {
        /// Pack directory
        pack: PathBuf,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.json, cli.verbose);

    match cli.command {
        Commands::Validate { pack, report_json } => cmd_validate(&pack, report_json),
        Commands::Archive { pack, output } => cmd_archive(&pack, output),
        Commands::Ceremony { action } => match action {
            CeremonyAction::Create {
                pack,
                source,
                target,
                ceremony_type,
                notes,
            } => cmd_ceremony_create(&pack, &source, &target, &ceremony_type, &notes),
            CeremonyAction::Complete { pack, ceremony_id } => {
                cmd_ceremony_complete(&pack, &ceremony_id)
            }
            CeremonyAction::Lineage { pack } => cmd_ceremony_lineage(&pack),
            CeremonyAction::Visualize { pack } => cmd_ceremony_visualize(&pack),
        },
    }
}

/// Validate a pack, print the summary, persist the report.
fn cmd_validate(pack: &PathBuf, report_json: bool) -> Result<ExitCode> {
    let validator = PackValidator::new(pack)?;
    let (report, results_path) = validator.validate_and_persist()?;

    if report_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Memory pack: {}", pack.display());
        println!();
        for (name, validation) in &report.artifacts {
            let mark = if validation.valid { "ok " } else { "FAIL" };
            if validation.exists {
                println!("  [{mark}] {name} ({} bytes)", validation.size_bytes);
            } else {
                println!("  [{mark}] {name} - missing");
            }
        }
        println!();
        println!("Overall status: {}", report.overall_status);

        if report.recommendations.is_empty() {
            println!("No recommendations - memory pack looks complete");
        } else {
            println!("Recommendations:");
            for rec in &report.recommendations {
                println!("  - {rec}");
            }
        }
        println!();
        println!("Detailed results saved to: {}", results_path.display());
    }

    // INVALID maps to a distinct exit code so CI can gate on pack health.
    if report.overall_status == OverallStatus::Invalid {
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Bundle the pack into a timestamped archive.
fn cmd_archive(pack: &PathBuf, output: Option<PathBuf>) -> Result<ExitCode> {
    let output_dir = output.unwrap_or_else(|| pack.clone());
    let archive = create_archive(pack, &output_dir)?;

    println!("Created memory pack archive:");
    println!("  Zip:       {}", archive.zip_path.display());
    println!("  Thumbnail: {}", archive.thumbnail_path.display());
    println!("  Metadata:  {}", archive.metadata_path.display());
    println!("  Files:     {}", archive.metadata.file_count);
    println!("  Size:      {} bytes", archive.metadata.zip_size_bytes);
    println!("  Hash:      {}...", &archive.metadata.content_hash[..16]);

    Ok(ExitCode::SUCCESS)
}

/// Initiate a ceremony and print next steps.
fn cmd_ceremony_create(
    pack: &PathBuf,
    source: &str,
    target: &str,
    ceremony_type: &str,
    notes: &str,
) -> Result<ExitCode> {
    let tracker = CeremonyTracker::new(pack)?;
    let record = tracker.create(source, target, ceremony_type, notes)?;

    println!("Inheritance ceremony initiated: {source} -> {target}");
    println!("  Ceremony ID: {}", record.ceremony_id);
    println!("  Validation:  {}", record.validation.overall_status);
    println!();
    println!("Next steps:");
    println!("  1. Review ceremony_{}.md", record.ceremony_id);
    println!("  2. git add . && git commit -F commit_template.txt");
    println!(
        "  3. soulpack ceremony complete {} {}",
        pack.display(),
        record.ceremony_id
    );

    Ok(ExitCode::SUCCESS)
}

/// Complete a ceremony and issue the certificate.
fn cmd_ceremony_complete(pack: &PathBuf, ceremony_id: &str) -> Result<ExitCode> {
    let tracker = CeremonyTracker::new(pack)?;
    let record = tracker.complete(ceremony_id)?;

    info!(ceremony_id, "ceremony completed");
    println!(
        "Ceremony completed: {} -> {}",
        record.source_identity, record.target_identity
    );
    println!("Certificate: certificate_{}.md", record.ceremony_id);

    Ok(ExitCode::SUCCESS)
}

/// Print the lineage as JSON.
fn cmd_ceremony_lineage(pack: &PathBuf) -> Result<ExitCode> {
    let tracker = CeremonyTracker::new(pack)?;
    let lineage = tracker.lineage()?;
    println!("{}", serde_json::to_string_pretty(&lineage)?);
    Ok(ExitCode::SUCCESS)
}

/// Print the lineage as a text tree.
fn cmd_ceremony_visualize(pack: &PathBuf) -> Result<ExitCode> {
    let tracker = CeremonyTracker::new(pack)?;
    let lineage = tracker.lineage()?;
    print!(
        "{}",
        render_lineage_tree(&lineage, &tracker.current_identity())
    );
    Ok(ExitCode::SUCCESS)
}
