//! Pack archival: timestamped zip bundles with thumbnail and metadata.
//!
//! Bundles every file in the pack directory into `SoulPack_<timestamp>.zip`
//! (deterministic file order), renders a content-addressed PNG thumbnail,
//! and writes a JSON metadata sidecar. Older archive triples beyond the
//! retention count are pruned.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{PackError, Result};

/// How many archives to keep when pruning.
pub const ARCHIVE_KEEP_COUNT: usize = 5;

/// Prefix shared by all archive outputs.
pub const ARCHIVE_PREFIX: &str = "SoulPack_";

const THUMBNAIL_SIZE: u32 = 256;

/// Sidecar metadata written next to each archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveMetadata {
    pub created: DateTime<Utc>,
    pub timestamp: String,
    /// SHA-256 over the bundled files (sorted by name, content then name).
    pub content_hash: String,
    pub file_count: usize,
    pub zip_size_bytes: u64,
    pub thumbnail: String,
}

/// Paths produced by one archive run.
#[derive(Debug, Clone)]
pub struct ArchiveOutput {
    pub zip_path: PathBuf,
    pub thumbnail_path: PathBuf,
    pub metadata_path: PathBuf,
    pub metadata: ArchiveMetadata,
}

/// Bundle a pack directory into a timestamped archive under `output_dir`.
///
/// Skips previous archive outputs so archives never nest. Prunes old
/// archives beyond [`ARCHIVE_KEEP_COUNT`] after a successful run.
pub fn create_archive(pack_path: &Path, output_dir: &Path) -> Result<ArchiveOutput> {
    if !pack_path.exists() {
        return Err(PackError::PackNotFound(pack_path.to_path_buf()));
    }

    let now = Utc::now();
    let timestamp = now.format("%Y-%m-%d_%H-%M-%S").to_string();
    let zip_path = output_dir.join(format!("{ARCHIVE_PREFIX}{timestamp}.zip"));

    let files = collect_pack_files(pack_path)?;
    info!(pack = %pack_path.display(), files = files.len(), "creating pack archive");

    let content_hash = content_hash(&files)?;

    let file = File::create(&zip_path)?;
    let mut writer = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, path) in &files {
        debug!(file = name, "adding to archive");
        writer.start_file(name.clone(), options)?;
        writer.write_all(&std::fs::read(path)?)?;
    }
    writer.finish()?;

    let thumbnail_path = zip_path.with_extension("png");
    render_thumbnail(&content_hash).save(&thumbnail_path)?;

    let metadata = ArchiveMetadata {
        created: now,
        timestamp,
        content_hash,
        file_count: files.len(),
        zip_size_bytes: std::fs::metadata(&zip_path)?.len(),
        thumbnail: thumbnail_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    let metadata_path = zip_path.with_extension("json");
    std::fs::write(&metadata_path, serde_json::to_string_pretty(&metadata)?)?;

    prune_old_archives(output_dir)?;

    info!(archive = %zip_path.display(), hash = %&metadata.content_hash[..16], "archive created");
    Ok(ArchiveOutput {
        zip_path,
        thumbnail_path,
        metadata_path,
        metadata,
    })
}

/// Files directly under the pack, sorted by name, minus archive outputs.
fn collect_pack_files(pack_path: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(pack_path)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(ARCHIVE_PREFIX) {
            continue;
        }
        files.push((name, path));
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

fn content_hash(files: &[(String, PathBuf)]) -> Result<String> {
    let mut hasher = Sha256::new();
    for (name, path) in files {
        hasher.update(std::fs::read(path)?);
        hasher.update(name.as_bytes());
        hasher.update(b"\0");
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Deterministic gradient thumbnail derived from the content hash.
fn render_thumbnail(content_hash: &str) -> RgbImage {
    let seed = u32::from_str_radix(&content_hash[..8], 16).unwrap_or(0);

    // Brightness floors keep the primary color visible on the dark base.
    let primary = [
        (((seed >> 16) & 0xff) as u8).saturating_add(50),
        (((seed >> 8) & 0xff) as u8).saturating_add(30),
        ((seed & 0xff) as u8).saturating_add(80),
    ];
    let stride = 24 + (seed % 40);
    let offset = seed % stride;

    RgbImage::from_fn(THUMBNAIL_SIZE, THUMBNAIL_SIZE, |x, y| {
        if (x + y + offset) % stride < 2 {
            return Rgb([0xf0, 0xf0, 0xf0]);
        }
        let factor = f64::from(y) / f64::from(THUMBNAIL_SIZE);
        let channel = |c: u8| -> u8 {
            let blended = f64::from(c) * (1.0 - factor) + f64::from(0x23u8) * factor;
            blended.round() as u8
        };
        Rgb([channel(primary[0]), channel(primary[1]), channel(primary[2])])
    })
}

/// Keep the newest [`ARCHIVE_KEEP_COUNT`] archives; delete older triples.
fn prune_old_archives(output_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut zips: Vec<PathBuf> = std::fs::read_dir(output_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension().is_some_and(|ext| ext == "zip")
                && p.file_name()
                    .is_some_and(|n| n.to_string_lossy().starts_with(ARCHIVE_PREFIX))
        })
        .collect();
    zips.sort();

    let mut removed = Vec::new();
    if zips.len() > ARCHIVE_KEEP_COUNT {
        for old in &zips[..zips.len() - ARCHIVE_KEEP_COUNT] {
            for path in [old.clone(), old.with_extension("png"), old.with_extension("json")] {
                if path.exists() {
                    std::fs::remove_file(&path)?;
                    removed.push(path);
                }
            }
            debug!(archive = %old.display(), "pruned old archive");
        }
    }
    Ok(removed)
}
