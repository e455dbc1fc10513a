//! Error taxonomy for soulpack operations.
//!
//! Structural and format problems inside a pack are captured as report data,
//! never as errors. Only environment-level conditions (the pack directory
//! itself missing, I/O on outputs, malformed log files) surface here.

use std::path::PathBuf;

/// Soulpack domain errors.
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("memory pack directory not found: {}", .0.display())]
    PackNotFound(PathBuf),

    #[error("git error: {0}")]
    Git(String),

    #[error("ceremony not found: {0}")]
    CeremonyNotFound(String),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("thumbnail error: {0}")]
    Thumbnail(#[from] image::ImageError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for soulpack domain operations.
pub type Result<T> = std::result::Result<T, PackError>;
