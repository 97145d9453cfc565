//! Artifact writer trait
//!
//! Defines the interface for persisting carved spans.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when writing carved artifacts
#[derive(Error, Debug)]
pub enum FileWriterError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("File already exists: {0}")]
    FileExists(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result of writing one artifact
#[derive(Debug, Clone)]
pub struct WriteResult {
    /// Path where the artifact was saved
    pub saved_path: PathBuf,
    /// Bytes written
    pub saved_size: u64,
}

/// Trait for writing carved artifacts to storage
///
/// # Example
///
/// ```ignore
/// let writer = LocalFileWriter::new("/output/carved", false)?;
/// let result = writer.write("file0.gif", &image[start..end])?;
/// println!("Saved to: {}", result.saved_path.display());
/// ```
pub trait ArtifactWriter: Send + Sync {
    /// Writes `data` under `name` inside the output directory
    fn write(&self, name: &str, data: &[u8]) -> Result<WriteResult, FileWriterError>;

    /// Returns the output directory
    fn output_dir(&self) -> &Path;

    /// Returns the number of artifacts written so far
    fn files_written(&self) -> usize;

    /// Returns the total bytes written so far
    fn bytes_written(&self) -> u64;
}
