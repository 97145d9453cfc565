use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that abort a carving run.
///
/// Heuristic misses (a format with no usable candidates) are not errors; they
/// surface as empty outcomes from the reconciler.
#[derive(Debug, Error)]
pub enum CarveError {
    #[error("File does not end with correct extension: \".{expected}\" ({})", path.display())]
    InvalidExtension { path: PathBuf, expected: String },

    #[error("File not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    #[error("Image {} has zero size", .0.display())]
    EmptyImage(PathBuf),

    #[error("Image is {size} bytes, exceeding the limit of {limit} bytes")]
    ImageTooLarge { size: u64, limit: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to build signature matcher: {0}")]
    Matcher(String),

    #[error("Deadline of {limit:?} exceeded during {phase}")]
    DeadlineExceeded { phase: &'static str, limit: Duration },
}

pub type Result<T> = std::result::Result<T, CarveError>;
