//! Local file writer implementation
//!
//! Writes carved artifacts into a directory on the local filesystem.

use crate::domain::repositories::{ArtifactWriter, FileWriterError, WriteResult};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Local file system writer
pub struct LocalFileWriter {
    output_dir: PathBuf,
    overwrite: bool,
    files_written: AtomicUsize,
    bytes_written: AtomicU64,
}

fn map_io(path: &Path, e: std::io::Error) -> FileWriterError {
    match e.kind() {
        ErrorKind::PermissionDenied => {
            FileWriterError::PermissionDenied(path.display().to_string())
        }
        ErrorKind::AlreadyExists => FileWriterError::FileExists(path.display().to_string()),
        _ => FileWriterError::IoError(e),
    }
}

impl LocalFileWriter {
    /// Creates the writer, creating `output_dir` if needed
    pub fn new(output_dir: impl AsRef<Path>, overwrite: bool) -> Result<Self, FileWriterError> {
        let output_dir = output_dir.as_ref();
        fs::create_dir_all(output_dir).map_err(|e| map_io(output_dir, e))?;

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            overwrite,
            files_written: AtomicUsize::new(0),
            bytes_written: AtomicU64::new(0),
        })
    }

    fn open(&self, path: &Path) -> Result<File, FileWriterError> {
        let mut options = OpenOptions::new();
        options.write(true);
        if self.overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }
        options.open(path).map_err(|e| map_io(path, e))
    }
}

impl ArtifactWriter for LocalFileWriter {
    fn write(&self, name: &str, data: &[u8]) -> Result<WriteResult, FileWriterError> {
        let output_path = self.output_dir.join(name);

        // Closed when it goes out of scope, on success or failure
        let mut output_file = self.open(&output_path)?;
        output_file.write_all(data)?;
        output_file.sync_all()?;

        let saved_size = data.len() as u64;
        self.files_written.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(saved_size, Ordering::Relaxed);

        Ok(WriteResult {
            saved_path: output_path,
            saved_size,
        })
    }

    fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn files_written(&self) -> usize {
        self.files_written.load(Ordering::Relaxed)
    }

    fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }
}
