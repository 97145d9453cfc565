//! Memory-mapped disk image
//!
//! Maps the whole image read-only so the scanner and reconciler can work on
//! one `&[u8]` without copying it into memory.

use crate::domain::repositories::DiskImage;
use crate::error::{CarveError, Result};
use memmap2::Mmap;
use std::fs::OpenOptions;
use std::path::Path;

/// Read-only memory-mapped image file
///
/// # Example
///
/// ```ignore
/// let image = MmapDiskImage::open("usb.dd", Some("dd"), None)?;
/// println!("{} bytes", image.size());
/// ```
pub struct MmapDiskImage {
    mmap: Mmap,
    label: String,
}

impl MmapDiskImage {
    /// Opens and maps an image
    ///
    /// `required_extension` is given without the dot and compared ignoring
    /// ASCII case;
    /// `max_bytes` rejects images above the limit before mapping them.
    pub fn open(
        path: impl AsRef<Path>,
        required_extension: Option<&str>,
        max_bytes: Option<u64>,
    ) -> Result<Self> {
        let path = path.as_ref();

        if let Some(expected) = required_extension {
            let matches = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(expected));
            if !matches {
                return Err(CarveError::InvalidExtension {
                    path: path.to_path_buf(),
                    expected: expected.to_string(),
                });
            }
        }

        if !path.is_file() {
            return Err(CarveError::ImageNotFound(path.to_path_buf()));
        }

        let file = OpenOptions::new().read(true).open(path)?;
        let size = file.metadata()?.len();

        if size == 0 {
            return Err(CarveError::EmptyImage(path.to_path_buf()));
        }
        if let Some(limit) = max_bytes {
            if size > limit {
                return Err(CarveError::ImageTooLarge { size, limit });
            }
        }

        // SAFETY: the map is read-only; the image must not be modified while
        // a run is in progress.
        let mmap = unsafe { Mmap::map(&file) }?;

        tracing::debug!(path = %path.display(), size, "mapped image");

        Ok(Self {
            mmap,
            label: path.display().to_string(),
        })
    }
}

impl DiskImage for MmapDiskImage {
    fn bytes(&self) -> &[u8] {
        &self.mmap
    }

    fn path(&self) -> &str {
        &self.label
    }
}
