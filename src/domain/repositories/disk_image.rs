//! Disk image source trait
//!
//! The carving engine works on one immutable byte buffer for the whole run.
//! Implementations decide where the bytes live (memory map, owned buffer).

/// Read-only access to a whole disk image
///
/// # Example
///
/// ```ignore
/// let image = MmapDiskImage::open("usb.dd", Some("dd"), None)?;
/// let boot = &image.bytes()[..512];
/// ```
pub trait DiskImage: Send + Sync {
    /// The entire image
    fn bytes(&self) -> &[u8];

    /// Path or label of the image
    fn path(&self) -> &str;

    fn size(&self) -> u64 {
        self.bytes().len() as u64
    }
}
