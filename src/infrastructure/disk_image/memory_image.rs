//! In-memory disk image

use crate::domain::repositories::DiskImage;

/// Owned image buffer
#[derive(Debug, Clone, Default)]
pub struct MemoryImage {
    data: Vec<u8>,
    label: String,
}

impl MemoryImage {
    pub fn new(label: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            data,
            label: label.into(),
        }
    }
}

impl DiskImage for MemoryImage {
    fn bytes(&self) -> &[u8] {
        &self.data
    }

    fn path(&self) -> &str {
        &self.label
    }
}
