//! Disk image implementations

mod memory_image;
mod mmap_disk_image;

pub use memory_image::MemoryImage;
pub use mmap_disk_image::MmapDiskImage;
