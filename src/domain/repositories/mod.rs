//! Repository traits (interfaces)
//!
//! Contracts for the image source and the artifact sink, implemented in the
//! infrastructure layer.

mod disk_image;
mod file_writer;

pub use disk_image::DiskImage;
pub use file_writer::{ArtifactWriter, FileWriterError, WriteResult};
