//! Infrastructure layer
//!
//! Concrete implementations of the domain repositories: image sources and
//! artifact writers.

pub mod disk_image;
pub mod persistence;
