//! Artifact persistence

mod local_file_writer;

pub use local_file_writer::LocalFileWriter;
