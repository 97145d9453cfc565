//! Span entity
//!
//! A claimed, contiguous byte range believed to hold one recovered file.

use super::file_signature::FormatKey;
use serde::Serialize;

/// Half-open byte range `[start, end)` attributed to one format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    start: u64,
    end: u64,
    format: FormatKey,
}

impl Span {
    /// Creates a span, refusing empty or inverted ranges
    pub fn new(start: u64, end: u64, format: FormatKey) -> Option<Self> {
        (start < end).then_some(Self { start, end, format })
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    /// Exclusive end offset
    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn format(&self) -> FormatKey {
        self.format
    }

    /// Number of bytes covered; never zero
    pub fn size(&self) -> u64 {
        self.end - self.start
    }

    /// True when `offset` lies strictly between start and end
    pub fn contains_strictly(&self, offset: u64) -> bool {
        offset > self.start && offset < self.end
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Returns the bytes of this span, or `None` if it runs past the image
    pub fn slice<'a>(&self, image: &'a [u8]) -> Option<&'a [u8]> {
        let start = usize::try_from(self.start).ok()?;
        let end = usize::try_from(self.end).ok()?;
        image.get(start..end)
    }
}
