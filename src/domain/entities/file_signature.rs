//! File signature entity
//!
//! Represents the magic bytes that mark the start (header) or the end
//! (trailer) of a carvable format. This is the foundation of file carving.

use serde::Serialize;
use std::fmt;

/// Formats the carver knows how to recover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKey {
    /// Windows bitmap, sized by its file header
    Bmp,
    /// GIF89a image
    Gif,
    /// JFIF JPEG image
    Jpg,
    /// Office Open XML document (ZIP container)
    Docx,
    /// RIFF AVI container
    Avi,
    /// PNG image
    Png,
    /// PDF document
    Pdf,
    /// MPEG program/video stream
    Mpg,
}

impl FormatKey {
    pub const ALL: [FormatKey; 8] = [
        FormatKey::Bmp,
        FormatKey::Gif,
        FormatKey::Jpg,
        FormatKey::Docx,
        FormatKey::Avi,
        FormatKey::Png,
        FormatKey::Pdf,
        FormatKey::Mpg,
    ];

    /// Returns the catalog key, which doubles as the output file extension
    pub fn extension(&self) -> &'static str {
        match self {
            FormatKey::Bmp => "bmp",
            FormatKey::Gif => "gif",
            FormatKey::Jpg => "jpg",
            FormatKey::Docx => "docx",
            FormatKey::Avi => "avi",
            FormatKey::Png => "png",
            FormatKey::Pdf => "pdf",
            FormatKey::Mpg => "mpg",
        }
    }

    /// Returns a human-readable name for this format
    pub fn name(&self) -> &'static str {
        match self {
            FormatKey::Bmp => "BMP Image",
            FormatKey::Gif => "GIF Image",
            FormatKey::Jpg => "JPEG Image",
            FormatKey::Docx => "Word Document",
            FormatKey::Avi => "AVI Video",
            FormatKey::Png => "PNG Image",
            FormatKey::Pdf => "PDF Document",
            FormatKey::Mpg => "MPEG Video",
        }
    }

    /// Parses a user-supplied format name (extension or common alias)
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "bmp" => Some(FormatKey::Bmp),
            "gif" => Some(FormatKey::Gif),
            "jpg" | "jpeg" => Some(FormatKey::Jpg),
            "docx" | "zip" => Some(FormatKey::Docx),
            "avi" => Some(FormatKey::Avi),
            "png" => Some(FormatKey::Png),
            "pdf" => Some(FormatKey::Pdf),
            "mpg" | "mpeg" => Some(FormatKey::Mpg),
            _ => None,
        }
    }
}

impl fmt::Display for FormatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Whether a signature opens or closes a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureRole {
    Header,
    Trailer,
}

impl fmt::Display for SignatureRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureRole::Header => f.write_str("header"),
            SignatureRole::Trailer => f.write_str("trailer"),
        }
    }
}

/// A byte signature for one format and role
///
/// `name` is the catalog key. It equals the format extension except for
/// trailer variants (`pdf2`, `pdf3`) that share a format with a base trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    name: &'static str,
    format: FormatKey,
    role: SignatureRole,
    pattern: &'static [u8],
    /// Bytes allowed right after the pattern; `None` accepts anything
    follow_bytes: Option<&'static [u8]>,
}

impl Signature {
    pub const fn header(format: FormatKey, name: &'static str, pattern: &'static [u8]) -> Self {
        Self {
            name,
            format,
            role: SignatureRole::Header,
            pattern,
            follow_bytes: None,
        }
    }

    pub const fn trailer(format: FormatKey, name: &'static str, pattern: &'static [u8]) -> Self {
        Self {
            name,
            format,
            role: SignatureRole::Trailer,
            pattern,
            follow_bytes: None,
        }
    }

    /// Restricts matches to those followed by one of `bytes`
    ///
    /// Short patterns such as the three-byte MPEG start code occur constantly
    /// in random data; the following byte tells real stream starts apart.
    pub const fn with_follow_bytes(mut self, bytes: &'static [u8]) -> Self {
        self.follow_bytes = Some(bytes);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn format(&self) -> FormatKey {
        self.format
    }

    pub fn role(&self) -> SignatureRole {
        self.role
    }

    pub fn pattern(&self) -> &'static [u8] {
        self.pattern
    }

    pub fn len(&self) -> usize {
        self.pattern.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    pub fn follow_bytes(&self) -> Option<&'static [u8]> {
        self.follow_bytes
    }

    /// Checks the byte right after a match; `None` means the buffer ended
    pub fn accepts_follow_byte(&self, next: Option<u8>) -> bool {
        match self.follow_bytes {
            None => true,
            Some(allowed) => next.is_some_and(|b| allowed.contains(&b)),
        }
    }
}
