//! Signature catalog service
//!
//! The fixed set of header and trailer signatures the carver searches for.
//! Byte patterns are reproduced exactly; report compatibility depends on it.

use crate::domain::entities::{FormatKey, Signature, SignatureRole};

const HEADERS: [Signature; 8] = [
    Signature::header(FormatKey::Bmp, "bmp", &[0x42, 0x4D]),
    Signature::header(FormatKey::Gif, "gif", &[0x47, 0x49, 0x46, 0x38, 0x39, 0x61]),
    Signature::header(FormatKey::Jpg, "jpg", &[0xFF, 0xD8, 0xFF, 0xE0]),
    Signature::header(
        FormatKey::Docx,
        "docx",
        &[0x50, 0x4B, 0x03, 0x04, 0x14, 0x00, 0x06, 0x00],
    ),
    Signature::header(FormatKey::Avi, "avi", &[0x52, 0x49, 0x46, 0x46]),
    Signature::header(
        FormatKey::Png,
        "png",
        &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
    ),
    Signature::header(FormatKey::Pdf, "pdf", &[0x25, 0x50, 0x44, 0x46]),
    // Sequence header start code only; other start codes are too common
    Signature::header(FormatKey::Mpg, "mpg", &[0x00, 0x00, 0x01]).with_follow_bytes(&[0xB3]),
];

const TRAILERS: [Signature; 9] = [
    Signature::trailer(FormatKey::Mpg, "mpg", &[0x00, 0x00, 0x01, 0xB7]),
    Signature::trailer(FormatKey::Pdf, "pdf", &[0x0A, 0x25, 0x25, 0x45, 0x4F, 0x46]),
    Signature::trailer(
        FormatKey::Pdf,
        "pdf2",
        &[0x0A, 0x25, 0x25, 0x45, 0x4F, 0x46, 0x0A],
    ),
    Signature::trailer(
        FormatKey::Pdf,
        "pdf3",
        &[0x0D, 0x0A, 0x25, 0x25, 0x45, 0x4F, 0x46, 0x0D, 0x0A],
    ),
    Signature::trailer(FormatKey::Gif, "gif", &[0x00, 0x00, 0x3B]),
    Signature::trailer(FormatKey::Jpg, "jpg", &[0xFF, 0xD9]),
    Signature::trailer(FormatKey::Docx, "docx", &[0x50, 0x4B, 0x05, 0x06]),
    Signature::trailer(
        FormatKey::Avi,
        "avi",
        &[0x41, 0x56, 0x49, 0x20, 0x4C, 0x49, 0x53, 0x54],
    ),
    Signature::trailer(
        FormatKey::Png,
        "png",
        &[0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82],
    ),
];

/// Catalog of header and trailer signatures
///
/// # Example
///
/// ```
/// use sigcarve::domain::entities::FormatKey;
/// use sigcarve::domain::services::SignatureCatalog;
///
/// let catalog = SignatureCatalog::standard();
/// assert_eq!(catalog.headers().len(), 8);
/// assert_eq!(catalog.trailers_for(FormatKey::Pdf).count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct SignatureCatalog {
    headers: Vec<Signature>,
    trailers: Vec<Signature>,
}

impl SignatureCatalog {
    /// The full built-in catalog
    pub fn standard() -> Self {
        Self {
            headers: HEADERS.to_vec(),
            trailers: TRAILERS.to_vec(),
        }
    }

    pub fn headers(&self) -> &[Signature] {
        &self.headers
    }

    pub fn trailers(&self) -> &[Signature] {
        &self.trailers
    }

    pub fn by_role(&self, role: SignatureRole) -> &[Signature] {
        match role {
            SignatureRole::Header => &self.headers,
            SignatureRole::Trailer => &self.trailers,
        }
    }

    pub fn trailers_for(&self, format: FormatKey) -> impl Iterator<Item = &Signature> {
        self.trailers.iter().filter(move |s| s.format() == format)
    }

    /// Looks up a signature by catalog key and role
    pub fn find(&self, name: &str, role: SignatureRole) -> Option<&Signature> {
        self.by_role(role).iter().find(|s| s.name() == name)
    }

    /// Keeps only signatures of the given formats; an empty list keeps all
    pub fn restrict(mut self, formats: &[FormatKey]) -> Self {
        if !formats.is_empty() {
            self.headers.retain(|s| formats.contains(&s.format()));
            self.trailers.retain(|s| formats.contains(&s.format()));
        }
        self
    }

    /// Formats with at least one header signature, in catalog order
    pub fn formats(&self) -> Vec<FormatKey> {
        let mut formats = Vec::new();
        for sig in &self.headers {
            if !formats.contains(&sig.format()) {
                formats.push(sig.format());
            }
        }
        formats
    }

    pub fn signature_count(&self) -> usize {
        self.headers.len() + self.trailers.len()
    }
}

impl Default for SignatureCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
