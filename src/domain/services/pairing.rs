//! Per-format pairing strategies
//!
//! Each format turns its header and trailer candidate pools into spans in
//! its own way: nearest end marker, embedded size field, partitioning around
//! a second header, and so on. The set is closed and chosen per format by
//! [`PairingStrategy::for_format`].
//!
//! Every reduction over a pool may find it empty. That is a normal "no span"
//! outcome, logged at debug level, never a panic.

use crate::domain::entities::{FormatKey, OffsetEntry, Span};
use crate::domain::services::{Deadline, SpanRegistry};
use crate::error::Result;
use byteorder::{ByteOrder, LittleEndian};

pub const DEFAULT_SECTOR_SIZE: u64 = 512;

/// Plausibility filter keeping header offsets on a sector boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorAlignment {
    sector_size: u64,
}

impl SectorAlignment {
    /// A sector size of 0 disables the filter
    pub fn new(sector_size: u64) -> Self {
        Self { sector_size }
    }

    pub fn is_aligned(&self, offset: u64) -> bool {
        self.sector_size == 0 || offset % self.sector_size == 0
    }
}

impl Default for SectorAlignment {
    fn default() -> Self {
        Self::new(DEFAULT_SECTOR_SIZE)
    }
}

/// Inputs for resolving one format
#[derive(Debug)]
pub struct PairingContext<'a> {
    pub image: &'a [u8],
    pub format: FormatKey,
    /// Header candidates, reverse discovery order, already membership-filtered
    pub headers: Vec<OffsetEntry>,
    /// Trailer candidates of every variant, same ordering and filtering
    pub trailers: Vec<OffsetEntry>,
    pub alignment: SectorAlignment,
    pub deadline: Deadline,
}

impl PairingContext<'_> {
    fn bytes(&self, start: u64, end: u64) -> Option<&[u8]> {
        let start = usize::try_from(start).ok()?;
        let end = usize::try_from(end).ok()?;
        self.image.get(start..end)
    }

    fn fits(&self, end: u64) -> bool {
        end <= self.image.len() as u64
    }

    fn aligned_headers(&self) -> Vec<u64> {
        let mut offsets: Vec<u64> = self
            .headers
            .iter()
            .map(|h| h.offset)
            .filter(|&o| self.alignment.is_aligned(o))
            .collect();
        offsets.sort_unstable();
        offsets.dedup();
        offsets
    }

    /// Claims `[start, end)` if it is a valid span inside the image
    fn claim(&self, registry: &mut SpanRegistry, start: u64, end: u64) -> bool {
        if !self.fits(end) {
            tracing::debug!(format = %self.format, start, end, "candidate runs past end of image");
            return false;
        }
        match Span::new(start, end, self.format) {
            Some(span) => {
                registry.claim(span);
                true
            }
            None => {
                tracing::debug!(format = %self.format, start, end, "candidate has no extent");
                false
            }
        }
    }
}

/// How a format pairs its candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingStrategy {
    /// Nearest following end marker (GIF, PNG)
    EndMarker,
    /// i-th header with i-th trailer; little-endian size field between them (AVI)
    SizeFieldContainer { size_field_offset: u64 },
    /// Two headers, trailers partitioned around the later one (PDF). Every
    /// span ends `end_marker_len` bytes past its trailer offset, whichever
    /// marker variant matched there.
    TwoHeaderDocument { end_marker_len: u64 },
    /// End-of-central-directory record closes the archive (DOCX). The start
    /// is the lowest unassigned local header above the previous directory
    /// record, i.e. the first header of the nearest preceding archive rather
    /// than the single nearest header.
    CentralDirectoryArchive { trailing_bytes: u64 },
    /// Earliest aligned header to the pool's first end code (MPEG)
    SectorStream,
    /// No trailer; 32-bit size field in the file header (BMP)
    BitmapSizeField { size_field_offset: u64 },
    /// Fixed cardinality: always emits the earliest and the latest
    /// header/trailer pair, whatever the true number of files (JPEG)
    FixedPairPhoto,
}

impl PairingStrategy {
    pub fn for_format(format: FormatKey) -> Self {
        match format {
            FormatKey::Gif | FormatKey::Png => PairingStrategy::EndMarker,
            FormatKey::Avi => PairingStrategy::SizeFieldContainer {
                size_field_offset: 4,
            },
            FormatKey::Pdf => PairingStrategy::TwoHeaderDocument { end_marker_len: 6 },
            FormatKey::Docx => PairingStrategy::CentralDirectoryArchive { trailing_bytes: 18 },
            FormatKey::Mpg => PairingStrategy::SectorStream,
            FormatKey::Bmp => PairingStrategy::BitmapSizeField {
                size_field_offset: 2,
            },
            FormatKey::Jpg => PairingStrategy::FixedPairPhoto,
        }
    }

    /// Whether this strategy ignores the number of candidates it sees
    pub fn is_fixed_cardinality(&self) -> bool {
        matches!(self, PairingStrategy::FixedPairPhoto)
    }

    /// Resolves the context into spans, claiming each as soon as it is accepted.
    /// Returns the number of spans claimed.
    pub fn resolve(&self, ctx: &PairingContext<'_>, registry: &mut SpanRegistry) -> Result<usize> {
        match *self {
            PairingStrategy::EndMarker => resolve_end_marker(ctx, registry),
            PairingStrategy::SizeFieldContainer { size_field_offset } => {
                Ok(resolve_size_field_container(ctx, registry, size_field_offset))
            }
            PairingStrategy::TwoHeaderDocument { end_marker_len } => {
                Ok(resolve_two_header_document(ctx, registry, end_marker_len))
            }
            PairingStrategy::CentralDirectoryArchive { trailing_bytes } => {
                Ok(resolve_central_directory(ctx, registry, trailing_bytes))
            }
            PairingStrategy::SectorStream => Ok(resolve_sector_stream(ctx, registry)),
            PairingStrategy::BitmapSizeField { size_field_offset } => {
                Ok(resolve_bitmap(ctx, registry, size_field_offset))
            }
            PairingStrategy::FixedPairPhoto => resolve_fixed_pair(ctx, registry),
        }
    }
}

fn resolve_end_marker(ctx: &PairingContext<'_>, registry: &mut SpanRegistry) -> Result<usize> {
    let mut accepted = 0;

    for header in &ctx.headers {
        ctx.deadline.check("span reconciliation")?;

        let trailer = ctx
            .trailers
            .iter()
            .filter(|t| t.offset > header.offset && !registry.separates(header.offset, t.offset))
            .min_by_key(|t| (t.offset, t.len));

        match trailer {
            Some(t) => {
                if ctx.claim(registry, header.offset, t.end()) {
                    accepted += 1;
                }
            }
            None => tracing::debug!(
                format = %ctx.format,
                header = header.offset,
                "no usable trailer"
            ),
        }
    }

    Ok(accepted)
}

/// Reads a little-endian unsigned integer of any width. Wider than eight
/// bytes is accepted only when the excess high bytes are zero.
fn read_le_uint(field: &[u8]) -> Option<u64> {
    if field.is_empty() {
        return None;
    }
    let (low, high) = field.split_at(field.len().min(8));
    if high.iter().any(|&b| b != 0) {
        return None;
    }
    Some(LittleEndian::read_uint(low, low.len()))
}

fn resolve_size_field_container(
    ctx: &PairingContext<'_>,
    registry: &mut SpanRegistry,
    size_field_offset: u64,
) -> usize {
    if ctx.headers.len() != ctx.trailers.len() {
        tracing::warn!(
            format = %ctx.format,
            headers = ctx.headers.len(),
            trailers = ctx.trailers.len(),
            "header and trailer counts differ, pairing the common prefix"
        );
    }

    let mut accepted = 0;
    for (header, trailer) in ctx.headers.iter().zip(&ctx.trailers) {
        let field_start = header.offset + size_field_offset;
        if trailer.offset <= field_start {
            tracing::debug!(
                format = %ctx.format,
                header = header.offset,
                trailer = trailer.offset,
                "trailer precedes size field"
            );
            continue;
        }

        let Some(size) = ctx.bytes(field_start, trailer.offset).and_then(read_le_uint) else {
            tracing::debug!(format = %ctx.format, header = header.offset, "unreadable size field");
            continue;
        };

        if let Some(end) = header.offset.checked_add(size) {
            if ctx.claim(registry, header.offset, end) {
                accepted += 1;
            }
        }
    }
    accepted
}

fn resolve_two_header_document(
    ctx: &PairingContext<'_>,
    registry: &mut SpanRegistry,
    end_marker_len: u64,
) -> usize {
    let (Some(larger), Some(smaller)) = (
        ctx.headers.iter().map(|h| h.offset).max(),
        ctx.headers.iter().map(|h| h.offset).min(),
    ) else {
        tracing::debug!(format = %ctx.format, "no headers");
        return 0;
    };

    if ctx.headers.len() != 2 {
        tracing::warn!(
            format = %ctx.format,
            headers = ctx.headers.len(),
            "expected exactly two headers, using the first and last"
        );
    }

    let (greater, rest): (Vec<&OffsetEntry>, Vec<&OffsetEntry>) =
        ctx.trailers.iter().partition(|t| t.offset > larger);
    let latest = |pool: &[&OffsetEntry]| {
        pool.iter()
            .map(|t| t.offset)
            .max()
            .map(|offset| offset + end_marker_len)
    };

    let mut accepted = 0;
    match latest(&greater) {
        Some(end) => accepted += usize::from(ctx.claim(registry, larger, end)),
        None => tracing::debug!(
            format = %ctx.format,
            header = larger,
            "no trailer after last header"
        ),
    }

    if smaller != larger {
        match latest(&rest) {
            Some(end) => accepted += usize::from(ctx.claim(registry, smaller, end)),
            None => tracing::debug!(
                format = %ctx.format,
                header = smaller,
                "no trailer for first header"
            ),
        }
    }
    accepted
}

fn resolve_central_directory(
    ctx: &PairingContext<'_>,
    registry: &mut SpanRegistry,
    trailing_bytes: u64,
) -> usize {
    let mut directory_offsets: Vec<u64> = ctx.trailers.iter().map(|t| t.offset).collect();
    directory_offsets.sort_unstable();
    directory_offsets.dedup();

    let mut assigned: Vec<u64> = Vec::new();
    let mut accepted = 0;

    for trailer in &ctx.trailers {
        // The previous archive's directory bounds this archive from below;
        // its first local header after that point is where it starts.
        let floor = directory_offsets
            .iter()
            .rev()
            .find(|&&o| o < trailer.offset)
            .copied();

        let start = ctx
            .headers
            .iter()
            .map(|h| h.offset)
            .filter(|&h| {
                h < trailer.offset && floor.is_none_or(|f| h > f) && !assigned.contains(&h)
            })
            .min();

        match start {
            Some(start) => {
                assigned.push(start);
                if ctx.claim(registry, start, trailer.end() + trailing_bytes) {
                    accepted += 1;
                }
            }
            None => tracing::debug!(
                format = %ctx.format,
                trailer = trailer.offset,
                "no header before directory"
            ),
        }
    }
    accepted
}

fn resolve_sector_stream(ctx: &PairingContext<'_>, registry: &mut SpanRegistry) -> usize {
    let start = ctx.aligned_headers().first().copied();
    // Reverse discovery order puts the last end code of the image first
    let trailer = ctx.trailers.first();

    match (start, trailer) {
        (Some(start), Some(trailer)) => usize::from(ctx.claim(registry, start, trailer.end())),
        _ => {
            tracing::debug!(format = %ctx.format, "no aligned header or no end code");
            0
        }
    }
}

fn resolve_bitmap(
    ctx: &PairingContext<'_>,
    registry: &mut SpanRegistry,
    size_field_offset: u64,
) -> usize {
    let best = ctx
        .aligned_headers()
        .into_iter()
        .filter_map(|start| {
            let field_start = start + size_field_offset;
            let field = ctx.bytes(field_start, field_start + 4)?;
            let end = start + u64::from(LittleEndian::read_u32(field));
            let plausible = end > start && ctx.fits(end) && !registry.separates(start, end);
            plausible.then_some((start, end))
        })
        .min();

    match best {
        Some((start, end)) => usize::from(ctx.claim(registry, start, end)),
        None => {
            tracing::debug!(format = %ctx.format, "no plausible bitmap header");
            0
        }
    }
}

fn resolve_fixed_pair(ctx: &PairingContext<'_>, registry: &mut SpanRegistry) -> Result<usize> {
    let headers = ctx.aligned_headers();
    let claimed: &SpanRegistry = registry;

    let valid_trailers = |header: u64| {
        ctx.trailers
            .iter()
            .filter(move |t| t.offset > header && !claimed.separates(header, t.offset))
    };

    let mut first = None;
    for &header in &headers {
        ctx.deadline.check("span reconciliation")?;
        if let Some(t) = valid_trailers(header).min_by_key(|t| (t.offset, t.len)) {
            first = Some((header, t.end()));
            break;
        }
    }

    let mut last = None;
    for &header in headers.iter().rev() {
        ctx.deadline.check("span reconciliation")?;
        if let Some(t) = valid_trailers(header).max_by_key(|t| (t.offset, t.len)) {
            last = Some((header, t.end()));
            break;
        }
    }

    let (Some(first), Some(last)) = (first, last) else {
        tracing::debug!(format = %ctx.format, "no aligned header/trailer pair");
        return Ok(0);
    };

    let mut accepted = 0;
    for (start, end) in [first, last] {
        accepted += usize::from(ctx.claim(registry, start, end));
    }
    Ok(accepted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::SignatureRole;

    fn entries(
        format: FormatKey,
        role: SignatureRole,
        len: usize,
        offsets: &[u64],
    ) -> Vec<OffsetEntry> {
        offsets
            .iter()
            .map(|&offset| OffsetEntry {
                format,
                role,
                name: format.extension(),
                offset,
                len,
            })
            .collect()
    }

    fn context<'a>(
        image: &'a [u8],
        format: FormatKey,
        headers: &[u64],
        trailers: &[u64],
        trailer_len: usize,
    ) -> PairingContext<'a> {
        PairingContext {
            image,
            format,
            headers: entries(format, SignatureRole::Header, 4, headers),
            trailers: entries(format, SignatureRole::Trailer, trailer_len, trailers),
            alignment: SectorAlignment::default(),
            deadline: Deadline::unlimited(),
        }
    }

    fn claimed(registry: &SpanRegistry) -> Vec<(u64, u64)> {
        registry.spans().iter().map(|s| (s.start(), s.end())).collect()
    }

    #[test]
    fn test_strategy_lookup() {
        assert_eq!(PairingStrategy::for_format(FormatKey::Png), PairingStrategy::EndMarker);
        assert!(PairingStrategy::for_format(FormatKey::Jpg).is_fixed_cardinality());
        assert!(!PairingStrategy::for_format(FormatKey::Bmp).is_fixed_cardinality());
    }

    #[test]
    fn test_read_le_uint() {
        assert_eq!(read_le_uint(&[0xE8, 0x03, 0x00, 0x00]), Some(1000));
        assert_eq!(read_le_uint(&[0x01, 0, 0, 0, 0, 0, 0, 0, 0, 0]), Some(1));
        assert_eq!(read_le_uint(&[0, 0, 0, 0, 0, 0, 0, 0, 1]), None);
        assert_eq!(read_le_uint(&[]), None);
    }

    #[test]
    fn test_end_marker_picks_nearest_trailer() {
        let image = vec![0u8; 4096];
        let ctx = context(&image, FormatKey::Gif, &[1000, 100], &[3000, 800, 50], 3);
        let mut registry = SpanRegistry::new();
        let n = PairingStrategy::EndMarker.resolve(&ctx, &mut registry).unwrap();
        assert_eq!(n, 2);
        assert_eq!(claimed(&registry), vec![(1000, 3003), (100, 803)]);
    }

    #[test]
    fn test_end_marker_respects_separation() {
        let image = vec![0u8; 4096];
        let mut registry = SpanRegistry::new();
        registry.claim(Span::new(500, 600, FormatKey::Bmp).unwrap());
        let ctx = context(&image, FormatKey::Png, &[100], &[700, 2000], 8);
        let n = PairingStrategy::EndMarker.resolve(&ctx, &mut registry).unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn test_size_field_container() {
        let mut image = vec![0u8; 4096];
        image[516..520].copy_from_slice(&1000u32.to_le_bytes());
        let ctx = context(&image, FormatKey::Avi, &[512], &[520], 8);
        let mut registry = SpanRegistry::new();
        PairingStrategy::for_format(FormatKey::Avi)
            .resolve(&ctx, &mut registry)
            .unwrap();
        assert_eq!(claimed(&registry), vec![(512, 1512)]);
    }

    #[test]
    fn test_size_field_past_image_is_dropped() {
        let mut image = vec![0u8; 1024];
        image[4..8].copy_from_slice(&5000u32.to_le_bytes());
        let ctx = context(&image, FormatKey::Avi, &[0], &[8], 8);
        let mut registry = SpanRegistry::new();
        let n = PairingStrategy::for_format(FormatKey::Avi)
            .resolve(&ctx, &mut registry)
            .unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn test_central_directory_groups_archives() {
        let image = vec![0u8; 4096];
        let headers = [0x840, 0x800, 0x240, 0x200];
        let ctx = context(&image, FormatKey::Docx, &headers, &[0x900, 0x400], 4);
        let mut registry = SpanRegistry::new();
        let n = PairingStrategy::for_format(FormatKey::Docx)
            .resolve(&ctx, &mut registry)
            .unwrap();
        assert_eq!(n, 2);
        assert_eq!(claimed(&registry), vec![(0x800, 0x916), (0x200, 0x416)]);
    }

    #[test]
    fn test_sector_stream_uses_aligned_header() {
        let image = vec![0u8; 4096];
        let ctx = context(&image, FormatKey::Mpg, &[1536, 700, 1024], &[3000, 2000], 4);
        let mut registry = SpanRegistry::new();
        PairingStrategy::SectorStream.resolve(&ctx, &mut registry).unwrap();
        assert_eq!(claimed(&registry), vec![(1024, 3004)]);
    }

    #[test]
    fn test_sector_stream_without_aligned_header() {
        let image = vec![0u8; 4096];
        let ctx = context(&image, FormatKey::Mpg, &[700], &[3000], 4);
        let mut registry = SpanRegistry::new();
        assert_eq!(PairingStrategy::SectorStream.resolve(&ctx, &mut registry).unwrap(), 0);
    }

    #[test]
    fn test_bitmap_rejects_separated_candidate() {
        let mut image = vec![0u8; 8192];
        image[514..518].copy_from_slice(&4000u32.to_le_bytes());
        image[2050..2054].copy_from_slice(&100u32.to_le_bytes());
        let mut registry = SpanRegistry::new();
        registry.claim(Span::new(1024, 1100, FormatKey::Gif).unwrap());

        let ctx = context(&image, FormatKey::Bmp, &[2048, 512], &[], 0);
        PairingStrategy::for_format(FormatKey::Bmp)
            .resolve(&ctx, &mut registry)
            .unwrap();
        assert_eq!(claimed(&registry)[1], (2048, 2148));
    }

    #[test]
    fn test_alignment_filter() {
        let alignment = SectorAlignment::new(4096);
        assert!(alignment.is_aligned(8192));
        assert!(!alignment.is_aligned(512));
        assert!(SectorAlignment::new(0).is_aligned(3));
    }

    #[test]
    fn test_fixed_pair_emits_two_even_for_one_pair() {
        let image = vec![0u8; 4096];
        let ctx = context(&image, FormatKey::Jpg, &[512], &[900], 2);
        let mut registry = SpanRegistry::new();
        let n = PairingStrategy::FixedPairPhoto.resolve(&ctx, &mut registry).unwrap();
        assert_eq!(n, 2);
        assert_eq!(claimed(&registry), vec![(512, 902), (512, 902)]);
    }

    #[test]
    fn test_two_header_document_with_single_header() {
        let image = vec![0u8; 4096];
        let ctx = context(&image, FormatKey::Pdf, &[100], &[50, 900, 400], 6);
        let mut registry = SpanRegistry::new();
        let n = PairingStrategy::for_format(FormatKey::Pdf)
            .resolve(&ctx, &mut registry)
            .unwrap();
        assert_eq!(n, 1);
        assert_eq!(claimed(&registry), vec![(100, 906)]);
    }

    #[test]
    fn test_two_header_document_ends_at_base_marker() {
        let image = vec![0u8; 4096];
        let mut ctx = context(&image, FormatKey::Pdf, &[1000, 100], &[1500, 600], 6);
        // "\n%%EOF\n" at 1500 is seen as both the short and the newline variant
        ctx.trailers.push(OffsetEntry {
            format: FormatKey::Pdf,
            role: SignatureRole::Trailer,
            name: "pdf2",
            offset: 1500,
            len: 7,
        });
        let mut registry = SpanRegistry::new();
        let n = PairingStrategy::for_format(FormatKey::Pdf)
            .resolve(&ctx, &mut registry)
            .unwrap();
        assert_eq!(n, 2);
        assert_eq!(claimed(&registry), vec![(1000, 1506), (100, 606)]);
    }

    #[test]
    fn test_empty_pools_yield_nothing() {
        let image = vec![0u8; 64];
        for format in FormatKey::ALL {
            let ctx = context(&image, format, &[], &[], 2);
            let mut registry = SpanRegistry::new();
            let n = PairingStrategy::for_format(format)
                .resolve(&ctx, &mut registry)
                .unwrap();
            assert_eq!(n, 0, "{format}");
        }
    }
}
