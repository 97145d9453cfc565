//! Data region locator
//!
//! Parses the FAT12/16 boot sector just far enough to find where the data
//! region begins. Searching from there skips the FATs and root directory,
//! whose bytes cannot hold file content. Searching from zero is still valid.

use byteorder::{LittleEndian, ReadBytesExt};
use serde::Serialize;
use std::io::Cursor;

/// Bytes of the boot sector needed to read every geometry field
pub const BOOT_SECTOR_FIELDS_LEN: usize = 24;

const BYTES_PER_SECTOR_OFFSET: u64 = 11;
const SECTORS_PER_CLUSTER_OFFSET: u64 = 13;
const RESERVED_SECTORS_OFFSET: u64 = 14;
const FAT_COUNT_OFFSET: u64 = 16;
const ROOT_ENTRIES_OFFSET: u64 = 17;
const SECTORS_PER_FAT_OFFSET: u64 = 22;
const ROOT_ENTRY_SIZE: u64 = 32;

/// Where the scan region starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionStart {
    /// Derive the data region from the boot sector
    #[default]
    BootSector,
    /// Fixed byte offset
    Absolute(u64),
}

/// Geometry fields of a FAT boot sector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BootSectorGeometry {
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub reserved_sectors: u16,
    pub fat_count: u8,
    pub root_entries: u16,
    pub sectors_per_fat: u16,
}

impl BootSectorGeometry {
    /// Reads the geometry fields; `None` if the buffer is too short
    ///
    /// No field is validated. Garbage in gives a garbage (but finite) offset.
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < BOOT_SECTOR_FIELDS_LEN {
            return None;
        }

        let mut cursor = Cursor::new(data);

        cursor.set_position(BYTES_PER_SECTOR_OFFSET);
        let bytes_per_sector = cursor.read_u16::<LittleEndian>().ok()?;

        cursor.set_position(SECTORS_PER_CLUSTER_OFFSET);
        let sectors_per_cluster = cursor.read_u8().ok()?;

        cursor.set_position(RESERVED_SECTORS_OFFSET);
        let reserved_sectors = cursor.read_u16::<LittleEndian>().ok()?;

        cursor.set_position(FAT_COUNT_OFFSET);
        let fat_count = cursor.read_u8().ok()?;

        cursor.set_position(ROOT_ENTRIES_OFFSET);
        let root_entries = cursor.read_u16::<LittleEndian>().ok()?;

        cursor.set_position(SECTORS_PER_FAT_OFFSET);
        let sectors_per_fat = cursor.read_u16::<LittleEndian>().ok()?;

        Some(Self {
            bytes_per_sector,
            sectors_per_cluster,
            reserved_sectors,
            fat_count,
            root_entries,
            sectors_per_fat,
        })
    }

    /// First sector of the root directory
    pub fn root_dir_sector(&self) -> u64 {
        u64::from(self.reserved_sectors)
            + u64::from(self.fat_count) * u64::from(self.sectors_per_fat)
    }

    /// Sectors occupied by the root directory, rounded up
    pub fn root_dir_sectors(&self) -> u64 {
        let bytes = u64::from(self.root_entries) * ROOT_ENTRY_SIZE;
        bytes.div_ceil(u64::from(self.bytes_per_sector.max(1)))
    }

    pub fn data_region_sector(&self) -> u64 {
        self.root_dir_sector() + self.root_dir_sectors()
    }

    /// Byte offset of the data region; zero when the sector size is zero
    pub fn data_region_offset(&self) -> u64 {
        self.data_region_sector() * u64::from(self.bytes_per_sector)
    }
}

/// Computes the byte offset where file content begins
///
/// Falls back to 0 when the image is too short to hold a boot sector.
pub fn locate_data_region(image: &[u8]) -> u64 {
    match BootSectorGeometry::parse(image) {
        Some(geometry) => {
            let offset = geometry.data_region_offset();
            tracing::debug!(?geometry, offset, "located data region");
            offset
        }
        None => {
            tracing::warn!(
                len = image.len(),
                "image too short for a boot sector, scanning from offset 0"
            );
            0
        }
    }
}

/// Resolves the configured region start against an image
pub fn resolve_region_start(image: &[u8], region: RegionStart) -> u64 {
    match region {
        RegionStart::BootSector => locate_data_region(image),
        RegionStart::Absolute(offset) => offset,
    }
}
