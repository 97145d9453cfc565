//! CLI commands using clap

use crate::application::dto::ScanOptions;
use crate::domain::entities::FormatKey;
use crate::domain::services::{DEFAULT_SECTOR_SIZE, OverlapPolicy, RegionStart};
use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// sigcarve - signature-based file carver
///
/// Finds files whose filesystem metadata is gone by searching a raw disk
/// image for known header and trailer signatures.
#[derive(Parser)]
#[command(name = "sigcarve")]
#[command(version)]
#[command(about = "Carve lost files out of raw disk images", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report the files found in an image
    Scan {
        #[command(flatten)]
        carve: CarveArgs,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report and write the carved files to a directory
    Recover {
        #[command(flatten)]
        carve: CarveArgs,

        /// Output directory for carved files
        #[arg(short, long, default_value = "./carved")]
        output: PathBuf,

        /// Overwrite existing files
        #[arg(long)]
        overwrite: bool,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the signature catalog
    ListSignatures,

    /// Show image size and boot sector geometry
    Info {
        /// Path to the disk image
        image: PathBuf,

        /// Accept images without the .dd extension
        #[arg(long)]
        any_extension: bool,
    },
}

/// Options shared by the carving subcommands
#[derive(Args, Debug, Clone)]
pub struct CarveArgs {
    /// Path to the disk image (.dd)
    pub image: PathBuf,

    /// Formats to carve (bmp, gif, jpg, docx, avi, png, pdf, mpg)
    #[arg(short = 't', long, value_delimiter = ',')]
    pub types: Option<Vec<String>>,

    /// Sector size headers must be aligned to (0 disables the check)
    #[arg(long, default_value_t = DEFAULT_SECTOR_SIZE)]
    pub sector_size: u64,

    /// Search the whole image instead of the FAT data region
    #[arg(long, conflicts_with = "scan_from")]
    pub whole_image: bool,

    /// Search from this byte offset instead of the FAT data region
    #[arg(long)]
    pub scan_from: Option<u64>,

    /// Report overlapping spans instead of dropping the later claim
    #[arg(long)]
    pub allow_overlap: bool,

    /// Abort if scanning and reconciliation take longer than this
    #[arg(long)]
    pub deadline_secs: Option<u64>,

    /// Refuse images larger than this many MiB
    #[arg(long)]
    pub max_image_mb: Option<u64>,

    /// Accept images without the .dd extension
    #[arg(long)]
    pub any_extension: bool,
}

impl CarveArgs {
    /// Maps the flags onto scan options
    pub fn to_options(&self) -> Result<ScanOptions> {
        let mut options = ScanOptions::new()
            .with_formats(parse_formats(self.types.as_deref())?)
            .with_sector_size(self.sector_size);

        if self.whole_image {
            options = options.with_region(RegionStart::Absolute(0));
        } else if let Some(offset) = self.scan_from {
            options = options.with_region(RegionStart::Absolute(offset));
        }
        if self.allow_overlap {
            options = options.with_overlap_policy(OverlapPolicy::Allow);
        }
        if let Some(secs) = self.deadline_secs {
            options = options.with_deadline(Duration::from_secs(secs));
        }
        if let Some(mb) = self.max_image_mb {
            options = options.with_max_image_mb(mb);
        }
        if self.any_extension {
            options = options.any_extension();
        }

        Ok(options)
    }
}

/// Parses format names; `None` selects every format
pub fn parse_formats(types: Option<&[String]>) -> Result<Vec<FormatKey>> {
    let Some(names) = types else {
        return Ok(Vec::new());
    };

    let mut formats = Vec::with_capacity(names.len());
    for name in names {
        match FormatKey::parse(name.trim()) {
            Some(format) if !formats.contains(&format) => formats.push(format),
            Some(_) => {}
            None => bail!("Unknown file type '{}'", name),
        }
    }
    Ok(formats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats() {
        let names = vec!["JPEG".to_string(), "pdf".to_string(), "jpg".to_string()];
        assert_eq!(parse_formats(Some(&names)).unwrap(), vec![FormatKey::Jpg, FormatKey::Pdf]);
        assert!(parse_formats(None).unwrap().is_empty());
        assert!(parse_formats(Some(&["tiff".to_string()])).is_err());
    }

    #[test]
    fn test_flags_map_to_options() {
        let cli = Cli::parse_from([
            "sigcarve",
            "scan",
            "usb.img",
            "--types",
            "gif,png",
            "--scan-from",
            "4096",
            "--allow-overlap",
            "--any-extension",
        ]);
        let Commands::Scan { carve, json } = cli.command else {
            panic!("expected scan");
        };
        assert!(!json);

        let options = carve.to_options().unwrap();
        assert_eq!(options.formats, vec![FormatKey::Gif, FormatKey::Png]);
        assert_eq!(options.region, RegionStart::Absolute(4096));
        assert_eq!(options.overlap_policy, OverlapPolicy::Allow);
        assert!(options.required_extension.is_none());
    }

    #[test]
    fn test_whole_image_conflicts_with_scan_from() {
        let result = Cli::try_parse_from([
            "sigcarve",
            "scan",
            "a.dd",
            "--whole-image",
            "--scan-from",
            "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
