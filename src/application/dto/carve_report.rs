//! Carve report DTO

use super::format_bytes;
use crate::domain::entities::{CountEntry, FormatKey, Span};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// One carved file as reported to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRecord {
    /// `file{index}.{extension}`, index in start order
    pub name: String,
    pub format: FormatKey,
    pub start: u64,
    pub end: u64,
    pub size: u64,
    /// Lowercase hex SHA-256 of `image[start..end]`
    pub sha256: String,
}

impl fmt::Display for ReportRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, Start Offset: {}, End Offset: {}, SHA-256: {}",
            self.name, self.start, self.end, self.sha256
        )
    }
}

/// Result of carving one image
#[derive(Debug, Clone, Serialize)]
pub struct CarveReport {
    pub source_path: String,
    pub image_size: u64,
    /// Offset the search started from
    pub data_region: u64,
    pub header_counts: Vec<CountEntry>,
    pub trailer_counts: Vec<CountEntry>,
    /// Carved files sorted by start offset
    pub records: Vec<ReportRecord>,
    /// Spans dropped by the overlap pass, in claim order
    pub rejected: Vec<Span>,
    #[serde(serialize_with = "serialize_secs")]
    pub duration: Duration,
}

fn serialize_secs<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

impl CarveReport {
    pub fn files_found(&self) -> usize {
        self.records.len()
    }

    pub fn bytes_carved(&self) -> u64 {
        self.records.iter().map(|r| r.size).sum()
    }

    /// One line per record, in report order
    pub fn lines(&self) -> Vec<String> {
        self.records.iter().map(ToString::to_string).collect()
    }

    /// Returns a summary string
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Carved {} files ({}) from {} ({}) in {:.2}s\n",
            self.files_found(),
            format_bytes(self.bytes_carved()),
            self.source_path,
            format_bytes(self.image_size),
            self.duration.as_secs_f64()
        );

        for format in FormatKey::ALL {
            let count = self.records.iter().filter(|r| r.format == format).count();
            if count > 0 {
                summary.push_str(&format!("  - {}: {}\n", format.name(), count));
            }
        }

        if !self.rejected.is_empty() {
            summary.push_str(&format!("{} overlapping spans dropped\n", self.rejected.len()));
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ReportRecord {
        ReportRecord {
            name: "file0.gif".to_string(),
            format: FormatKey::Gif,
            start: 512,
            end: 803,
            size: 291,
            sha256: "ab".repeat(32),
        }
    }

    #[test]
    fn test_record_line_format() {
        assert_eq!(
            record().to_string(),
            format!("file0.gif, Start Offset: 512, End Offset: 803, SHA-256: {}", "ab".repeat(32))
        );
    }

    #[test]
    fn test_report_serializes() {
        let report = CarveReport {
            source_path: "usb.dd".to_string(),
            image_size: 4096,
            data_region: 0,
            header_counts: Vec::new(),
            trailer_counts: Vec::new(),
            records: vec![record()],
            rejected: Vec::new(),
            duration: Duration::from_millis(1500),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["records"][0]["format"], "gif");
        assert_eq!(json["records"][0]["size"], 291);
        assert_eq!(json["duration"], 1.5);
        assert!(report.summary().contains("GIF Image: 1"));
    }
}
