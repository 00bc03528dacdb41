//! Write a report to a standalone JSON file.
//!
//! The file holds `{ saved_at, report }` and is named
//! `homeprice_{locality}_{epoch_ms}.json`.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::data::store::write_atomic;
use crate::domain::{ExportedReport, Report};
use crate::error::AppError;

/// `homeprice_{slug}_{ms}.json`, where the slug is the lowercased locality
/// with whitespace runs collapsed to `_`.
pub fn export_file_name(locality: &str, epoch_ms: i64) -> String {
    let slug = locality
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<String>>()
        .join("_");
    let slug = if slug.is_empty() { "report".to_string() } else { slug };
    format!("homeprice_{slug}_{epoch_ms}.json")
}

/// Write `report` into `dir` and return the created path.
pub fn export_report(dir: &Path, report: &Report, now: DateTime<Utc>) -> Result<PathBuf, AppError> {
    fs::create_dir_all(dir)
        .map_err(|e| AppError::storage(format!("Failed to create export dir '{}': {e}", dir.display())))?;

    let path = dir.join(export_file_name(&report.locality, now.timestamp_millis()));
    let payload = ExportedReport {
        saved_at: now,
        report: report.clone(),
    };

    write_atomic(&path, |w| {
        serde_json::to_writer_pretty(w, &payload)
            .map_err(|e| AppError::storage(format!("Failed to write export JSON: {e}")))
    })?;

    info!(path = %path.display(), "report exported");
    Ok(path)
}

/// Read back an exported report file.
pub fn read_export(path: &Path) -> Result<ExportedReport, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::storage(format!("Failed to open report '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::decode(format!("Invalid report JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PredictionInput, RawEstimate};
    use crate::report::build_report;
    use chrono::TimeZone;

    #[test]
    fn file_name_slugs_the_locality() {
        assert_eq!(
            export_file_name("Banjara  Hills", 1_700_000_000_000),
            "homeprice_banjara_hills_1700000000000.json"
        );
        assert_eq!(export_file_name("  ", 5), "homeprice_report_5.json");
    }

    #[test]
    fn export_writes_saved_at_and_report() {
        let dir = tempfile::tempdir().unwrap();
        let input = PredictionInput {
            locality: "Jubilee Hills".to_string(),
            property_type: "Villa".to_string(),
            area_sqft: 2400.0,
            age_years: 3,
            bedrooms: 4,
        };
        let report = build_report(&input, RawEstimate { estimated_price: 3.0 });
        let now = Utc.with_ymd_and_hms(2026, 7, 4, 9, 0, 0).unwrap();

        let path = export_report(dir.path(), &report, now).unwrap();
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some(format!("homeprice_jubilee_hills_{}.json", now.timestamp_millis()).as_str())
        );

        let raw = std::fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["report"]["area_in_sqft"], 2400.0);
        assert_eq!(json["report"]["estimated"], 3.0);
        assert!(json["saved_at"].is_string());

        let back = read_export(&path).unwrap();
        assert_eq!(back.report, report);
        assert_eq!(back.saved_at, now);
    }

    #[test]
    fn reading_garbage_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "[1,2").unwrap();
        let err = read_export(&path).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Decode);
    }
}
