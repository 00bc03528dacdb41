//! The result panel: the last successful report plus its save/export actions.
//!
//! Action outcomes come back as short status strings for the footer.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::domain::Report;
use crate::error::AppError;
use crate::io::{ReportHistory, export_report};

pub const SAVED_MESSAGE: &str = "Saved to local reports";
pub const NOTHING_TO_SAVE: &str = "Nothing to save yet";
pub const NOTHING_TO_EXPORT: &str = "Nothing to download yet";

#[derive(Debug, Clone, Default)]
pub struct ResultPanel {
    report: Option<Report>,
}

impl ResultPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the displayed report.
    pub fn show(&mut self, report: Report) {
        self.report = Some(report);
    }

    pub fn clear(&mut self) {
        self.report = None;
    }

    /// `None` renders the empty state.
    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    pub fn save(&self, history: &ReportHistory, now: DateTime<Utc>) -> Result<String, AppError> {
        let Some(report) = &self.report else {
            return Ok(NOTHING_TO_SAVE.to_string());
        };
        history.save(report, now)?;
        Ok(SAVED_MESSAGE.to_string())
    }

    pub fn export(&self, dir: &Path, now: DateTime<Utc>) -> Result<String, AppError> {
        let Some(report) = &self.report else {
            return Ok(NOTHING_TO_EXPORT.to_string());
        };
        let path = export_report(dir, report, now)?;
        Ok(format!("Downloaded {}", path.display()))
    }
}
