//! Saved report history, persisted as one JSON array in the key-value store.
//!
//! Newest entries come first. A corrupt history is reported and left untouched
//! rather than overwritten.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::data::store::{KvStore, read_json, write_json};
use crate::domain::{Report, SavedReport};
use crate::error::AppError;

pub const HISTORY_KEY: &str = "homeprice_reports";

#[derive(Clone)]
pub struct ReportHistory {
    store: Arc<dyn KvStore>,
}

impl ReportHistory {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// All saved reports, newest first. Missing history is empty.
    pub fn load(&self) -> Result<Vec<SavedReport>, AppError> {
        Ok(read_json(self.store.as_ref(), HISTORY_KEY)?.unwrap_or_default())
    }

    /// Prepend `report` stamped with `now`.
    ///
    /// The id is the save time in epoch milliseconds, bumped past the newest
    /// existing id when two saves land in the same millisecond.
    pub fn save(&self, report: &Report, now: DateTime<Utc>) -> Result<SavedReport, AppError> {
        let mut entries = self.load()?;

        let mut id = now.timestamp_millis();
        if let Some(newest) = entries.iter().map(|e| e.id).max() {
            if id <= newest {
                id = newest + 1;
            }
        }

        let saved = SavedReport {
            id,
            saved_at: now,
            report: report.clone(),
        };
        entries.insert(0, saved.clone());
        write_json(self.store.as_ref(), HISTORY_KEY, &entries)?;

        info!(id, locality = %report.locality, total = entries.len(), "report saved");
        Ok(saved)
    }
}
