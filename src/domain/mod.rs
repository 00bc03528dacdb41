//! Domain types shared across the crate.
//!
//! This module defines:
//!
//! - the list kinds served by the backend (`ListKind`)
//! - form inputs and the backend estimate (`PredictionInput`, `RawEstimate`)
//! - the derived report and its persisted envelopes (`Report`, `SavedReport`, `ExportedReport`)
//! - cache entries (`CacheEntry`)

pub mod types;

pub use types::*;
