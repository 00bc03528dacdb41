//! Local persistence of finished reports.
//!
//! - saved report history in the key-value store (`history`)
//! - standalone JSON export files (`export`)

pub mod export;
pub mod history;

pub use export::*;
pub use history::*;
