//! Remote data access and local storage.
//!
//! - `api`: HTTP client for the prediction backend
//! - `cache`: TTL list cache with stale-if-error fallback
//! - `store`: key-value store backing the cache and the report history

pub mod api;
pub mod cache;
pub mod store;

pub use api::{ListSource, Predictor, PriceApiClient};
pub use cache::{Clock, FetchedLists, ListCache, SystemClock};
pub use store::{FileStore, KvStore, MemoryStore};
