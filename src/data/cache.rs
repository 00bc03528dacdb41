//! TTL cache over the option-list fetches, with stale-if-error fallback.
//!
//! Lookup policy for one list:
//! 1. fresh entry (age <= TTL) and no forced refresh: serve it, no request
//! 2. otherwise fetch; on success overwrite the entry and serve the new list
//! 3. on fetch failure serve whatever entry exists, however old
//! 4. only with no entry at all does the fetch error reach the caller
//!
//! Entries that fail to decode are treated as missing.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use crate::data::api::ListSource;
use crate::data::store::{KvStore, read_json, write_json};
use crate::domain::{CacheEntry, ListKind};
use crate::error::{AppError, ErrorKind};

/// Wall-clock source in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Both option lists, plus the handle of a background refresh when one was started.
#[derive(Debug)]
pub struct FetchedLists {
    pub locations: Vec<String>,
    pub property_types: Vec<String>,
    pub background_refresh: Option<JoinHandle<()>>,
}

#[derive(Clone)]
pub struct ListCache {
    source: Arc<dyn ListSource>,
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl ListCache {
    pub fn new(source: Arc<dyn ListSource>, store: Arc<dyn KvStore>, ttl: Duration) -> Self {
        Self::with_clock(source, store, Arc::new(SystemClock), ttl)
    }

    pub fn with_clock(
        source: Arc<dyn ListSource>,
        store: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        Self {
            source,
            store,
            clock,
            ttl,
        }
    }

    /// Cached list for `kind` if it is within the TTL. Expired or unreadable
    /// entries are a miss, never an error.
    pub fn read_fresh(&self, kind: ListKind) -> Option<Vec<String>> {
        self.read_entry(kind)
            .filter(|entry| self.is_fresh(entry))
            .map(|entry| entry.value)
    }

    /// Store `list` for `kind`, stamped with the current time.
    pub fn write(&self, kind: ListKind, list: &[String]) -> Result<(), AppError> {
        let entry = CacheEntry {
            timestamp: self.clock.now_millis(),
            value: list.to_vec(),
        };
        write_json(self.store.as_ref(), kind.cache_key(), &entry)
    }

    pub fn invalidate(&self, kind: ListKind) -> Result<(), AppError> {
        self.store.remove(kind.cache_key())
    }

    /// One list, following the TTL + stale-if-error policy.
    pub fn get_list(&self, kind: ListKind, force_refresh: bool) -> Result<Vec<String>, AppError> {
        let cached = self.read_entry(kind);

        if !force_refresh {
            if let Some(entry) = &cached {
                if self.is_fresh(entry) {
                    debug!(?kind, "list cache hit");
                    return Ok(entry.value.clone());
                }
            }
        }

        match self.source.fetch_list(kind) {
            Ok(list) => {
                if let Err(err) = self.write(kind, &list) {
                    warn!(?kind, %err, "failed to update list cache");
                }
                debug!(?kind, len = list.len(), "list refreshed");
                Ok(list)
            }
            Err(err) => match cached {
                Some(entry) => {
                    warn!(?kind, %err, age_ms = self.age_millis(&entry), "refresh failed, serving stale list");
                    Ok(entry.value)
                }
                None => Err(err),
            },
        }
    }

    /// Both lists. Fetched in parallel unless both are fresh, in which case the
    /// cached copies are returned at once and a detached refresh is started.
    pub fn fetch_lists(&self, force_refresh: bool) -> Result<FetchedLists, AppError> {
        if !force_refresh {
            if let (Some(locations), Some(property_types)) = (
                self.read_fresh(ListKind::Locations),
                self.read_fresh(ListKind::PropertyTypes),
            ) {
                return Ok(FetchedLists {
                    locations,
                    property_types,
                    background_refresh: self.spawn_background_refresh(),
                });
            }
        }

        let (locations, property_types) = self.get_lists(force_refresh)?;
        Ok(FetchedLists {
            locations,
            property_types,
            background_refresh: None,
        })
    }

    /// Both lists through `get_list`, in parallel, with no background refresh.
    /// For short-lived callers that exit right after reading.
    pub fn get_lists(&self, force_refresh: bool) -> Result<(Vec<String>, Vec<String>), AppError> {
        let (locations, property_types) = rayon::join(
            || self.get_list(ListKind::Locations, force_refresh),
            || self.get_list(ListKind::PropertyTypes, force_refresh),
        );
        Ok((locations?, property_types?))
    }

    fn spawn_background_refresh(&self) -> Option<JoinHandle<()>> {
        let cache = self.clone();
        let spawned = thread::Builder::new()
            .name("list-refresh".to_string())
            .spawn(move || {
                for kind in ListKind::ALL {
                    if let Err(err) = cache.get_list(kind, true) {
                        debug!(?kind, %err, "background list refresh failed");
                    }
                }
            });

        match spawned {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!(%err, "could not start background list refresh");
                None
            }
        }
    }

    fn read_entry(&self, kind: ListKind) -> Option<CacheEntry<Vec<String>>> {
        match read_json::<CacheEntry<Vec<String>>>(self.store.as_ref(), kind.cache_key()) {
            Ok(entry) => entry,
            Err(err) if err.kind() == ErrorKind::Decode => {
                warn!(?kind, %err, "discarding corrupt list cache entry");
                if let Err(err) = self.invalidate(kind) {
                    warn!(?kind, %err, "failed to remove corrupt list cache entry");
                }
                None
            }
            Err(err) => {
                warn!(?kind, %err, "list cache unreadable");
                None
            }
        }
    }

    fn age_millis(&self, entry: &CacheEntry<Vec<String>>) -> i64 {
        self.clock.now_millis() - entry.timestamp
    }

    fn is_fresh(&self, entry: &CacheEntry<Vec<String>>) -> bool {
        let ttl_ms = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        self.age_millis(entry) <= ttl_ms
    }
}
