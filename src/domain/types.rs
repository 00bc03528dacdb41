//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - sent to / decoded from the prediction backend
//! - cached and persisted in the local store
//! - exported to JSON and reloaded for the history view

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One of the two option lists the backend serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Locations,
    PropertyTypes,
}

impl ListKind {
    pub const ALL: [ListKind; 2] = [ListKind::Locations, ListKind::PropertyTypes];

    /// Path (relative to the API base) serving this list.
    pub fn endpoint(self) -> &'static str {
        match self {
            ListKind::Locations => "/get_location_names",
            ListKind::PropertyTypes => "/get_property_types",
        }
    }

    /// Key holding the array in the JSON response body.
    pub fn response_key(self) -> &'static str {
        match self {
            ListKind::Locations => "locations",
            ListKind::PropertyTypes => "property_types",
        }
    }

    /// Store key for the cached copy of this list.
    pub fn cache_key(self) -> &'static str {
        match self {
            ListKind::Locations => "list_cache.locations",
            ListKind::PropertyTypes => "list_cache.property_types",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ListKind::Locations => "Locality",
            ListKind::PropertyTypes => "Property Type",
        }
    }
}

/// Validated form inputs sent to the prediction endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionInput {
    pub locality: String,
    pub property_type: String,
    #[serde(rename = "area_in_sqft")]
    pub area_sqft: f64,
    #[serde(rename = "age_of_property")]
    pub age_years: u32,
    pub bedrooms: u32,
}

impl PredictionInput {
    /// Form-encoded field pairs, in the order the backend documents them.
    pub fn form_fields(&self) -> [(&'static str, String); 5] {
        [
            ("locality", self.locality.clone()),
            ("property_type", self.property_type.clone()),
            ("area_in_sqft", self.area_sqft.to_string()),
            ("age_of_property", self.age_years.to_string()),
            ("bedrooms", self.bedrooms.to_string()),
        ]
    }
}

/// The backend's only numeric output.
///
/// Unit-ambiguous: values `>= 1` are crores, smaller values are displayed in lakhs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawEstimate {
    pub estimated_price: f64,
}

/// One presentational feature-weight bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub name: String,
    #[serde(rename = "value")]
    pub percentage: u32,
}

/// Display-ready report derived from one successful prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub locality: String,
    pub property_type: String,
    #[serde(rename = "area_in_sqft")]
    pub area_sqft: f64,
    #[serde(rename = "age_of_property")]
    pub age_years: u32,
    pub bedrooms: u32,
    pub estimated: f64,
    pub low: f64,
    pub high: f64,
    pub contributions: Vec<Contribution>,
    pub timeseries: Vec<f64>,
}

/// A cached value stamped with its write time (epoch millis).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub timestamp: i64,
    pub value: T,
}

/// One entry of the local report history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedReport {
    pub id: i64,
    pub saved_at: DateTime<Utc>,
    pub report: Report,
}

/// Contents of an exported report file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedReport {
    pub saved_at: DateTime<Utc>,
    pub report: Report,
}
