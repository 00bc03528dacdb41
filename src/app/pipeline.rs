//! Shared wiring used by both the CLI subcommands and the TUI.
//!
//! One `Services` value owns the HTTP client, the local store, the list cache,
//! and the report history, so every front-end talks to the same instances.

use std::sync::Arc;

use tracing::info;

use crate::config::AppConfig;
use crate::data::{FileStore, KvStore, ListCache, Predictor, PriceApiClient};
use crate::domain::{PredictionInput, Report};
use crate::error::AppError;
use crate::form::SearchableSelector;
use crate::io::ReportHistory;
use crate::report::build_report;

#[derive(Clone)]
pub struct Services {
    pub config: AppConfig,
    pub client: Arc<PriceApiClient>,
    pub cache: ListCache,
    pub history: ReportHistory,
}

impl Services {
    pub fn from_config(config: AppConfig) -> Result<Self, AppError> {
        let client = Arc::new(PriceApiClient::from_config(&config)?);
        let store: Arc<dyn KvStore> = Arc::new(FileStore::open(&config.data_dir)?);
        let cache = ListCache::new(client.clone(), store.clone(), config.cache_ttl);
        let history = ReportHistory::new(store);

        info!(
            api_base = client.base_url(),
            data_dir = %config.data_dir.display(),
            "services ready"
        );

        Ok(Self {
            config,
            client,
            cache,
            history,
        })
    }

    pub fn predictor(&self) -> Arc<dyn Predictor> {
        self.client.clone()
    }
}

/// Canonicalize `input` against the served lists, request an estimate, and
/// build the report. Used by `homeprice predict`.
pub fn run_prediction(services: &Services, mut input: PredictionInput) -> Result<Report, AppError> {
    let (locations, property_types) = services.cache.get_lists(false)?;

    input.locality = canonical_choice("locality", &input.locality, &locations)?;
    input.property_type = canonical_choice("property type", &input.property_type, &property_types)?;
    if !(input.area_sqft.is_finite() && input.area_sqft > 0.0) {
        return Err(AppError::validation("Area must be a positive number of square feet"));
    }

    let estimate = services.client.predict(&input)?;
    let report = build_report(&input, estimate);
    info!(locality = %report.locality, estimated = report.estimated, "prediction complete");
    Ok(report)
}

/// Match `wanted` against `options` the way the form's selector does, so the
/// CLI can only send values the backend actually serves.
fn canonical_choice(label: &str, wanted: &str, options: &[String]) -> Result<String, AppError> {
    let mut selector = SearchableSelector::new(options.iter().map(|o| crate::form::title_case(o)).collect());
    if selector.select_value(wanted) {
        if let Some(value) = selector.value() {
            return Ok(value.to_string());
        }
    }
    Err(AppError::validation(format!(
        "Unknown {label} '{wanted}'. Run `homeprice lists` to see the choices."
    )))
}
