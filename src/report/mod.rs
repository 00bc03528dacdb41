//! Report derivation: confidence band, contribution weights, trend series.
//!
//! Everything here is pure. The contribution split is a fixed presentational
//! placeholder and carries no information about the model's feature importance.

pub mod format;

pub use format::*;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::{Contribution, PredictionInput, RawEstimate, Report};

/// Lower / upper multipliers of the confidence band.
pub const BAND_LOW: f64 = 0.92;
pub const BAND_HIGH: f64 = 1.08;

/// Multipliers of the 5-point trend series, oldest first.
pub const TREND_MULTIPLIERS: [f64; 5] = [0.95, 0.98, 1.00, 1.02, 1.05];

/// Fixed contribution weights (percent), in display order. Sums to 100.
pub const CONTRIBUTION_WEIGHTS: [(&str, u32); 4] = [
    ("Locality", 45),
    ("Area", 30),
    ("Bedrooms", 15),
    ("Age", 10),
];

/// Build the display-ready report for one estimate.
pub fn build_report(input: &PredictionInput, estimate: RawEstimate) -> Report {
    let estimated = estimate.estimated_price;

    Report {
        locality: input.locality.clone(),
        property_type: input.property_type.clone(),
        area_sqft: input.area_sqft,
        age_years: input.age_years,
        bedrooms: input.bedrooms,
        estimated,
        low: round2(estimated * BAND_LOW),
        high: round2(estimated * BAND_HIGH),
        contributions: contributions(),
        timeseries: trend_series(estimated),
    }
}

pub fn contributions() -> Vec<Contribution> {
    CONTRIBUTION_WEIGHTS
        .iter()
        .map(|&(name, percentage)| Contribution {
            name: name.to_string(),
            percentage,
        })
        .collect()
}

pub fn trend_series(estimated: f64) -> Vec<f64> {
    TREND_MULTIPLIERS.iter().map(|m| round2(estimated * m)).collect()
}

/// Round the exact binary value of `v` to 2 places, ties away from zero.
/// `0.5 * 0.95` is stored just below 0.475, so it rounds to 0.47.
pub fn round2(v: f64) -> f64 {
    fixed(v, 2).and_then(|d| d.to_f64()).unwrap_or(v)
}

/// `v` with exactly `dp` decimals, rounded like `round2`.
pub fn to_fixed(v: f64, dp: u32) -> String {
    match fixed(v, dp) {
        Some(mut d) => {
            d.rescale(dp);
            d.to_string()
        }
        // NaN, infinities and magnitudes beyond `Decimal`.
        None => format!("{v:.prec$}", prec = dp as usize),
    }
}

fn fixed(v: f64, dp: u32) -> Option<Decimal> {
    Decimal::from_f64_retain(v).map(|d| d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero))
}
