//! Text formatting of reports for terminal output.
//!
//! Price formatting is shared by the TUI and the CLI so both show the same
//! strings.

use crate::domain::{Report, SavedReport};
use crate::report::{round2, to_fixed};

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Human-readable price.
///
/// Estimates below 1 are crore fractions and are shown in lakhs; an exact
/// lakh amount drops the decimals. Everything else is shown in crores.
pub fn format_price(estimated: f64) -> String {
    if estimated < 1.0 {
        let lakhs = estimated * 100.0;
        let rounded = round2(lakhs);
        if rounded.fract() == 0.0 {
            format!("{} Lakhs", to_fixed(rounded, 0))
        } else {
            format!("{} Lakhs", to_fixed(lakhs, 2))
        }
    } else {
        format!("{} Crores", to_fixed(estimated, 2))
    }
}

/// Confidence band line, e.g. `0.78 - 0.92 crores`.
pub fn format_band(report: &Report) -> String {
    format!("{} - {} crores", to_fixed(report.low, 2), to_fixed(report.high, 2))
}

/// Unicode block sparkline, scaled between the series min and max.
pub fn sparkline(values: &[f64]) -> String {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let (min, max) = finite
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    values
        .iter()
        .map(|&v| {
            if !v.is_finite() {
                return ' ';
            }
            if max <= min {
                return SPARK_LEVELS[SPARK_LEVELS.len() / 2];
            }
            let u = (v - min) / (max - min);
            let idx = (u * (SPARK_LEVELS.len() - 1) as f64).round() as usize;
            SPARK_LEVELS[idx.min(SPARK_LEVELS.len() - 1)]
        })
        .collect()
}

/// Horizontal percentage bar of `width` cells.
pub fn percent_bar(percentage: u32, width: usize) -> String {
    let filled = ((percentage.min(100) as f64 / 100.0) * width as f64).round() as usize;
    let mut out = "█".repeat(filled);
    out.push_str(&"░".repeat(width.saturating_sub(filled)));
    out
}

/// Full multi-line text report.
pub fn format_report(report: &Report) -> String {
    let mut out = String::new();

    out.push_str("=== homeprice - Estimated Price ===\n");
    out.push_str(&format!("Predicted price: ₹ {}\n", format_price(report.estimated)));
    out.push_str(&format!("Confidence: {}\n", format_band(report)));
    out.push('\n');

    for (label, value) in info_rows(report) {
        out.push_str(&format!("{label:<16} {value}\n"));
    }

    out.push_str("\nFeature contributions:\n");
    for c in &report.contributions {
        out.push_str(&format!(
            "  {:<10} {} {:>3}%\n",
            c.name,
            percent_bar(c.percentage, 20),
            c.percentage
        ));
    }

    out.push_str(&format!("\nTrend: {}", sparkline(&report.timeseries)));
    if let (Some(first), Some(last)) = (report.timeseries.first(), report.timeseries.last()) {
        out.push_str(&format!("  ({} .. {})", to_fixed(*first, 2), to_fixed(*last, 2)));
    }
    out.push('\n');

    out
}

/// Label/value pairs describing the submitted inputs.
pub fn info_rows(report: &Report) -> [(&'static str, String); 5] {
    [
        ("Locality", non_empty_or_dash(&report.locality)),
        ("Property Type", non_empty_or_dash(&report.property_type)),
        ("Area (sq ft)", report.area_sqft.to_string()),
        ("Age (yrs)", report.age_years.to_string()),
        ("Bedrooms", report.bedrooms.to_string()),
    ]
}

/// Saved-report listing, newest first as stored.
pub fn format_history(entries: &[SavedReport]) -> String {
    if entries.is_empty() {
        return "No saved reports.\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{:<15} {:<20} {:<24} {:<14} {:>14}\n",
        "id", "saved_at", "locality", "type", "price"
    ));
    out.push_str(&format!(
        "{:-<15} {:-<20} {:-<24} {:-<14} {:-<14}\n",
        "", "", "", "", ""
    ));
    for entry in entries {
        out.push_str(&format!(
            "{:<15} {:<20} {:<24} {:<14} {:>14}\n",
            entry.id,
            entry.saved_at.format("%Y-%m-%d %H:%M:%S"),
            truncate(&entry.report.locality, 24),
            truncate(&entry.report.property_type, 14),
            format_price(entry.report.estimated),
        ));
    }
    out
}

fn non_empty_or_dash(s: &str) -> String {
    if s.trim().is_empty() { "-".to_string() } else { s.to_string() }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PredictionInput, RawEstimate};
    use crate::report::build_report;
    use chrono::{TimeZone, Utc};

    #[test]
    fn format_price_golden_values() {
        assert_eq!(format_price(0.85), "85 Lakhs");
        assert_eq!(format_price(1.5), "1.50 Crores");
        assert_eq!(format_price(0.8567), "85.67 Lakhs");
        assert_eq!(format_price(0.5), "50 Lakhs");
        assert_eq!(format_price(1.0), "1.00 Crores");
        assert_eq!(format_price(12.3456), "12.35 Crores");
        // Exact halves round away from zero.
        assert_eq!(format_price(0.00625), "0.63 Lakhs");
        assert_eq!(format_price(0.00125), "0.13 Lakhs");
        assert_eq!(format_price(1.125), "1.13 Crores");
    }

    #[test]
    fn lakhs_match_estimate_times_100_to_two_decimals() {
        for estimated in [0.0, 0.07, 0.123, 0.4567, 0.999] {
            let text = format_price(estimated);
            let number: f64 = text.trim_end_matches(" Lakhs").parse().unwrap();
            assert!((number - round2(estimated * 100.0)).abs() < 1e-9, "{estimated} -> {text}");
        }
    }

    #[test]
    fn sparkline_spans_lowest_to_highest_block() {
        assert_eq!(sparkline(&[1.9, 1.96, 2.0, 2.04, 2.1]).chars().count(), 5);
        let line: Vec<char> = sparkline(&[1.0, 2.0, 3.0]).chars().collect();
        assert_eq!(line.first(), Some(&'▁'));
        assert_eq!(line.last(), Some(&'█'));
        assert_eq!(sparkline(&[0.0, 0.0]), "▅▅");
    }

    #[test]
    fn percent_bar_fills_proportionally() {
        assert_eq!(percent_bar(45, 20).chars().filter(|c| *c == '█').count(), 9);
        assert_eq!(percent_bar(100, 10), "██████████");
        assert_eq!(percent_bar(0, 4), "░░░░");
    }

    #[test]
    fn text_report_lists_price_band_and_inputs() {
        let input = PredictionInput {
            locality: "Banjara Hills".to_string(),
            property_type: "Villa".to_string(),
            area_sqft: 3200.0,
            age_years: 12,
            bedrooms: 4,
        };
        let report = build_report(&input, RawEstimate { estimated_price: 4.25 });
        let text = format_report(&report);
        assert!(text.contains("Predicted price: ₹ 4.25 Crores"));
        assert!(text.contains("Confidence: 3.91 - 4.59 crores"));
        assert!(text.contains("Banjara Hills"));
        assert!(text.contains("Area (sq ft)     3200"));
        assert!(text.contains(" 45%"));
    }

    #[test]
    fn history_lists_entries_in_stored_order() {
        let input = PredictionInput {
            locality: "Kokapet".to_string(),
            property_type: "Apartment".to_string(),
            area_sqft: 1000.0,
            age_years: 1,
            bedrooms: 2,
        };
        let saved_at = Utc.with_ymd_and_hms(2026, 3, 1, 10, 30, 0).unwrap();
        let entries = vec![
            SavedReport {
                id: 2,
                saved_at,
                report: build_report(&input, RawEstimate { estimated_price: 0.85 }),
            },
            SavedReport {
                id: 1,
                saved_at,
                report: build_report(&input, RawEstimate { estimated_price: 1.2 }),
            },
        ];
        let text = format_history(&entries);
        let lakhs = text.find("85 Lakhs").unwrap();
        let crores = text.find("1.20 Crores").unwrap();
        assert!(lakhs < crores);
        assert!(text.contains("2026-03-01 10:30:00"));
        assert_eq!(format_history(&[]), "No saved reports.\n");
    }
}
