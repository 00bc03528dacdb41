//! Command-line parsing for the home price estimator.
//!
//! Parsing and dispatch stay separate from the form, cache, and client code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::AppConfig;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "homeprice", version, about = "Home price estimator (terminal client)")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Overrides for values normally read from the environment.
#[derive(Debug, Args, Clone, Default)]
pub struct GlobalArgs {
    /// Backend base URL (overrides HOMEPRICE_API_BASE).
    #[arg(long, global = true, value_name = "URL")]
    pub api_base: Option<String>,

    /// Directory for the list cache, saved reports, and the log file.
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory for exported report files.
    #[arg(long, global = true, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,
}

impl GlobalArgs {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(api_base) = &self.api_base {
            config.api_base = api_base.clone();
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(dir) = &self.export_dir {
            config.export_dir = dir.clone();
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive form (default when no subcommand is given).
    Tui,
    /// Request one estimate and print the report.
    Predict(PredictArgs),
    /// Print the locality and property type lists.
    Lists(ListsArgs),
    /// Print saved reports, newest first.
    History(HistoryArgs),
    /// Check that the backend is reachable.
    Health,
    /// Print a previously exported report file.
    Show(ShowArgs),
}

#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    /// Locality; must match one of the served localities (case-insensitive).
    #[arg(short = 'l', long)]
    pub locality: String,

    /// Property type; must match one of the served types (case-insensitive).
    #[arg(short = 't', long)]
    pub property_type: String,

    /// Built-up area in square feet.
    #[arg(long, default_value_t = 1200.0)]
    pub area: f64,

    /// Age of the property in years (0-50).
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(0..=50))]
    pub age: u32,

    #[arg(long, default_value_t = 2)]
    pub bedrooms: u32,

    /// Append the report to the saved history.
    #[arg(long)]
    pub save: bool,

    /// Write the report to a JSON file in the export directory.
    #[arg(long)]
    pub export: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ListsArgs {
    /// Ignore the cache and fetch both lists from the backend.
    #[arg(long)]
    pub refresh: bool,
}

#[derive(Debug, Args, Clone)]
pub struct HistoryArgs {
    /// Show at most N entries.
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    /// Exported report JSON.
    #[arg(long, value_name = "JSON")]
    pub report: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_defaults_match_the_form() {
        let cli = Cli::parse_from(["homeprice", "predict", "-l", "Kondapur", "-t", "Villa"]);
        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(args.area, 1200.0);
        assert_eq!(args.age, 5);
        assert_eq!(args.bedrooms, 2);
        assert!(!args.save && !args.export);
    }

    #[test]
    fn age_outside_range_is_rejected() {
        let parsed = Cli::try_parse_from([
            "homeprice", "predict", "-l", "Kondapur", "-t", "Villa", "--age", "51",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn global_overrides_apply_to_config() {
        let cli = Cli::parse_from(["homeprice", "health", "--api-base", "http://10.0.0.2:5000"]);
        let mut config = AppConfig::default();
        cli.global.apply(&mut config);
        assert_eq!(config.api_base, "http://10.0.0.2:5000");
        assert_eq!(config.data_dir, PathBuf::from(".homeprice"));
    }
}
