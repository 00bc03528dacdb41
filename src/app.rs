//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads configuration and applies CLI overrides
//! - sets up file logging
//! - builds the shared services
//! - dispatches to the TUI or a one-shot subcommand

use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use chrono::Utc;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, HistoryArgs, ListsArgs, PredictArgs, ShowArgs};
use crate::config::AppConfig;
use crate::domain::PredictionInput;
use crate::error::AppError;
use crate::io::{export_report, read_export};
use crate::report::{format_history, format_report};

pub mod pipeline;

use pipeline::Services;

const LOG_FILE: &str = "homeprice.log";

/// Entry point for the `homeprice` binary.
pub fn run() -> Result<(), AppError> {
    // `homeprice` and `homeprice --api-base URL` behave like `homeprice tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = Cli::parse_from(argv);

    let mut config = AppConfig::from_env()?;
    cli.global.apply(&mut config);
    init_logging(&config)?;

    info!(command = ?cli.command, "starting");
    let services = Services::from_config(config)?;

    match cli.command {
        Command::Tui => crate::tui::run(services),
        Command::Predict(args) => handle_predict(&services, args),
        Command::Lists(args) => handle_lists(&services, args),
        Command::History(args) => handle_history(&services, args),
        Command::Health => handle_health(&services),
        Command::Show(args) => handle_show(args),
    }
}

/// Log to `{data_dir}/homeprice.log` so the TUI screen stays clean.
/// `HOMEPRICE_LOG` (or `RUST_LOG`) sets the filter.
fn init_logging(config: &AppConfig) -> Result<(), AppError> {
    fs::create_dir_all(&config.data_dir).map_err(|e| {
        AppError::storage(format!("Failed to create data dir '{}': {e}", config.data_dir.display()))
    })?;
    let path = config.data_dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| AppError::storage(format!("Failed to open log file '{}': {e}", path.display())))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();
    Ok(())
}

fn handle_predict(services: &Services, args: PredictArgs) -> Result<(), AppError> {
    let input = PredictionInput {
        locality: args.locality,
        property_type: args.property_type,
        area_sqft: args.area,
        age_years: args.age,
        bedrooms: args.bedrooms,
    };
    let report = pipeline::run_prediction(services, input)?;
    println!("{}", format_report(&report));

    let now = Utc::now();
    if args.save {
        let saved = services.history.save(&report, now)?;
        println!("Saved to local reports (id {}).", saved.id);
    }
    if args.export {
        let path = export_report(&services.config.export_dir, &report, now)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn handle_lists(services: &Services, args: ListsArgs) -> Result<(), AppError> {
    let lists = services.cache.fetch_lists(args.refresh)?;

    println!("Localities ({}):", lists.locations.len());
    for name in &lists.locations {
        println!("  {}", crate::form::title_case(name));
    }
    println!("\nProperty types ({}):", lists.property_types.len());
    for name in &lists.property_types {
        println!("  {}", crate::form::title_case(name));
    }

    // Let the revalidation finish before the process exits.
    if let Some(handle) = lists.background_refresh {
        let _ = handle.join();
    }
    Ok(())
}

fn handle_history(services: &Services, args: HistoryArgs) -> Result<(), AppError> {
    let mut entries = services.history.load()?;
    if let Some(limit) = args.limit {
        entries.truncate(limit);
    }
    print!("{}", format_history(&entries));
    Ok(())
}

fn handle_health(services: &Services) -> Result<(), AppError> {
    let status = services.client.health()?;
    println!("{}: {status}", services.client.base_url());
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let exported = read_export(&args.report)?;
    println!("Saved at {}", exported.saved_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("{}", format_report(&exported.report));
    Ok(())
}

/// Rewrite argv so `homeprice` defaults to `homeprice tui`.
///
/// Rules:
/// - `homeprice`                      -> `homeprice tui`
/// - `homeprice --api-base URL ...`   -> `homeprice tui --api-base URL ...`
/// - `homeprice --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "tui" | "predict" | "lists" | "history" | "health" | "show"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}
