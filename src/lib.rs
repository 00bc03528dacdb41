//! `homeprice` library crate.
//!
//! The binary (`homeprice`) is a thin wrapper around this library so that:
//!
//! - the cache, client, form, and report logic are testable without a terminal
//! - the TUI and the one-shot subcommands share one implementation

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod form;
pub mod io;
pub mod report;
pub mod results;
pub mod tui;
