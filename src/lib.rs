//! `fpm-dashboard` library crate.
//!
//! The binary (`fpm`) is a thin wrapper around this library so that:
//!
//! - the request/response and results logic is testable without spawning processes
//! - the terminal dashboard, the CLI and the HTTP relay share one pipeline
//! - code stays easy to navigate as the project grows

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod plot;
pub mod relay;
pub mod results;
pub mod scenario;
pub mod tui;
