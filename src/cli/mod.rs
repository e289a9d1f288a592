//! Command-line parsing for the financial planning dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the request/response and results code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{LineItem, ModelParams, YearRates, parse_rates};
use crate::error::AppError;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "fpm", version, about = "Financial Planning Model dashboard, relay and scenario tools")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive terminal dashboard (default).
    Tui(TuiArgs),
    /// Run the model once and print the results view.
    Run(RunArgs),
    /// Run every predefined scenario (in parallel) and print a summary.
    Demo,
    /// List the predefined scenarios.
    Scenarios,
    /// Compare two scenarios from an export file.
    Compare(CompareArgs),
    /// Check connectivity to the model API step by step.
    Diagnose,
    /// Serve the HTTP relay and the browser dashboard.
    Serve(ServeArgs),
}

/// Model inputs that can be set from flags.
///
/// Every flag is optional and overrides the base parameter set (defaults,
/// `--params` file or `--scenario`).
#[derive(Debug, Args, Clone, Default)]
pub struct ParamArgs {
    /// Capital expenditure.
    #[arg(long)]
    pub capex: Option<f64>,

    /// Useful life of existing PP&E (years).
    #[arg(long)]
    pub existing_ppe_life: Option<u32>,

    /// Useful life of new PP&E (years).
    #[arg(long)]
    pub new_ppe_life: Option<u32>,

    /// G&A personnel rates Y1..Y5, comma-separated.
    #[arg(long, value_name = "R1,..,R5", value_parser = rates_flag)]
    pub ga_personnel: Option<YearRates>,

    /// G&A non-personnel rates Y1..Y5.
    #[arg(long, value_name = "R1,..,R5", value_parser = rates_flag)]
    pub ga_non_personnel: Option<YearRates>,

    /// R&D personnel rates Y1..Y5.
    #[arg(long, value_name = "R1,..,R5", value_parser = rates_flag)]
    pub rd_personnel: Option<YearRates>,

    /// R&D non-personnel rates Y1..Y5.
    #[arg(long, value_name = "R1,..,R5", value_parser = rates_flag)]
    pub rd_non_personnel: Option<YearRates>,

    /// Global SaaS COGS (decimal).
    #[arg(long)]
    pub global_saas_cogs: Option<f64>,

    /// Interest income rate (decimal).
    #[arg(long)]
    pub interest_income: Option<f64>,

    /// Output row to analyse, e.g. "Income Statement : Revenue : Total Revenue".
    #[arg(long)]
    pub line_item: Option<String>,
}

impl ParamArgs {
    pub fn apply(&self, params: &mut ModelParams) -> Result<(), AppError> {
        if let Some(v) = self.capex {
            params.capex = v;
        }
        if let Some(v) = self.existing_ppe_life {
            params.existing_ppe_life = v;
        }
        if let Some(v) = self.new_ppe_life {
            params.new_ppe_life = v;
        }
        if let Some(v) = self.ga_personnel {
            params.ga_personnel_rates = v;
        }
        if let Some(v) = self.ga_non_personnel {
            params.ga_non_personnel_rates = v;
        }
        if let Some(v) = self.rd_personnel {
            params.rd_personnel_rates = v;
        }
        if let Some(v) = self.rd_non_personnel {
            params.rd_non_personnel_rates = v;
        }
        if let Some(v) = self.global_saas_cogs {
            params.global_saas_cogs = v;
        }
        if let Some(v) = self.interest_income {
            params.interest_income = v;
        }
        if let Some(raw) = &self.line_item {
            params.line_item = LineItem::parse(raw).map_err(AppError::input)?;
        }
        Ok(())
    }
}

fn rates_flag(raw: &str) -> Result<YearRates, String> {
    parse_rates(raw).map_err(|e| e.to_string())
}

/// Where the base parameter set comes from.
#[derive(Debug, Args, Clone, Default)]
pub struct ParamSource {
    /// JSON file with (camelCase) parameters; missing fields take defaults.
    #[arg(long, value_name = "JSON", conflicts_with = "scenario")]
    pub params: Option<PathBuf>,

    /// Start from a predefined scenario (id or name).
    #[arg(long)]
    pub scenario: Option<String>,

    #[command(flatten)]
    pub overrides: ParamArgs,
}

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: ParamSource,

    /// Call purpose recorded with the request.
    #[arg(long, default_value = "CLI Analysis")]
    pub purpose: String,

    /// Render an ASCII plot of the result series.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Print the relay-shaped JSON response instead of the text report.
    #[arg(long)]
    pub json: bool,

    /// Write the run as a one-scenario export file.
    #[arg(long, value_name = "JSON")]
    pub save_scenario: Option<PathBuf>,

    /// Name for `--save-scenario` (defaults to the predefined name or "CLI Run").
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Debug, Args, Clone, Default)]
pub struct TuiArgs {
    #[command(flatten)]
    pub source: ParamSource,

    /// Call purpose recorded with dashboard requests.
    #[arg(long, default_value = "Terminal Dashboard")]
    pub purpose: String,
}

#[derive(Debug, Args, Clone)]
pub struct CompareArgs {
    /// Scenario export file.
    #[arg(long, value_name = "JSON")]
    pub file: PathBuf,

    /// Base scenario (id or name).
    #[arg(long)]
    pub base: String,

    /// Scenario compared against the base (id or name).
    #[arg(long)]
    pub other: String,

    /// Print the comparison as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ServeArgs {
    /// Interface to bind (overrides RELAY_HOST).
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (overrides RELAY_PORT).
    #[arg(long)]
    pub port: Option<u16>,
}
