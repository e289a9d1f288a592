//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves model parameters (defaults, files, predefined scenarios, flags)
//! - runs the model through the shared pipeline
//! - prints reports/plots or starts the dashboard / relay
//! - reads and writes scenario export files

use std::sync::Arc;

use chrono::Local;
use clap::Parser;
use rayon::prelude::*;

use crate::api::{ModelApi, ModelClient, SourceSystem};
use crate::cli::{Command, CompareArgs, ParamSource, RunArgs, ServeArgs};
use crate::config::RelayConfig;
use crate::domain::ModelParams;
use crate::error::AppError;
use crate::results::{format_balance_sheet, format_insights, format_results_table, format_run_summary};
use crate::scenario::{
    PredefinedScenario, Scenario, ScenarioStore, compare, find_predefined, format_comparison, predefined_scenarios,
    read_export_json, write_export_json,
};

pub mod diagnose;
pub mod pipeline;

/// Entry point for the `fpm` binary.
pub fn run() -> Result<(), AppError> {
    // We want `fpm` and `fpm --scenario x` to behave like `fpm tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        // The dashboard owns the terminal; no log output.
        Command::Tui(args) => crate::tui::run(args),
        Command::Run(args) => {
            crate::logging::init("warn");
            handle_run(args)
        }
        Command::Demo => {
            crate::logging::init("warn");
            handle_demo()
        }
        Command::Scenarios => {
            handle_scenarios();
            Ok(())
        }
        Command::Compare(args) => {
            crate::logging::init("warn");
            handle_compare(args)
        }
        Command::Diagnose => {
            crate::logging::init("warn");
            handle_diagnose()
        }
        Command::Serve(args) => {
            crate::logging::init("info");
            handle_serve(args)
        }
    }
}

/// Base parameters (file, predefined scenario or defaults) with flag overrides.
pub fn resolve_params(source: &ParamSource) -> Result<ModelParams, AppError> {
    let mut params: ModelParams = if let Some(path) = &source.params {
        let file = std::fs::File::open(path)
            .map_err(|e| AppError::input(format!("Failed to open params file '{}': {e}", path.display())))?;
        serde_json::from_reader(file).map_err(|e| AppError::input(format!("Invalid params file: {e}")))?
    } else if let Some(name) = &source.scenario {
        lookup_predefined(name)?.parameters
    } else {
        ModelParams::default()
    };

    source.overrides.apply(&mut params)?;
    Ok(params)
}

fn lookup_predefined(name: &str) -> Result<PredefinedScenario, AppError> {
    find_predefined(name).ok_or_else(|| {
        let known: Vec<String> = predefined_scenarios().into_iter().map(|s| s.id).collect();
        AppError::input(format!("Unknown scenario '{name}'. Known: {}.", known.join(", ")))
    })
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let params = resolve_params(&args.source)?;
    let client = ModelClient::from_env()?;
    let run = pipeline::run_model(&client, &params, &args.purpose, SourceSystem::Cli)?;

    if args.json {
        let body = crate::relay::models::ModelRunResponse::from(run.clone());
        let text = serde_json::to_string_pretty(&body)
            .map_err(|e| AppError::runtime(format!("Failed to encode JSON output: {e}")))?;
        println!("{text}");
    } else {
        println!("{}", format_run_summary(&run.outputs, &run.params, &run.call_purpose));
        println!("{}", format_results_table(&run.table));

        let insights = format_insights(&run.column_summaries);
        if !insights.is_empty() {
            println!("{insights}");
        }
        let balance = format_balance_sheet(&run.outputs.balance_sheet_items);
        if !balance.is_empty() {
            println!("{balance}");
        }
        if args.plot {
            println!("{}", crate::plot::render_series_plot(&run.series, args.width, args.height));
        }
    }

    // Optional export.
    if let Some(path) = &args.save_scenario {
        let name = args
            .name
            .clone()
            .or_else(|| args.source.scenario.as_deref().and_then(find_predefined).map(|s| s.name))
            .unwrap_or_else(|| "CLI Run".to_string());
        let mut store = ScenarioStore::new();
        store.save(
            Scenario::new(name, "", run.params.clone())
                .with_call_purpose(run.call_purpose.clone())
                .with_result(run.scenario_result()),
        )?;
        write_export_json(path, &store.to_export())?;
        eprintln!("Saved scenario to {}", path.display());
    }

    Ok(())
}

fn handle_demo() -> Result<(), AppError> {
    let client = ModelClient::from_env()?;
    let scenarios = predefined_scenarios();

    let runs: Vec<_> = scenarios
        .par_iter()
        .map(|s| {
            let purpose = format!("Demo - {}", s.name);
            (s, pipeline::run_model(&client, &s.parameters, &purpose, SourceSystem::Cli))
        })
        .collect();

    let mut ok = 0;
    for (scenario, outcome) in &runs {
        println!("=== {} ===", scenario.name.to_uppercase());
        println!("{}", scenario.description);
        match outcome {
            Ok(run) => {
                ok += 1;
                println!("{}", format_run_summary(&run.outputs, &run.params, &run.call_purpose));
                println!("{}", format_results_table(&run.table));
                let insights = format_insights(&run.column_summaries);
                if !insights.is_empty() {
                    println!("{insights}");
                }
            }
            Err(err) => println!("Error: {err}\n"),
        }
    }

    let total = runs.len();
    let rate = if total == 0 { 0.0 } else { ok as f64 / total as f64 * 100.0 };
    println!("Demo summary: {ok}/{total} scenarios succeeded ({rate:.1}%)");

    if ok == 0 && total > 0 {
        return Err(AppError::runtime("All demo scenarios failed."));
    }
    Ok(())
}

fn handle_scenarios() {
    println!("{:<22} {:<22} {:>8}  line item", "id", "name", "capex");
    for s in predefined_scenarios() {
        println!(
            "{:<22} {:<22} {:>8}  {}",
            s.id,
            s.name,
            crate::results::format_currency(s.parameters.capex),
            s.parameters.line_item
        );
        println!("    {}", s.description);
    }
}

fn handle_compare(args: CompareArgs) -> Result<(), AppError> {
    let export = read_export_json(&args.file)?;
    let mut store = ScenarioStore::new();
    store.import(export)?;

    let base = store
        .find(&args.base)
        .ok_or_else(|| AppError::input(format!("Scenario '{}' not found in {}.", args.base, args.file.display())))?;
    let other = store
        .find(&args.other)
        .ok_or_else(|| AppError::input(format!("Scenario '{}' not found in {}.", args.other, args.file.display())))?;

    let cmp = compare(base, other)?;
    if args.json {
        let text = serde_json::to_string_pretty(&cmp)
            .map_err(|e| AppError::runtime(format!("Failed to encode JSON output: {e}")))?;
        println!("{text}");
    } else {
        println!("{}", format_comparison(&cmp));
    }
    Ok(())
}

fn handle_diagnose() -> Result<(), AppError> {
    let client = ModelClient::from_env()?;
    println!("Endpoint: {}", client.endpoint().execute_url());

    let host = client.endpoint().host_url();
    let checks = diagnose::run_diagnostics(&client, &host, |url| client.probe(url));
    println!("{}", diagnose::format_diagnostics(&checks));

    match checks.iter().find(|c| !c.ok) {
        Some(failed) => Err(AppError::runtime(format!("Diagnostic check '{}' failed.", failed.name))),
        None => Ok(()),
    }
}

fn handle_serve(args: ServeArgs) -> Result<(), AppError> {
    let mut config = RelayConfig::from_env()?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    let api: Arc<dyn ModelApi> = Arc::new(ModelClient::from_env()?);
    eprintln!("Relay listening on http://{} (Ctrl-C to stop)", config.bind_addr());
    crate::relay::serve(&config, Arc::clone(&api))?;
    drop(api);
    Ok(())
}

/// Default export path next to the working directory.
pub fn default_export_path() -> std::path::PathBuf {
    crate::scenario::default_export_file_name(Local::now())
}

/// Rewrite argv so `fpm` defaults to `fpm tui`.
///
/// Rules:
/// - `fpm`                      -> `fpm tui`
/// - `fpm --scenario x ...`     -> `fpm tui --scenario x ...`
/// - `fpm --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "tui" | "run" | "demo" | "scenarios" | "compare" | "diagnose" | "serve"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_tui() {
        assert_eq!(rewrite_args(argv(&["fpm"])), argv(&["fpm", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["fpm", "--scenario", "x"])),
            argv(&["fpm", "tui", "--scenario", "x"])
        );
        assert_eq!(rewrite_args(argv(&["fpm", "--help"])), argv(&["fpm", "--help"]));
        assert_eq!(rewrite_args(argv(&["fpm", "serve"])), argv(&["fpm", "serve"]));
    }

    #[test]
    fn scenario_source_then_flags() {
        let source = ParamSource {
            params: None,
            scenario: Some("aggressive_expansion".to_string()),
            overrides: crate::cli::ParamArgs {
                capex: Some(100.0),
                ..Default::default()
            },
        };
        let params = resolve_params(&source).unwrap();
        assert_eq!(params.capex, 100.0);
        assert_eq!(params.global_saas_cogs, 0.9);
    }

    #[test]
    fn unknown_scenario_lists_known_ids() {
        let source = ParamSource {
            scenario: Some("moonshot".to_string()),
            ..Default::default()
        };
        let err = resolve_params(&source).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("balanced_portfolio"));
    }
}
