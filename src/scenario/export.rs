//! Read/write scenario export files.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::AppError;
use crate::scenario::ScenarioExport;

/// `scenarios_YYYYMMDD_HHMMSS.json`
pub fn default_export_file_name(now: DateTime<Local>) -> PathBuf {
    PathBuf::from(format!("scenarios_{}.json", now.format("%Y%m%d_%H%M%S")))
}

/// Write an export document as pretty JSON.
pub fn write_export_json(path: &Path, export: &ScenarioExport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::runtime(format!("Failed to create scenario file '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, export)
        .map_err(|e| AppError::runtime(format!("Failed to write scenario file: {e}")))?;
    tracing::info!(path = %path.display(), scenarios = export.scenarios.len(), "scenarios exported");
    Ok(())
}

/// Read an export document.
pub fn read_export_json(path: &Path) -> Result<ScenarioExport, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open scenario file '{}': {e}", path.display())))?;
    let export: ScenarioExport =
        serde_json::from_reader(file).map_err(|e| AppError::input(format!("Invalid scenario file: {e}")))?;
    Ok(export)
}
