//! Request and response bodies of the relay (camelCase JSON).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app::pipeline::RunOutput;
use crate::domain::ModelParams;
use crate::results::{Series, SeriesSummary};
use crate::scenario::{PredefinedScenario, Scenario, ScenarioResult};

pub const DEFAULT_CALL_PURPOSE: &str = "React UI Analysis";
pub const SERVICE_NAME: &str = "Financial Planning Model API";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub service: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Form parameters plus an optional call purpose.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRunRequest {
    #[serde(default)]
    pub call_purpose: Option<String>,
    #[serde(flatten)]
    pub params: ModelParams,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetadata {
    pub line_item: String,
    pub call_purpose: String,
    pub timestamp: String,
    pub parameters: ModelParams,
}

/// Reshaped model response for the browser.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRunResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_description: Option<String>,
    pub client_name: String,
    pub model_name: String,
    pub project_name: String,
    pub results: Vec<Value>,
    pub balance_sheet_items: Vec<Value>,
    pub series: Vec<Series>,
    pub summaries: Vec<SeriesSummary>,
    pub metadata: RunMetadata,
}

impl From<RunOutput> for ModelRunResponse {
    fn from(run: RunOutput) -> Self {
        Self {
            scenario_name: None,
            scenario_description: None,
            client_name: run.outputs.client_name,
            model_name: run.outputs.model_name,
            project_name: run.outputs.project_name,
            results: run.outputs.results,
            balance_sheet_items: run.outputs.balance_sheet_items,
            series: run.series,
            summaries: run.summaries,
            metadata: RunMetadata {
                line_item: run.params.line_item.to_string(),
                call_purpose: run.call_purpose,
                timestamp: run.computed_at.to_rfc3339(),
                parameters: run.params,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PredefinedList {
    pub scenarios: Vec<PredefinedScenario>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunDemoRequest {
    pub scenario_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectivityResponse {
    pub status: String,
    pub message: String,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveScenarioRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub call_purpose: Option<String>,
    #[serde(default)]
    pub parameters: ModelParams,
    #[serde(default)]
    pub result: Option<ScenarioResult>,
}

#[derive(Debug, Serialize)]
pub struct ScenarioList {
    pub scenarios: Vec<Scenario>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportSummary {
    pub imported: usize,
}

#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    pub base: String,
    pub other: String,
}
