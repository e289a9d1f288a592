//! Shared "model run" logic used by the CLI, the TUI and the relay.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! validate -> build request -> execute -> check envelope -> table -> series -> stats
//!
//! The front-ends can then focus on presentation (printing, widgets, JSON).

use chrono::{DateTime, Utc};

use crate::api::{ExecuteRequest, ModelApi, ModelOutputs, RequestMeta, SourceSystem};
use crate::domain::{ModelParams, validate_params};
use crate::error::AppError;
use crate::results::{ResultTable, Series, SeriesSummary, summarize_all};
use crate::scenario::ScenarioResult;

/// Everything computed from one model call.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub params: ModelParams,
    pub call_purpose: String,
    pub outputs: ModelOutputs,
    pub table: ResultTable,
    /// One series per result row (chart lines).
    pub series: Vec<Series>,
    pub summaries: Vec<SeriesSummary>,
    /// Per-column summaries ("key insights").
    pub column_summaries: Vec<SeriesSummary>,
    pub computed_at: DateTime<Utc>,
}

impl RunOutput {
    pub fn scenario_result(&self) -> ScenarioResult {
        ScenarioResult {
            client_name: self.outputs.client_name.clone(),
            model_name: self.outputs.model_name.clone(),
            project_name: self.outputs.project_name.clone(),
            line_item: self.params.line_item.to_string(),
            series: self.series.clone(),
            computed_at: self.computed_at,
        }
    }
}

/// Run the model for `params` and derive the results view.
pub fn run_model(
    api: &dyn ModelApi,
    params: &ModelParams,
    call_purpose: &str,
    source: SourceSystem,
) -> Result<RunOutput, AppError> {
    // 1) Reject bad inputs before spending a model call.
    validate_params(params)?;

    // 2) Build and send the request.
    let request = ExecuteRequest::for_params(params, RequestMeta::new(call_purpose, source))?;
    let body = api.execute(&request)?;

    // 3) Check the envelope and pull the outputs.
    let outputs = ModelOutputs::from_response(&body)?;

    Ok(derive_output(params.clone(), call_purpose, outputs))
}

/// Results view for already-extracted outputs.
pub fn derive_output(params: ModelParams, call_purpose: &str, outputs: ModelOutputs) -> RunOutput {
    let table = ResultTable::from_results(&outputs.results);
    let series = table.row_series();
    let summaries = summarize_all(&series);
    let column_summaries = summarize_all(&table.column_series());

    tracing::debug!(
        rows = table.rows.len(),
        series = series.len(),
        call_purpose,
        "results derived"
    );

    RunOutput {
        params,
        call_purpose: call_purpose.to_string(),
        outputs,
        table,
        series,
        summaries,
        column_summaries,
        computed_at: Utc::now(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use serde_json::{Value, json};

    use super::*;

    /// Canned `ModelApi` that records the requests it sees.
    pub(crate) struct FakeModel {
        pub response: Result<Value, String>,
        pub seen: Mutex<Vec<Value>>,
    }

    impl FakeModel {
        pub fn ok(response: Value) -> Self {
            Self {
                response: Ok(response),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                response: Err(message.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.seen.lock().map(|s| s.len()).unwrap_or(0)
        }
    }

    impl ModelApi for FakeModel {
        fn execute(&self, request: &ExecuteRequest) -> Result<Value, AppError> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(serde_json::to_value(request).unwrap_or(Value::Null));
            }
            self.response.clone().map_err(AppError::runtime)
        }
    }

    pub(crate) fn sample_response() -> Value {
        json!({
            "status": "Success",
            "error": null,
            "response_data": {"outputs": {
                "ClientName": "Acme",
                "ModelName": "FPM",
                "ProjectName": "Plan 2025",
                "Results": [
                    {"Line Item": "GAAP Net Income", "Y1": 1000.0, "Y2": 1100.0, "Y3": 1250.0},
                    {"Line Item": "Total Revenue", "Y1": 5000.0, "Y2": 5400.0, "Y3": 5900.0}
                ],
                "BalanceSheet_lineitems": ["Cash", "Receivables"]
            }}
        })
    }

    #[test]
    fn run_model_derives_series_and_stats() {
        let api = FakeModel::ok(sample_response());
        let run = run_model(&api, &ModelParams::default(), "Unit Test", SourceSystem::Cli).unwrap();

        assert_eq!(run.outputs.client_name, "Acme");
        assert_eq!(run.series.len(), 2);
        assert_eq!(run.series[0].label, "GAAP Net Income");
        assert_eq!(run.summaries[0].stats.percent_change, Some(25.0));
        // One column summary per year column.
        assert_eq!(run.column_summaries.len(), 3);
        assert_eq!(run.scenario_result().series, run.series);

        let seen = api.seen.lock().unwrap();
        assert_eq!(seen[0]["request_meta"]["call_purpose"], json!("Unit Test"));
    }

    #[test]
    fn invalid_params_never_reach_the_model() {
        let api = FakeModel::ok(sample_response());
        let mut params = ModelParams::default();
        params.capex = -5.0;
        let err = run_model(&api, &params, "Unit Test", SourceSystem::Cli).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(api.calls(), 0);
    }

    #[test]
    fn upstream_errors_propagate() {
        let api = FakeModel::ok(json!({"status": "error", "error": "model offline"}));
        let err = run_model(&api, &ModelParams::default(), "Unit Test", SourceSystem::Cli).unwrap_err();
        assert_eq!(err.to_string(), "model offline");
        assert_eq!(err.exit_code(), 4);

        let api = FakeModel::failing("Request failed: timeout");
        let err = run_model(&api, &ModelParams::default(), "Unit Test", SourceSystem::Cli).unwrap_err();
        assert_eq!(err.to_string(), "Request failed: timeout");
    }
}
