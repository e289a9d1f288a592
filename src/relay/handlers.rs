//! Relay endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::{JsonRejection, QueryRejection}},
    http::{StatusCode, header},
    response::{Html, IntoResponse},
};
use chrono::{Local, Utc};

use crate::api::SourceSystem;
use crate::app::pipeline::{RunOutput, run_model};
use crate::domain::ModelParams;
use crate::relay::error::{ApiError, ApiResult};
use crate::relay::models::*;
use crate::relay::state::RelayState;
use crate::scenario::{
    Scenario, ScenarioComparison, ScenarioExport, compare, connectivity_test_params, default_export_file_name,
    find_predefined, predefined_scenarios,
};

const DASHBOARD_PAGE: &str = include_str!("../../web/index.html");

pub async fn index() -> Html<&'static str> {
    Html(DASHBOARD_PAGE)
}

pub async fn health(State(state): State<RelayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}

pub async fn run_financial_model(
    State(state): State<RelayState>,
    payload: Result<Json<ModelRunRequest>, JsonRejection>,
) -> ApiResult<Json<ModelRunResponse>> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let call_purpose = req
        .call_purpose
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CALL_PURPOSE.to_string());

    tracing::info!(call_purpose = %call_purpose, "financial model request");
    let run = run_blocking(&state, req.params, call_purpose).await?;
    Ok(Json(run.into()))
}

pub async fn predefined() -> Json<PredefinedList> {
    Json(PredefinedList {
        scenarios: predefined_scenarios(),
    })
}

pub async fn run_demo(
    State(state): State<RelayState>,
    payload: Result<Json<RunDemoRequest>, JsonRejection>,
) -> ApiResult<Json<ModelRunResponse>> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let name = req
        .scenario_name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Scenario name is required".to_string()))?;

    let scenario =
        find_predefined(&name).ok_or_else(|| ApiError::NotFound(format!("Scenario \"{name}\" not found")))?;

    let run = run_blocking(&state, scenario.parameters, scenario.name.clone()).await?;
    let mut resp = ModelRunResponse::from(run);
    resp.scenario_name = Some(scenario.name);
    resp.scenario_description = Some(scenario.description);
    Ok(Json(resp))
}

pub async fn test_connectivity(State(state): State<RelayState>) -> impl IntoResponse {
    let outcome = run_blocking(&state, connectivity_test_params(), "Connectivity Test".to_string()).await;
    let timestamp = Utc::now().to_rfc3339();
    match outcome {
        Ok(_) => (
            StatusCode::OK,
            Json(ConnectivityResponse {
                status: "success".to_string(),
                message: "API connectivity test successful".to_string(),
                timestamp,
            }),
        ),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ConnectivityResponse {
                status: "error".to_string(),
                message: format!("Connectivity test failed: {err}"),
                timestamp,
            }),
        ),
    }
}

pub async fn list_scenarios(State(state): State<RelayState>) -> Json<ScenarioList> {
    let store = state.store.read().await;
    Json(ScenarioList {
        scenarios: store.list().to_vec(),
    })
}

pub async fn save_scenario(
    State(state): State<RelayState>,
    payload: Result<Json<SaveScenarioRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Scenario>)> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let mut scenario = Scenario::new(req.name, req.description, req.parameters)
        .with_call_purpose(req.call_purpose.unwrap_or_else(|| DEFAULT_CALL_PURPOSE.to_string()));
    scenario.result = req.result;

    let mut store = state.store.write().await;
    let saved = store.save(scenario)?.clone();
    tracing::info!(name = %saved.name, id = %saved.id, "scenario saved");
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn get_scenario(State(state): State<RelayState>, Path(id): Path<String>) -> ApiResult<Json<Scenario>> {
    let store = state.store.read().await;
    store
        .find(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| scenario_not_found(&id))
}

pub async fn delete_scenario(
    State(state): State<RelayState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Scenario>> {
    let mut store = state.store.write().await;
    let found = store.find(&id).map(|s| s.id).ok_or_else(|| scenario_not_found(&id))?;
    store
        .remove(found)
        .map(Json)
        .ok_or_else(|| scenario_not_found(&id))
}

pub async fn export_scenarios(State(state): State<RelayState>) -> impl IntoResponse {
    let export = state.store.read().await.to_export();
    let file_name = default_export_file_name(Local::now());
    let disposition = format!("attachment; filename=\"{}\"", file_name.display());
    ([(header::CONTENT_DISPOSITION, disposition)], Json(export))
}

pub async fn import_scenarios(
    State(state): State<RelayState>,
    payload: Result<Json<ScenarioExport>, JsonRejection>,
) -> ApiResult<Json<ImportSummary>> {
    let Json(export) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let imported = state.store.write().await.import(export)?;
    tracing::info!(imported, "scenarios imported");
    Ok(Json(ImportSummary { imported }))
}

pub async fn compare_scenarios(
    State(state): State<RelayState>,
    query: Result<Query<CompareQuery>, QueryRejection>,
) -> ApiResult<Json<ScenarioComparison>> {
    let Query(q) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let store = state.store.read().await;
    let base = store.find(&q.base).ok_or_else(|| scenario_not_found(&q.base))?;
    let other = store.find(&q.other).ok_or_else(|| scenario_not_found(&q.other))?;
    Ok(Json(compare(base, other)?))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound("Endpoint not found".to_string())
}

fn scenario_not_found(key: &str) -> ApiError {
    ApiError::NotFound(format!("Scenario \"{key}\" not found"))
}

/// Run the (blocking) model call off the async workers.
async fn run_blocking(state: &RelayState, params: ModelParams, call_purpose: String) -> ApiResult<RunOutput> {
    let api = Arc::clone(&state.api);
    let run = tokio::task::spawn_blocking(move || {
        run_model(api.as_ref(), &params, &call_purpose, SourceSystem::Relay)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("model task failed: {e}")))??;
    tracing::info!(call_purpose = %run.call_purpose, series = run.series.len(), "financial model processed");
    Ok(run)
}
