//! Response envelope checks.
//!
//! The model answers `200 OK` even for some failures, so the body is checked
//! for an `error` field, an error `status`, and the `response_data.outputs`
//! object before anything is displayed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;

const NOT_AVAILABLE: &str = "N/A";

/// The parts of a model response the dashboard shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelOutputs {
    pub client_name: String,
    pub model_name: String,
    pub project_name: String,
    pub results: Vec<Value>,
    pub balance_sheet_items: Vec<Value>,
}

impl ModelOutputs {
    pub fn from_response(body: &Value) -> Result<Self, AppError> {
        if let Some(err) = body.get("error") {
            if let Some(msg) = error_message(err) {
                return Err(AppError::runtime(msg));
            }
        }

        if body.get("status").and_then(Value::as_str) == Some("error") {
            let msg = body
                .get("error")
                .and_then(error_message)
                .unwrap_or_else(|| "Unknown API error".to_string());
            return Err(AppError::runtime(msg));
        }

        let outputs = body
            .get("response_data")
            .and_then(|d| d.get("outputs"))
            .and_then(Value::as_object)
            .ok_or_else(|| AppError::runtime("Invalid response format from financial model API"))?;

        Ok(Self {
            client_name: text_field(outputs.get("ClientName")),
            model_name: text_field(outputs.get("ModelName")),
            project_name: text_field(outputs.get("ProjectName")),
            results: list_field(outputs.get("Results")),
            balance_sheet_items: list_field(outputs.get("BalanceSheet_lineitems")),
        })
    }
}

/// `None` for null / empty errors (the model sends `"error": null` on success).
fn error_message(err: &Value) -> Option<String> {
    match err {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(map) if map.is_empty() => None,
        Value::Array(items) if items.is_empty() => None,
        other => Some(other.to_string()),
    }
}

fn text_field(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => NOT_AVAILABLE.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn list_field(v: Option<&Value>) -> Vec<Value> {
    match v {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(other) => vec![other.clone()],
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn extracts_outputs() {
        let body = json!({
            "status": "Success",
            "error": null,
            "response_data": {"outputs": {
                "ClientName": "Luna",
                "ModelName": "Meteor",
                "Results": [{"Y1": 1.0, "Y2": 2.0}],
                "BalanceSheet_lineitems": "Total Assets"
            }}
        });
        let out = ModelOutputs::from_response(&body).unwrap();
        assert_eq!(out.client_name, "Luna");
        assert_eq!(out.model_name, "Meteor");
        assert_eq!(out.project_name, "N/A");
        assert_eq!(out.results.len(), 1);
        assert_eq!(out.balance_sheet_items, vec![json!("Total Assets")]);
    }

    #[test]
    fn error_field_wins() {
        let body = json!({"error": "Request failed: timeout"});
        let err = ModelOutputs::from_response(&body).unwrap_err();
        assert_eq!(err.to_string(), "Request failed: timeout");
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn empty_error_is_not_an_error() {
        let body = json!({"error": "", "response_data": {"outputs": {}}});
        let out = ModelOutputs::from_response(&body).unwrap();
        assert!(out.results.is_empty());
        assert!(out.balance_sheet_items.is_empty());
    }

    #[test]
    fn error_status_without_message() {
        let body = json!({"status": "error"});
        let err = ModelOutputs::from_response(&body).unwrap_err();
        assert_eq!(err.to_string(), "Unknown API error");
    }

    #[test]
    fn structured_error_is_stringified() {
        let body = json!({"status": "error", "error": {"code": 42}});
        let err = ModelOutputs::from_response(&body).unwrap_err();
        assert_eq!(err.to_string(), r#"{"code":42}"#);
    }

    #[test]
    fn missing_outputs_is_invalid() {
        let body = json!({"response_data": {}});
        let err = ModelOutputs::from_response(&body).unwrap_err();
        assert!(err.to_string().contains("Invalid response format"));
    }
}
