//! Step-by-step connectivity checks against the model API.
//!
//! 1) the model host answers HTTP at all
//! 2) a minimal request (capex + line item) is accepted
//! 3) a full default request returns a usable envelope

use serde_json::Value;

use crate::api::{ExecuteRequest, ModelApi, ModelOutputs, RequestMeta, SourceSystem};
use crate::domain::{LineItem, ModelParams};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub name: &'static str,
    pub ok: bool,
    pub detail: String,
}

impl CheckOutcome {
    fn pass(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            ok: true,
            detail: detail.into(),
        }
    }

    fn fail(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            ok: false,
            detail: detail.into(),
        }
    }
}

/// Run all checks; later checks are skipped once one fails.
pub fn run_diagnostics<P>(api: &dyn ModelApi, host_url: &str, probe: P) -> Vec<CheckOutcome>
where
    P: Fn(&str) -> Result<u16, AppError>,
{
    let mut out = Vec::new();

    match probe(host_url) {
        Ok(status) => out.push(CheckOutcome::pass("host", format!("{host_url} reachable (status {status})"))),
        Err(e) => {
            out.push(CheckOutcome::fail("host", e.to_string()));
            return out;
        }
    }

    let minimal = ExecuteRequest::minimal(
        1000.0,
        &LineItem::default(),
        RequestMeta::new("Diagnostic Test", SourceSystem::Diagnostic),
    );
    match api.execute(&minimal) {
        Ok(body) => out.push(CheckOutcome::pass("minimal payload", format!("response keys: {}", keys(&body)))),
        Err(e) => {
            out.push(CheckOutcome::fail("minimal payload", e.to_string()));
            return out;
        }
    }

    let full = ExecuteRequest::for_params(
        &ModelParams::default(),
        RequestMeta::new("Full Diagnostic Test", SourceSystem::Diagnostic),
    )
    .and_then(|req| api.execute(&req))
    .and_then(|body| ModelOutputs::from_response(&body));
    match full {
        Ok(outputs) => out.push(CheckOutcome::pass(
            "full payload",
            format!(
                "{} result rows, {} balance sheet items (model: {})",
                outputs.results.len(),
                outputs.balance_sheet_items.len(),
                outputs.model_name
            ),
        )),
        Err(e) => out.push(CheckOutcome::fail("full payload", e.to_string())),
    }

    out
}

pub fn format_diagnostics(checks: &[CheckOutcome]) -> String {
    let mut out = String::from("=== fpm diagnose ===\n");
    for c in checks {
        let mark = if c.ok { "OK  " } else { "FAIL" };
        out.push_str(&format!("[{mark}] {:<16} {}\n", c.name, c.detail));
    }
    out
}

fn keys(body: &Value) -> String {
    match body.as_object() {
        Some(map) => map.keys().cloned().collect::<Vec<_>>().join(", "),
        None => "(not an object)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::app::pipeline::tests::{FakeModel, sample_response};

    #[test]
    fn all_checks_pass() {
        let api = FakeModel::ok(sample_response());
        let checks = run_diagnostics(&api, "https://model.test", |_| Ok(200));
        assert_eq!(checks.len(), 3);
        assert!(checks.iter().all(|c| c.ok));
        assert!(checks[1].detail.contains("response_data"));
        assert!(checks[2].detail.starts_with("2 result rows"));

        let seen = api.seen.lock().unwrap();
        assert_eq!(seen[0]["request_meta"]["requested_output"], json!(["Results"]));
        assert_eq!(seen[1]["request_meta"]["call_purpose"], json!("Full Diagnostic Test"));
    }

    #[test]
    fn unreachable_host_stops_early() {
        let api = FakeModel::ok(sample_response());
        let checks = run_diagnostics(&api, "https://model.test", |url| {
            Err(AppError::runtime(format!("Request to {url} failed")))
        });
        assert_eq!(checks.len(), 1);
        assert!(!checks[0].ok);
        assert_eq!(api.calls(), 0);
        assert!(format_diagnostics(&checks).contains("[FAIL] host"));
    }

    #[test]
    fn bad_envelope_fails_last_check() {
        let api = FakeModel::ok(json!({"status": "ok"}));
        let checks = run_diagnostics(&api, "https://model.test", |_| Ok(404));
        assert!(checks[0].ok);
        assert!(checks[1].ok);
        assert!(!checks[2].ok);
        assert!(checks[2].detail.contains("Invalid response format"));
    }
}
