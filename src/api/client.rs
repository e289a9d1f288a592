//! HTTP client for the hosted model.

use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use crate::api::payload::ExecuteRequest;
use crate::config::ModelEndpoint;
use crate::error::AppError;

/// How much of an error body is kept in messages.
const BODY_SNIPPET_CHARS: usize = 500;

/// Anything that can run the model.
///
/// The relay, the CLI and the dashboard only see this trait, so tests swap in
/// canned responses.
pub trait ModelApi: Send + Sync {
    /// Send one request and return the raw JSON body.
    fn execute(&self, request: &ExecuteRequest) -> Result<Value, AppError>;
}

pub struct ModelClient {
    client: Client,
    endpoint: ModelEndpoint,
}

impl ModelClient {
    pub fn from_env() -> Result<Self, AppError> {
        Self::new(ModelEndpoint::from_env()?)
    }

    pub fn new(endpoint: ModelEndpoint) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static("x-synthetic-key"),
            HeaderValue::from_str(&endpoint.synthetic_key)
                .map_err(|e| AppError::input(format!("SYNTHETIC_KEY is not a valid header value: {e}")))?,
        );
        headers.insert(
            HeaderName::from_static("x-tenant-name"),
            HeaderValue::from_str(&endpoint.tenant)
                .map_err(|e| AppError::input(format!("TENANT_NAME is not a valid header value: {e}")))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(endpoint.timeout)
            .build()
            .map_err(|e| AppError::runtime(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &ModelEndpoint {
        &self.endpoint
    }

    /// GET `url` and report the status code (reachability check).
    pub fn probe(&self, url: &str) -> Result<u16, AppError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| AppError::runtime(format!("Request to {url} failed: {e}")))?;
        Ok(resp.status().as_u16())
    }
}

impl ModelApi for ModelClient {
    fn execute(&self, request: &ExecuteRequest) -> Result<Value, AppError> {
        let url = self.endpoint.execute_url();
        tracing::debug!(url = %url, call_purpose = request.call_purpose(), "executing model");

        let started = std::time::Instant::now();
        let resp = self
            .client
            .post(&url)
            .json(request)
            .send()
            .map_err(|e| AppError::runtime(format!("Request failed: {e}")))?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| AppError::runtime(format!("Failed to read model response: {e}")))?;

        tracing::info!(
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            call_purpose = request.call_purpose(),
            "model call finished"
        );

        if !status.is_success() {
            return Err(AppError::runtime(format!(
                "Model API request failed with status {status}: {}",
                snippet(&text)
            )));
        }

        serde_json::from_str(&text).map_err(|e| {
            AppError::runtime(format!(
                "Invalid JSON in model response: {e} (body: {})",
                snippet(&text)
            ))
        })
    }
}

fn snippet(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= BODY_SNIPPET_CHARS {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(BODY_SNIPPET_CHARS).collect();
    out.push_str("...");
    out
}
