//! Connection settings for the external model API and the relay.
//!
//! Values come from the process environment, after loading an optional `.env`
//! file. `from_lookup` takes any key lookup so the rules can be tested without
//! touching the real environment.

use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "https://excel.uat.us.coherent.global/presales/api/v3";
pub const DEFAULT_TENANT: &str = "presales";
pub const DEFAULT_FOLDER: &str = "Luna - Private Equity";
pub const DEFAULT_SERVICE: &str = "Meteor - Long-range financial planning model";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_RELAY_HOST: &str = "0.0.0.0";
pub const DEFAULT_RELAY_PORT: u16 = 5001;

/// Where and how to call the hosted model.
#[derive(Clone)]
pub struct ModelEndpoint {
    pub base_url: String,
    pub tenant: String,
    pub folder: String,
    pub service: String,
    pub synthetic_key: String,
    pub timeout: Duration,
}

impl ModelEndpoint {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let synthetic_key = get("SYNTHETIC_KEY")
            .ok_or_else(|| AppError::input("Missing SYNTHETIC_KEY in environment (.env)."))?;

        let timeout_secs = match get("MODEL_TIMEOUT_SECS") {
            None => DEFAULT_TIMEOUT_SECS,
            Some(raw) => match raw.parse::<u64>() {
                Ok(v) if v > 0 => v,
                _ => {
                    return Err(AppError::input(format!(
                        "MODEL_TIMEOUT_SECS must be a positive integer, got '{raw}'."
                    )));
                }
            },
        };

        let base_url = get("MODEL_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(AppError::input(format!(
                "MODEL_API_BASE_URL must be an http(s) URL, got '{base_url}'."
            )));
        }

        Ok(Self {
            base_url,
            tenant: get("TENANT_NAME").unwrap_or_else(|| DEFAULT_TENANT.to_string()),
            folder: get("MODEL_FOLDER").unwrap_or_else(|| DEFAULT_FOLDER.to_string()),
            service: get("MODEL_SERVICE").unwrap_or_else(|| DEFAULT_SERVICE.to_string()),
            synthetic_key,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Full URL of the model's `execute` operation.
    pub fn execute_url(&self) -> String {
        format!(
            "{}/folders/{}/services/{}/execute",
            self.base_url.trim_end_matches('/'),
            self.folder,
            self.service
        )
    }

    /// Scheme and host of the base URL (`https://example.com`).
    pub fn host_url(&self) -> String {
        let (scheme, rest) = self
            .base_url
            .split_once("://")
            .unwrap_or(("https", self.base_url.as_str()));
        let host = rest.split('/').next().unwrap_or(rest);
        format!("{scheme}://{host}")
    }
}

// The key never shows up in logs or panics.
impl std::fmt::Debug for ModelEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelEndpoint")
            .field("base_url", &self.base_url)
            .field("tenant", &self.tenant)
            .field("folder", &self.folder)
            .field("service", &self.service)
            .field("synthetic_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Bind address for `fpm serve`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("RELAY_HOST")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_RELAY_HOST.to_string());

        let port = match lookup("RELAY_PORT").map(|v| v.trim().to_string()) {
            None => DEFAULT_RELAY_PORT,
            Some(raw) if raw.is_empty() => DEFAULT_RELAY_PORT,
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| AppError::input(format!("Invalid RELAY_PORT '{raw}': {e}")))?,
        };

        Ok(Self { host, port })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
