//! In-memory scenario store.
//!
//! Scenarios live only as long as the process (or browser tab, for the relay);
//! the export document in `scenario::export` is the only way to keep them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ModelParams;
use crate::error::AppError;
use crate::results::Series;

/// Name written into export documents.
pub const EXPORT_TOOL: &str = "fpm";

/// What a model run produced for a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub client_name: String,
    pub model_name: String,
    pub project_name: String,
    pub line_item: String,
    pub series: Vec<Series>,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub call_purpose: String,
    pub parameters: ModelParams,
    #[serde(default)]
    pub result: Option<ScenarioResult>,
    pub saved_at: DateTime<Utc>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: ModelParams) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            call_purpose: String::new(),
            parameters,
            result: None,
            saved_at: Utc::now(),
        }
    }

    pub fn with_call_purpose(mut self, call_purpose: impl Into<String>) -> Self {
        self.call_purpose = call_purpose.into();
        self
    }

    pub fn with_result(mut self, result: ScenarioResult) -> Self {
        self.result = Some(result);
        self
    }
}

/// Portable form of a store (`scenarios_YYYYMMDD_HHMMSS.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioExport {
    pub tool: String,
    pub exported_at: DateTime<Utc>,
    pub scenarios: Vec<Scenario>,
}

/// Insertion-ordered scenarios, unique by name.
#[derive(Debug, Clone, Default)]
pub struct ScenarioStore {
    scenarios: Vec<Scenario>,
}

impl ScenarioStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace by name (case-insensitive). A replaced scenario keeps
    /// its id and slot.
    pub fn save(&mut self, scenario: Scenario) -> Result<&Scenario, AppError> {
        let idx = self.upsert(scenario, true)?;
        Ok(&self.scenarios[idx])
    }

    fn upsert(&mut self, mut scenario: Scenario, stamp: bool) -> Result<usize, AppError> {
        let name = scenario.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::input("Scenario name must not be empty."));
        }
        scenario.name = name;
        if stamp {
            scenario.saved_at = Utc::now();
        }

        let idx = match self.scenarios.iter().position(|s| s.name.eq_ignore_ascii_case(&scenario.name)) {
            Some(idx) => {
                scenario.id = self.scenarios[idx].id;
                self.scenarios[idx] = scenario;
                idx
            }
            None => {
                // Ids stay unique even when an imported file reuses one under a new name.
                if self.get(scenario.id).is_some() {
                    scenario.id = Uuid::new_v4();
                }
                self.scenarios.push(scenario);
                self.scenarios.len() - 1
            }
        };
        tracing::debug!(name = %self.scenarios[idx].name, id = %self.scenarios[idx].id, "scenario saved");
        Ok(idx)
    }

    pub fn get(&self, id: Uuid) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    /// Look up by id, or by name (case-insensitive).
    pub fn find(&self, key: &str) -> Option<&Scenario> {
        let key = key.trim();
        if let Ok(id) = Uuid::parse_str(key) {
            if let Some(s) = self.get(id) {
                return Some(s);
            }
        }
        self.scenarios.iter().find(|s| s.name.eq_ignore_ascii_case(key))
    }

    pub fn list(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Scenario> {
        let idx = self.scenarios.iter().position(|s| s.id == id)?;
        Some(self.scenarios.remove(idx))
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn to_export(&self) -> ScenarioExport {
        ScenarioExport {
            tool: EXPORT_TOOL.to_string(),
            exported_at: Utc::now(),
            scenarios: self.scenarios.clone(),
        }
    }

    /// Upsert every scenario of `export` by name, keeping their timestamps.
    ///
    /// All or nothing: on error the store is left as it was.
    pub fn import(&mut self, export: ScenarioExport) -> Result<usize, AppError> {
        let mut staged = self.clone();
        let mut imported = 0;
        for scenario in export.scenarios {
            staged.upsert(scenario, false)?;
            imported += 1;
        }
        *self = staged;
        Ok(imported)
    }
}
