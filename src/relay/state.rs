//! Shared state for relay handlers.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;

use crate::api::ModelApi;
use crate::scenario::ScenarioStore;

#[derive(Clone)]
pub struct RelayState {
    pub api: Arc<dyn ModelApi>,
    pub store: Arc<RwLock<ScenarioStore>>,
    /// Server start time for uptime calculation
    pub start_time: Instant,
}

impl RelayState {
    pub fn new(api: Arc<dyn ModelApi>) -> Self {
        Self {
            api,
            store: Arc::new(RwLock::new(ScenarioStore::new())),
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
