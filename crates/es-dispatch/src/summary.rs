//! Dispatch-phase manifest.

use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::DispatchResult;
use crate::task::TaskOutcome;

pub const SUMMARY_FILE: &str = "dispatch_summary.json";

/// Per-phase accounting persisted next to the run outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchSummary {
    pub timestamp: String,
    pub strategy: String,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<TaskOutcome>,
}

impl DispatchSummary {
    pub fn new(strategy: &str, outcomes: Vec<TaskOutcome>) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.status.is_success()).count();
        Self {
            timestamp: Utc::now().to_rfc3339(),
            strategy: strategy.to_string(),
            attempted: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
            outcomes,
        }
    }

    pub fn save(&self, path: &Path) -> DispatchResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> DispatchResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
