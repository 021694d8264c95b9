//! Aggregate result of one provisioning, status or rollback pass.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

/// Terminal status of a pass. Everything except `Error` exits zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Provisioning completed (possibly with warnings).
    Ready,
    /// Read-only status pass completed.
    Ok,
    RolledBack,
    Error,
}

impl RunStatus {
    pub fn is_success(self) -> bool {
        !matches!(self, RunStatus::Error)
    }
}

/// One invocation's outcome: status, per-step keyed values, warnings and
/// fatal errors. Built up by a runner during its pass, then printed once.
#[derive(Debug, Serialize)]
pub struct RunOutcome {
    pub status: RunStatus,
    #[serde(flatten)]
    values: Map<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl RunOutcome {
    pub fn new(status: RunStatus) -> Self {
        Self {
            status,
            values: Map::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Record one step's keyed value.
    pub fn set(&mut self, key: &str, value: impl Serialize) {
        // Serialization of plain data types cannot fail here.
        if let Ok(value) = serde_json::to_value(value) {
            self.values.insert(key.to_string(), value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Record a non-fatal warning; the run continues.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Record the run-terminating error and flip the status.
    pub fn fail(&mut self, error: &CoreError) {
        self.status = RunStatus::Error;
        self.errors.push(error.to_string());
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
