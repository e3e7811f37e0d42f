//! Execution Context: per-run settings
use serde::{Deserialize, Serialize};

/// What to do when two operations in a program share a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateNamePolicy {
    /// The later trace replaces the earlier one under the shared name.
    #[default]
    Shadow,
    /// Refuse to run the program.
    Reject,
}

#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub run_id: String,
    pub duplicate_names: DuplicateNamePolicy,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            duplicate_names: DuplicateNamePolicy::default(),
        }
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    pub fn with_duplicate_names(mut self, policy: DuplicateNamePolicy) -> Self {
        self.duplicate_names = policy;
        self
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}
