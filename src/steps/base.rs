use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::browser::SessionManager;
use crate::core::RemoteDriver;
use crate::errors::Result;

/// Result of a passed step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    pub message: String,
    pub execution_time_ms: u64,
}

impl StepOutcome {
    pub fn passed(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            execution_time_ms: 0,
        }
    }

    pub fn with_execution_time(mut self, time_ms: u64) -> Self {
        self.execution_time_ms = time_ms;
        self
    }
}

/// Errors raised by step resolution itself, before an action runs.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("No step matches line {0:?}")]
    Unrecognized(String),

    #[error("Step {step} is missing capture group {index}")]
    MissingArgument { step: String, index: usize },

    #[error("Invalid pattern for step {step}: {source}")]
    BadPattern {
        step: String,
        #[source]
        source: regex::Error,
    },
}

/// Ordered arguments captured from a step line.
#[derive(Debug, Clone, Default)]
pub struct StepArgs(Vec<String>);

impl StepArgs {
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn required(&self, step: &str, index: usize) -> std::result::Result<&str, StepError> {
        self.get(index).ok_or_else(|| StepError::MissingArgument {
            step: step.to_string(),
            index,
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Context handed to actions during execution. Carries the run's session
/// binding so nothing has to live in process-wide state.
pub struct StepContext<D: RemoteDriver> {
    pub session: Arc<SessionManager<D>>,
    pub scenario: String,
}

impl<D: RemoteDriver> StepContext<D> {
    pub fn new(session: Arc<SessionManager<D>>, scenario: impl Into<String>) -> Self {
        Self {
            session,
            scenario: scenario.into(),
        }
    }
}

/// One named, pattern-matched browser action.
#[async_trait]
pub trait StepAction<D: RemoteDriver>: Send + Sync + std::fmt::Debug {
    /// Name of the action.
    fn name(&self) -> &str;

    /// Bare phrase pattern; the registry anchors it and matches it
    /// case-insensitively. Capture groups become the ordered arguments.
    fn pattern(&self) -> &str;

    /// Perform the action against the current session.
    async fn execute(&self, args: &StepArgs, ctx: &StepContext<D>) -> Result<StepOutcome>;
}
