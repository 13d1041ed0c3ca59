use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::browser::SessionManager;
use crate::core::{Config, RemoteDriver};
use crate::errors::Result;
use crate::steps::{StepContext, StepRegistry};

/// An ordered list of step lines, as the surrounding BDD runner would
/// produce them. No feature-file syntax is interpreted here.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub steps: Vec<String>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, steps: Vec<String>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }

    /// Build a scenario from plain text, one step per line. Blank lines and
    /// `#` comments are skipped.
    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        let steps = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        Self::new(name, steps)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub line: String,
    pub message: String,
    pub execution_time_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    Passed,
    Failed { step: String, error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub scenario: String,
    pub started_at: DateTime<Utc>,
    pub executed: Vec<StepReport>,
    pub skipped: usize,
    pub outcome: RunOutcome,
}

impl RunReport {
    pub fn passed(&self) -> bool {
        matches!(self.outcome, RunOutcome::Passed)
    }
}

/// Drives one scenario against one remote session.
///
/// Before-all and after-all behavior lives here: the session is provisioned
/// before the first step and released on every exit path, whether the run
/// ends after the last step or at the first failed step (where the dispatch
/// guard has already released it).
pub struct ScenarioRunner<D: RemoteDriver> {
    config: Config,
    registry: StepRegistry<D>,
    session: Arc<SessionManager<D>>,
}

impl<D: RemoteDriver> ScenarioRunner<D> {
    pub fn new(config: Config, registry: StepRegistry<D>, session: Arc<SessionManager<D>>) -> Self {
        Self {
            config,
            registry,
            session,
        }
    }

    pub fn session(&self) -> &Arc<SessionManager<D>> {
        &self.session
    }

    /// Run every step in order, stopping at the first failure.
    ///
    /// Returns `Err` only when provisioning fails, which is fatal to the
    /// run. Step failures are reported in the returned [`RunReport`].
    pub async fn run(&self, scenario: &Scenario) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(run = %run_id, scenario = %scenario.name, steps = scenario.steps.len(), "starting run");

        self.session
            .setup(&self.config.endpoint, &self.config.capabilities)
            .await?;

        let ctx = StepContext::new(Arc::clone(&self.session), scenario.name.clone());
        let mut executed = Vec::new();
        let mut skipped = 0;
        let mut outcome = RunOutcome::Passed;

        for (index, line) in scenario.steps.iter().enumerate() {
            match self.registry.dispatch(line, &ctx).await {
                Ok(step) => {
                    info!(step = %line, elapsed_ms = step.execution_time_ms, "step passed");
                    executed.push(StepReport {
                        line: line.clone(),
                        message: step.message,
                        execution_time_ms: step.execution_time_ms,
                    });
                }
                Err(err) => {
                    // the dispatch guard has already released the session
                    error!(step = %line, error = %err, "step failed");
                    skipped = scenario.steps.len() - index - 1;
                    outcome = RunOutcome::Failed {
                        step: line.clone(),
                        error: err.to_string(),
                    };
                    break;
                }
            }
        }

        self.session.teardown().await;

        let report = RunReport {
            run_id,
            scenario: scenario.name.clone(),
            started_at,
            executed,
            skipped,
            outcome,
        };
        info!(run = %run_id, passed = report.passed(), skipped = report.skipped, "run finished");
        Ok(report)
    }
}
