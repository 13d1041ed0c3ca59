use regex::Regex;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::core::RemoteDriver;
use crate::errors::Result;
use crate::steps::base::{StepAction, StepArgs, StepContext, StepError, StepOutcome};

struct Entry<D: RemoteDriver> {
    regex: Regex,
    action: Arc<dyn StepAction<D>>,
}

/// Registry of step actions, matched against free-text lines in
/// registration order.
pub struct StepRegistry<D: RemoteDriver> {
    entries: Vec<Entry<D>>,
}

impl<D: RemoteDriver> StepRegistry<D> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a new action. Its pattern is compiled anchored and
    /// case-insensitive.
    pub fn register<A: StepAction<D> + 'static>(&mut self, action: A) -> Result<()> {
        let anchored = format!("(?i)^{}$", action.pattern());
        let regex = Regex::new(&anchored).map_err(|e| StepError::BadPattern {
            step: action.name().to_string(),
            source: e,
        })?;
        self.entries.push(Entry {
            regex,
            action: Arc::new(action),
        });
        Ok(())
    }

    /// List all registered action names.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.action.name()).collect()
    }

    /// Resolve a line to its action and captured arguments without running it.
    pub fn resolve(
        &self,
        line: &str,
    ) -> std::result::Result<(Arc<dyn StepAction<D>>, StepArgs), StepError> {
        let text = strip_keyword(line);
        for entry in &self.entries {
            if let Some(captures) = entry.regex.captures(text) {
                let args = StepArgs::new(
                    captures
                        .iter()
                        .skip(1)
                        .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                        .collect(),
                );
                return Ok((Arc::clone(&entry.action), args));
            }
        }
        Err(StepError::Unrecognized(line.trim().to_string()))
    }

    /// Execute the action matching a line, with timing.
    ///
    /// This is the step boundary of the run: any failure (an unmatched
    /// line, a missing capture, the action's own browser call) releases the
    /// session before the error surfaces. Teardown is idempotent, so this
    /// composes with an explicit close step and with end-of-run cleanup.
    pub async fn dispatch(&self, line: &str, ctx: &StepContext<D>) -> Result<StepOutcome> {
        let started = Instant::now();
        match self.dispatch_inner(line, ctx).await {
            Ok(outcome) => {
                Ok(outcome.with_execution_time(started.elapsed().as_millis() as u64))
            }
            Err(err) => {
                ctx.session.teardown().await;
                Err(err)
            }
        }
    }

    async fn dispatch_inner(&self, line: &str, ctx: &StepContext<D>) -> Result<StepOutcome> {
        let (action, args) = self.resolve(line)?;
        debug!(step = action.name(), line = %line.trim(), "dispatching step");
        action.execute(&args, ctx).await
    }
}

impl<D: RemoteDriver> Default for StepRegistry<D> {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip one leading BDD keyword so patterns only describe the phrase.
fn strip_keyword(line: &str) -> &str {
    let trimmed = line.trim();
    for keyword in ["given", "when", "then", "and", "but"] {
        let followed_by_space = trimmed
            .as_bytes()
            .get(keyword.len())
            .is_some_and(|b| b.is_ascii_whitespace());
        if followed_by_space
            && trimmed
                .get(..keyword.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(keyword))
        {
            return trimmed[keyword.len() + 1..].trim_start();
        }
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GridError;
    use crate::steps::register_builtin;
    use crate::testing::{MockDriver, TestHelper};

    fn registry() -> StepRegistry<MockDriver> {
        let mut registry = StepRegistry::new();
        register_builtin(&mut registry).unwrap();
        registry
    }

    #[test]
    fn keyword_prefixes_are_stripped() {
        assert_eq!(strip_keyword("When I click \"Next\""), "I click \"Next\"");
        assert_eq!(strip_keyword("  then the browser should close"), "the browser should close");
        assert_eq!(strip_keyword("I click \"Next\""), "I click \"Next\"");
        // a keyword must be a whole leading word
        assert_eq!(strip_keyword("Thenever it runs"), "Thenever it runs");
    }

    #[test]
    fn resolve_extracts_ordered_captures() {
        let registry = registry();
        let (action, args) = registry
            .resolve("When I fill in \"email\" with \"a@b.com\"")
            .unwrap();
        assert_eq!(action.name(), "fill-field");
        assert_eq!(args.get(0), Some("email"));
        assert_eq!(args.get(1), Some("a@b.com"));
    }

    #[test]
    fn resolve_is_case_insensitive() {
        let registry = registry();
        let (action, args) = registry
            .resolve("the TITLE of the page should become \"Home\"")
            .unwrap();
        assert_eq!(action.name(), "assert-title");
        assert_eq!(args.get(0), Some("Home"));
    }

    #[test]
    fn unknown_lines_do_not_resolve() {
        let registry = registry();
        let err = registry.resolve("I dance wildly").unwrap_err();
        assert!(matches!(err, StepError::Unrecognized(_)));
    }

    #[tokio::test]
    async fn dispatch_failure_releases_the_session() {
        let registry = registry();
        let (ctx, state) = TestHelper::active_context().await;

        let err = registry
            .dispatch("When I click \"No Such Link\"", &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, GridError::ElementNotFound(_)));
        assert_eq!(state.lock().unwrap().quit_count, 1);
    }

    #[tokio::test]
    async fn unrecognized_lines_also_release_the_session() {
        let registry = registry();
        let (ctx, state) = TestHelper::active_context().await;

        let err = registry.dispatch("I dance wildly", &ctx).await.unwrap_err();
        assert!(matches!(err, GridError::Step(StepError::Unrecognized(_))));
        assert_eq!(state.lock().unwrap().quit_count, 1);
    }
}
