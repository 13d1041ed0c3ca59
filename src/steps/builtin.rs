use async_trait::async_trait;

use crate::core::RemoteDriver;
use crate::errors::{GridError, Result};
use crate::steps::base::{StepAction, StepArgs, StepContext, StepOutcome};
use crate::steps::registry::StepRegistry;

/// Compare the live page title against an expected value, exactly.
#[derive(Debug)]
pub struct AssertTitle;

#[async_trait]
impl<D: RemoteDriver> StepAction<D> for AssertTitle {
    fn name(&self) -> &str {
        "assert-title"
    }

    fn pattern(&self) -> &str {
        r#"the title of the page should become "([^"]*)""#
    }

    async fn execute(&self, args: &StepArgs, ctx: &StepContext<D>) -> Result<StepOutcome> {
        let expected = args.required(<Self as StepAction<D>>::name(self), 0)?;
        let actual = ctx.session.title().await?;
        if actual != expected {
            return Err(GridError::AssertionFailed {
                expected: expected.to_string(),
                actual,
            });
        }
        Ok(StepOutcome::passed(format!("title is {expected:?}")))
    }
}

/// Type a value into the element with the given `name` attribute.
#[derive(Debug)]
pub struct FillField;

#[async_trait]
impl<D: RemoteDriver> StepAction<D> for FillField {
    fn name(&self) -> &str {
        "fill-field"
    }

    fn pattern(&self) -> &str {
        r#"I fill in "([^"]*)" with "([^"]*)""#
    }

    async fn execute(&self, args: &StepArgs, ctx: &StepContext<D>) -> Result<StepOutcome> {
        let name = args.required(<Self as StepAction<D>>::name(self), 0)?;
        let value = args.required(<Self as StepAction<D>>::name(self), 1)?;
        ctx.session.fill_by_name(name, value).await?;
        Ok(StepOutcome::passed(format!("filled {name:?}")))
    }
}

/// Click the link with the given visible text.
#[derive(Debug)]
pub struct ClickLink;

#[async_trait]
impl<D: RemoteDriver> StepAction<D> for ClickLink {
    fn name(&self) -> &str {
        "click-link"
    }

    fn pattern(&self) -> &str {
        r#"I click "([^"]*)""#
    }

    async fn execute(&self, args: &StepArgs, ctx: &StepContext<D>) -> Result<StepOutcome> {
        let text = args.required(<Self as StepAction<D>>::name(self), 0)?;
        ctx.session.click_link(text).await?;
        Ok(StepOutcome::passed(format!("clicked {text:?}")))
    }
}

/// Terminate the session. Never fails the scenario, even when the session
/// is already gone.
#[derive(Debug)]
pub struct CloseSession;

#[async_trait]
impl<D: RemoteDriver> StepAction<D> for CloseSession {
    fn name(&self) -> &str {
        "close-session"
    }

    fn pattern(&self) -> &str {
        "the browser should close"
    }

    async fn execute(&self, _args: &StepArgs, ctx: &StepContext<D>) -> Result<StepOutcome> {
        ctx.session.teardown().await;
        Ok(StepOutcome::passed("browser closed"))
    }
}

/// Register the four built-in actions.
pub fn register_builtin<D: RemoteDriver>(registry: &mut StepRegistry<D>) -> Result<()> {
    registry.register(AssertTitle)?;
    registry.register(FillField)?;
    registry.register(ClickLink)?;
    registry.register(CloseSession)?;
    Ok(())
}

impl<D: RemoteDriver> StepRegistry<D> {
    /// A registry preloaded with the built-in actions.
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new();
        register_builtin(&mut registry)?;
        Ok(registry)
    }
}
