pub mod base;
pub mod builtin;
pub mod registry;

pub use base::{StepAction, StepArgs, StepContext, StepError, StepOutcome};
pub use builtin::{register_builtin, AssertTitle, ClickLink, CloseSession, FillField};
pub use registry::StepRegistry;
