use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("Session provisioning failed: {0}")]
    Provisioning(String),

    #[error("Session already active")]
    SessionAlreadyActive,

    #[error("Session not provisioned")]
    SessionNotProvisioned,

    #[error("Session terminated")]
    SessionTerminated,

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Assertion failed: expected {expected:?}, got {actual:?}")]
    AssertionFailed { expected: String, actual: String },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Step error: {0}")]
    Step(#[from] crate::steps::StepError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, GridError>;

impl GridError {
    /// True for errors that abort the whole run rather than a single step.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GridError::Provisioning(_))
    }
}
