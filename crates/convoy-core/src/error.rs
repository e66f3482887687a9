use thiserror::Error;

/// Failure taxonomy for action execution.
///
/// A failure inside a child's `execute` never escapes its enclosing
/// [`ActionList`](crate::list::ActionList) silently: the list catches it,
/// logs a description, and applies the configured undo policy.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Invalid configuration or input supplied to an action
    /// (empty command string, missing library path). Never retried.
    #[error("data error: {0}")]
    Data(String),
    /// Contract violation by the caller or builder (unknown action kind,
    /// wrong object type attached). Always fatal to the current operation.
    #[error("logic error: {0}")]
    Logic(String),
    /// An external operation was attempted and failed (nonzero process
    /// exit, library or symbol load failure, task join failure).
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl ActionError {
    /// Create a data error
    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    /// Create a logic error
    pub fn logic(msg: impl Into<String>) -> Self {
        Self::Logic(msg.into())
    }

    /// Create a runtime error
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }
}
