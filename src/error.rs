use thiserror::Error;

/// Errors that can occur while loading or saving a workflow document.
#[derive(Error, Debug)]
pub enum DefinitionError {
    #[error("Failed to parse workflow JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Step '{step_id}' has an unknown step type: '{type_name}'")]
    UnknownStepType { step_id: String, type_name: String },

    #[error("Step '{step_id}' of type '{type_name}' has an invalid config: {message}")]
    InvalidConfig {
        step_id: String,
        type_name: String,
        message: String,
    },

    #[error("Could not access workflow file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by structural edits of a workflow tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("Step '{0}' not found in the workflow")]
    StepNotFound(String),

    #[error("Step '{step_id}' is a '{type_name}' step and cannot hold child steps here")]
    NotAContainer { step_id: String, type_name: String },

    #[error("Condition path '{path_id}' not found in step '{step_id}'")]
    PathNotFound { step_id: String, path_id: String },

    #[error("Index {index} is out of bounds for a list of {len} entries")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("A step with id '{0}' already exists in the workflow")]
    DuplicateStepId(String),

    #[error("Step '{step_id}' already has a condition path '{path_id}'")]
    DuplicatePathId { step_id: String, path_id: String },
}

/// A failure reported by an external action executor. The message is surfaced verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ActionError {
    pub message: String,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors that abort a run of the reference runner.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("Step '{step_name}' ({step_id}) failed: {source}")]
    StepFailed {
        step_id: String,
        step_name: String,
        #[source]
        source: ActionError,
    },

    #[error(
        "Step '{step_id}' would iterate over {items} items, exceeding the limit of {limit}"
    )]
    IterationLimit {
        step_id: String,
        items: usize,
        limit: usize,
    },
}
