//! Workflow error types.

use hypatia_core::KernelError;
use thiserror::Error;

/// Result type for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Errors raised by the workflow engine.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The definition is incoherent. Every problem found is listed.
    #[error("invalid workflow definition: {}", errors.join("; "))]
    InvalidDefinition {
        /// One message per problem.
        errors: Vec<String>,
    },

    /// A persisted instance does not agree with its definition.
    #[error("invalid workflow instance: {}", errors.join("; "))]
    InvalidInstance {
        /// One message per problem.
        errors: Vec<String>,
    },

    /// The definition input is not well-formed JSON for a definition.
    #[error("failed to parse workflow definition: {0}")]
    Parse(#[from] serde_json::Error),

    /// No definition has been loaded into the engine.
    #[error("no workflow definition loaded")]
    NotLoaded,

    /// No transition leaves the current state on this event.
    #[error("event '{event}' is not allowed in state '{state}'")]
    TransitionNotAllowed {
        /// The instance's current state.
        state: String,
        /// The rejected event.
        event: String,
    },
}

impl From<WorkflowError> for KernelError {
    fn from(error: WorkflowError) -> Self {
        match error {
            WorkflowError::TransitionNotAllowed { .. } => Self::conflict(error.to_string()),
            other => Self::internal_with_source(other.to_string(), other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_invalid_definition_lists_every_error() {
        let err = WorkflowError::InvalidDefinition {
            errors: vec!["first".into(), "second".into()],
        };
        assert_eq!(err.to_string(), "invalid workflow definition: first; second");
    }

    #[test]
    fn test_transition_not_allowed_is_conflict() {
        let err: KernelError = WorkflowError::TransitionNotAllowed {
            state: "Draft".into(),
            event: "Approve".into(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert!(err.to_string().contains("Approve"));
    }

    #[test]
    fn test_configuration_errors_are_internal() {
        let err: KernelError = WorkflowError::NotLoaded.into();
        assert!(err.is_internal());
    }
}
