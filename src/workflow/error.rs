//! Workflow Error Taxonomy
//!
//! All fallible store and engine operations return [`WorkflowError`].
//! Collaborator failures are converted into `fail_step` mutations by the
//! runner rather than propagated to the original caller.

use thiserror::Error;

/// Errors produced by the workflow store and execution engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// Operation referenced an unknown workflow id.
    #[error("workflow '{0}' not found")]
    NotFound(String),

    /// Operation referenced a step id that does not exist in the workflow.
    #[error("workflow '{workflow_id}' has no step '{step_id}'")]
    StepNotFound {
        workflow_id: String,
        step_id: String,
    },

    /// A control action or mutation was invoked against a state that does
    /// not satisfy its precondition.
    #[error("invalid transition for workflow '{workflow_id}': {reason}")]
    InvalidTransition {
        workflow_id: String,
        reason: String,
    },

    /// Workflow configuration rejected before a workflow was created.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

impl WorkflowError {
    pub(crate) fn invalid_transition(
        workflow_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        WorkflowError::InvalidTransition {
            workflow_id: workflow_id.into(),
            reason: reason.into(),
        }
    }
}
