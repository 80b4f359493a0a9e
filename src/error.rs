use thiserror::Error;

/// Workflow-level error taxonomy. Every remote-call failure is caught at the
/// call site and surfaced as one of these; none are fatal to the process.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Network(String),

    #[error("No active diet plan found")]
    NoActivePlan,

    #[error("Authentication required")]
    Unauthenticated,

    /// The generated plan could not be durably persisted (the health-entry
    /// save failed, so the plan save was never attempted). The plan is still
    /// usable from memory.
    #[error("Diet plan was not saved: {0}")]
    PersistenceSkipped(String),
}

impl WorkflowError {
    pub fn validation(msg: impl Into<String>) -> Self {
        WorkflowError::Validation(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        WorkflowError::Network(msg.into())
    }
}
