//! Error types for planner-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlannerError {
    /// A block-out rule, recurring event, or time string the calculator cannot use.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A single task the scheduler refused. Other tasks in the batch are unaffected.
    #[error("Invalid task '{task_id}': {reason}")]
    InvalidTask { task_id: String, reason: String },
}

impl PlannerError {
    pub(crate) fn invalid_task(task_id: &str, reason: impl Into<String>) -> Self {
        PlannerError::InvalidTask {
            task_id: task_id.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;
