use thiserror::Error;

use col_behavior::BehaviorError;
use col_core::BuildingId;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("building {0} not found")]
    UnknownBuilding(BuildingId),

    #[error("building {id} is not a {expected}")]
    WrongKind { id: BuildingId, expected: &'static str },

    #[error("sieve table parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type TaskResult<T> = Result<T, TaskError>;

impl From<TaskError> for BehaviorError {
    fn from(e: TaskError) -> Self {
        match e {
            TaskError::UnknownBuilding(id) => BehaviorError::MissingBuilding(id),
            other => BehaviorError::Handler(other.to_string()),
        }
    }
}
