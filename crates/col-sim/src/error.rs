use thiserror::Error;

use col_agent::{AgentError, Handle};
use col_core::{CitizenId, CoreError};
use col_nav::NavError;
use col_path::PathError;
use col_tasks::TaskError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("no live citizen behind handle {0:?}")]
    UnknownCitizen(Handle),

    #[error("citizen {0} is already alive in this simulation")]
    DuplicateCitizen(CitizenId),

    #[error("pathfinding error: {0}")]
    Path(#[from] PathError),

    #[error("navigation error: {0}")]
    Nav(#[from] NavError),

    #[error("citizen data error: {0}")]
    Agent(#[from] AgentError),

    #[error("colony error: {0}")]
    Task(#[from] TaskError),
}

pub type SimResult<T> = Result<T, SimError>;
