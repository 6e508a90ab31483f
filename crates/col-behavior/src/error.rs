use thiserror::Error;

use col_agent::AgentError;
use col_core::{BuildingId, CitizenId};
use col_world::WorldError;

#[derive(Debug, Error)]
pub enum BehaviorError {
    #[error("building {0} not found")]
    MissingBuilding(BuildingId),

    #[error("citizen {0} has no job")]
    NoJob(CitizenId),

    #[error("handler failed: {0}")]
    Handler(String),

    #[error(transparent)]
    World(#[from] WorldError),

    #[error(transparent)]
    Agent(#[from] AgentError),
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;
