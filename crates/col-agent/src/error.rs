use thiserror::Error;

use col_core::CitizenId;
use col_world::WorldError;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("citizen {0} has no live entity")]
    NoEntity(CitizenId),

    #[error("interaction check '{key}' failed: {reason}")]
    InteractionCheck { key: String, reason: String },

    #[error("invalid citizen record: {0}")]
    InvalidRecord(String),

    #[error(transparent)]
    World(#[from] WorldError),
}

pub type AgentResult<T> = Result<T, AgentError>;
