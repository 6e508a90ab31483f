//! Pathfinding error type.
//!
//! "No path" is not an error: a search that exhausts its bound returns
//! `Ok(None)`.

use thiserror::Error;

use col_core::BlockPos;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PathError {
    #[error("path search interrupted")]
    Interrupted,

    #[error("path search panicked")]
    JobPanicked,

    #[error("start position {0} is not loaded")]
    StartNotLoaded(BlockPos),

    #[error("pathfinding scheduler has not been started")]
    NotStarted,

    #[error("pathfinding scheduler is shut down")]
    ShutDown,

    #[error("could not build the pathfinding thread pool: {0}")]
    PoolBuild(String),
}

pub type PathingResult<T> = Result<T, PathError>;
