//! World-facade error type.

use thiserror::Error;

use col_core::BlockPos;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("slot {slot} out of range for container with {count} slots")]
    SlotOutOfRange { slot: usize, count: usize },

    #[error("position {0} is outside the loaded region")]
    NotLoaded(BlockPos),
}

pub type WorldResult<T> = Result<T, WorldError>;
