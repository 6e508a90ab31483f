//! Base error type for `col-core`.
//!
//! Downstream crates keep their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use thiserror::Error;

use crate::{BuildingId, CitizenId};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("citizen {0} not found")]
    CitizenNotFound(CitizenId),

    #[error("building {0} not found")]
    BuildingNotFound(BuildingId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `col-core`.
pub type CoreResult<T> = Result<T, CoreError>;
