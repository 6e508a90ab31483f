//! Navigator error type.

use thiserror::Error;

use col_path::PathError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum NavError {
    #[error("requested speed {0} exceeds the allowed maximum")]
    SpeedTooHigh(f64),

    #[error("refusing to path to the zero vector")]
    ZeroTarget,

    #[error(transparent)]
    Scheduler(#[from] PathError),
}

pub type NavResult<T> = Result<T, NavError>;
