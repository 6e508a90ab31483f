//! `col-nav`: per-citizen path navigation.
//!
//! A [`PathNavigator`] turns movement requests into path jobs on the shared
//! [`PathScheduler`][col_path::PathScheduler], adopts the finished path on a
//! later tick and steers a [`Body`] along it one waypoint at a time.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`body`]      | `Body`, `MoveTarget`: collision, gravity, climbing        |
//! | [`navigator`] | `PathNavigator`: request de-duplication, path following   |
//! | [`error`]     | `NavError`, `NavResult<T>`                                |
//!
//! # Per-tick order
//!
//! The owning citizen calls [`PathNavigator::on_update_navigation`] first,
//! which only sets the body's move target, and then [`Body::step`], which
//! actually moves.  Nothing here blocks on the scheduler.

pub mod body;
pub mod error;
pub mod navigator;

#[cfg(test)]
mod tests;

pub use body::{Body, MoveTarget};
pub use error::{NavError, NavResult};
pub use navigator::PathNavigator;
