//! `col-path`: asynchronous pathfinding over the block world.
//!
//! A [`PathJob`] captures everything a search needs at construction time and
//! never changes afterwards.  The [`PathScheduler`] runs jobs on a bounded
//! rayon pool; callers poll the returned [`PathFuture`] from the simulation
//! thread.  The shared [`PathResult`] handle carries the status the navigator
//! and the owning behaviour watch.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`point`]     | `PathPoint`, `Path`                                       |
//! | [`result`]    | `PathStatus`, `PathResult`                                |
//! | [`goal`]      | `PathGoal`, `BlockPredicate`, `Capabilities`              |
//! | [`job`]       | `PathJob`, `CancelToken`, `prepare_start`, A* search      |
//! | [`scheduler`] | `PathScheduler`, `PathFuture`                             |
//! | [`error`]     | `PathError`, `PathingResult<T>`                           |

pub mod error;
pub mod goal;
pub mod job;
pub mod point;
pub mod result;
pub mod scheduler;


pub use error::{PathError, PathingResult};
pub use goal::{BlockPredicate, Capabilities, PathGoal};
pub use job::{prepare_start, CancelToken, PathJob};
pub use point::{Path, PathPoint};
pub use result::{PathResult, PathStatus};
pub use scheduler::{PathFuture, PathScheduler};
