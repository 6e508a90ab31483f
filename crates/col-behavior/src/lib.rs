//! `col-behavior`: the generic task state machine and the traits behaviours
//! are written against.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                     |
//! |----------------|--------------------------------------------------------------|
//! | [`machine`]    | `StateMachine<S, B, X>`, `AiTarget`, `Action`, `Handler`     |
//! | [`context`]    | `TaskContext<'a, X>`, `PeerSnapshot`                         |
//! | [`capability`] | `Movable`, `Worker`                                          |
//! | [`error`]      | `BehaviorError`, `BehaviorResult<T>`                         |
//!
//! # Design notes
//!
//! A behaviour is three things: a `Copy` state enum `S`, a plain data struct
//! `B` holding whatever it remembers between ticks (food slot, waiting
//! counter, current target), and a registration table mapping each state
//! to a handler and a tick interval.  Handlers are plain `fn` pointers that
//! receive `&mut B` and a [`TaskContext`] and return the next state.  The
//! engine owns the cadence, the requested delay and error containment; the
//! handlers own everything else.
//!
//! `X` is the colony type.  It is a parameter so this crate does not depend
//! on the buildings that concrete behaviours need.

pub mod capability;
pub mod context;
pub mod error;
pub mod machine;


pub use capability::{Movable, Worker};
pub use context::{PeerSnapshot, TaskContext};
pub use error::{BehaviorError, BehaviorResult};
pub use machine::{Action, AiTarget, Handler, StateMachine};
