//! `col-agent`: per-citizen data for the colony citizen AI.
//!
//! Everything here is plain data plus the rules that keep it consistent
//! (stat caps, saturation bounds, interaction de-duplication).  The live
//! simulation object that walks around the world lives in `col-sim`; a
//! [`CitizenData`] only knows it through an optional arena [`Handle`].
//!
//! # Crate layout
//!
//! | Module            | Contents                                                  |
//! |-------------------|-----------------------------------------------------------|
//! | [`stats`]         | `Skill`, `Stats`, saturation constants                    |
//! | [`experience`]    | `Experience` (per-job level and xp)                       |
//! | [`job`]           | `Job`, `JobKind`                                          |
//! | [`interaction`]   | `Interaction`, `InteractionPriority`, `Interactions`      |
//! | [`citizen`]       | `CitizenData`, `CitizenDataBuilder`, `CitizenRecord`      |
//! | [`arena`]         | `Arena<T>`, `Handle` (generational index)                 |
//! | [`capability`]    | `InventoryOwning`, `Experienceable` traits                |
//! | [`error`]         | `AgentError`, `AgentResult<T>`                            |

pub mod arena;
pub mod capability;
pub mod citizen;
pub mod error;
pub mod experience;
pub mod interaction;
pub mod job;
pub mod stats;

#[cfg(test)]
mod tests;

pub use arena::{Arena, Handle};
pub use capability::{Experienceable, InventoryOwning};
pub use citizen::{CitizenData, CitizenDataBuilder, CitizenRecord, INVENTORY_SLOTS};
pub use error::{AgentError, AgentResult};
pub use experience::Experience;
pub use interaction::{Interaction, InteractionPriority, Interactions};
pub use job::{Job, JobKind};
pub use stats::{Skill, Stats};
