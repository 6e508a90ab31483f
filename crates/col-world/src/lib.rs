//! `col-world`: the world facade the citizen AI reads and mutates.
//!
//! The host engine owns the real world; this crate defines the narrow
//! interfaces the AI needs plus `GridWorld`, an in-memory host used by tests
//! and the demo.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`block`]     | `Block`, `Material`                                        |
//! | [`item`]      | `ItemKind`, `ItemStack`, `ToolType`                        |
//! | [`container`] | `ItemContainer` trait, `SlotInventory`, transfer helpers   |
//! | [`world`]     | `World` trait, `WorldEntity`, `EntityKind`                 |
//! | [`grid`]      | `GridWorld` (hash-map blocks + R-tree entities), builder   |
//! | [`effects`]   | `EffectSink` trait, `NullSink`, `RecordingSink`, `TracingSink` |
//! | [`error`]     | `WorldError`, `WorldResult<T>`                             |

pub mod block;
pub mod container;
pub mod effects;
pub mod error;
pub mod grid;
pub mod item;
pub mod world;


pub use block::{Block, Material};
pub use container::{ItemContainer, SlotInventory};
pub use effects::{Effect, EffectSink, Notification, NullSink, Recipients, RecordingSink, Sound, TracingSink};
pub use error::{WorldError, WorldResult};
pub use grid::{GridWorld, GridWorldBuilder};
pub use item::{ItemKind, ItemStack, ToolType};
pub use world::{EntityKind, World, WorldEntity};
