//! `col-tasks`: the colony and the concrete citizen behaviours.
//!
//! Every behaviour is a `StateMachine` from `col-behavior` over a state enum
//! of its own, with `Colony` as the context's colony type.  Behaviours share
//! nothing but the citizen and the colony they are handed each tick.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                       |
//! |--------------|----------------------------------------------------------------|
//! | [`colony`]   | `Colony` (building registry, level cap, item requests)         |
//! | [`building`] | `Building`, `BuildingKind`, sifter/academy/mine modules        |
//! | [`eat`]      | `EatTask`: hunger gate and the food-seeking state machine      |
//! | [`combat`]   | `CombatTrainingTask`: knight sparring and dummy training       |
//! | [`sift`]     | `SiftTask`: sifting with daily quota and mesh wear             |
//! | [`miner`]    | `MinerTask`, `mine_block`, `block_mining_delay`, item pickup   |
//! | [`sieve`]    | `SieveTable`: weighted sifting results, CSV loader             |
//! | [`common`]   | helpers shared by job behaviours (tools, dumping)              |
//! | [`error`]    | `TaskError`, `TaskResult<T>`                                   |

pub mod building;
pub mod colony;
pub mod combat;
pub mod common;
pub mod eat;
pub mod error;
pub mod miner;
pub mod sieve;
pub mod sift;

#[cfg(test)]
mod tests;

pub use building::{AcademyModule, Building, BuildingKind, DigOrder, Mesh, MineModule, SifterModule};
pub use colony::{Colony, ItemRequest};
pub use combat::{CombatState, CombatTrainingTask};
pub use eat::{EatState, EatTask};
pub use error::{TaskError, TaskResult};
pub use miner::{block_mining_delay, MinerState, MinerTask};
pub use sieve::{SieveEntry, SieveTable};
pub use sift::{SiftState, SiftTask};
