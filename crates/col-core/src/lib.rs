//! `col-core`: foundational types for the colony citizen AI.
//!
//! Every other `col-*` crate depends on this one.  It has no `col-*`
//! dependencies and only `rand` and `thiserror` (plus optional `serde`).
//!
//! # What lives here
//!
//! | Module       | Contents                                                 |
//! |--------------|----------------------------------------------------------|
//! | [`ids`]      | `CitizenId`, `BuildingId`, `EntityId`                    |
//! | [`pos`]      | `BlockPos`, `Vec3`, `Facing`, `Aabb`                     |
//! | [`time`]     | `Tick`, `SimClock`, tick-rate constants                  |
//! | [`rng`]      | `AgentRng` (per-citizen), `SimRng` (global)              |
//! | [`config`]   | `ColonyConfig`                                           |
//! | [`error`]    | `CoreError`, `CoreResult`                                |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |
//!           | Required by `col-agent` persistence.                       |

pub mod config;
pub mod error;
pub mod ids;
pub mod pos;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::ColonyConfig;
pub use error::{CoreError, CoreResult};
pub use ids::{BuildingId, CitizenId, EntityId};
pub use pos::{Aabb, BlockPos, Facing, Vec3};
pub use rng::{AgentRng, SimRng};
pub use time::{SimClock, Tick, TICKS_PER_SECOND};
