//! `col-sim`: citizen controller and tick loop for the colony citizen AI.
//!
//! # Tick loop
//!
//! ```text
//! every tick:
//!   ① Day:       on multiples of TICKS_PER_DAY the colony starts a new day
//!   ② Peers:     snapshot every citizen's position
//!   ③ Citizens:  in ascending arena order, each citizen:
//!                   drops stale interactions
//!                   polls its path search and steps its body
//!                   eats when hungry, otherwise runs its job AI
//!   ④ Clock:     advance world time and the simulation clock
//! ```
//!
//! Path searches run on the shared [`PathScheduler`][col_path::PathScheduler]
//! between ticks.  Everything else happens on the thread calling
//! [`Sim::step`].
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use col_sim::{NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::new(Arc::new(world)).config(config).build()?;
//! let handle = sim.spawn_random("Alys", Vec3::new(0.5, 1.0, 0.5))?;
//! sim.run_ticks(24_000, &mut NoopObserver);
//! sim.shutdown(&mut NoopObserver);
//! ```

pub mod builder;
pub mod citizen;
pub mod error;
pub mod observer;
pub mod sim;


pub use builder::SimBuilder;
pub use citizen::{Citizen, JobAi};
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use sim::{Sim, TICKS_PER_DAY};
