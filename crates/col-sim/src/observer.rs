//! Simulation observer trait for progress reporting and data collection.

use col_agent::Arena;
use col_core::Tick;
use col_tasks::Colony;

use crate::Citizen;

/// Callbacks invoked by [`Sim::step`][crate::Sim::step] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick, citizens: usize) {
///         if tick.0 % self.interval == 0 {
///             println!("tick {tick}: {citizens} citizens");
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any citizen moves.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at the end of each tick with the number of citizens ticked.
    fn on_tick_end(&mut self, _tick: Tick, _citizens: usize) {}

    /// Called when a new day starts and sifter quotas reset.
    fn on_new_day(&mut self, _tick: Tick) {}

    /// Called every `snapshot_interval` ticks (see
    /// [`SimBuilder::snapshot_interval`][crate::SimBuilder::snapshot_interval]).
    fn on_snapshot(&mut self, _tick: Tick, _citizens: &Arena<Citizen>, _colony: &Colony) {}

    /// Called once from [`Sim::shutdown`][crate::Sim::shutdown].
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
