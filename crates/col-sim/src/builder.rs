//! Fluent builder for constructing a [`Sim`].

use std::sync::Arc;

use col_agent::Arena;
use col_core::{ColonyConfig, SimClock, SimRng};
use col_path::PathScheduler;
use col_tasks::{Colony, SieveTable};
use col_world::{EffectSink, NullSink, World};

use crate::{Sim, SimResult};

/// Level cap of a colony nobody supplied.
const DEFAULT_LEVEL_CAP: u32 = 5;

/// Fluent builder for [`Sim`].
///
/// # Required inputs
///
/// - `Arc<dyn World>`: the block and entity store citizens live in
///
/// # Optional inputs (have defaults)
///
/// | Method                    | Default                                     |
/// |---------------------------|---------------------------------------------|
/// | `.config(c)`              | `ColonyConfig::default()`                   |
/// | `.colony(c)`              | empty colony with level cap 5               |
/// | `.effects(s)`             | `NullSink`                                  |
/// | `.sieve_table(t)`         | `SieveTable::builtin()`                     |
/// | `.scheduler(s)`           | new scheduler, owned and stopped by the sim |
/// | `.snapshot_interval(n)`   | `0` (no snapshots)                          |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(Arc::new(world))
///     .config(config)
///     .colony(colony)
///     .effects(Arc::new(TracingSink))
///     .build()?;
/// sim.spawn(data)?;
/// sim.run_ticks(1_000, &mut NoopObserver);
/// sim.shutdown(&mut NoopObserver);
/// ```
pub struct SimBuilder {
    world:             Arc<dyn World>,
    config:            ColonyConfig,
    colony:            Option<Colony>,
    effects:           Option<Arc<dyn EffectSink>>,
    sieve:             Option<Arc<SieveTable>>,
    scheduler:         Option<Arc<PathScheduler>>,
    snapshot_interval: u64,
}

impl SimBuilder {
    pub fn new(world: Arc<dyn World>) -> Self {
        Self {
            world,
            config:            ColonyConfig::default(),
            colony:            None,
            effects:           None,
            sieve:             None,
            scheduler:         None,
            snapshot_interval: 0,
        }
    }

    pub fn config(mut self, config: ColonyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn colony(mut self, colony: Colony) -> Self {
        self.colony = Some(colony);
        self
    }

    /// Where notifications and visual effects go.
    pub fn effects(mut self, effects: Arc<dyn EffectSink>) -> Self {
        self.effects = Some(effects);
        self
    }

    pub fn sieve_table(mut self, table: SieveTable) -> Self {
        self.sieve = Some(Arc::new(table));
        self
    }

    /// Share a scheduler that is already running.
    ///
    /// The simulation never shuts a shared scheduler down; whoever started
    /// it stays responsible for that.
    pub fn scheduler(mut self, scheduler: Arc<PathScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Call [`SimObserver::on_snapshot`][crate::SimObserver::on_snapshot]
    /// every `ticks` ticks.  `0` disables snapshots.
    pub fn snapshot_interval(mut self, ticks: u64) -> Self {
        self.snapshot_interval = ticks;
        self
    }

    /// Validate the configuration, start the scheduler if none was shared
    /// and return a ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim> {
        self.config.validate()?;

        let (scheduler, owns_scheduler) = match self.scheduler {
            Some(s) => (s, false),
            None => (PathScheduler::started(self.config.pathfinding_max_threads)?, true),
        };

        let seed = self.config.seed;
        let clock = SimClock::new(self.world.time());
        tracing::debug!(seed = self.config.seed, start = %clock.current_tick, owns_scheduler, "simulation built");

        Ok(Sim {
            config:            self.config,
            clock,
            colony:            self.colony.unwrap_or_else(|| Colony::new(DEFAULT_LEVEL_CAP)),
            world:             self.world,
            effects:           self.effects.unwrap_or_else(|| Arc::new(NullSink)),
            scheduler,
            sieve:             self.sieve.unwrap_or_else(|| Arc::new(SieveTable::builtin())),
            citizens:          Arena::new(),
            next_citizen:      0,
            rng:               SimRng::new(seed),
            owns_scheduler,
            snapshot_interval: self.snapshot_interval,
        })
    }
}
