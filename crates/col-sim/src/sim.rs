//! The `Sim` struct and its tick loop.

use std::sync::Arc;

use col_agent::{Arena, CitizenData, Handle, Job, JobKind};
use col_behavior::PeerSnapshot;
use col_core::{AgentRng, CitizenId, ColonyConfig, SimClock, SimRng, Tick, Vec3};
use col_nav::PathNavigator;
use col_path::PathScheduler;
use col_tasks::{Colony, SieveTable};
use col_world::{EffectSink, World};

use crate::{Citizen, JobAi, SimError, SimObserver, SimResult};

/// Ticks in one in-game day.  Sifter quotas reset at every multiple.
pub const TICKS_PER_DAY: u64 = 24_000;

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim` owns the colony, every live [`Citizen`] and a handle to the shared
/// path scheduler, and drives the tick loop:
///
/// 1. **Day change**: on every multiple of [`TICKS_PER_DAY`] the colony
///    starts a new day.
/// 2. **Peers**: snapshot every citizen's position so behaviours can look
///    for sparring partners without borrowing each other.
/// 3. **Citizens**: tick each citizen in ascending arena slot order.
/// 4. **Clock**: advance the world time and the simulation clock.
///
/// Path searches run on the scheduler's workers between ticks; a citizen
/// only observes a finished search on its own next tick.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    /// Read-only after build.
    pub config: ColonyConfig,

    pub clock: SimClock,

    /// Buildings, the level cap and open item requests.
    pub colony: Colony,

    pub(crate) world:             Arc<dyn World>,
    pub(crate) effects:           Arc<dyn EffectSink>,
    pub(crate) scheduler:         Arc<PathScheduler>,
    pub(crate) sieve:             Arc<SieveTable>,
    pub(crate) citizens:          Arena<Citizen>,
    pub(crate) next_citizen:      u32,
    /// Colony-wide draws, e.g. stats of newly arriving citizens.
    pub(crate) rng:               SimRng,
    pub(crate) owns_scheduler:    bool,
    pub(crate) snapshot_interval: u64,
}

impl Sim {
    // ── Population ────────────────────────────────────────────────────────

    /// Put a citizen into the world and return its handle.
    ///
    /// The citizen's RNG is derived from the master seed and its id, so the
    /// same seed and spawn order always reproduce the same run.
    pub fn spawn(&mut self, mut data: CitizenData) -> SimResult<Handle> {
        let id = data.id();
        if self.find(id).is_some() {
            return Err(SimError::DuplicateCitizen(id));
        }
        let job = data.job().copied();
        if let Some(job) = job {
            assign_workplace(&mut self.colony, id, &job)?;
        }

        let navigator = PathNavigator::new(Arc::clone(&self.scheduler), Arc::clone(&self.world), &self.config);
        let rng = AgentRng::new(self.config.seed, id);
        let job_ai = job.map(|j| JobAi::for_job(j.kind, &self.sieve));
        data.set_entity(None);

        let handle = self.citizens.insert(Citizen::new(data, navigator, rng, job_ai));
        if let Some(citizen) = self.citizens.try_resolve_mut(handle) {
            citizen.data_mut().set_entity(Some(handle));
        }
        self.next_citizen = self.next_citizen.max(id.0 + 1);
        tracing::info!(citizen = %id, ?handle, job = ?job.map(|j| j.kind), "citizen spawned");
        Ok(handle)
    }

    /// Spawn a fresh citizen with rolled stats under the next free id.
    pub fn spawn_random(&mut self, name: impl Into<String>, pos: Vec3) -> SimResult<Handle> {
        let id = CitizenId(self.next_citizen);
        let mut rng = AgentRng::new(self.rng.gen_range(0..=u64::MAX), id);
        let mut data = CitizenData::new_random(id, name, self.colony.level_cap(), &mut rng);
        data.set_position(pos);
        self.spawn(data)
    }

    /// Remove a citizen for good.  Its requests are cancelled and its
    /// academy bond is broken; the returned data can still be inspected.
    pub fn kill(&mut self, handle: Handle) -> SimResult<CitizenData> {
        let mut citizen = self.citizens.remove(handle).ok_or(SimError::UnknownCitizen(handle))?;
        citizen.on_death(&mut self.colony);
        Ok(citizen.into_data())
    }

    /// Change a citizen's job, or make it jobless with `None`.
    pub fn set_job(&mut self, handle: Handle, job: Option<Job>) -> SimResult<()> {
        let citizen = self.citizens.try_resolve_mut(handle).ok_or(SimError::UnknownCitizen(handle))?;
        let id = citizen.id();
        // the new workplace must accept the citizen before the old one lets go
        if let Some(new) = &job {
            assign_workplace(&mut self.colony, id, new)?;
        }
        let kept = job.filter(|j| j.kind == JobKind::Knight).and_then(|j| j.work_building);
        let old = citizen.data().job().and_then(|j| j.work_building).filter(|&b| Some(b) != kept);
        if let Some(academy) = old.and_then(|b| self.colony.building_mut(b)).and_then(|b| b.academy_mut()) {
            academy.unassign(id);
        }
        citizen.data_mut().set_job(job);
        citizen.set_job_ai(job.map(|j| JobAi::for_job(j.kind, &self.sieve)));
        tracing::info!(citizen = %id, job = ?job.map(|j| j.kind), "job changed");
        Ok(())
    }

    pub fn citizen(&self, handle: Handle) -> Option<&Citizen> {
        self.citizens.try_resolve(handle)
    }

    pub fn citizen_mut(&mut self, handle: Handle) -> Option<&mut Citizen> {
        self.citizens.try_resolve_mut(handle)
    }

    pub fn citizens(&self) -> &Arena<Citizen> {
        &self.citizens
    }

    /// Handle of the live citizen with this id.
    pub fn find(&self, id: CitizenId) -> Option<Handle> {
        self.citizens.iter().find(|(_, c)| c.id() == id).map(|(h, _)| h)
    }

    pub fn population(&self) -> usize {
        self.citizens.len()
    }

    pub fn world(&self) -> &Arc<dyn World> {
        &self.world
    }

    pub fn scheduler(&self) -> &Arc<PathScheduler> {
        &self.scheduler
    }

    #[inline]
    pub fn now(&self) -> Tick {
        self.clock.current_tick
    }

    // ── Tick loop ─────────────────────────────────────────────────────────

    /// Run exactly `n` ticks from the current position.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            self.step(observer);
        }
    }

    /// Advance one tick.  Returns the number of citizens ticked.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) -> usize {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);

        if now.0 > 0 && now.0.is_multiple_of(TICKS_PER_DAY) {
            self.colony.start_new_day();
            tracing::info!(tick = %now, "new day");
            observer.on_new_day(now);
        }

        let peers: Vec<PeerSnapshot> = self.citizens.iter().map(|(_, c)| c.snapshot()).collect();

        // Explicit field borrows so the borrow checker sees disjoint access.
        let world   = &*self.world;
        let effects = &*self.effects;
        let config  = &self.config;
        let colony  = &mut self.colony;
        let mut ticked = 0;
        for (_, citizen) in self.citizens.iter_mut() {
            citizen.tick(now, colony, world, effects, &peers, config);
            ticked += 1;
        }

        observer.on_tick_end(now, ticked);
        if self.snapshot_interval > 0 && now.0.is_multiple_of(self.snapshot_interval) {
            observer.on_snapshot(now, &self.citizens, &self.colony);
        }

        self.world.advance_time();
        self.clock.advance();
        ticked
    }

    /// Stop the path scheduler (when this simulation started it) after the
    /// searches already queued have finished.
    pub fn shutdown<O: SimObserver>(&mut self, observer: &mut O) {
        for (_, citizen) in self.citizens.iter_mut() {
            citizen.navigator_mut().clear_path();
        }
        if self.owns_scheduler {
            self.scheduler.shutdown();
        }
        tracing::info!(clock = %self.clock, population = self.citizens.len(), "simulation ended");
        observer.on_sim_end(self.clock.current_tick);
    }
}

impl Drop for Sim {
    fn drop(&mut self) {
        if self.owns_scheduler && self.scheduler.is_running() {
            self.scheduler.shutdown_now();
        }
    }
}

/// Knights train at an academy, which keeps track of who may spar.
fn assign_workplace(colony: &mut Colony, citizen: CitizenId, job: &Job) -> SimResult<()> {
    if job.kind != JobKind::Knight {
        return Ok(());
    }
    if let Some(building) = job.work_building {
        colony.academy_mut(building)?.assign(citizen);
    }
    Ok(())
}
