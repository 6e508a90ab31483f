//! The citizen controller: one live citizen in the world.
//!
//! A [`Citizen`] owns everything that moves and thinks for one colonist:
//! its data record, a kinematic [`Body`], a [`PathNavigator`], a private
//! RNG, the eating behaviour and (when employed) a job behaviour.
//!
//! # Per-tick order
//!
//! ```text
//! ① interactions:  drop the ones whose validity check fails
//! ② navigation:    poll the path search, steer the body, step it
//! ③ behaviour:     EatTask when its gate says so, otherwise the job AI
//! ```

use std::sync::Arc;

use col_agent::{CitizenData, JobKind};
use col_behavior::{Movable, PeerSnapshot, TaskContext, Worker};
use col_core::{AgentRng, BlockPos, CitizenId, ColonyConfig, Tick, Vec3};
use col_nav::{Body, PathNavigator};
use col_path::Path;
use col_tasks::{Colony, CombatTrainingTask, EatTask, MinerTask, SieveTable, SiftTask};
use col_world::{EffectSink, World};

// ── Job AI ────────────────────────────────────────────────────────────────────

/// The work behaviour matching a citizen's job.
pub enum JobAi {
    Knight(CombatTrainingTask),
    Sifter(SiftTask),
    Miner(MinerTask),
}

impl JobAi {
    pub fn for_job(kind: JobKind, sieve: &Arc<SieveTable>) -> Self {
        match kind {
            JobKind::Knight => JobAi::Knight(CombatTrainingTask::new()),
            JobKind::Sifter => JobAi::Sifter(SiftTask::new(Arc::clone(sieve))),
            JobKind::Miner => JobAi::Miner(MinerTask::new()),
        }
    }

    pub fn kind(&self) -> JobKind {
        match self {
            JobAi::Knight(_) => JobKind::Knight,
            JobAi::Sifter(_) => JobKind::Sifter,
            JobAi::Miner(_) => JobKind::Miner,
        }
    }

    pub fn is_idle(&self) -> bool {
        match self {
            JobAi::Knight(t) => t.is_idle(),
            JobAi::Sifter(t) => t.is_idle(),
            JobAi::Miner(t) => t.is_idle(),
        }
    }

    /// Current state, formatted for logs.
    pub fn state_name(&self) -> String {
        match self {
            JobAi::Knight(t) => format!("{:?}", t.state()),
            JobAi::Sifter(t) => format!("{:?}", t.state()),
            JobAi::Miner(t) => format!("{:?}", t.state()),
        }
    }

    fn tick(&mut self, ctx: &mut TaskContext<'_, Colony>) {
        match self {
            JobAi::Knight(t) => {
                t.tick(ctx);
            }
            JobAi::Sifter(t) => {
                t.tick(ctx);
            }
            JobAi::Miner(t) => {
                t.tick(ctx);
            }
        }
    }

    pub fn reset(&mut self) {
        match self {
            JobAi::Knight(t) => t.reset(),
            JobAi::Sifter(t) => t.reset(),
            JobAi::Miner(t) => t.reset(),
        }
    }
}

// ── Worker view ───────────────────────────────────────────────────────────────

/// Split borrow of a citizen handed to behaviours as their `Worker`.
struct Mover<'a> {
    data: &'a mut CitizenData,
    body: &'a mut Body,
    nav:  &'a mut PathNavigator,
}

impl Movable for Mover<'_> {
    fn position(&self) -> Vec3 {
        self.body.position()
    }

    fn walk_to(&mut self, site: BlockPos, range: i32) -> bool {
        let speed = self.nav.speed();
        self.nav.is_at_site_with_move(self.body.position(), site, range, speed)
    }

    fn move_away_from(&mut self, avoid: BlockPos, range: u32) {
        let speed = self.nav.speed();
        if let Err(e) = self.nav.move_away_from(self.body.position(), avoid, range, speed) {
            tracing::debug!(citizen = %self.data.id(), error = %e, "could not move away");
        }
    }

    fn random_land_pos(&self, range: i32, rng: &mut AgentRng) -> Option<BlockPos> {
        self.nav.random_land_pos(self.block_pos(), range, rng)
    }

    fn no_path(&self) -> bool {
        self.nav.no_path()
    }

    fn path_progress(&self) -> Option<usize> {
        self.nav.path().map(Path::cursor)
    }

    fn stop(&mut self) {
        self.nav.clear_path();
        self.body.stop();
    }
}

impl Worker for Mover<'_> {
    fn citizen(&self) -> &CitizenData {
        &*self.data
    }

    fn citizen_mut(&mut self) -> &mut CitizenData {
        &mut *self.data
    }
}

// ── Citizen ───────────────────────────────────────────────────────────────────

pub struct Citizen {
    data:      CitizenData,
    body:      Body,
    navigator: PathNavigator,
    rng:       AgentRng,
    eat:       EatTask,
    job:       Option<JobAi>,
}

impl Citizen {
    /// The body starts where the data record says the citizen is.
    pub fn new(data: CitizenData, navigator: PathNavigator, rng: AgentRng, job: Option<JobAi>) -> Self {
        let body = Body::new(data.position());
        Self { data, body, navigator, rng, eat: EatTask::new(), job }
    }

    #[inline]
    pub fn id(&self) -> CitizenId {
        self.data.id()
    }

    pub fn data(&self) -> &CitizenData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut CitizenData {
        &mut self.data
    }

    pub fn position(&self) -> Vec3 {
        self.body.position()
    }

    /// Teleport, dropping any path.
    pub fn set_position(&mut self, pos: Vec3) {
        self.navigator.clear_path();
        self.body.stop();
        self.body.set_position(pos);
        self.data.set_position(pos);
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn navigator(&self) -> &PathNavigator {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut PathNavigator {
        &mut self.navigator
    }

    pub fn eat_task(&self) -> &EatTask {
        &self.eat
    }

    pub fn job_ai(&self) -> Option<&JobAi> {
        self.job.as_ref()
    }

    /// Swap the job behaviour, e.g. after the citizen changed jobs.
    pub fn set_job_ai(&mut self, job: Option<JobAi>) {
        self.navigator.clear_path();
        self.job = job;
    }

    pub fn snapshot(&self) -> PeerSnapshot {
        PeerSnapshot { id: self.data.id(), pos: self.body.position(), alive: true }
    }

    /// Advance this citizen by one tick.
    pub fn tick(
        &mut self,
        now:     Tick,
        colony:  &mut Colony,
        world:   &dyn World,
        effects: &dyn EffectSink,
        peers:   &[PeerSnapshot],
        config:  &ColonyConfig,
    ) {
        for key in self.data.tick_interactions() {
            tracing::debug!(citizen = %self.data.id(), %key, "interaction no longer applies");
        }

        self.navigator.on_update_navigation(&mut self.body, now, &mut self.rng);
        self.body.step(world);
        self.data.set_position(self.body.position());

        if self.data.is_paused() {
            return;
        }

        self.eat.set_job_idle(self.job.as_ref().is_none_or(JobAi::is_idle));
        let mut mover = Mover { data: &mut self.data, body: &mut self.body, nav: &mut self.navigator };
        let mut ctx = TaskContext::new(now, &mut mover, colony, world, effects, &mut self.rng, peers, config);

        if self.eat.should_execute(&mut ctx) {
            self.eat.tick(&mut ctx);
            if self.eat.take_job_reset() {
                if let Some(job) = &mut self.job {
                    job.reset();
                }
            }
            return;
        }
        if ctx.citizen().is_asleep() {
            return;
        }
        if let Some(job) = &mut self.job {
            job.tick(&mut ctx);
        }
    }

    /// Stop moving and release everything the colony holds for this citizen.
    pub fn on_death(&mut self, colony: &mut Colony) {
        self.navigator.clear_path();
        self.body.stop();
        colony.forget_citizen(self.data.id());
        self.data.set_entity(None);
        tracing::info!(citizen = %self.data.id(), name = self.data.name(), "citizen died");
    }

    pub fn into_data(self) -> CitizenData {
        self.data
    }
}
