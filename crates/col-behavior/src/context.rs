//! Everything a handler can touch during one invocation.

use col_agent::CitizenData;
use col_core::{AgentRng, CitizenId, ColonyConfig, Tick, Vec3};
use col_world::{EffectSink, World};

use crate::Worker;

/// Read-only view of another citizen, taken at the start of the tick.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct PeerSnapshot {
    pub id:    CitizenId,
    pub pos:   Vec3,
    pub alive: bool,
}

/// Borrowed for the duration of one behaviour tick.
///
/// Handlers may mutate the worker and the colony; the world is shared and
/// only mutated through its own interior locking (block breaks, item drops).
pub struct TaskContext<'a, X: ?Sized> {
    pub tick:    Tick,
    pub worker:  &'a mut dyn Worker,
    pub colony:  &'a mut X,
    pub world:   &'a dyn World,
    pub effects: &'a dyn EffectSink,
    pub rng:     &'a mut AgentRng,
    pub peers:   &'a [PeerSnapshot],
    pub config:  &'a ColonyConfig,
    delay:       u32,
}

impl<'a, X: ?Sized> TaskContext<'a, X> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tick:    Tick,
        worker:  &'a mut dyn Worker,
        colony:  &'a mut X,
        world:   &'a dyn World,
        effects: &'a dyn EffectSink,
        rng:     &'a mut AgentRng,
        peers:   &'a [PeerSnapshot],
        config:  &'a ColonyConfig,
    ) -> Self {
        Self { tick, worker, colony, world, effects, rng, peers, config, delay: 0 }
    }

    /// Skip the next `ticks` engine ticks after this handler returns.
    #[inline]
    pub fn set_delay(&mut self, ticks: u32) {
        self.delay = ticks;
    }

    /// Read and clear the requested delay.
    pub fn take_delay(&mut self) -> u32 {
        std::mem::take(&mut self.delay)
    }

    #[inline]
    pub fn citizen(&self) -> &CitizenData {
        self.worker.citizen()
    }

    #[inline]
    pub fn citizen_mut(&mut self) -> &mut CitizenData {
        self.worker.citizen_mut()
    }

    /// A live peer by id.
    pub fn peer(&self, id: CitizenId) -> Option<&PeerSnapshot> {
        self.peers.iter().find(|p| p.id == id && p.alive)
    }
}
