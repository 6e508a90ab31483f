//! Fire-and-forget notification and effect sink.
//!
//! Chat messages, particles and sounds are cosmetic: nothing in the AI waits
//! for them or retries them.

use std::sync::{Mutex, PoisonError};

use col_core::{CitizenId, Vec3};

use crate::item::ItemKind;

#[derive(Clone, Debug, PartialEq)]
pub enum Recipients {
    /// The citizen's own chat bubble / interaction list.
    Citizen(CitizenId),
    /// Everyone with management rights in the colony.
    ColonyManagers,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Sound {
    Sift,
    SwordSwing,
    ShieldBlock,
    Eat,
    BlockBreak,
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Effect {
    Sound(Sound),
    ItemParticles(ItemKind),
    SwingArm(CitizenId),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub recipients: Recipients,
    pub key:        String,
    pub args:       Vec<String>,
}

pub trait EffectSink: Send + Sync {
    fn notify(&self, recipients: Recipients, key: &str, args: &[String]);

    fn broadcast_effect(&self, effect: Effect, pos: Vec3);
}

// ── NullSink ──────────────────────────────────────────────────────────────────

pub struct NullSink;

impl EffectSink for NullSink {
    fn notify(&self, _recipients: Recipients, _key: &str, _args: &[String]) {}
    fn broadcast_effect(&self, _effect: Effect, _pos: Vec3) {}
}

// ── TracingSink ───────────────────────────────────────────────────────────────

/// Writes notifications to the log; effects at trace level.
pub struct TracingSink;

impl EffectSink for TracingSink {
    fn notify(&self, recipients: Recipients, key: &str, args: &[String]) {
        tracing::info!(?recipients, key, ?args, "notification");
    }

    fn broadcast_effect(&self, effect: Effect, pos: Vec3) {
        tracing::trace!(?effect, %pos, "effect");
    }
}

// ── RecordingSink ─────────────────────────────────────────────────────────────

/// Keeps everything it receives.
#[derive(Default)]
pub struct RecordingSink {
    notifications: Mutex<Vec<Notification>>,
    effects:       Mutex<Vec<(Effect, Vec3)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn count_key(&self, key: &str) -> usize {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|n| n.key == key)
            .count()
    }

    pub fn effects(&self) -> Vec<(Effect, Vec3)> {
        self.effects.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl EffectSink for RecordingSink {
    fn notify(&self, recipients: Recipients, key: &str, args: &[String]) {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Notification { recipients, key: key.to_owned(), args: args.to_vec() });
    }

    fn broadcast_effect(&self, effect: Effect, pos: Vec3) {
        self.effects.lock().unwrap_or_else(PoisonError::into_inner).push((effect, pos));
    }
}
