//! Pending player-facing interactions ("I need a restaurant", "my mesh
//! broke").
//!
//! Interactions are keyed by their message key: triggering one that is
//! already pending is a no-op, so a behaviour can re-trigger every tick
//! without flooding the player.  Each carries an optional validity check
//! that [`Interactions::retain_valid`] evaluates; a check that fails or
//! returns `Err` removes the interaction.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{AgentResult, CitizenData};

/// Validity check run against the owning citizen's data.
pub type Validator = Arc<dyn Fn(&CitizenData) -> AgentResult<bool> + Send + Sync>;

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionPriority {
    Chitchat,
    Important,
    /// Blocks the citizen's work until resolved.
    Blocking,
}

#[derive(Clone)]
pub struct Interaction {
    pub key:       String,
    pub args:      Vec<String>,
    pub priority:  InteractionPriority,
    validator: Option<Validator>,
}

impl Interaction {
    pub fn new(key: impl Into<String>, priority: InteractionPriority) -> Self {
        Self { key: key.into(), args: Vec::new(), priority, validator: None }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn valid_while(
        mut self,
        check: impl Fn(&CitizenData) -> AgentResult<bool> + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Arc::new(check));
        self
    }

    /// Interactions without a check stay until dismissed.
    pub fn is_valid(&self, data: &CitizenData) -> AgentResult<bool> {
        match &self.validator {
            Some(check) => check(data),
            None => Ok(true),
        }
    }
}

impl fmt::Debug for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interaction")
            .field("key", &self.key)
            .field("args", &self.args)
            .field("priority", &self.priority)
            .field("checked", &self.validator.is_some())
            .finish()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Interactions {
    pending: BTreeMap<String, Interaction>,
}

impl Interactions {
    /// Add unless the key is already pending.  Returns `true` when added.
    pub fn trigger(&mut self, interaction: Interaction) -> bool {
        if self.pending.contains_key(&interaction.key) {
            return false;
        }
        self.pending.insert(interaction.key.clone(), interaction);
        true
    }

    pub fn dismiss(&mut self, key: &str) -> Option<Interaction> {
        self.pending.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pending.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interaction> + '_ {
        self.pending.values()
    }

    pub fn has_blocking(&self) -> bool {
        self.pending.values().any(|i| i.priority == InteractionPriority::Blocking)
    }

    /// Drop interactions whose check returns `false` or fails.  Returns the
    /// removed keys.
    pub fn retain_valid(&mut self, data: &CitizenData) -> Vec<String> {
        let mut removed = Vec::new();
        self.pending.retain(|key, interaction| match interaction.is_valid(data) {
            Ok(true) => true,
            Ok(false) => {
                removed.push(key.clone());
                false
            }
            Err(e) => {
                tracing::warn!(citizen = %data.id(), key = %key, error = %e, "interaction check failed; removing");
                removed.push(key.clone());
                false
            }
        });
        removed
    }
}
