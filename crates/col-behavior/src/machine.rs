//! The generic state machine engine.
//!
//! # Tick contract
//!
//! Every call to [`StateMachine::tick`] advances an internal counter.  Then:
//!
//! 1. If a handler requested a delay, the tick is consumed by the delay.
//! 2. Otherwise the first target registered for the current state runs,
//!    but only when the counter is a multiple of that target's interval.
//! 3. The returned state becomes current.  Staying put is an explicit
//!    return of the same state.
//!
//! At most one handler runs per tick.  A handler returning `Err` is logged,
//! counted, and the machine falls back to its initial state; the error never
//! leaves `tick`.

use std::fmt::Debug;

use crate::{BehaviorResult, TaskContext};

/// Handler signature: behaviour data, context, next state.
pub type Handler<S, B, X> = fn(&mut B, &mut TaskContext<'_, X>) -> BehaviorResult<S>;

pub enum Action<S, B, X: ?Sized> {
    Handler(Handler<S, B, X>),
    /// Unconditional transition.
    Goto(S),
}

impl<S: Copy, B, X: ?Sized> Clone for Action<S, B, X> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: Copy, B, X: ?Sized> Copy for Action<S, B, X> {}

/// One row of the registration table.
pub struct AiTarget<S, B, X: ?Sized> {
    pub state:    S,
    pub action:   Action<S, B, X>,
    /// Run every `interval` ticks; 0 is treated as 1.
    pub interval: u32,
}

impl<S, B, X: ?Sized> AiTarget<S, B, X> {
    pub fn new(state: S, interval: u32, handler: Handler<S, B, X>) -> Self {
        Self { state, action: Action::Handler(handler), interval }
    }

    pub fn goto(state: S, interval: u32, next: S) -> Self {
        Self { state, action: Action::Goto(next), interval }
    }
}

pub struct StateMachine<S, B, X: ?Sized> {
    name:    &'static str,
    initial: S,
    state:   S,
    targets: Vec<AiTarget<S, B, X>>,
    counter: u64,
    delay:   u32,
    errors:  u32,
}

impl<S, B, X> StateMachine<S, B, X>
where
    S: Copy + Eq + Debug,
    X: ?Sized,
{
    pub fn new(name: &'static str, initial: S) -> Self {
        Self { name, initial, state: initial, targets: Vec::new(), counter: 0, delay: 0, errors: 0 }
    }

    pub fn with_targets(mut self, targets: impl IntoIterator<Item = AiTarget<S, B, X>>) -> Self {
        for target in targets {
            self.register(target);
        }
        self
    }

    /// Add a row.  The first row for a state wins; a later one is dropped
    /// and `false` returned.
    pub fn register(&mut self, target: AiTarget<S, B, X>) -> bool {
        if self.is_registered(target.state) {
            tracing::warn!(machine = self.name, state = ?target.state, "duplicate target ignored");
            return false;
        }
        self.targets.push(target);
        true
    }

    #[inline]
    pub fn state(&self) -> S {
        self.state
    }

    #[inline]
    pub fn initial(&self) -> S {
        self.initial
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Ticks still to be skipped.
    pub fn delay(&self) -> u32 {
        self.delay
    }

    /// Handler failures contained so far.
    pub fn error_count(&self) -> u32 {
        self.errors
    }

    pub fn is_registered(&self, state: S) -> bool {
        self.targets.iter().any(|t| t.state == state)
    }

    /// Back to the initial state with no pending delay.
    pub fn reset(&mut self) {
        self.state = self.initial;
        self.delay = 0;
    }

    /// Jump to `state` from outside the table (e.g. a job reset after eating).
    pub fn force(&mut self, state: S) {
        self.state = state;
        self.delay = 0;
    }

    /// Advance one tick.  Returns the new state when a transition happened.
    pub fn tick(&mut self, data: &mut B, ctx: &mut TaskContext<'_, X>) -> Option<S> {
        self.counter = self.counter.wrapping_add(1);
        if self.delay > 0 {
            self.delay -= 1;
            return None;
        }

        let (action, interval) = {
            let target = self.targets.iter().find(|t| t.state == self.state)?;
            (target.action, target.interval.max(1))
        };
        if self.counter % interval as u64 != 0 {
            return None;
        }

        let outcome = match action {
            Action::Goto(next) => Ok(next),
            Action::Handler(handler) => handler(data, ctx),
        };
        self.delay = ctx.take_delay();

        let next = match outcome {
            Ok(next) => next,
            Err(e) => {
                self.errors += 1;
                tracing::warn!(
                    machine = self.name,
                    citizen = %ctx.citizen().id(),
                    state = ?self.state,
                    error = %e,
                    "handler failed; resetting"
                );
                self.delay = 0;
                self.initial
            }
        };
        if next == self.state {
            return None;
        }
        tracing::debug!(machine = self.name, citizen = %ctx.citizen().id(), from = ?self.state, to = ?next, "transition");
        self.state = next;
        Some(next)
    }
}
