//! Slot-indexed item containers and the transfer helpers behaviours use.
//!
//! Citizen inventories, building racks and restaurant counters all implement
//! [`ItemContainer`].  The free functions below work on any implementation,
//! so a behaviour can move food from a hut into a citizen without knowing
//! either side's concrete type.

use serde::{Deserialize, Serialize};

use crate::error::{WorldError, WorldResult};
use crate::item::ItemStack;

// ── ItemContainer ─────────────────────────────────────────────────────────────

pub trait ItemContainer {
    fn slot_count(&self) -> usize;

    /// Copy of the stack in `slot`; `None` for empty or out-of-range slots.
    fn get(&self, slot: usize) -> Option<ItemStack>;

    fn set(&mut self, slot: usize, stack: Option<ItemStack>) -> WorldResult<()>;

    /// Insert into one slot.  Returns whatever did not fit.  With `simulate`
    /// the container is left untouched.
    fn insert(&mut self, slot: usize, stack: ItemStack, simulate: bool) -> Option<ItemStack>;

    /// Remove up to `amount` from one slot.  Returns what was (or would be)
    /// removed.
    fn extract(&mut self, slot: usize, amount: u32, simulate: bool) -> Option<ItemStack>;
}

// ── SlotInventory ─────────────────────────────────────────────────────────────

/// Fixed-capacity `Vec` of optional stacks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotInventory {
    slots: Vec<Option<ItemStack>>,
}

impl SlotInventory {
    pub fn new(capacity: usize) -> Self {
        Self { slots: vec![None; capacity] }
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &ItemStack)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|s| (i, s)))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }

    /// Mutable access for in-place wear.  Empties the slot if `f` leaves the
    /// stack with a zero count.
    pub fn modify<R>(&mut self, slot: usize, f: impl FnOnce(&mut ItemStack) -> R) -> Option<R> {
        let entry = self.slots.get_mut(slot)?;
        let stack = entry.as_mut()?;
        let r = f(stack);
        if stack.count == 0 {
            *entry = None;
        }
        Some(r)
    }
}

impl ItemContainer for SlotInventory {
    fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn get(&self, slot: usize) -> Option<ItemStack> {
        self.slots.get(slot).copied().flatten()
    }

    fn set(&mut self, slot: usize, stack: Option<ItemStack>) -> WorldResult<()> {
        let count = self.slots.len();
        let entry = self.slots.get_mut(slot).ok_or(WorldError::SlotOutOfRange { slot, count })?;
        *entry = stack.filter(|s| s.count > 0);
        Ok(())
    }

    fn insert(&mut self, slot: usize, stack: ItemStack, simulate: bool) -> Option<ItemStack> {
        if stack.count == 0 {
            return None;
        }
        let Some(entry) = self.slots.get_mut(slot) else {
            return Some(stack);
        };
        let max = stack.kind.max_stack();
        match entry {
            None => {
                let placed = stack.count.min(max);
                if !simulate {
                    *entry = Some(stack.with_count(placed));
                }
                remainder(stack, placed)
            }
            Some(existing) if existing.stacks_with(&stack) => {
                let placed = stack.count.min(max.saturating_sub(existing.count));
                if !simulate {
                    existing.count += placed;
                }
                remainder(stack, placed)
            }
            Some(_) => Some(stack),
        }
    }

    fn extract(&mut self, slot: usize, amount: u32, simulate: bool) -> Option<ItemStack> {
        let entry = self.slots.get_mut(slot)?;
        let existing = entry.as_mut()?;
        let taken = amount.min(existing.count);
        if taken == 0 {
            return None;
        }
        let out = existing.with_count(taken);
        if !simulate {
            existing.count -= taken;
            if existing.count == 0 {
                *entry = None;
            }
        }
        Some(out)
    }
}

fn remainder(stack: ItemStack, placed: u32) -> Option<ItemStack> {
    (placed < stack.count).then(|| stack.with_count(stack.count - placed))
}

// ── Transfer helpers ──────────────────────────────────────────────────────────

pub fn find_first_slot<C, P>(c: &C, pred: P) -> Option<usize>
where
    C: ItemContainer + ?Sized,
    P: Fn(&ItemStack) -> bool,
{
    (0..c.slot_count()).find(|&i| c.get(i).is_some_and(|s| pred(&s)))
}

pub fn has_matching<C, P>(c: &C, pred: P) -> bool
where
    C: ItemContainer + ?Sized,
    P: Fn(&ItemStack) -> bool,
{
    find_first_slot(c, pred).is_some()
}

pub fn count_matching<C, P>(c: &C, pred: P) -> u32
where
    C: ItemContainer + ?Sized,
    P: Fn(&ItemStack) -> bool,
{
    (0..c.slot_count())
        .filter_map(|i| c.get(i))
        .filter(|s| pred(s))
        .map(|s| s.count)
        .sum()
}

/// No empty slot left.
pub fn is_full<C: ItemContainer + ?Sized>(c: &C) -> bool {
    (0..c.slot_count()).all(|i| c.get(i).is_some())
}

/// How many of `stack` the container could absorb across all slots.
pub fn room_for<C: ItemContainer + ?Sized>(c: &mut C, stack: ItemStack) -> u32 {
    let mut room = 0u32;
    for slot in 0..c.slot_count() {
        let rest = c.insert(slot, stack, true);
        room += stack.count - rest.map_or(0, |r| r.count);
        if room >= stack.count {
            return stack.count;
        }
    }
    room
}

/// Insert anywhere: top up matching stacks first, then fill empty slots.
/// Returns what did not fit.
pub fn insert_anywhere<C: ItemContainer + ?Sized>(c: &mut C, stack: ItemStack) -> Option<ItemStack> {
    let mut rest = Some(stack);
    for pass_matching in [true, false] {
        for slot in 0..c.slot_count() {
            let Some(s) = rest else { return None };
            let occupied = c.get(slot).is_some();
            if occupied == pass_matching {
                rest = c.insert(slot, s, false);
            }
        }
    }
    rest
}

/// Move up to `max` items matching `pred` from `from` into `to`.  Only what
/// fits is taken.  Returns the number moved.
pub fn transfer_matching<F, T, P>(from: &mut F, to: &mut T, pred: P, max: u32) -> u32
where
    F: ItemContainer + ?Sized,
    T: ItemContainer + ?Sized,
    P: Fn(&ItemStack) -> bool,
{
    let mut moved = 0u32;
    for slot in 0..from.slot_count() {
        if moved >= max {
            break;
        }
        let Some(stack) = from.get(slot).filter(|s| pred(s)) else { continue };
        let want = stack.count.min(max - moved);
        let fit = room_for(to, stack.with_count(want));
        if fit == 0 {
            continue;
        }
        let Some(taken) = from.extract(slot, fit, false) else { continue };
        if let Some(back) = insert_anywhere(to, taken) {
            // room_for said it fits; put anything unexpected back where it came from
            let _ = from.insert(slot, back, false);
            moved += taken.count - back.count;
        } else {
            moved += taken.count;
        }
    }
    moved
}

/// Remove up to `n` matching items.  Returns the number removed.
pub fn reduce_matching<C, P>(c: &mut C, pred: P, n: u32) -> u32
where
    C: ItemContainer + ?Sized,
    P: Fn(&ItemStack) -> bool,
{
    let mut removed = 0u32;
    for slot in 0..c.slot_count() {
        if removed >= n {
            break;
        }
        if c.get(slot).is_some_and(|s| pred(&s)) {
            removed += c.extract(slot, n - removed, false).map_or(0, |s| s.count);
        }
    }
    removed
}
