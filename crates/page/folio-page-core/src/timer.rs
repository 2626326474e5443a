//! One-shot timer queue on a virtual clock.
//!
//! Timers fire in (due, insertion) order. The queue never reads a wall clock;
//! callers pass `now` explicitly, which keeps every delay testable without
//! real time passing.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::Millis;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TimerId(pub u64);

#[derive(Debug)]
pub struct TimerQueue<T> {
    entries: BTreeMap<(Millis, TimerId), T>,
    due_of: HashMap<TimerId, Millis>,
    next_id: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            due_of: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to fire `delay` ms after `now`.
    pub fn schedule(&mut self, now: Millis, delay: Millis, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let due = now.saturating_add(delay);
        self.entries.insert((due, id), task);
        self.due_of.insert(id, due);
        id
    }

    /// Remove a pending timer. Returns its task if it had not fired yet.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let due = self.due_of.remove(&id)?;
        self.entries.remove(&(due, id))
    }

    /// Pop the earliest timer whose due time is `<= now`.
    pub fn pop_due(&mut self, now: Millis) -> Option<(Millis, TimerId, T)> {
        let (&(due, id), _) = self.entries.iter().next()?;
        if due > now {
            return None;
        }
        let task = self.entries.remove(&(due, id))?;
        self.due_of.remove(&id);
        Some((due, id, task))
    }

    pub fn next_due(&self) -> Option<Millis> {
        self.entries.keys().next().map(|(due, _)| *due)
    }

    /// Due time of a pending timer.
    pub fn due(&self, id: TimerId) -> Option<Millis> {
        self.due_of.get(&id).copied()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.due_of.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every pending timer.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.due_of.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (Millis, &T)> {
        self.entries.iter().map(|((due, _), task)| (*due, task))
    }
}
