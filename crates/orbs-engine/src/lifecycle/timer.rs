//! Cancellable timer queue
//!
//! Timers are plain entries ordered by `(deadline, sequence)`. Nothing fires
//! on its own: the owner pops due entries with [`TimerQueue::pop_due`] and
//! dispatches them. Entries with equal deadlines fire in scheduling order.

use std::collections::{BTreeMap, HashMap};

/// Handle to a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Deadline-ordered queue of pending timer events
#[derive(Debug)]
pub struct TimerQueue<E> {
    next_id: u64,
    pending: BTreeMap<(i64, u64), E>,
    deadlines: HashMap<u64, i64>,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            pending: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }

    /// Schedule `event` to fire `delay_ms` after `now_ms`
    pub fn schedule(&mut self, now_ms: i64, delay_ms: i64, event: E) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;

        let deadline = now_ms.saturating_add(delay_ms.max(0));
        self.pending.insert((deadline, id), event);
        self.deadlines.insert(id, deadline);
        TimerHandle(id)
    }

    /// Cancel a pending timer; returns false if it already fired or was cancelled
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.deadlines.remove(&handle.0) {
            Some(deadline) => self.pending.remove(&(deadline, handle.0)).is_some(),
            None => false,
        }
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.deadlines.contains_key(&handle.0)
    }

    /// Deadline of a pending timer
    pub fn deadline_of(&self, handle: TimerHandle) -> Option<i64> {
        self.deadlines.get(&handle.0).copied()
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<i64> {
        self.pending.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Remove and return the earliest timer whose deadline is `<= now_ms`
    pub fn pop_due(&mut self, now_ms: i64) -> Option<(TimerHandle, i64, E)> {
        let (&(deadline, id), _) = self.pending.first_key_value()?;
        if deadline > now_ms {
            return None;
        }
        let event = self.pending.remove(&(deadline, id))?;
        self.deadlines.remove(&id);
        Some((TimerHandle(id), deadline, event))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.deadlines.clear();
    }
}
