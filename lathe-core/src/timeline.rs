//! Virtual clock with cancellable delayed continuations.
//!
//! The host drives time forward with [`Timeline::pop_due`] calls from its own
//! frame loop. Continuations are plain values; `revoke` invalidates every one
//! scheduled so far by bumping the generation, and stale entries are dropped
//! when they surface.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

struct Scheduled<T> {
    due_ms: f64,
    seq: u64,
    generation: u64,
    task: T,
}

impl<T> PartialEq for Scheduled<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Scheduled<T> {}

impl<T> PartialOrd for Scheduled<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reversed so the max-heap yields the earliest entry, FIFO on ties.
impl<T> Ord for Scheduled<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_ms
            .total_cmp(&self.due_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

pub struct Timeline<T> {
    now_ms: f64,
    seq: u64,
    generation: u64,
    queue: BinaryHeap<Scheduled<T>>,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Timeline<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0.0,
            seq: 0,
            generation: 0,
            queue: BinaryHeap::new(),
        }
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn schedule(&mut self, delay_ms: f64, task: T) {
        let delay = if delay_ms.is_finite() { delay_ms.max(0.0) } else { 0.0 };
        self.seq += 1;
        self.queue.push(Scheduled {
            due_ms: self.now_ms + delay,
            seq: self.seq,
            generation: self.generation,
            task,
        });
    }

    /// Invalidates everything scheduled so far.
    pub fn revoke(&mut self) {
        self.generation += 1;
    }

    fn drop_stale(&mut self) {
        while self
            .queue
            .peek()
            .is_some_and(|s| s.generation != self.generation)
        {
            self.queue.pop();
        }
    }

    /// Pops the earliest live task due at or before `until_ms`, moving the
    /// clock to its due time. Returns `None` once nothing more is due.
    pub fn pop_due(&mut self, until_ms: f64) -> Option<T> {
        self.drop_stale();
        if self.queue.peek()?.due_ms > until_ms {
            return None;
        }
        let entry = self.queue.pop()?;
        self.now_ms = self.now_ms.max(entry.due_ms);
        Some(entry.task)
    }

    /// Moves the clock forward once everything due has been popped.
    pub fn settle_at(&mut self, until_ms: f64) {
        if until_ms > self.now_ms {
            self.now_ms = until_ms;
        }
    }

    pub fn is_idle(&self) -> bool {
        !self.queue.iter().any(|s| s.generation == self.generation)
    }
}
