//! Virtual-clock task scheduler.
//!
//! Time only moves when the host calls `advance`; nothing here touches wall
//! clocks, so runs are deterministic and tests can jump hours in one call.
//! Wakeups due at the same instant fire in scheduling order (FIFO via a
//! monotonically increasing sequence number). Cancellation bumps a
//! generation counter; stale wakeups are discarded lazily on pop.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

struct Wakeup<T> {
    at_s: f64,
    seq: u64,
    generation: u64,
    task: T,
}

impl<T> PartialEq for Wakeup<T> {
    fn eq(&self, other: &Self) -> bool {
        self.at_s == other.at_s && self.seq == other.seq
    }
}

impl<T> Eq for Wakeup<T> {}

impl<T> PartialOrd for Wakeup<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Wakeup<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.at_s
            .total_cmp(&other.at_s)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Min-heap of pending wakeups over a virtual clock.
pub struct Scheduler<T> {
    now_s: f64,
    seq: u64,
    generation: u64,
    heap: BinaryHeap<Reverse<Wakeup<T>>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now_s: 0.0,
            seq: 0,
            generation: 0,
            heap: BinaryHeap::new(),
        }
    }

    /// Current virtual time in seconds.
    pub fn now(&self) -> f64 {
        self.now_s
    }

    pub fn is_idle(&self) -> bool {
        self.heap
            .iter()
            .all(|Reverse(w)| w.generation != self.generation)
    }

    /// Schedule `task` to fire `delay_s` from now. Negative delays clamp
    /// to "immediately".
    pub fn schedule(&mut self, delay_s: f64, task: T) {
        self.schedule_at(self.now_s + delay_s.max(0.0), task);
    }

    /// Schedule `task` at an absolute virtual time.
    pub fn schedule_at(&mut self, at_s: f64, task: T) {
        let seq = self.seq;
        self.seq += 1;
        self.heap.push(Reverse(Wakeup {
            at_s: at_s.max(self.now_s),
            seq,
            generation: self.generation,
            task,
        }));
    }

    /// Invalidate every pending wakeup. The clock keeps its position.
    pub fn cancel_all(&mut self) {
        self.generation += 1;
        self.heap.clear();
    }

    /// Pop the earliest wakeup due at or before `until_s`, advancing the
    /// clock to its stamp. Returns `None` when nothing is due; the caller
    /// finishes the advance with [`Scheduler::settle_to`].
    pub fn pop_due(&mut self, until_s: f64) -> Option<(f64, T)> {
        while let Some(Reverse(head)) = self.heap.peek() {
            if head.at_s > until_s {
                return None;
            }
            let Reverse(wakeup) = self.heap.pop().expect("peeked wakeup");
            if wakeup.generation != self.generation {
                continue;
            }
            self.now_s = self.now_s.max(wakeup.at_s);
            return Some((wakeup.at_s, wakeup.task));
        }
        None
    }

    /// Move the clock forward to `until_s` after all due wakeups have been
    /// drained. Never moves backwards.
    pub fn settle_to(&mut self, until_s: f64) {
        self.now_s = self.now_s.max(until_s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// it should fire same-instant wakeups in scheduling order
    #[test]
    fn fifo_at_equal_times() {
        let mut s: Scheduler<u32> = Scheduler::new();
        s.schedule(1.0, 1);
        s.schedule(1.0, 2);
        s.schedule(0.5, 0);
        let mut fired = Vec::new();
        while let Some((_, t)) = s.pop_due(2.0) {
            fired.push(t);
        }
        s.settle_to(2.0);
        assert_eq!(fired, vec![0, 1, 2]);
        assert_eq!(s.now(), 2.0);
    }

    #[test]
    fn wakeups_beyond_horizon_stay_pending() {
        let mut s: Scheduler<&str> = Scheduler::new();
        s.schedule(5.0, "late");
        assert!(s.pop_due(1.0).is_none());
        s.settle_to(1.0);
        assert_eq!(s.now(), 1.0);
        let (at, task) = s.pop_due(10.0).unwrap();
        assert_eq!(at, 5.0);
        assert_eq!(task, "late");
    }

    /// it should drop wakeups scheduled before a cancel
    #[test]
    fn cancel_invalidates_pending() {
        let mut s: Scheduler<&str> = Scheduler::new();
        s.schedule(1.0, "stale");
        s.cancel_all();
        s.schedule(1.0, "fresh");
        assert_eq!(s.pop_due(2.0), Some((1.0, "fresh")));
        assert!(s.pop_due(2.0).is_none());
    }

    #[test]
    fn negative_delay_fires_immediately() {
        let mut s: Scheduler<&str> = Scheduler::new();
        s.settle_to(3.0);
        s.schedule(-1.0, "now");
        assert_eq!(s.pop_due(3.0), Some((3.0, "now")));
    }
}
