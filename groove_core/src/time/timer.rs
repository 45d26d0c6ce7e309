//! Cooperative timer queue.
//!
//! Timers fire in (due time, insertion order). Each timer carries the run
//! generation it was scheduled under; the consumer drops timers whose
//! generation is no longer current, so cancellation is a data check.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use level_schema::Millis;

#[derive(Debug, Clone, PartialEq)]
pub struct Timer<K> {
    pub due_ms: Millis,
    pub generation: u64,
    pub seq: u64,
    pub kind: K,
}

struct Entry<K>(Timer<K>);

impl<K> PartialEq for Entry<K> {
    fn eq(&self, other: &Self) -> bool {
        self.0.due_ms.to_bits() == other.0.due_ms.to_bits() && self.0.seq == other.0.seq
    }
}

impl<K> Eq for Entry<K> {}

impl<K> PartialOrd for Entry<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// BinaryHeap is a max-heap; reversed for earliest-first.
impl<K> Ord for Entry<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.0.due_ms.total_cmp(&other.0.due_ms) {
            Ordering::Equal => self.0.seq.cmp(&other.0.seq),
            o => o,
        }
        .reverse()
    }
}

pub struct TimerQueue<K> {
    heap: BinaryHeap<Entry<K>>,
    seq: u64,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> TimerQueue<K> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            seq: 0,
        }
    }

    /// Schedules `kind` to fire once the clock reaches `due_ms`.
    pub fn schedule(&mut self, due_ms: Millis, generation: u64, kind: K) -> u64 {
        let seq = self.seq;
        self.seq += 1;
        self.heap.push(Entry(Timer {
            due_ms,
            generation,
            seq,
            kind,
        }));
        seq
    }

    pub fn peek_due(&self) -> Option<Millis> {
        self.heap.peek().map(|e| e.0.due_ms)
    }

    /// Pops the earliest timer if it is due at `now_ms`.
    pub fn pop_due(&mut self, now_ms: Millis) -> Option<Timer<K>> {
        if self.peek_due()? > now_ms {
            return None;
        }
        self.heap.pop().map(|e| e.0)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
