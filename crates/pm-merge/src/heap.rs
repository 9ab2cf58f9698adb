//! `MergeHeap` — min-heap of producer heads.
//!
//! Each entry pairs a producer's next unemitted event (the *head*) with the
//! producer's stream (the *tail*), which is where the following event will
//! come from once the head is emitted.  The coordinator keeps at most one
//! entry per live producer, so the heap's minimum is always the earliest
//! event not yet emitted by anyone.
//!
//! # Ordering
//!
//! Entries order by `(head.time, seq)`, where `seq` is a counter stamped at
//! push time.  Equal timestamps therefore pop in the order their heads
//! entered the heap, which keeps runs reproducible.
//!
//! `std::collections::BinaryHeap` is a max-heap; `Ord` for `HeadWithTail`
//! is reversed to make it pop the minimum.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use pm_core::{Event, ProducerId, SimTime};

use crate::channel::EventReceiver;

// ── Tail ──────────────────────────────────────────────────────────────────────

/// A registered producer stream, as tracked by the coordinator.
#[derive(Debug)]
pub struct Tail {
    pub producer: ProducerId,
    pub stream:   EventReceiver,
    /// Timestamp of the last event accepted from this producer.
    pub last:     Option<SimTime>,
    /// Events accepted from this producer so far.
    pub accepted: u64,
}

impl Tail {
    pub fn new(producer: ProducerId, stream: EventReceiver) -> Self {
        Self { producer, stream, last: None, accepted: 0 }
    }
}

// ── HeadWithTail ──────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct HeadWithTail {
    pub head: Event,
    pub tail: Tail,
    seq:      u64,
}

impl PartialEq for HeadWithTail {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeadWithTail {}

impl PartialOrd for HeadWithTail {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeadWithTail {
    /// Reversed: the earliest `(time, seq)` is the greatest.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .head
            .time
            .cmp(&self.head.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

// ── MergeHeap ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MergeHeap {
    inner:    BinaryHeap<HeadWithTail>,
    next_seq: u64,
    /// Largest number of entries held at once.
    peak:     usize,
}

impl MergeHeap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, head: Event, tail: Tail) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.inner.push(HeadWithTail { head, tail, seq });
        self.peak = self.peak.max(self.inner.len());
    }

    /// Remove and return the entry with the earliest head.
    pub fn pop(&mut self) -> Option<HeadWithTail> {
        self.inner.pop()
    }

    /// Timestamp of the earliest head, without removing it.
    pub fn peek_time(&self) -> Option<SimTime> {
        self.inner.peek().map(|e| e.head.time)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn peak(&self) -> usize {
        self.peak
    }
}
