//! Producer tasks.
//!
//! A producer is one OS thread that pulls events from an [`EventSource`] and
//! hands them, one rendezvous at a time, to whoever reads its
//! [`EventSender`].  The source is only asked for its next event after the
//! previous one was taken, so the reader's pace drives the computation.
//!
//! When the source is exhausted the thread drops its sender, which is the
//! end-of-stream signal.  A producer never reports errors to the merge:
//! cancellation and a vanished reader both simply end the thread, and the
//! reason is recorded in its [`ProducerReport`].

use std::thread::{self, JoinHandle};

use tracing::trace;

use pm_core::Event;

use crate::cancel::{CancelToken, Interrupt, Waiter};
use crate::channel::EventSender;
use crate::{MergeError, MergeResult};

/// Producer threads do little more than walk a plan, so they get a small
/// stack.  Runs commonly start one thread per plan.
const PRODUCER_STACK_BYTES: usize = 256 * 1024;

// ── EventSource ───────────────────────────────────────────────────────────────

/// Anything that yields a non-decreasing sequence of events.
///
/// Every `Iterator<Item = Event>` that can move to another thread is a
/// source, including `pm_plan::PlanSimulation` and `Vec<Event>::into_iter()`.
pub trait EventSource: Send + 'static {
    fn next_event(&mut self) -> Option<Event>;
}

impl<I> EventSource for I
where
    I: Iterator<Item = Event> + Send + 'static,
{
    #[inline]
    fn next_event(&mut self) -> Option<Event> {
        self.next()
    }
}

// ── ProducerReport ────────────────────────────────────────────────────────────

/// How a producer thread ended.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ProducerOutcome {
    /// The source ran dry and the stream was closed.
    Finished,
    /// The run was cancelled while the producer waited to send.
    Cancelled,
    /// The reader dropped the stream before the source ran dry.
    Detached,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ProducerReport {
    /// Events taken by the reader.
    pub sent:    u64,
    pub outcome: ProducerOutcome,
}

// ── ProducerHandle ────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct ProducerHandle {
    name: String,
    join: JoinHandle<ProducerReport>,
}

impl ProducerHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wait for the producer thread to end.
    pub fn join(self) -> MergeResult<ProducerReport> {
        self.join.join().map_err(|_| MergeError::Panicked("producer"))
    }
}

// ── spawn_producer ────────────────────────────────────────────────────────────

/// Run `source` on a new thread, writing its events to `tx`.
pub fn spawn_producer<S: EventSource>(
    name:       impl Into<String>,
    mut source: S,
    tx:         EventSender,
    cancel:     CancelToken,
) -> MergeResult<ProducerHandle> {
    let name = name.into();
    let thread_name = name.clone();

    let join = thread::Builder::new()
        .name(thread_name)
        .stack_size(PRODUCER_STACK_BYTES)
        .spawn(move || {
            // Producers wait on the coordinator for as long as it takes: in a
            // two-phase run they sit idle until every producer is seeded.
            let waiter = Waiter::new(cancel);
            let mut sent = 0u64;
            let outcome = loop {
                let Some(event) = source.next_event() else {
                    break ProducerOutcome::Finished;
                };
                match tx.send(event, &waiter) {
                    Ok(()) => sent += 1,
                    Err(Interrupt::Disconnected) => break ProducerOutcome::Detached,
                    Err(_) => break ProducerOutcome::Cancelled,
                }
            };
            drop(tx);
            trace!(sent, ?outcome, "producer done");
            ProducerReport { sent, outcome }
        })
        .map_err(|source| MergeError::Spawn { what: "producer", source })?;

    Ok(ProducerHandle { name, join })
}
