//! The merge coordinator.
//!
//! # State machine
//!
//! ```text
//! Seeding ──(registration closed / first safe head in Concurrent mode)──▶ Draining ──(heap empty)──▶ Closed
//! ```
//!
//! **Seeding.**  Take producer streams off the registration channel.  For each
//! one, wait for its first event; a producer that closes without one is
//! retired on the spot, otherwise `(first event, stream)` goes into the heap.
//!
//! **Draining.**  Pop the earliest head, send it to the output, then wait for
//! that same producer's next event and push it back (or retire the producer
//! when its stream closes).  Only the producer whose head was just emitted is
//! ever waited on.
//!
//! **Closed.**  The output sender is dropped, which ends the sink's stream.
//!
//! In [`MergeMode::TwoPhase`] seeding runs until registration closes and
//! nothing is emitted before that.
//!
//! [`MergeMode::Concurrent`] drains while registration is still open, but
//! only heads that are *safe*: at or below the start time promised by the
//! latest registration (see [`Registration::start`]).  No later registrant
//! can produce anything earlier, so emitting such a head never strands a
//! future event behind the watermark.  Ready registrations are picked up
//! between drain steps; when the earliest head is not yet safe the
//! coordinator blocks on registration instead.  A registration without a
//! start time makes nothing safe until the next promise or the close.
//!
//! # Order guard
//!
//! Each accepted event must be at or after a floor: the producer's previous
//! event, and the last timestamp the merge emitted (the watermark).  Events
//! below the floor are dropped or fail the run according to
//! [`OrderPolicy`].  With well-behaved producers, and in concurrent mode
//! with kept start-time promises, the guard never fires.

use std::time::Instant;

use tracing::{debug, info, trace, warn};

use pm_core::{Event, MergeConfig, MergeMode, OrderPolicy, ProducerId, SimTime};

use crate::cancel::{CancelToken, Interrupt, Waiter};
use crate::channel::{EventSender, Poll, Registration, Registrations};
use crate::heap::{MergeHeap, Tail};
use crate::{MergeError, MergeObserver, MergeResult, WaitPoint};

// ── Phase ─────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Phase {
    Seeding,
    Draining,
    Closed,
}

// ── MergeStats ────────────────────────────────────────────────────────────────

/// Counters describing one finished merge.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergeStats {
    /// Producer streams accepted from the registration channel.
    pub producers:      u64,
    /// Producers that closed without a single event.
    pub empty:          u64,
    /// Events handed to the sink.
    pub emitted:        u64,
    /// Events discarded by the order guard.
    pub dropped:        u64,
    /// Largest number of heads held at once.
    pub peak_heap:      usize,
    /// Timestamp of the last emitted event.
    pub last_time:      Option<SimTime>,
}

// ── Coordinator ───────────────────────────────────────────────────────────────

/// Single owner of the merge heap.  Construct, then call [`run`][Self::run]
/// on the thread that should drive the merge.
pub struct Coordinator {
    registrations: Option<Registrations>,
    output:        Option<EventSender>,
    config:        MergeConfig,
    cancel:        CancelToken,
    heap:          MergeHeap,
    phase:         Phase,
    /// Producers not yet retired.
    active:        usize,
    next_id:       u32,
    watermark:     Option<SimTime>,
    /// Start time promised by the latest registration.
    promised:      Option<SimTime>,
    stats:         MergeStats,
}

impl Coordinator {
    pub fn new(registrations: Registrations, output: EventSender, config: MergeConfig) -> Self {
        Self {
            registrations: Some(registrations),
            output:        Some(output),
            config,
            cancel:        CancelToken::never(),
            heap:          MergeHeap::new(),
            phase:         Phase::Seeding,
            active:        0,
            next_id:       0,
            watermark:     None,
            promised:      None,
            stats:         MergeStats::default(),
        }
    }

    /// Abort every blocking wait once `cancel` fires.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run the merge to completion.
    ///
    /// The output is closed exactly once when this returns, whether the
    /// merge finished or failed.  On failure, producers still in the heap
    /// see their streams dropped and stop on their next send.
    pub fn run<O: MergeObserver>(mut self, observer: &mut O) -> MergeResult<MergeStats> {
        self.config.validate()?;

        let waiter = Waiter::new(self.cancel.clone())
            .deadline(self.config.run_timeout().map(|d| Instant::now() + d))
            .stall_timeout(self.config.stall_timeout());

        info!(mode = ?self.config.mode, policy = ?self.config.order_policy, "merge started");

        let result = match self.config.mode {
            MergeMode::TwoPhase => self
                .seed_all(&waiter, observer)
                .and_then(|()| self.drain(&waiter, observer)),
            MergeMode::Concurrent => self.run_concurrent(&waiter, observer),
        };

        self.output = None;
        self.registrations = None;
        self.set_phase(Phase::Closed, observer);
        self.stats.peak_heap = self.heap.peak();

        if self.stats.dropped > 0 {
            warn!(dropped = self.stats.dropped, "events dropped by the order guard");
        }

        match result {
            Ok(()) => {
                info!(
                    producers = self.stats.producers,
                    empty     = self.stats.empty,
                    emitted   = self.stats.emitted,
                    dropped   = self.stats.dropped,
                    peak_heap = self.stats.peak_heap,
                    "merge finished"
                );
                Ok(self.stats)
            }
            Err(e) => {
                warn!(error = %e, emitted = self.stats.emitted, active = self.active, "merge aborted");
                Err(e)
            }
        }
    }

    // ── Phases ────────────────────────────────────────────────────────────

    /// Phase A: admit every producer until registration closes.
    fn seed_all<O: MergeObserver>(&mut self, waiter: &Waiter, observer: &mut O) -> MergeResult<()> {
        while let Some(registration) = self.next_registration(waiter, observer)? {
            self.admit(registration, waiter, observer)?;
        }
        Ok(())
    }

    /// Phase B: emit heads in time order until every producer is retired.
    fn drain<O: MergeObserver>(&mut self, waiter: &Waiter, observer: &mut O) -> MergeResult<()> {
        while self.step(waiter, observer)? {}
        Ok(())
    }

    /// Seeding and draining interleaved.  Only safe heads are emitted
    /// while registration is open.
    fn run_concurrent<O: MergeObserver>(
        &mut self,
        waiter:   &Waiter,
        observer: &mut O,
    ) -> MergeResult<()> {
        loop {
            if self.registrations.is_some() {
                if self.head_is_safe() {
                    self.poll_registrations(waiter, observer)?;
                }
                if self.registrations.is_some() && !self.head_is_safe() {
                    if let Some(registration) = self.next_registration(waiter, observer)? {
                        self.admit(registration, waiter, observer)?;
                    }
                    continue;
                }
                self.set_phase(Phase::Draining, observer);
            }

            if !self.step(waiter, observer)? && self.registrations.is_none() {
                return Ok(());
            }
        }
    }

    /// `true` when the earliest head cannot be undercut by any producer
    /// still to register.
    fn head_is_safe(&self) -> bool {
        match (self.heap.peek_time(), self.promised) {
            (Some(head), Some(promised)) => head <= promised,
            _ => false,
        }
    }

    // ── Steps ─────────────────────────────────────────────────────────────

    /// Emit the earliest head and refill from its producer.  Returns `false`
    /// when the heap was empty.
    fn step<O: MergeObserver>(&mut self, waiter: &Waiter, observer: &mut O) -> MergeResult<bool> {
        let Some(entry) = self.heap.pop() else {
            return Ok(false);
        };
        let producer = entry.tail.producer;
        self.emit(entry.head, producer, waiter, observer)?;

        let mut tail = entry.tail;
        match self.pull(&mut tail, WaitPoint::NextEvent(producer), waiter, observer)? {
            Some(next) => self.heap.push(next, tail),
            None => self.retire(tail, observer),
        }
        Ok(true)
    }

    fn emit<O: MergeObserver>(
        &mut self,
        event:    Event,
        producer: ProducerId,
        waiter:   &Waiter,
        observer: &mut O,
    ) -> MergeResult<()> {
        let Some(output) = self.output.as_ref() else {
            return Err(MergeError::SinkClosed);
        };
        let time = event.time;
        trace!(%producer, %time, "emit");
        output.send(event, waiter).map_err(|i| match i {
            Interrupt::Disconnected => MergeError::SinkClosed,
            other => interrupted(other, WaitPoint::Sink),
        })?;
        self.watermark = Some(time);
        self.stats.emitted += 1;
        self.stats.last_time = Some(time);
        observer.on_emit(producer, time);
        Ok(())
    }

    /// Accept a freshly registered stream and seed it into the heap.
    fn admit<O: MergeObserver>(
        &mut self,
        registration: Registration,
        waiter:       &Waiter,
        observer:     &mut O,
    ) -> MergeResult<()> {
        let producer = ProducerId(self.next_id);
        self.next_id += 1;
        self.stats.producers += 1;
        self.active += 1;
        self.promised = registration.start;
        debug!(%producer, start = ?registration.start.map(SimTime::secs), "producer registered");
        observer.on_register(producer);

        let mut tail = Tail::new(producer, registration.stream);
        match self.pull(&mut tail, WaitPoint::FirstEvent(producer), waiter, observer)? {
            Some(first) => self.heap.push(first, tail),
            None => self.retire(tail, observer),
        }
        Ok(())
    }

    fn retire<O: MergeObserver>(&mut self, tail: Tail, observer: &mut O) {
        self.active -= 1;
        if tail.accepted == 0 {
            self.stats.empty += 1;
        }
        debug!(producer = %tail.producer, accepted = tail.accepted, "producer retired");
        observer.on_retire(tail.producer, tail.accepted);
    }

    /// Receive the next acceptable event from `tail`, applying the order
    /// guard.  `Ok(None)` when the stream has closed.
    fn pull<O: MergeObserver>(
        &mut self,
        tail:     &mut Tail,
        point:    WaitPoint,
        waiter:   &Waiter,
        observer: &mut O,
    ) -> MergeResult<Option<Event>> {
        loop {
            let Some(event) = tail.stream.recv(waiter).map_err(|i| interrupted(i, point))? else {
                return Ok(None);
            };

            let floor = match (tail.last, self.watermark) {
                (Some(a), Some(b)) => Some(a.max(b)),
                (a, b) => a.or(b),
            };
            if let Some(floor) = floor {
                if event.time < floor {
                    observer.on_order_violation(tail.producer, floor, event.time);
                    match self.config.order_policy {
                        OrderPolicy::Fail => {
                            return Err(MergeError::OutOfOrder {
                                producer: tail.producer,
                                previous: floor,
                                got:      event.time,
                            });
                        }
                        OrderPolicy::Drop => {
                            warn!(
                                producer = %tail.producer,
                                floor    = %floor,
                                got      = %event.time,
                                "event out of order; dropped"
                            );
                            self.stats.dropped += 1;
                            continue;
                        }
                    }
                }
            }

            tail.last = Some(event.time);
            tail.accepted += 1;
            return Ok(Some(event));
        }
    }

    // ── Registration ──────────────────────────────────────────────────────

    /// Block for the next registration.  `Ok(None)` once registration closed.
    fn next_registration<O: MergeObserver>(
        &mut self,
        waiter:   &Waiter,
        observer: &mut O,
    ) -> MergeResult<Option<Registration>> {
        let Some(registrations) = self.registrations.as_ref() else {
            return Ok(None);
        };
        match registrations
            .recv(waiter)
            .map_err(|i| interrupted(i, WaitPoint::Registration))?
        {
            Some(registration) => Ok(Some(registration)),
            None => {
                self.close_registration(observer);
                Ok(None)
            }
        }
    }

    /// Admit every registration that is ready without blocking.
    fn poll_registrations<O: MergeObserver>(
        &mut self,
        waiter:   &Waiter,
        observer: &mut O,
    ) -> MergeResult<()> {
        while let Some(registrations) = self.registrations.as_ref() {
            match registrations.poll() {
                Poll::Ready(registration) => self.admit(registration, waiter, observer)?,
                Poll::Empty => break,
                Poll::Closed => self.close_registration(observer),
            }
        }
        Ok(())
    }

    fn close_registration<O: MergeObserver>(&mut self, observer: &mut O) {
        self.registrations = None;
        info!(producers = self.stats.producers, active = self.active, "registration closed");
        if self.phase == Phase::Seeding {
            self.set_phase(Phase::Draining, observer);
        }
    }

    fn set_phase<O: MergeObserver>(&mut self, to: Phase, observer: &mut O) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        debug!(?from, ?to, heap = self.heap.len(), "phase change");
        observer.on_phase_change(from, to);
    }
}

/// Map an interrupted wait to the run error it causes.
fn interrupted(interrupt: Interrupt, point: WaitPoint) -> MergeError {
    match interrupt {
        Interrupt::Cancelled => MergeError::Cancelled(point),
        Interrupt::Deadline => MergeError::DeadlineExceeded(point),
        Interrupt::Stalled => MergeError::Stalled(point),
        Interrupt::Disconnected => MergeError::SinkClosed,
    }
}
