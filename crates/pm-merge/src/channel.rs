//! Rendezvous channels between producers, the coordinator, and the sink.
//!
//! All channels here are unbuffered (`bounded(0)`): a send completes only
//! when the receiver takes the value, so every hand-off is a synchronization
//! point and a slow reader throttles its writer.
//!
//! Event channels are strictly one-to-one.  [`EventSender`] and
//! [`EventReceiver`] deliberately do not implement `Clone`, so a producer
//! stream has exactly one writer and, once registered, exactly one reader.
//!
//! The registration channel is many-to-one: [`Registrar`] clones may
//! register concurrently.  It closes when the last `Registrar` is dropped,
//! which tells the coordinator that the producer set is final.
//!
//! A registration may carry a start time: a promise that neither this
//! stream nor any stream registered after it yields an event earlier than
//! that time.  A concurrent-mode coordinator only emits heads at or below
//! the latest promise, so registering in start-time order lets it drain
//! while registration is still open without losing late producers' events.

use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use tracing::warn;

use pm_core::{Event, SimTime};

use crate::cancel::{CancelToken, Interrupt, Waiter};
use crate::producer::{EventSource, ProducerHandle, spawn_producer};
use crate::{MergeError, MergeResult};

// ── Event channels ────────────────────────────────────────────────────────────

/// Create an unbuffered one-to-one event channel.
pub fn event_channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = channel::bounded(0);
    (EventSender { tx }, EventReceiver { rx })
}

/// Writing end of an event stream.  Dropping it closes the stream.
#[derive(Debug)]
pub struct EventSender {
    tx: Sender<Event>,
}

impl EventSender {
    /// Block until the reader takes `event`, or the wait is interrupted.
    pub fn send(&self, event: Event, waiter: &Waiter) -> Result<(), Interrupt> {
        waiter.send(&self.tx, event)
    }

    /// Close the stream.  Equivalent to dropping the sender.
    pub fn close(self) {}
}

/// Reading end of an event stream.
#[derive(Debug)]
pub struct EventReceiver {
    rx: Receiver<Event>,
}

impl EventReceiver {
    /// Next event, `Ok(None)` once the writer has closed the stream.
    pub fn recv(&self, waiter: &Waiter) -> Result<Option<Event>, Interrupt> {
        waiter.recv(&self.rx)
    }
}

// ── Registration channel ──────────────────────────────────────────────────────

/// Create the registration channel for one merge run.
pub fn registration_channel() -> (Registrar, Registrations) {
    let (tx, rx) = channel::bounded(0);
    (Registrar { tx }, Registrations { rx })
}

/// One producer stream offered to the coordinator.
#[derive(Debug)]
pub struct Registration {
    pub stream: EventReceiver,
    /// No event from this or any later registration is earlier than this.
    /// `None` makes no promise.
    pub start:  Option<SimTime>,
}

/// Registering end.  Clone it to register from several threads.
#[derive(Clone, Debug)]
pub struct Registrar {
    tx: Sender<Registration>,
}

impl Registrar {
    /// Announce a producer stream to the coordinator, without a start time.
    ///
    /// Blocks until the coordinator accepts it.  If the coordinator is no
    /// longer accepting registrations, the stream is dropped (its producer
    /// sees a disconnected channel on its next send) and
    /// [`MergeError::RegistrationClosed`] is returned.
    pub fn register(&self, stream: EventReceiver) -> MergeResult<()> {
        self.offer(Registration { stream, start: None })
    }

    /// Like [`register`][Self::register], promising that nothing from this
    /// registration onward is earlier than `start`.
    pub fn register_from(&self, stream: EventReceiver, start: SimTime) -> MergeResult<()> {
        self.offer(Registration { stream, start: Some(start) })
    }

    /// Create a producer channel, start `source` on its own thread, and
    /// register the stream.
    ///
    /// The producer is spawned before registering, so its first event is
    /// already being offered by the time the coordinator asks for it.
    pub fn register_source<S: EventSource>(
        &self,
        name:   impl Into<String>,
        source: S,
        cancel: &CancelToken,
    ) -> MergeResult<ProducerHandle> {
        self.register_source_with(name.into(), source, None, cancel)
    }

    /// [`register_source`][Self::register_source] with a start-time promise.
    pub fn register_source_from<S: EventSource>(
        &self,
        name:   impl Into<String>,
        source: S,
        start:  SimTime,
        cancel: &CancelToken,
    ) -> MergeResult<ProducerHandle> {
        self.register_source_with(name.into(), source, Some(start), cancel)
    }

    /// If registration is rejected the producer thread is left detached: its
    /// stream is already dropped, so it ends at its next send.
    pub(crate) fn register_source_with<S: EventSource>(
        &self,
        name:   String,
        source: S,
        start:  Option<SimTime>,
        cancel: &CancelToken,
    ) -> MergeResult<ProducerHandle> {
        let (tx, rx) = event_channel();
        let handle = spawn_producer(name, source, tx, cancel.clone())?;
        match self.offer(Registration { stream: rx, start }) {
            Ok(()) => Ok(handle),
            Err(e) => {
                warn!(producer = handle.name(), "registration rejected; producer detached");
                Err(e)
            }
        }
    }

    fn offer(&self, registration: Registration) -> MergeResult<()> {
        self.tx.send(registration).map_err(|_| MergeError::RegistrationClosed)
    }

    /// Close the registration channel (from this handle's side).
    ///
    /// The channel is closed for the coordinator once every clone has been
    /// closed or dropped.
    pub fn close(self) {}
}

/// Coordinator end of the registration channel.
#[derive(Debug)]
pub struct Registrations {
    rx: Receiver<Registration>,
}

/// Result of a non-blocking registration poll.
#[derive(Debug)]
pub enum Poll {
    Ready(Registration),
    Empty,
    Closed,
}

impl Registrations {
    /// Next registration, `Ok(None)` once registration has closed.
    pub fn recv(&self, waiter: &Waiter) -> Result<Option<Registration>, Interrupt> {
        waiter.recv(&self.rx)
    }

    /// Take a registration if one is being offered right now.
    pub fn poll(&self) -> Poll {
        match self.rx.try_recv() {
            Ok(registration) => Poll::Ready(registration),
            Err(TryRecvError::Empty) => Poll::Empty,
            Err(TryRecvError::Disconnected) => Poll::Closed,
        }
    }
}
