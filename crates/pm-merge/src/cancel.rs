//! Cancellation and bounded waiting.
//!
//! Every blocking channel operation in a run goes through a [`Waiter`],
//! which races the operation against:
//!
//! - the run's [`CancelToken`] (fires when its [`CancelSource`] cancels or is
//!   dropped),
//! - an optional absolute deadline for the whole run,
//! - an optional per-wait stall timeout.
//!
//! Without a deadline, stall timeout, or cancellation a wait blocks for as
//! long as the other side takes, which is the plain rendezvous behavior.
//!
//! The token is a receiver on a channel nobody ever sends on.  Cancelling
//! drops the only sender, which disconnects the channel and makes every
//! pending and future `recv` on any clone return at once.

use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use crossbeam::select;

// ── CancelSource / CancelToken ────────────────────────────────────────────────

/// Owner side of a cancellation signal.  Dropping it cancels.
#[derive(Debug)]
pub struct CancelSource {
    _tx:   Sender<()>,
    token: CancelToken,
}

impl CancelSource {
    pub fn new() -> Self {
        let (tx, rx) = channel::bounded(0);
        Self { _tx: tx, token: CancelToken { rx } }
    }

    /// A token observing this source.
    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Cancel every wait observing this source's tokens.
    pub fn cancel(self) {}
}

impl Default for CancelSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer side of a cancellation signal.  Cheap to clone.
#[derive(Clone, Debug)]
pub struct CancelToken {
    rx: Receiver<()>,
}

impl CancelToken {
    /// A token that is never cancelled.
    pub fn never() -> Self {
        Self { rx: channel::never() }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.rx.try_recv(), Err(TryRecvError::Disconnected))
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::never()
    }
}

// ── Waiter ────────────────────────────────────────────────────────────────────

/// Why a wait ended without completing its channel operation.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Interrupt {
    Cancelled,
    Deadline,
    Stalled,
    /// The other end of the channel is gone (send side only; a closed
    /// channel on the receive side is a normal end of stream).
    Disconnected,
}

/// Bounded blocking send/receive over rendezvous channels.
#[derive(Clone, Debug, Default)]
pub struct Waiter {
    cancel:   CancelToken,
    deadline: Option<Instant>,
    stall:    Option<Duration>,
}

impl Waiter {
    pub fn new(cancel: CancelToken) -> Self {
        Self { cancel, deadline: None, stall: None }
    }

    /// Fail every wait that would end after `deadline`.
    pub fn deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Fail any single wait that lasts longer than `stall`.
    pub fn stall_timeout(mut self, stall: Option<Duration>) -> Self {
        self.stall = stall;
        self
    }

    /// Receive one message.  `Ok(None)` means the channel is closed.
    pub fn recv<T>(&self, rx: &Receiver<T>) -> Result<Option<T>, Interrupt> {
        let deadline = self.deadline_rx();
        let stall = self.stall_rx();
        select! {
            recv(rx) -> msg => Ok(msg.ok()),
            recv(self.cancel.rx) -> _ => Err(Interrupt::Cancelled),
            recv(deadline) -> _ => Err(Interrupt::Deadline),
            recv(stall) -> _ => Err(Interrupt::Stalled),
        }
    }

    /// Hand `value` to the receiver, blocking until it is taken.
    pub fn send<T>(&self, tx: &Sender<T>, value: T) -> Result<(), Interrupt> {
        let deadline = self.deadline_rx();
        let stall = self.stall_rx();
        select! {
            send(tx, value) -> res => res.map_err(|_| Interrupt::Disconnected),
            recv(self.cancel.rx) -> _ => Err(Interrupt::Cancelled),
            recv(deadline) -> _ => Err(Interrupt::Deadline),
            recv(stall) -> _ => Err(Interrupt::Stalled),
        }
    }

    fn deadline_rx(&self) -> Receiver<Instant> {
        match self.deadline {
            Some(at) => channel::at(at),
            None => channel::never(),
        }
    }

    fn stall_rx(&self) -> Receiver<Instant> {
        match self.stall {
            Some(d) => channel::after(d),
            None => channel::never(),
        }
    }
}
