//! Error types for pm-merge.

use std::fmt;

use pm_core::{CoreError, ProducerId, SimTime};
use thiserror::Error;

/// The blocking operation a merge participant was suspended in.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum WaitPoint {
    /// The coordinator waiting for the next producer to register.
    Registration,
    /// The coordinator waiting for a newly registered producer's first event.
    FirstEvent(ProducerId),
    /// The coordinator waiting for a producer's next event after emitting its head.
    NextEvent(ProducerId),
    /// The coordinator waiting for the sink to take an event.
    Sink,
}

impl WaitPoint {
    /// The producer involved, if the wait concerns one.
    pub fn producer(self) -> Option<ProducerId> {
        match self {
            WaitPoint::FirstEvent(p) | WaitPoint::NextEvent(p) => Some(p),
            _ => None,
        }
    }
}

impl fmt::Display for WaitPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitPoint::Registration  => f.write_str("producer registration"),
            WaitPoint::FirstEvent(p) => write!(f, "first event of {p}"),
            WaitPoint::NextEvent(p)  => write!(f, "next event of {p}"),
            WaitPoint::Sink          => f.write_str("the sink"),
        }
    }
}

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("cancelled while waiting for {0}")]
    Cancelled(WaitPoint),

    #[error("run deadline exceeded while waiting for {0}")]
    DeadlineExceeded(WaitPoint),

    #[error("stalled waiting for {0}")]
    Stalled(WaitPoint),

    #[error("{producer} went back in time: {got} after {previous}")]
    OutOfOrder {
        producer: ProducerId,
        previous: SimTime,
        got:      SimTime,
    },

    #[error("registration is closed")]
    RegistrationClosed,

    #[error("sink hung up before the merge finished")]
    SinkClosed,

    #[error("failed to spawn {what} thread: {source}")]
    Spawn {
        what:   &'static str,
        source: std::io::Error,
    },

    #[error("{0} thread panicked")]
    Panicked(&'static str),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type MergeResult<T> = Result<T, MergeError>;
