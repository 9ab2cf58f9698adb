//! Merge observer trait for progress reporting and data collection.

use pm_core::{ProducerId, SimTime};

use crate::coordinator::Phase;

/// Callbacks invoked by [`Coordinator::run`][crate::Coordinator::run] at key
/// points of a merge.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.  Callbacks run on the coordinator
/// thread between channel operations; a slow observer slows the merge.
///
/// # Example — progress counter
///
/// ```rust,ignore
/// struct Progress { every: u64, emitted: u64 }
///
/// impl MergeObserver for Progress {
///     fn on_emit(&mut self, _producer: ProducerId, time: SimTime) {
///         self.emitted += 1;
///         if self.emitted % self.every == 0 {
///             eprintln!("{} events, now at t={time}", self.emitted);
///         }
///     }
/// }
/// ```
pub trait MergeObserver {
    /// The coordinator moved from one phase to the next.
    fn on_phase_change(&mut self, _from: Phase, _to: Phase) {}

    /// A producer stream was accepted and assigned `producer`.
    fn on_register(&mut self, _producer: ProducerId) {}

    /// An event from `producer` was handed to the sink.
    fn on_emit(&mut self, _producer: ProducerId, _time: SimTime) {}

    /// `producer` closed its stream after `accepted` events.  Producers that
    /// close without emitting anything are reported here with `accepted == 0`.
    fn on_retire(&mut self, _producer: ProducerId, _accepted: u64) {}

    /// An event from `producer` at `got` was behind `floor` (the producer's
    /// previous event, or what the merge had already emitted).
    fn on_order_violation(&mut self, _producer: ProducerId, _floor: SimTime, _got: SimTime) {}
}

/// A [`MergeObserver`] that does nothing.
pub struct NoopObserver;

impl MergeObserver for NoopObserver {}
