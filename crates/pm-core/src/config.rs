//! Merge run configuration.
//!
//! Typically loaded from the `[merge]` table of a TOML file by the
//! application crate and passed to the merge pipeline.  `Default` reproduces
//! the classic behavior: two-phase seed-then-drain, every plan simulated, no
//! timeouts.

use std::time::Duration;

use crate::CoreError;

// ── MergeMode ─────────────────────────────────────────────────────────────────

/// How the coordinator interleaves registration with draining.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MergeMode {
    /// Seed every producer until registration closes, then drain.  Output is
    /// withheld until the last producer has registered and produced its
    /// first event.
    #[default]
    TwoPhase,
    /// Drain while registration is still open, emitting only heads no later
    /// registrant can undercut (registrations promise a start time).  Ready
    /// registrations are picked up between drain steps.  Nothing is lost
    /// as long as registrants keep their promise; a broken promise is
    /// handled by [`OrderPolicy`].
    Concurrent,
}

// ── OrderPolicy ───────────────────────────────────────────────────────────────

/// What to do with an event that would break the global order: a producer
/// going backwards in time, or a late registrant behind the watermark.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OrderPolicy {
    /// Discard the event, log a warning, and keep merging.
    #[default]
    Drop,
    /// Abort the merge with an error.
    Fail,
}

// ── PlanSelection ─────────────────────────────────────────────────────────────

/// Which plans of each person become producers.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PlanSelection {
    /// Every plan of every person.
    #[default]
    All,
    /// Only plans flagged as selected.  Persons without a selected plan fall
    /// back to their first plan.
    SelectedOnly,
}

// ── MergeConfig ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct MergeConfig {
    pub mode: MergeMode,

    pub order_policy: OrderPolicy,

    pub plan_selection: PlanSelection,

    /// Longest a single blocking wait (registration, a producer's next event,
    /// the sink taking an event) may take before the run fails as stalled.
    /// `None` waits forever.
    pub stall_timeout_ms: Option<u64>,

    /// Upper bound on the whole run, measured from when the coordinator
    /// starts.  `None` means unbounded.
    pub run_timeout_ms: Option<u64>,
}

impl MergeConfig {
    pub fn stall_timeout(&self) -> Option<Duration> {
        self.stall_timeout_ms.map(Duration::from_millis)
    }

    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout_ms.map(Duration::from_millis)
    }

    /// Reject settings that would make every wait fail immediately.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.stall_timeout_ms == Some(0) {
            return Err(CoreError::Config("stall_timeout_ms must be > 0".into()));
        }
        if self.run_timeout_ms == Some(0) {
            return Err(CoreError::Config("run_timeout_ms must be > 0".into()));
        }
        Ok(())
    }
}
