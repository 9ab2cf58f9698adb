//! Simulation time model.
//!
//! # Design
//!
//! Time is a real number of seconds since midnight of the simulated day,
//! wrapped in `SimTime`.  Plans routinely run past midnight (`25:30:00` is a
//! valid end time), so there is no upper bound.
//!
//! `f64` has no total order, but the merge heap needs one.  `SimTime`
//! implements `Ord` via [`f64::total_cmp`], which orders every bit pattern:
//! positive NaN sorts after `+∞` and negative NaN before `-∞`.  Equality is
//! defined the same way so `Eq` and `Ord` agree.

use std::cmp::Ordering;
use std::fmt;

// ── SimTime ───────────────────────────────────────────────────────────────────

/// An absolute simulation timestamp, in seconds.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SimTime(pub f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);

    #[inline]
    pub fn from_secs(secs: f64) -> Self {
        SimTime(secs)
    }

    /// Build a time from clock components.  Components are not range-checked,
    /// so `from_hms(25, 0, 0)` is one hour past the next midnight.
    #[inline]
    pub fn from_hms(hours: u32, minutes: u32, seconds: u32) -> Self {
        SimTime(hours as f64 * 3_600.0 + minutes as f64 * 60.0 + seconds as f64)
    }

    #[inline]
    pub fn secs(self) -> f64 {
        self.0
    }

    /// Parse a plan clock string: `HH:MM` or `HH:MM:SS`.
    ///
    /// Hours may exceed 23.  Minutes and seconds must be below 60.  Returns
    /// `None` for anything else, including the empty string; callers decide
    /// what an unparseable time means.
    pub fn parse_clock(s: &str) -> Option<SimTime> {
        let mut parts = s.trim().split(':');
        let hours: u32 = parts.next()?.parse().ok()?;
        let minutes: u32 = parts.next()?.parse().ok()?;
        let seconds: u32 = match parts.next() {
            Some(p) => p.parse().ok()?,
            None => 0,
        };
        if parts.next().is_some() || minutes >= 60 || seconds >= 60 {
            return None;
        }
        Some(SimTime::from_hms(hours, minutes, seconds))
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::ops::Add for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: SimTime) -> SimTime {
        SimTime(self.0 + rhs.0)
    }
}

impl std::ops::Sub for SimTime {
    type Output = SimTime;
    #[inline]
    fn sub(self, rhs: SimTime) -> SimTime {
        SimTime(self.0 - rhs.0)
    }
}

impl From<f64> for SimTime {
    fn from(secs: f64) -> Self {
        SimTime(secs)
    }
}

/// Plain seconds, formatted the shortest way that round-trips
/// (`21600`, `21600.5`).
impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
