//! The timestamped record that flows from producers through the merge.

use std::fmt;
use std::str::FromStr;

use crate::{ActType, CoreError, LinkId, PersonId, SimTime};

// ── EventKind ─────────────────────────────────────────────────────────────────

/// What happened.  Opaque to the merge coordinator.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    /// A person leaves an activity.
    #[cfg_attr(feature = "serde", serde(rename = "actEnd"))]
    ActivityEnd,
    /// A person begins an activity.
    #[cfg_attr(feature = "serde", serde(rename = "actStart"))]
    ActivityStart,
}

impl EventKind {
    /// The wire label used by every output format.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::ActivityEnd => "actEnd",
            EventKind::ActivityStart => "actStart",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "actEnd" | "actend" => Ok(EventKind::ActivityEnd),
            "actStart" | "actstart" => Ok(EventKind::ActivityStart),
            other => Err(CoreError::EventKind(other.to_owned())),
        }
    }
}

// ── Event ─────────────────────────────────────────────────────────────────────

/// An immutable timestamped record.
///
/// Events move by value: a producer gives up ownership when it sends, and the
/// coordinator hands ownership on to the sink.  Cloning is cheap because the
/// payload ids are reference counted.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    pub time: SimTime,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: EventKind,
    pub person: PersonId,
    pub link: LinkId,
    #[cfg_attr(feature = "serde", serde(rename = "actType"))]
    pub act_type: ActType,
}

impl Event {
    pub fn new(
        time:     SimTime,
        kind:     EventKind,
        person:   PersonId,
        link:     LinkId,
        act_type: ActType,
    ) -> Self {
        Self { time, kind, person, link, act_type }
    }

    pub fn activity_end(time: SimTime, person: PersonId, link: LinkId, act_type: ActType) -> Self {
        Self::new(time, EventKind::ActivityEnd, person, link, act_type)
    }

    pub fn activity_start(time: SimTime, person: PersonId, link: LinkId, act_type: ActType) -> Self {
        Self::new(time, EventKind::ActivityStart, person, link, act_type)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} person={} link={} actType={}",
            self.time, self.kind, self.person, self.link, self.act_type
        )
    }
}
