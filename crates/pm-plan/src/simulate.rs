//! The plan walk: one person's plan → a non-decreasing event sequence.
//!
//! `PlanSimulation` is a lazy iterator, so a producer thread computes each
//! event only when the previous one has been handed off.  A slow consumer
//! therefore throttles the walk itself.
//!
//! # Fault handling
//!
//! A step whose end time cannot be determined (no end time and no duration,
//! or neither parses) ends the sequence at that point with a warning.  The
//! events already produced stay valid; nothing is reported upstream.

use pm_core::{Event, PersonId, SimTime};
use tracing::warn;

use crate::{Activity, Plan};

/// Start walking `plan` on behalf of `person`.
pub fn simulate(plan: Plan, person: PersonId) -> PlanSimulation {
    PlanSimulation::new(person, plan.activities)
}

/// Iterator over the activity end/start events of one plan.
#[derive(Debug)]
pub struct PlanSimulation {
    person:     PersonId,
    activities: Vec<Activity>,
    /// Index of the activity the person is currently at.
    current:    usize,
    /// When the person leaves `activities[current]`.  `None` before the
    /// first step, and after a step whose end could not be worked out.
    leave_at:   Option<SimTime>,
    /// Arrival event queued behind the departure that was just returned.
    pending:    Option<Event>,
    started:    bool,
    stopped:    bool,
}

impl PlanSimulation {
    pub fn new(person: PersonId, activities: Vec<Activity>) -> Self {
        Self {
            person,
            activities,
            current:  0,
            leave_at: None,
            pending:  None,
            started:  false,
            stopped:  false,
        }
    }

    pub fn person(&self) -> &PersonId {
        &self.person
    }

    /// Departure time for the activity at `idx`, given the arrival time.
    ///
    /// A fixed end time wins over a duration; an end time earlier than the
    /// arrival means the person leaves immediately.
    fn leave_time(&self, idx: usize, arrived: SimTime) -> Option<SimTime> {
        let act = &self.activities[idx];
        if let Some(end) = act.end_time() {
            return Some(end.max(arrived));
        }
        act.duration().map(|dur| arrived + dur)
    }

    fn stop(&mut self, idx: usize) {
        let act = &self.activities[idx];
        warn!(
            person   = %self.person,
            activity = idx,
            act_type = %act.act_type,
            end_time = ?act.end_time,
            dur      = ?act.dur,
            "cannot determine activity end; stopping plan"
        );
        self.stopped = true;
    }
}

impl Iterator for PlanSimulation {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        if let Some(event) = self.pending.take() {
            return Some(event);
        }
        if self.stopped || self.current + 1 >= self.activities.len() {
            return None;
        }

        if !self.started {
            self.started = true;
            self.leave_at = self.leave_time(0, SimTime::ZERO);
        }
        let Some(t) = self.leave_at else {
            self.stop(self.current);
            return None;
        };

        let from = &self.activities[self.current];
        let departure = Event::activity_end(
            t,
            self.person.clone(),
            from.link.clone(),
            from.act_type.clone(),
        );

        self.current += 1;
        let to = &self.activities[self.current];
        self.pending = Some(Event::activity_start(
            t,
            self.person.clone(),
            to.link.clone(),
            to.act_type.clone(),
        ));

        // The last activity never ends, so there is nothing to compute.
        if self.current + 1 < self.activities.len() {
            self.leave_at = self.leave_time(self.current, t);
            if self.leave_at.is_none() {
                self.stop(self.current);
            }
        }

        Some(departure)
    }
}
