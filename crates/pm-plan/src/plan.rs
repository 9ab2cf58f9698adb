//! Plan data model: `Activity`, `Plan`, `Person`, and `Population`.
//!
//! Times are kept exactly as the input gave them (`"07:30:00"`, `""`, or
//! something unparseable).  Interpreting them is the producer's job, so that
//! a bad value only affects the one person it belongs to.

use pm_core::{ActType, LinkId, PersonId, PlanSelection, SimTime};

// ── Activity ──────────────────────────────────────────────────────────────────

/// One located activity in a plan.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Activity {
    pub act_type: ActType,
    pub link:     LinkId,
    /// Clock time at which the activity ends, if the plan fixes one.
    pub end_time: Option<String>,
    /// How long the activity lasts, as a clock duration (`"08:00"`).
    pub dur:      Option<String>,
}

impl Activity {
    pub fn new(act_type: impl Into<ActType>, link: impl Into<LinkId>) -> Self {
        Self {
            act_type: act_type.into(),
            link:     link.into(),
            end_time: None,
            dur:      None,
        }
    }

    pub fn with_end_time(mut self, end_time: impl Into<String>) -> Self {
        self.end_time = Some(end_time.into());
        self
    }

    pub fn with_dur(mut self, dur: impl Into<String>) -> Self {
        self.dur = Some(dur.into());
        self
    }

    /// Parsed end time; `None` if absent or unparseable.
    pub fn end_time(&self) -> Option<SimTime> {
        self.end_time.as_deref().and_then(SimTime::parse_clock)
    }

    /// Parsed duration; `None` if absent or unparseable.
    pub fn duration(&self) -> Option<SimTime> {
        self.dur.as_deref().and_then(SimTime::parse_clock)
    }
}

// ── Plan ──────────────────────────────────────────────────────────────────────

/// An ordered day plan for one person.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Plan {
    pub activities: Vec<Activity>,
    pub selected:   bool,
    pub score:      Option<f64>,
}

impl Plan {
    pub fn new(activities: Vec<Activity>) -> Self {
        Self { activities, selected: false, score: None }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }
}

// ── Person ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Person {
    pub id:    PersonId,
    pub plans: Vec<Plan>,
}

impl Person {
    pub fn new(id: impl Into<PersonId>, plans: Vec<Plan>) -> Self {
        Self { id: id.into(), plans }
    }

    /// The plans that should be simulated under `selection`.
    ///
    /// With [`PlanSelection::SelectedOnly`] a person that has no plan flagged
    /// as selected falls back to its first plan, so nobody silently drops out
    /// of the run.
    pub fn plans_for(&self, selection: PlanSelection) -> Vec<&Plan> {
        match selection {
            PlanSelection::All => self.plans.iter().collect(),
            PlanSelection::SelectedOnly => {
                let chosen: Vec<&Plan> = self.plans.iter().filter(|p| p.selected).collect();
                if chosen.is_empty() {
                    self.plans.first().into_iter().collect()
                } else {
                    chosen
                }
            }
        }
    }
}

// ── Population ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Population {
    pub persons: Vec<Person>,
}

impl Population {
    pub fn new(persons: Vec<Person>) -> Self {
        Self { persons }
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    /// Total number of plans across all persons.
    pub fn plan_count(&self) -> usize {
        self.persons.iter().map(|p| p.plans.len()).sum()
    }

    /// Every `(person, plan)` pair that becomes one producer, in population
    /// order.
    pub fn producer_plans(&self, selection: PlanSelection) -> Vec<(PersonId, &Plan)> {
        self.persons
            .iter()
            .flat_map(|person| {
                person
                    .plans_for(selection)
                    .into_iter()
                    .map(move |plan| (person.id.clone(), plan))
            })
            .collect()
    }
}
