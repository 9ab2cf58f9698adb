//! Seeded synthetic population generator.
//!
//! Produces home → work → (optional errand) → home day plans on a pool of
//! numbered links.  Every person draws from its own [`PersonRng`], so the
//! population for a given `(seed, persons)` pair is identical across runs
//! and independent of generation order.

use pm_core::PersonRng;

use crate::plan::{Activity, Person, Plan, Population};

/// Builder for a synthetic [`Population`].
///
/// ```rust,ignore
/// let population = SyntheticPopulation::new(1_000, 42)
///     .links(500)
///     .plans_per_person(2)
///     .generate();
/// ```
#[derive(Clone, Debug)]
pub struct SyntheticPopulation {
    persons:          usize,
    seed:             u64,
    links:            u32,
    plans_per_person: usize,
    errand_prob:      f64,
}

const ERRANDS: [&str; 3] = ["shop", "leisure", "education"];

impl SyntheticPopulation {
    pub fn new(persons: usize, seed: u64) -> Self {
        Self {
            persons,
            seed,
            links:            100,
            plans_per_person: 1,
            errand_prob:      0.3,
        }
    }

    /// Size of the link pool activities are placed on (at least 1).
    pub fn links(mut self, links: u32) -> Self {
        self.links = links.max(1);
        self
    }

    /// Plans generated per person; the first one is marked selected.
    pub fn plans_per_person(mut self, n: usize) -> Self {
        self.plans_per_person = n;
        self
    }

    /// Probability of an extra errand between work and returning home.
    pub fn errand_prob(mut self, p: f64) -> Self {
        self.errand_prob = p;
        self
    }

    pub fn generate(&self) -> Population {
        let persons = (0..self.persons)
            .map(|i| {
                // Home and work stay fixed across a person's alternative plans.
                let mut rng = PersonRng::new(self.seed, i as u64);
                let home = rng.gen_range(0..self.links);
                let work = rng.gen_range(0..self.links);
                let plans = (0..self.plans_per_person)
                    .map(|k| self.day_plan(&mut rng, home, work).selected(k == 0))
                    .collect();
                Person::new(format!("{i}"), plans)
            })
            .collect();
        Population::new(persons)
    }

    fn day_plan(&self, rng: &mut PersonRng, home: u32, work: u32) -> Plan {
        let leave_home = rng.gen_range(5 * 60..10 * 60); // minutes after midnight
        let work_mins = rng.gen_range(4 * 60..10 * 60);

        let mut activities = vec![
            Activity::new("home", link(home)).with_end_time(clock(leave_home)),
            Activity::new("work", link(work)).with_dur(clock(work_mins)),
        ];

        if rng.gen_bool(self.errand_prob) {
            let errand_link = rng.gen_range(0..self.links);
            let errand_mins = rng.gen_range(15..180);
            let kind = rng.choose(&ERRANDS).copied().unwrap_or("shop");
            activities.push(Activity::new(kind, link(errand_link)).with_dur(clock(errand_mins)));
        }

        activities.push(Activity::new("home", link(home)));
        Plan::new(activities)
    }
}

fn link(n: u32) -> String {
    format!("l{n}")
}

fn clock(minutes: u32) -> String {
    format!("{:02}:{:02}:00", minutes / 60, minutes % 60)
}
