//! CSV population loader.
//!
//! # CSV format
//!
//! One row per activity.  Rows belonging to the same `(person_id, plan)`
//! pair form one plan, in file order.
//!
//! ```csv
//! person_id,plan,selected,act_type,link,end_time,dur
//! 100,0,yes,home,1,06:00,
//! 100,0,yes,work,20,,08:00
//! 100,0,yes,home,1,,
//! 101,0,no,home,7,07:15:30,
//! 101,0,no,shop,12,,00:45
//! 101,0,no,home,7,,
//! ```
//!
//! | Column     | Meaning                                                      |
//! |------------|--------------------------------------------------------------|
//! | `plan`     | Plan index within the person (any integer; only grouping)    |
//! | `selected` | `yes`/`true`/`1` marks the plan as selected                  |
//! | `end_time` | `HH:MM[:SS]`, may be empty                                   |
//! | `dur`      | `HH:MM[:SS]`, may be empty                                   |
//!
//! Time columns are stored as given.  A malformed time is not a load error;
//! it only cuts that person's event sequence short during the merge.
//!
//! Persons and plans keep the order in which they first appear.

use std::io::Read;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use pm_core::PersonId;

use crate::plan::{Activity, Person, Plan, Population};
use crate::PlanError;

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct PlanRecord {
    person_id: String,
    plan:      u32,
    selected:  Option<String>,
    act_type:  String,
    link:      String,
    end_time:  Option<String>,
    dur:       Option<String>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a [`Population`] from a CSV file.
pub fn load_population_csv(path: &Path) -> Result<Population, PlanError> {
    let file = std::fs::File::open(path).map_err(PlanError::Io)?;
    load_population_reader(file)
}

/// Like [`load_population_csv`] but accepts any `Read` source.
///
/// Useful for testing (pass a `std::io::Cursor`) or for inputs that are
/// decompressed on the fly.
pub fn load_population_reader<R: Read>(reader: R) -> Result<Population, PlanError> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let mut persons: Vec<Person> = Vec::new();
    let mut person_idx: FxHashMap<String, usize> = FxHashMap::default();
    // (person index, plan key) → plan index within that person.
    let mut plan_idx: FxHashMap<(usize, u32), usize> = FxHashMap::default();

    for (line, result) in csv_reader.deserialize::<PlanRecord>().enumerate() {
        let row = result.map_err(|e| PlanError::Parse(e.to_string()))?;
        let person_id = row.person_id.trim();
        if person_id.is_empty() {
            return Err(PlanError::Parse(format!("row {}: empty person_id", line + 1)));
        }

        let p = *person_idx.entry(person_id.to_owned()).or_insert_with(|| {
            persons.push(Person::new(PersonId::new(person_id), Vec::new()));
            persons.len() - 1
        });
        let person = &mut persons[p];

        let k = *plan_idx.entry((p, row.plan)).or_insert_with(|| {
            person.plans.push(Plan::default());
            person.plans.len() - 1
        });
        let plan = &mut person.plans[k];
        plan.selected |= parse_flag(row.selected.as_deref());

        plan.activities.push(Activity {
            act_type: row.act_type.trim().into(),
            link:     row.link.trim().into(),
            end_time: non_empty(row.end_time),
            dur:      non_empty(row.dur),
        });
    }

    Ok(Population::new(persons))
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_flag(s: Option<&str>) -> bool {
    matches!(
        s.map(|s| s.trim().to_ascii_lowercase()).as_deref(),
        Some("yes" | "true" | "1")
    )
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}
