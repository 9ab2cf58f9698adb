//! `pm-plan` — per-person activity plans and the producer algorithm that
//! turns one plan into a time-ordered event sequence.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                 |
//! |----------------|----------------------------------------------------------|
//! | [`plan`]       | `Activity`, `Plan`, `Person`, `Population`               |
//! | [`simulate`]   | `simulate`, `PlanSimulation` (an `Iterator<Item = Event>`) |
//! | [`loader`]     | `load_population_csv`, `load_population_reader`          |
//! | [`synthetic`]  | `SyntheticPopulation` seeded generator                   |
//! | [`error`]      | `PlanError`, `PlanResult<T>`                             |
//!
//! # Event model (summary)
//!
//! For a plan `a0, a1, …, an` a person leaves `a_i` and arrives at `a_{i+1}`
//! at the same instant (legs take no time):
//!
//! ```text
//! t0      = a0.end_time            (or a0.dur from midnight)
//! t_{i+1} = max(t_i, a_{i+1}.end_time)  (or t_i + a_{i+1}.dur)
//!
//! actEnd(t_i, a_i)  actStart(t_i, a_{i+1})   for i in 0..n
//! ```
//!
//! The last activity never ends.  Times that cannot be worked out stop the
//! sequence early instead of producing an error.

pub mod error;
pub mod loader;
pub mod plan;
pub mod simulate;
pub mod synthetic;


pub use error::{PlanError, PlanResult};
pub use loader::{load_population_csv, load_population_reader};
pub use plan::{Activity, Person, Plan, Population};
pub use simulate::{PlanSimulation, simulate};
pub use synthetic::SyntheticPopulation;
