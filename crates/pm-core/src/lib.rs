//! `pm-core` — foundational types for the `plan_merge` event scheduler.
//!
//! This crate is a dependency of every other `pm-*` crate.  It has no `pm-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `PersonId`, `LinkId`, `ActType`, `ProducerId`         |
//! | [`time`]        | `SimTime` (totally ordered seconds)                   |
//! | [`event`]       | `Event`, `EventKind`                                  |
//! | [`config`]      | `MergeConfig`, `MergeMode`, `OrderPolicy`, `PlanSelection` |
//! | [`rng`]         | `PersonRng` (per-person seeded RNG)                   |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod event;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{MergeConfig, MergeMode, OrderPolicy, PlanSelection};
pub use error::{CoreError, CoreResult};
pub use event::{Event, EventKind};
pub use ids::{ActType, LinkId, PersonId, ProducerId};
pub use rng::PersonRng;
pub use time::SimTime;
