//! `pm-output` — event sinks for the plan_merge scheduler.
//!
//! | Feature   | Sink            | Output                                           |
//! |-----------|-----------------|--------------------------------------------------|
//! | *(none)*  | [`XmlSink`]     | indented `<event …/>` lines inside `<events>`    |
//! | *(none)*  | [`CsvSink`]     | `time,type,person,link,actType` rows             |
//! | *(none)*  | [`JsonLinesSink`] | one JSON object per line                       |
//! | *(none)*  | [`MemorySink`]  | a `Vec<Event>` in memory                         |
//! | `sqlite`  | `SqliteSink`    | an `events` table in a SQLite database           |
//!
//! All sinks implement [`EventSink`].  [`drain_into`] is the sink task: it
//! reads the coordinator's merged stream until it closes and writes every
//! event to a sink.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pm_output::{SinkKind, drain_into, open_sink};
//!
//! let mut sink = open_sink(SinkKind::Xml, None)?; // stdout
//! let report = pipeline.run(sources, |merged| drain_into(merged, &mut sink, &cancel))?;
//! let written = report.sink?.written;
//! ```

pub mod csv;
pub mod drain;
pub mod error;
pub mod jsonl;
pub mod kind;
pub mod memory;
pub mod sink;
pub mod xml;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use self::csv::CsvSink;
pub use drain::{SinkReport, drain_into};
pub use error::{OutputError, OutputResult};
pub use jsonl::JsonLinesSink;
pub use kind::{SinkKind, open_sink};
pub use memory::MemorySink;
pub use sink::EventSink;
pub use xml::XmlSink;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteSink;
