//! The `EventSink` trait implemented by all sinks.

use pm_core::Event;

use crate::OutputResult;

/// Trait implemented by the XML, CSV, JSON-lines, SQLite and memory sinks.
///
/// Events arrive in global time order, one call per event.
pub trait EventSink {
    /// Write one merged event.
    fn write_event(&mut self, event: &Event) -> OutputResult<()>;

    /// Write any trailer, then flush and close the underlying output.
    ///
    /// Idempotent — safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn write_event(&mut self, event: &Event) -> OutputResult<()> {
        (**self).write_event(event)
    }

    fn finish(&mut self) -> OutputResult<()> {
        (**self).finish()
    }
}
