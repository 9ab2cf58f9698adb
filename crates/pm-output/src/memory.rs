//! In-memory sink.

use pm_core::Event;

use crate::OutputResult;
use crate::sink::EventSink;

/// Collects every event into a `Vec`.
#[derive(Debug, Default)]
pub struct MemorySink {
    events:   Vec<Event>,
    finished: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl EventSink for MemorySink {
    fn write_event(&mut self, event: &Event) -> OutputResult<()> {
        self.events.push(event.clone());
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.finished = true;
        Ok(())
    }
}
