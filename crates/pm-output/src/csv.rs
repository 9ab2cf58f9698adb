//! CSV sink.
//!
//! One header row `time,type,person,link,actType`, then one row per event.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::Writer;

use pm_core::Event;

use crate::OutputResult;
use crate::sink::EventSink;

pub const HEADER: [&str; 5] = ["time", "type", "person", "link", "actType"];

/// Writes events to a CSV file (or any writer).
pub struct CsvSink<W: Write> {
    writer:   Writer<W>,
    finished: bool,
}

impl CsvSink<File> {
    /// Create (or truncate) the file at `path` and write the header row.
    pub fn create(path: &Path) -> OutputResult<Self> {
        let writer = Writer::from_path(path)?;
        Self::with_writer(writer)
    }
}

impl<W: Write> CsvSink<W> {
    pub fn new(out: W) -> OutputResult<Self> {
        Self::with_writer(Writer::from_writer(out))
    }

    fn with_writer(mut writer: Writer<W>) -> OutputResult<Self> {
        writer.write_record(HEADER)?;
        Ok(Self { writer, finished: false })
    }
}

impl<W: Write> EventSink for CsvSink<W> {
    fn write_event(&mut self, event: &Event) -> OutputResult<()> {
        self.writer.write_record([
            event.time.to_string().as_str(),
            event.kind.as_str(),
            event.person.as_str(),
            event.link.as_str(),
            event.act_type.as_str(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.writer.flush()?;
        Ok(())
    }
}
