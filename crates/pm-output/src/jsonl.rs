//! JSON-lines sink: one serialized [`Event`] per line.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use pm_core::Event;

use crate::OutputResult;
use crate::sink::EventSink;

pub struct JsonLinesSink<W: Write> {
    out:      W,
    finished: bool,
}

impl JsonLinesSink<BufWriter<File>> {
    pub fn create(path: &Path) -> OutputResult<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, finished: false }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn write_event(&mut self, event: &Event) -> OutputResult<()> {
        serde_json::to_writer(&mut self.out, event)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.out.flush()?;
        Ok(())
    }
}
