//! XML event-file sink.
//!
//! ```text
//! <?xml version="1.0" encoding="utf-8"?>
//! <events version="1.0">
//!   <event time="21600" type="actEnd" person="1" link="l7" actType="home"/>
//! </events>
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use pm_core::Event;

use crate::OutputResult;
use crate::sink::EventSink;

const HEADER: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<events version=\"1.0\">\n";
const FOOTER: &str = "</events>\n";

/// Writes events as an indented XML document.
///
/// The header is written with the first event (or by `finish` for an empty
/// run), so a document is always well-formed once finished.
pub struct XmlSink<W: Write> {
    out:      W,
    started:  bool,
    finished: bool,
}

impl XmlSink<BufWriter<File>> {
    /// Create (or truncate) the file at `path`.
    pub fn create(path: &Path) -> OutputResult<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> XmlSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, started: false, finished: false }
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn start(&mut self) -> OutputResult<()> {
        if !self.started {
            self.started = true;
            self.out.write_all(HEADER.as_bytes())?;
        }
        Ok(())
    }
}

impl<W: Write> EventSink for XmlSink<W> {
    fn write_event(&mut self, event: &Event) -> OutputResult<()> {
        self.start()?;
        writeln!(
            self.out,
            "  <event time=\"{}\" type=\"{}\" person=\"{}\" link=\"{}\" actType=\"{}\"/>",
            event.time,
            event.kind,
            escape(event.person.as_str()),
            escape(event.link.as_str()),
            escape(event.act_type.as_str()),
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.start()?;
        self.finished = true;
        self.out.write_all(FOOTER.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Escape a value for use inside a double-quoted attribute.
pub fn escape(value: &str) -> std::borrow::Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\'']) {
        return value.into();
    }
    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out.into()
}
