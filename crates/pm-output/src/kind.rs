//! Output format selection.

use std::fmt;
use std::io::{self, BufWriter};
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::sink::EventSink;
use crate::{CsvSink, JsonLinesSink, OutputError, OutputResult, XmlSink};

/// The sink formats [`open_sink`] can build.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum SinkKind {
    #[default]
    Xml,
    Csv,
    JsonLines,
    Sqlite,
}

impl SinkKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SinkKind::Xml => "xml",
            SinkKind::Csv => "csv",
            SinkKind::JsonLines => "jsonl",
            SinkKind::Sqlite => "sqlite",
        }
    }

    /// Guess the format from a file extension (`events.csv` → `Csv`).
    pub fn from_extension(path: &Path) -> Option<Self> {
        path.extension()?.to_str()?.parse().ok()
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SinkKind {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xml" => Ok(SinkKind::Xml),
            "csv" => Ok(SinkKind::Csv),
            "jsonl" | "json" | "ndjson" => Ok(SinkKind::JsonLines),
            "sqlite" | "db" => Ok(SinkKind::Sqlite),
            _ => Err(OutputError::UnknownFormat(s.to_owned())),
        }
    }
}

impl TryFrom<String> for SinkKind {
    type Error = OutputError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Build a boxed sink of `kind` writing to `path`, or to stdout when `path`
/// is `None`.  SQLite always needs a path.
pub fn open_sink(kind: SinkKind, path: Option<&Path>) -> OutputResult<Box<dyn EventSink + Send>> {
    let sink: Box<dyn EventSink + Send> = match (kind, path) {
        (SinkKind::Xml, Some(path)) => Box::new(XmlSink::create(path)?),
        (SinkKind::Xml, None) => Box::new(XmlSink::new(BufWriter::new(io::stdout()))),
        (SinkKind::Csv, Some(path)) => Box::new(CsvSink::create(path)?),
        (SinkKind::Csv, None) => Box::new(CsvSink::new(io::stdout())?),
        (SinkKind::JsonLines, Some(path)) => Box::new(JsonLinesSink::create(path)?),
        (SinkKind::JsonLines, None) => Box::new(JsonLinesSink::new(BufWriter::new(io::stdout()))),
        (SinkKind::Sqlite, None) => return Err(OutputError::PathRequired(kind)),
        (SinkKind::Sqlite, Some(path)) => open_sqlite(path)?,
    };
    Ok(sink)
}

#[cfg(feature = "sqlite")]
fn open_sqlite(path: &Path) -> OutputResult<Box<dyn EventSink + Send>> {
    Ok(Box::new(crate::SqliteSink::open(path)?))
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite(_path: &Path) -> OutputResult<Box<dyn EventSink + Send>> {
    Err(OutputError::Disabled(SinkKind::Sqlite))
}
