//! SQLite sink (feature `sqlite`).
//!
//! Writes a single `events` table.  `seq` is the event's position in the
//! merged stream.

use std::path::Path;

use rusqlite::Connection;

use pm_core::Event;

use crate::OutputResult;
use crate::sink::EventSink;

/// Rows buffered before they are inserted in one transaction.
const BATCH: usize = 4096;

/// Writes events to an SQLite database.
pub struct SqliteSink {
    conn:     Connection,
    pending:  Vec<Event>,
    next_seq: i64,
    finished: bool,
}

impl SqliteSink {
    /// Open (or create) the database at `path` and initialise the schema.
    pub fn open(path: &Path) -> OutputResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS events (
                 seq      INTEGER PRIMARY KEY,
                 time     REAL    NOT NULL,
                 type     TEXT    NOT NULL,
                 person   TEXT    NOT NULL,
                 link     TEXT    NOT NULL,
                 act_type TEXT    NOT NULL
             );",
        )?;

        let next_seq: i64 =
            conn.query_row("SELECT COALESCE(MAX(seq) + 1, 0) FROM events", [], |row| row.get(0))?;

        Ok(Self { conn, pending: Vec::with_capacity(BATCH), next_seq, finished: false })
    }

    fn flush_pending(&mut self) -> OutputResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO events (seq, time, type, person, link, act_type) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for event in &self.pending {
                stmt.execute(rusqlite::params![
                    self.next_seq,
                    event.time.secs(),
                    event.kind.as_str(),
                    event.person.as_str(),
                    event.link.as_str(),
                    event.act_type.as_str(),
                ])?;
                self.next_seq += 1;
            }
        }
        tx.commit()?;
        self.pending.clear();
        Ok(())
    }
}

impl EventSink for SqliteSink {
    fn write_event(&mut self, event: &Event) -> OutputResult<()> {
        self.pending.push(event.clone());
        if self.pending.len() >= BATCH {
            self.flush_pending()?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.flush_pending()?;
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
