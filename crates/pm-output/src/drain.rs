//! The sink task: move the merged stream into an [`EventSink`].

use tracing::{debug, info, warn};

use pm_core::SimTime;
use pm_merge::{CancelToken, EventReceiver, Waiter};

use crate::sink::EventSink;
use crate::{OutputError, OutputResult};

/// What [`drain_into`] wrote.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SinkReport {
    pub written:    u64,
    pub first_time: Option<SimTime>,
    pub last_time:  Option<SimTime>,
}

/// Read `merged` until the coordinator closes it, writing every event to
/// `sink`, then finish the sink.
///
/// Every receive honors `cancel`.  On a write error the receiver is dropped
/// on return, which the coordinator sees as a closed sink.
pub fn drain_into<S: EventSink + ?Sized>(
    merged: EventReceiver,
    sink:   &mut S,
    cancel: &CancelToken,
) -> OutputResult<SinkReport> {
    let waiter = Waiter::new(cancel.clone());
    let mut report = SinkReport::default();

    loop {
        let event = match merged.recv(&waiter) {
            Ok(Some(event)) => event,
            Ok(None) => break,
            Err(interrupt) => {
                warn!(?interrupt, written = report.written, "sink interrupted");
                return Err(OutputError::Interrupted(interrupt));
            }
        };

        if let Err(e) = sink.write_event(&event) {
            warn!(error = %e, written = report.written, "sink write failed");
            return Err(e);
        }
        report.first_time.get_or_insert(event.time);
        report.last_time = Some(event.time);
        report.written += 1;
    }

    debug!(written = report.written, "merged stream closed");
    sink.finish()?;
    info!(
        written = report.written,
        first   = ?report.first_time.map(SimTime::secs),
        last    = ?report.last_time.map(SimTime::secs),
        "sink finished"
    );
    Ok(report)
}
