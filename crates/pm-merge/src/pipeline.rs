//! End-to-end merge runs.

use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use pm_core::{Event, MergeConfig, MergeMode, SimTime};

use crate::cancel::CancelToken;
use crate::channel::{EventReceiver, Registrar, event_channel, registration_channel};
use crate::producer::{EventSource, ProducerHandle, ProducerOutcome};
use crate::{Coordinator, MergeError, MergeObserver, MergeResult, MergeStats, NoopObserver};

/// Outcome of a successful [`MergePipeline::run`].
#[derive(Debug)]
pub struct RunReport<T> {
    pub stats:           MergeStats,
    /// Whatever the sink closure returned.
    pub sink:            T,
    /// Producer threads started.
    pub producers:       usize,
    /// Events the producers handed to the coordinator.  Equals
    /// `stats.emitted + stats.dropped`.
    pub producer_events: u64,
    pub elapsed:         Duration,
}

/// Fluent driver for a whole merge run.
///
/// The calling thread acts as the orchestrator: it starts one producer
/// thread per source, registers each stream, and closes registration after
/// the last one.  The coordinator and the sink run on their own scoped
/// threads.
///
/// In two-phase mode sources register in the order given.  In concurrent
/// mode the orchestrator first computes every source's first event, then
/// registers them by that start time with a start-time promise, so the
/// coordinator can drain early without dropping anything.
///
/// # Example
///
/// ```rust,ignore
/// let report = MergePipeline::new(config)
///     .cancel_token(source.token())
///     .run(simulations, |merged| drain_into(merged, &mut sink, &cancel))?;
/// println!("{} events", report.stats.emitted);
/// ```
pub struct MergePipeline {
    config: MergeConfig,
    cancel: CancelToken,
}

impl MergePipeline {
    pub fn new(config: MergeConfig) -> Self {
        Self { config, cancel: CancelToken::never() }
    }

    /// Token honored by the producers and the coordinator.  The sink closure
    /// should observe the same token.
    pub fn cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Run without an observer.
    pub fn run<I, S, F, T>(&self, sources: I, sink: F) -> MergeResult<RunReport<T>>
    where
        I: IntoIterator<Item = S>,
        S: EventSource,
        F: FnOnce(EventReceiver) -> T + Send,
        T: Send,
    {
        self.run_observed(sources, sink, &mut NoopObserver)
    }

    /// Run with `observer` receiving the coordinator's callbacks.
    pub fn run_observed<I, S, F, T, O>(
        &self,
        sources:  I,
        sink:     F,
        observer: &mut O,
    ) -> MergeResult<RunReport<T>>
    where
        I: IntoIterator<Item = S>,
        S: EventSource,
        F: FnOnce(EventReceiver) -> T + Send,
        T: Send,
        O: MergeObserver + Send,
    {
        let started = Instant::now();
        let (registrar, registrations) = registration_channel();
        let (merged_tx, merged_rx) = event_channel();
        let coordinator = Coordinator::new(registrations, merged_tx, self.config.clone())
            .with_cancel(self.cancel.clone());

        thread::scope(|scope| {
            let merge = thread::Builder::new()
                .name("coordinator".into())
                .spawn_scoped(scope, move || coordinator.run(observer))
                .map_err(|source| MergeError::Spawn { what: "coordinator", source })?;

            let sink = thread::Builder::new()
                .name("sink".into())
                .spawn_scoped(scope, move || sink(merged_rx))
                .map_err(|source| MergeError::Spawn { what: "sink", source })?;

            let sources = sources.into_iter().enumerate();
            let producers = match self.config.mode {
                MergeMode::TwoPhase => {
                    self.register_all(&registrar, sources.map(|(i, source)| (i, source, None)))
                }
                MergeMode::Concurrent => {
                    let mut primed: Vec<_> =
                        sources.map(|(i, source)| (i, Primed::new(source))).collect();
                    // Stable: equal start times keep their given order.
                    primed.sort_by_key(|(_, source)| source.start());
                    self.register_all(
                        &registrar,
                        primed.into_iter().map(|(i, source)| {
                            let start = source.start();
                            (i, source, start)
                        }),
                    )
                }
            };
            registrar.close();

            let merged = merge.join().map_err(|_| MergeError::Panicked("coordinator"))?;
            let sink_out = sink.join().map_err(|_| MergeError::Panicked("sink"))?;
            let stats = merged?;

            // Every stream has closed, so every producer is ending.
            let mut producer_events = 0;
            let started_producers = producers.len();
            for handle in producers {
                let report = handle.join()?;
                if report.outcome != ProducerOutcome::Finished {
                    warn!(outcome = ?report.outcome, sent = report.sent, "producer did not finish");
                }
                producer_events += report.sent;
            }

            let elapsed = started.elapsed();
            info!(
                producers = started_producers,
                events    = stats.emitted,
                elapsed_ms = elapsed.as_millis() as u64,
                "run complete"
            );

            Ok(RunReport {
                stats,
                sink: sink_out,
                producers: started_producers,
                producer_events,
                elapsed,
            })
        })
    }

    /// Register `(index, source, start)` triples in order.  Stops at the
    /// first rejection; the coordinator's own error says why.
    fn register_all<S, I>(&self, registrar: &Registrar, sources: I) -> Vec<ProducerHandle>
    where
        S: EventSource,
        I: Iterator<Item = (usize, S, Option<SimTime>)>,
    {
        let mut producers = Vec::new();
        for (i, source, start) in sources {
            let name = format!("producer-{i}");
            match registrar.register_source_with(name, source, start, &self.cancel) {
                Ok(handle) => producers.push(handle),
                Err(e) => {
                    warn!(error = %e, registered = producers.len(), "registration stopped early");
                    break;
                }
            }
        }
        producers
    }
}

// ── Primed ────────────────────────────────────────────────────────────────────

/// A source whose first event was computed up front.
struct Primed<S> {
    first: Option<Event>,
    rest:  S,
}

impl<S: EventSource> Primed<S> {
    fn new(mut source: S) -> Self {
        Self { first: source.next_event(), rest: source }
    }

    /// Time of the first event.  `None` for an empty source, which sorts
    /// ahead of every start time.
    fn start(&self) -> Option<SimTime> {
        self.first.as_ref().map(|e| e.time)
    }
}

impl<S: EventSource> Iterator for Primed<S> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        self.first.take().or_else(|| self.rest.next_event())
    }
}
