//! plan-merge — merge every person's day plan into one time-ordered event
//! stream.
//!
//! Each plan runs as its own producer thread, walking its activities and
//! emitting `actEnd`/`actStart` events.  The coordinator merges them by time
//! and the sink writes the result as XML, CSV, JSON lines or SQLite.
//!
//! ```text
//! plan-merge --plans data/plans.csv                     # XML on stdout
//! plan-merge --synthetic 10000 --output events.csv      # format from extension
//! plan-merge --config config/default.toml --concurrent
//! ```
//!
//! Logs go to stderr; `RUST_LOG` overrides `[logging] level`.

mod config;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pm_core::{MergeMode, OrderPolicy, PlanSelection, ProducerId, SimTime};
use pm_merge::{CancelToken, MergeObserver, MergePipeline};
use pm_output::{SinkKind, drain_into, open_sink};
use pm_plan::{Population, SyntheticPopulation, load_population_csv, simulate};

use config::{AppConfig, InputConfig};

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "plan-merge", version, about)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Plans CSV (person_id,plan,selected,act_type,link,end_time,dur)
    #[arg(long, conflicts_with = "synthetic")]
    plans: Option<PathBuf>,

    /// Generate this many synthetic persons instead of reading a file
    #[arg(long)]
    synthetic: Option<usize>,

    /// Seed for the synthetic population
    #[arg(long)]
    seed: Option<u64>,

    /// Output format: xml, csv, jsonl or sqlite
    #[arg(short, long)]
    format: Option<SinkKind>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Start emitting while producers are still registering (lossless)
    #[arg(long)]
    concurrent: bool,

    /// Abort on an out-of-order event instead of dropping it
    #[arg(long)]
    strict: bool,

    /// Simulate only each person's selected plan
    #[arg(long)]
    selected_only: bool,

    /// Fail if any single wait takes longer than this
    #[arg(long, value_name = "MS")]
    stall_timeout_ms: Option<u64>,

    /// Fail if the whole merge takes longer than this
    #[arg(long, value_name = "MS")]
    run_timeout_ms: Option<u64>,
}

impl Args {
    /// Overlay the flags that were given onto `config`.
    fn apply(self, config: &mut AppConfig) {
        if let Some(plans) = self.plans {
            config.input.plans = Some(plans);
            config.input.synthetic = None;
        }
        if let Some(n) = self.synthetic {
            config.input.synthetic = Some(n);
            config.input.plans = None;
        }
        if let Some(seed) = self.seed {
            config.input.seed = seed;
        }
        if self.format.is_some() {
            config.output.format = self.format;
        }
        if self.output.is_some() {
            config.output.path = self.output;
        }
        if self.concurrent {
            config.merge.mode = MergeMode::Concurrent;
        }
        if self.strict {
            config.merge.order_policy = OrderPolicy::Fail;
        }
        if self.selected_only {
            config.merge.plan_selection = PlanSelection::SelectedOnly;
        }
        if self.stall_timeout_ms.is_some() {
            config.merge.stall_timeout_ms = self.stall_timeout_ms;
        }
        if self.run_timeout_ms.is_some() {
            config.merge.run_timeout_ms = self.run_timeout_ms;
        }
    }
}

// ── Progress observer ─────────────────────────────────────────────────────────

/// Logs a line every `every` merged events.
struct Progress {
    every:   u64,
    emitted: u64,
    started: Instant,
}

impl MergeObserver for Progress {
    fn on_emit(&mut self, _producer: ProducerId, time: SimTime) {
        self.emitted += 1;
        if self.emitted % self.every == 0 {
            info!(
                events     = self.emitted,
                sim_time   = %time,
                elapsed_ms = self.started.elapsed().as_millis() as u64,
                "progress"
            );
        }
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    args.apply(&mut config);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    config.validate()?;
    info!(
        mode     = ?config.merge.mode,
        policy   = ?config.merge.order_policy,
        plans    = ?config.merge.plan_selection,
        format   = %config.output.kind(),
        "plan-merge starting"
    );

    let population = load_population(&config.input)?;
    info!(
        persons = population.len(),
        plans   = population.plan_count(),
        "population loaded"
    );

    let kind = config.output.kind();
    let mut sink = open_sink(kind, config.output.path.as_deref())
        .with_context(|| format!("failed to open {kind} output"))?;

    let cancel = CancelToken::never();
    let pipeline = MergePipeline::new(config.merge.clone()).cancel_token(cancel.clone());
    let sources = population
        .producer_plans(config.merge.plan_selection)
        .into_iter()
        .map(|(person, plan)| simulate(plan.clone(), person));
    let sink_fn = |merged| drain_into(merged, &mut sink, &cancel);

    let report = match config.logging.progress_every {
        Some(every) => {
            let mut progress = Progress { every, emitted: 0, started: Instant::now() };
            pipeline.run_observed(sources, sink_fn, &mut progress)?
        }
        None => pipeline.run(sources, sink_fn)?,
    };
    let written = report.sink.context("writing merged events failed")?;

    info!(
        producers  = report.producers,
        empty      = report.stats.empty,
        events     = written.written,
        dropped    = report.stats.dropped,
        peak_heap  = report.stats.peak_heap,
        last_time  = ?written.last_time.map(SimTime::secs),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "done"
    );
    Ok(())
}

fn load_population(input: &InputConfig) -> Result<Population> {
    if let Some(path) = &input.plans {
        return load_population_csv(path)
            .with_context(|| format!("failed to load plans from {}", path.display()));
    }
    let persons = input.synthetic.unwrap_or_default();
    Ok(SyntheticPopulation::new(persons, input.seed)
        .links(input.links)
        .plans_per_person(input.plans_per_person)
        .errand_prob(input.errand_prob)
        .generate())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("plan-merge").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn flags_override_file_values() {
        let mut config = AppConfig::parse(
            "[input]\nplans = \"a.csv\"\n[output]\nformat = \"xml\"\n",
        )
        .unwrap();
        parse(&["--synthetic", "50", "--format", "csv", "--concurrent", "--strict"])
            .apply(&mut config);

        assert_eq!(config.input.synthetic, Some(50));
        assert_eq!(config.input.plans, None);
        assert_eq!(config.output.kind(), SinkKind::Csv);
        assert_eq!(config.merge.mode, MergeMode::Concurrent);
        assert_eq!(config.merge.order_policy, OrderPolicy::Fail);
    }

    #[test]
    fn plans_and_synthetic_conflict() {
        let argv = ["plan-merge", "--plans", "a.csv", "--synthetic", "3"];
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn bad_format_is_a_usage_error() {
        assert!(Args::try_parse_from(["plan-merge", "--format", "yaml"]).is_err());
    }

    #[test]
    fn sample_plans_load() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/plans.csv");
        let input = InputConfig { plans: Some(path), ..InputConfig::default() };
        let population = load_population(&input).unwrap();
        assert_eq!(population.len(), 4);
        assert_eq!(population.plan_count(), 5);
    }

    #[test]
    fn synthetic_population_is_seeded() {
        let input = InputConfig { synthetic: Some(20), ..InputConfig::default() };
        let a = load_population(&input).unwrap();
        let b = load_population(&input).unwrap();
        assert_eq!(a.len(), 20);
        assert_eq!(a.persons, b.persons);
    }
}
