//! TOML configuration for the plan-merge binary.
//!
//! Every table and key is optional; a missing file section falls back to the
//! defaults below.  Command-line flags override file values.
//!
//! ```toml
//! [merge]
//! mode             = "two_phase"   # or "concurrent"
//! order_policy     = "drop"        # or "fail"
//! plan_selection   = "all"         # or "selected_only"
//! stall_timeout_ms = 30000
//!
//! [input]
//! plans = "data/plans.csv"         # or: synthetic = 10000
//!
//! [output]
//! format = "xml"
//! path   = "events.xml"            # stdout when omitted
//!
//! [logging]
//! level          = "info"          # RUST_LOG takes precedence
//! progress_every = 100000
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use pm_core::MergeConfig;
use pm_output::SinkKind;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub merge:   MergeConfig,
    pub input:   InputConfig,
    pub output:  OutputConfig,
    pub logging: LoggingConfig,
}

/// Where the population comes from.  Exactly one of `plans` or `synthetic`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Plans CSV file.
    pub plans:            Option<PathBuf>,
    /// Number of persons to generate instead of loading a file.
    pub synthetic:        Option<usize>,
    pub seed:             u64,
    pub plans_per_person: usize,
    pub links:            u32,
    pub errand_prob:      f64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            plans:            None,
            synthetic:        None,
            seed:             42,
            plans_per_person: 1,
            links:            100,
            errand_prob:      0.3,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Sink format; guessed from `path`'s extension when omitted, else XML.
    pub format: Option<SinkKind>,
    pub path:   Option<PathBuf>,
}

impl OutputConfig {
    pub fn kind(&self) -> SinkKind {
        self.format
            .or_else(|| self.path.as_deref().and_then(SinkKind::from_extension))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level:          String,
    /// Log a progress line every this many merged events.
    pub progress_every: Option<u64>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".into(), progress_every: None }
    }
}

impl AppConfig {
    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Check cross-field constraints after flags have been applied.
    pub fn validate(&self) -> Result<()> {
        self.merge.validate()?;
        match (&self.input.plans, self.input.synthetic) {
            (Some(_), Some(_)) => bail!("set either input.plans or input.synthetic, not both"),
            (None, None) => bail!("no input: pass --plans <csv> or --synthetic <n>"),
            _ => {}
        }
        if self.output.kind() == SinkKind::Sqlite && self.output.path.is_none() {
            bail!("sqlite output needs --output <path>");
        }
        if self.logging.progress_every == Some(0) {
            bail!("logging.progress_every must be positive");
        }
        Ok(())
    }
}
