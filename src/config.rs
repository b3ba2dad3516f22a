//! Simulator configuration.
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. built-in defaults
//! 2. an optional TOML file plus `CARDIO_*` environment variables
//! 3. command-line flags
//!
//! ```toml
//! patient_count = 20
//! interval = "500ms"
//! output = "file:./output"
//! seed = 42
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use config::{Config, Environment, File};
use serde::{Deserialize, Deserializer};

use crate::duration::parse_duration;
use crate::output::OutputSpec;

/// Command-line arguments for `cardio-sim`.
#[derive(Parser, Debug, Default)]
#[command(name = "cardio-sim")]
#[command(about = "Simulate patient vital-sign readings and deliver them to an output")]
pub struct Args {
    /// Optional TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of simulated patients (IDs 1..=N)
    #[arg(short, long)]
    pub patient_count: Option<u32>,

    /// Time between ticks for each patient (e.g. "1s", "250ms")
    #[arg(short, long)]
    pub interval: Option<String>,

    /// Output: console, file:<dir>, tcp:<port> or websocket:<port>
    #[arg(short, long)]
    pub output: Option<OutputSpec>,

    /// Seed for a reproducible run
    #[arg(short, long)]
    pub seed: Option<u64>,
}

/// Resolved simulator settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Number of simulated patients.
    pub patient_count: u32,

    /// Time between ticks for each patient.
    #[serde(deserialize_with = "deserialize_duration")]
    pub interval: Duration,

    /// Where readings go.
    pub output: OutputSpec,

    /// Seed for the random source; `None` uses thread-local randomness.
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            patient_count: 50,
            interval: Duration::from_secs(1),
            output: OutputSpec::Console,
            seed: None,
        }
    }
}

impl SimulatorConfig {
    /// Load from the config file named in `args` (if any) and the environment,
    /// then apply command-line overrides.
    pub fn load(args: &Args) -> Result<Self> {
        let mut config = Self::from_sources(args.config.as_deref())?;
        config.apply_args(args)?;
        Ok(config)
    }

    /// Load from an optional file plus `CARDIO_*` environment variables.
    pub fn from_sources(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(Environment::with_prefix("CARDIO").try_parsing(true))
            .build()
            .context("loading simulator config")?;

        config
            .try_deserialize()
            .context("parsing simulator config")
    }

    /// Override settings with any flags given on the command line.
    pub fn apply_args(&mut self, args: &Args) -> Result<()> {
        if let Some(count) = args.patient_count {
            self.patient_count = count;
        }
        if let Some(ref interval) = args.interval {
            self.interval = parse_duration(interval)?;
        }
        if let Some(ref output) = args.output {
            self.output = output.clone();
        }
        if args.seed.is_some() {
            self.seed = args.seed;
        }
        Ok(())
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_duration(&s).map_err(serde::de::Error::custom)
}
