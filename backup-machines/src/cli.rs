//! Command-line argument parsing for a binary built on this crate, wired
//! to [`Config::load`](crate::config::Config::load) and
//! [`WorkerPool::run`](crate::pool::WorkerPool::run).

use std::path::PathBuf;

use clap::Parser;

use crate::config::{Config, ConfigError};
use crate::core::Outcome;
use crate::pool::WorkerPool;

/// Run a declarative backup/restore pipeline.
#[derive(Debug, Parser)]
#[command(name = "backup-machines", version, about)]
pub struct Cli {
    /// Path to a YAML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Which pipeline to run, when a configuration file names several.
    #[arg(short, long, value_name = "NAME")]
    pub pipeline: Option<String>,

    /// Override the logging level (an `EnvFilter` directive string).
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Loads the configuration named by `--config`, or [`Config::default`]
    /// if absent. A binary calls this once, before [`init`](crate::logging::init)
    /// and before [`Cli::run`], since both need the result.
    pub fn load_config(&self) -> Result<Config, ConfigError> {
        match &self.config {
            Some(path) => Config::load(path),
            None => Ok(Config::default()),
        }
    }

    /// Builds a [`WorkerPool`] sized from `config`'s `worker_pool_size`
    /// entry for `--pipeline`, and runs `jobs` through it. A binary built
    /// on this crate supplies `jobs`, since only it knows which machine
    /// type(s) `--pipeline` should construct.
    pub fn run<F>(&self, config: &Config, jobs: Vec<F>) -> Vec<Outcome>
    where
        F: FnOnce() -> Vec<Outcome> + Send + 'static,
    {
        let pool = WorkerPool::new(config.worker_pool_size(self.pipeline.as_deref()));
        pool.run(jobs)
    }

    /// The `EnvFilter` directive string to install: `--log-level` if given,
    /// otherwise `config`'s `logging.level`.
    pub fn log_level(&self, config: &Config) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config.logging.level.clone())
    }
}
