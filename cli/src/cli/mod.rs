mod render;
mod run;
mod submit;
mod validate;
mod watch;

use anyhow::{Context, Result};
use std::{env, path::Path};
use structopt::{clap::AppSettings, StructOpt};

use cloudsched_core::utils::logging;
use cloudsched_core::workload::{demo_descriptors, WorkloadGenerator, WorkloadPattern};
use cloudsched_core::{PlacementPolicy, Scheduler, SimConfig};

use self::{run::RunCommand, validate::ValidateCommand, watch::WatchCommand};

const DEFAULT_CONFIG_FILE: &str = "cloudsched.json";

#[derive(StructOpt, Debug)]
#[structopt(
    name = "cloudsched",
    about = "Discrete-time cluster scheduling simulator",
    global_settings = &[AppSettings::DisableHelpSubcommand]
)]
pub enum AppCommand {
    /// Run a simulation to completion and print a report
    #[structopt(name = "run")]
    Run(RunCommand),

    /// Step the simulation on a wall-clock timer, printing metrics per tick
    #[structopt(name = "watch")]
    Watch(WatchCommand),

    /// Check a task file without running anything
    #[structopt(name = "validate")]
    Validate(ValidateCommand),
}

impl AppCommand {
    pub fn execute(self) -> Result<()> {
        match self {
            AppCommand::Run(cmd) => cmd.execute(),
            AppCommand::Watch(cmd) => cmd.execute(),
            AppCommand::Validate(cmd) => cmd.execute(),
        }
    }
}

/// Options shared by `run` and `watch`. Flags override the config file.
#[derive(StructOpt, Debug)]
pub struct SimOptions {
    /// Path to a JSON config file (default: ./cloudsched.json if present)
    #[structopt(long)]
    config: Option<String>,

    /// Number of servers in the pool
    #[structopt(long)]
    servers: Option<usize>,

    /// Placement policy: round-robin | least-loaded
    #[structopt(long)]
    policy: Option<PlacementPolicy>,

    /// Simulated time a task occupies a server once started
    #[structopt(long)]
    quantum: Option<f64>,

    /// Simulated time advanced per step
    #[structopt(long = "dt")]
    time_step: Option<f64>,

    /// Upper bound on the number of steps
    #[structopt(long)]
    max_steps: Option<u64>,

    /// JSON file with an array of task descriptors
    #[structopt(long)]
    tasks: Option<String>,

    /// Add the built-in demo tasks
    #[structopt(long)]
    demo: bool,

    /// Add N generated tasks
    #[structopt(long)]
    bulk: Option<usize>,

    /// Pattern for generated tasks: normal | burst | heavy
    #[structopt(long, default_value = "normal")]
    pattern: WorkloadPattern,

    /// Seed for generated tasks
    #[structopt(long)]
    seed: Option<u64>,

    /// Log level override (trace, debug, info, warn, error)
    #[structopt(long)]
    log_level: Option<String>,
}

impl SimOptions {
    /// Loads the config file (explicit path, or the default file when it
    /// exists) and applies flag overrides.
    pub fn resolve_config(&self) -> Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => SimConfig::from_file(Path::new(path))
                .with_context(|| format!("Failed to load config file: {}", path))?,
            None => {
                let default_path = env::current_dir()
                    .context("Failed to get current directory")?
                    .join(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    SimConfig::from_file(&default_path).with_context(|| {
                        format!("Failed to load config file: {}", default_path.display())
                    })?
                } else {
                    SimConfig::default()
                }
            }
        };

        if let Some(servers) = self.servers {
            config.servers = servers;
        }
        if let Some(policy) = self.policy {
            config.policy = policy;
        }
        if let Some(quantum) = self.quantum {
            config.base_quantum = quantum;
        }
        if let Some(dt) = self.time_step {
            config.time_step = dt;
        }
        if let Some(max_steps) = self.max_steps {
            config.max_steps = max_steps;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        config.validate().context("Invalid simulation settings")?;
        Ok(config)
    }

    /// Builds the scheduler and submits the requested workload.
    pub fn build_scheduler(&self, config: &SimConfig) -> Result<Scheduler> {
        let mut scheduler = Scheduler::from_config(config);

        if let Some(path) = &self.tasks {
            let accepted = submit::load_task_file(Path::new(path))?;
            for descriptor in accepted {
                scheduler.submit(descriptor);
            }
        }
        if self.demo {
            for descriptor in demo_descriptors() {
                scheduler.submit(descriptor);
            }
        }
        if let Some(count) = self.bulk {
            WorkloadGenerator::new(self.seed).submit_bulk(&mut scheduler, count, self.pattern);
        }

        log::info!(
            "Scheduler ready: {} servers, policy {}, {} tasks pending",
            config.servers,
            config.policy,
            scheduler.pending_len()
        );
        Ok(scheduler)
    }
}

pub fn init_logging(config: &SimConfig) -> Result<()> {
    logging::init(logging::parse_level(&config.log_level), config.log_path.as_deref())
        .context("Failed to initialize logger")
}
