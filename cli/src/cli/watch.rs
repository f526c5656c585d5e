use anyhow::{Context, Result};
use colored::*;
use structopt::StructOpt;
use tokio::sync::watch;

use cloudsched_core::{run_ticker, SharedScheduler, TickerOptions};

use crate::cli::{init_logging, render, SimOptions};

#[derive(StructOpt, Debug)]
pub struct WatchCommand {
    #[structopt(flatten)]
    options: SimOptions,

    /// Wall-clock milliseconds between steps (overrides tick-interval-ms)
    #[structopt(long)]
    interval_ms: Option<u64>,

    /// Keep ticking after the workload drains, until max-steps or Ctrl-C
    #[structopt(long)]
    keep_running: bool,
}

impl WatchCommand {
    pub fn execute(self) -> Result<()> {
        let mut config = self.options.resolve_config()?;
        if let Some(ms) = self.interval_ms {
            config.tick_interval_ms = ms;
        }
        config.validate().context("Invalid simulation settings")?;
        init_logging(&config)?;
        let scheduler = self.options.build_scheduler(&config)?;

        let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
        runtime.block_on(async move {
            let shared = SharedScheduler::new(scheduler);
            let (shutdown_tx, shutdown_rx) = watch::channel(false);

            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::info!("Ctrl-C received, stopping simulation.");
                    let _ = shutdown_tx.send(true);
                }
            });

            println!(
                "{} Stepping dt={} every {}ms with policy {} (Ctrl-C to stop)",
                "[INFO]".blue(),
                config.time_step,
                config.tick_interval_ms,
                config.policy.to_string().cyan()
            );

            let options = TickerOptions {
                time_step: config.time_step,
                interval: config.tick_interval(),
                max_steps: config.max_steps,
                history_window: config.history_window,
                stop_when_drained: !self.keep_running,
            };
            let history = run_ticker(shared.clone(), options, shutdown_rx, |report, metrics| {
                println!("{}", render::tick_line(report, metrics));
            })
            .await;

            println!();
            render::print_metrics(&shared.metrics().await);
            println!();
            render::print_servers(&shared.server_snapshots().await);
            println!();
            render::print_history(&history);
        });
        Ok(())
    }
}
