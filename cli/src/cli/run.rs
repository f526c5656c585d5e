use anyhow::{anyhow, Context, Result};
use colored::*;
use structopt::StructOpt;

use cloudsched_core::{AdmissionStall, MetricsHistory, MetricsSample};

use crate::cli::{init_logging, render, SimOptions};

#[derive(StructOpt, Debug)]
pub struct RunCommand {
    #[structopt(flatten)]
    options: SimOptions,

    /// Print the final metrics as JSON instead of tables
    #[structopt(long)]
    json: bool,

    /// Also print the completed-task timeline
    #[structopt(long)]
    timeline: bool,
}

impl RunCommand {
    pub fn execute(self) -> Result<()> {
        let config = self.options.resolve_config()?;
        init_logging(&config)?;
        let mut scheduler = self.options.build_scheduler(&config)?;

        if scheduler.pending_len() == 0 {
            println!("{} No tasks to simulate. Use --tasks, --demo or --bulk.", "[INFO]".blue());
            return Ok(());
        }

        let mut history = MetricsHistory::new(config.history_window);
        let mut steps = 0u64;
        let mut last_stall: Option<AdmissionStall> = None;

        while steps < config.max_steps && !scheduler.is_drained() {
            let report = scheduler.step(config.time_step);
            steps += 1;
            history.record(MetricsSample::capture(&scheduler.metrics(), scheduler.servers()));

            if report.stall != last_stall {
                if let Some(stall) = &report.stall {
                    println!("{} t={:.2} admission blocked: {}", "[WARN]".yellow(), report.time, render::describe_stall(stall));
                }
                last_stall = report.stall;
            }
            if report.stall == Some(AdmissionStall::EmptyPool) {
                break;
            }
        }

        let metrics = scheduler.metrics();
        if self.json {
            let out = serde_json::json!({
                "steps": steps,
                "policy": config.policy.to_string(),
                "metrics": metrics,
                "servers": scheduler.server_snapshots(),
            });
            println!("{}", serde_json::to_string_pretty(&out).context("Failed to encode report")?);
        } else {
            println!(
                "{} Ran {} steps of {} with policy {}",
                "[SUCCESS]".green(),
                steps,
                config.time_step,
                config.policy.to_string().cyan()
            );
            render::print_metrics(&metrics);
            println!();
            render::print_servers(&scheduler.server_snapshots());
            println!();
            render::print_history(&history);
            if self.timeline {
                println!();
                render::print_timeline(&scheduler);
            }
        }

        if !scheduler.is_drained() {
            return Err(anyhow!(
                "{} Simulation stopped after {} steps before draining ({} tasks still pending)",
                "[ERROR]".red(),
                steps,
                metrics.pending_count
            ));
        }
        Ok(())
    }
}
