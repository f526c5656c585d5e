use colored::*;

use cloudsched_core::utils::format_clock;
use cloudsched_core::{
    AdmissionStall, Metrics, MetricsHistory, Scheduler, ServerSnapshot, ServerStatus, StepReport,
};

fn status_label(status: ServerStatus) -> ColoredString {
    match status {
        ServerStatus::Normal => "normal".green(),
        ServerStatus::Warning => "warning".yellow(),
        ServerStatus::Danger => "danger".red(),
    }
}

pub fn print_metrics(metrics: &Metrics) {
    println!("{}", "Metrics".bold().underline());
    println!("  {:<18} {}", "Simulated time:".green(), format_clock(metrics.current_time));
    println!("  {:<18} {}", "Submitted:".green(), metrics.total_submitted);
    println!("  {:<18} {}", "Completed:".green(), metrics.total_completed.to_string().cyan());
    println!("  {:<18} {}", "Pending:".green(), metrics.pending_count.to_string().yellow());
    println!("  {:<18} {:.2}", "Avg wait time:".green(), metrics.avg_wait_time);
    println!("  {:<18} {:.2}", "Throughput:".green(), metrics.throughput);
    println!("  {:<18} {:.2}", "Avg turnaround:".green(), metrics.avg_turnaround_time);
    println!("  {:<18} {:.2}", "Avg load:".green(), metrics.avg_load);
}

pub fn print_servers(servers: &[ServerSnapshot]) {
    println!(
        "{:<12} {:<9} {:>6} {:>6} {:>6} {:<9} {:>8} {:>10}",
        "Server".bold().underline(),
        "Status".bold().underline(),
        "Load".bold().underline(),
        "CPU%".bold().underline(),
        "RAM%".bold().underline(),
        "Running".bold().underline(),
        "Backlog".bold().underline(),
        "Processed".bold().underline()
    );
    println!("{}", "-".repeat(74));
    for server in servers {
        println!(
            "{:<12} {:<9} {:>6.2} {:>6.1} {:>6.1} {:<9} {:>8} {:>10}",
            server.name.cyan(),
            status_label(server.status),
            server.load,
            server.cpu_usage,
            server.ram_usage,
            server.running_task.map_or_else(|| "-".to_string(), |id| id.to_string()),
            server.backlog_len,
            server.total_processed
        );
    }
}

pub fn print_timeline(scheduler: &Scheduler) {
    println!("{}", "Completed timeline".bold().underline());
    let mut any = false;
    for task in scheduler.completed_tasks() {
        any = true;
        println!(
            "  #{:<4} {:<16} {:<8} arrival {:>7.2}  start {:>7.2}  end {:>7.2}  turnaround {:>6.2}",
            task.id,
            task.name,
            task.category.to_string().magenta(),
            task.arrival_time,
            task.start_time.unwrap_or_default(),
            task.end_time.unwrap_or_default(),
            task.turnaround_time()
        );
    }
    if !any {
        println!("  {}", "(no completed tasks)".italic());
    }
}

pub fn print_history(history: &MetricsHistory) {
    if history.is_empty() {
        return;
    }
    println!("{}", "Recent samples".bold().underline());
    for sample in history.samples() {
        let loads = sample
            .server_loads
            .iter()
            .map(|l| format!("{:.2}", l))
            .collect::<Vec<_>>()
            .join(" ");
        println!(
            "  {} wait {:>6.2}  tput {:>5.2}  turnaround {:>6.2}  loads [{}]",
            format_clock(sample.time),
            sample.avg_wait_time,
            sample.throughput,
            sample.avg_turnaround_time,
            loads
        );
    }
}

pub fn describe_stall(stall: &AdmissionStall) -> String {
    match stall {
        AdmissionStall::EmptyPool => "server pool is empty".to_string(),
        AdmissionStall::AwaitingArrival { task_id, arrival_time } => {
            format!("task {} arrives at {:.2}", task_id, arrival_time)
        }
    }
}

pub fn tick_line(report: &StepReport, metrics: &Metrics) -> String {
    let mut line = format!(
        "{} {} admitted={} completed={} promoted={} | {}",
        "[TICK]".blue(),
        format_clock(report.time),
        report.admitted.len(),
        report.completed.len(),
        report.promoted.len(),
        metrics
    );
    if let Some(stall) = &report.stall {
        line.push_str(&format!(" {}", format!("(blocked: {})", describe_stall(stall)).yellow()));
    }
    line
}
