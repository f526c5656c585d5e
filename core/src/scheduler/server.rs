// core/src/scheduler/server.rs
use std::collections::VecDeque;

use crate::utils::models::{ServerSnapshot, ServerStatus, TaskId, TaskMeta};
use crate::utils::SERVER_MEMORY_CAPACITY_MB;

/// One simulated compute node. Holds task ids only; task records live in
/// the scheduler's arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Server {
    pub id: usize,
    pub name: String,
    pub running: Option<TaskId>,
    pub backlog: VecDeque<TaskId>,
    pub cpu_usage: f64, // 0-100
    pub ram_usage: f64, // 0-100
    pub total_processed: u64,
}

impl Server {
    pub fn new(id: usize) -> Self {
        Server {
            id,
            name: format!("Server {}", id),
            running: None,
            backlog: VecDeque::new(),
            cpu_usage: 0.0,
            ram_usage: 0.0,
            total_processed: 0,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.running.is_none() && self.backlog.is_empty()
    }

    /// Recomputes usage from the task currently in the running slot.
    pub fn apply_usage(&mut self, task: &TaskMeta) {
        self.cpu_usage = task.cpu as f64;
        self.ram_usage = ((task.ram_mb as f64 / SERVER_MEMORY_CAPACITY_MB) * 100.0).min(100.0);
    }

    pub fn clear_usage(&mut self) {
        self.cpu_usage = 0.0;
        self.ram_usage = 0.0;
    }

    /// Back to the freshly-initialised state; id and name are kept.
    pub fn reset(&mut self) {
        self.running = None;
        self.backlog.clear();
        self.clear_usage();
        self.total_processed = 0;
    }

    pub fn snapshot(&self) -> ServerSnapshot {
        ServerSnapshot {
            id: self.id,
            name: self.name.clone(),
            status: status(self),
            load: load(self),
            cpu_usage: self.cpu_usage,
            ram_usage: self.ram_usage,
            running_task: self.running,
            backlog_len: self.backlog.len(),
            total_processed: self.total_processed,
        }
    }
}

/// Average of the cpu and memory usage fractions.
pub fn load(server: &Server) -> f64 {
    (server.cpu_usage / 100.0 + server.ram_usage / 100.0) / 2.0
}

pub fn status(server: &Server) -> ServerStatus {
    classify_load(load(server))
}

pub fn classify_load(load: f64) -> ServerStatus {
    if load > 0.8 {
        ServerStatus::Danger
    } else if load > 0.5 {
        ServerStatus::Warning
    } else {
        ServerStatus::Normal
    }
}
