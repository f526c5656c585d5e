// core/src/utils/models.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SchedulerError;

pub type TaskId = u64;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Pending,
    Queued,
    Running,
    Completed,
}

impl TaskState {
    /// Allowed moves: pending -> queued | running, queued -> running, running -> completed.
    pub fn can_transition_to(self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (TaskState::Pending, TaskState::Queued)
                | (TaskState::Pending, TaskState::Running)
                | (TaskState::Queued, TaskState::Running)
                | (TaskState::Running, TaskState::Completed)
        )
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::Pending => "pending",
            TaskState::Queued => "queued",
            TaskState::Running => "running",
            TaskState::Completed => "completed",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    #[default]
    Compute,
    Memory,
    Network,
    Mixed,
}

impl TaskCategory {
    pub const ALL: [TaskCategory; 4] = [
        TaskCategory::Compute,
        TaskCategory::Memory,
        TaskCategory::Network,
        TaskCategory::Mixed,
    ];
}

impl FromStr for TaskCategory {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compute" => Ok(TaskCategory::Compute),
            "memory" => Ok(TaskCategory::Memory),
            "network" => Ok(TaskCategory::Network),
            "mixed" => Ok(TaskCategory::Mixed),
            other => Err(SchedulerError::UnknownCategory(other.to_string())),
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskCategory::Compute => "compute",
            TaskCategory::Memory => "memory",
            TaskCategory::Network => "network",
            TaskCategory::Mixed => "mixed",
        };
        f.write_str(s)
    }
}

/// Already-validated request for a unit of simulated work.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TaskDescriptor {
    pub name: String,
    pub priority: u8,     // [1-4]
    pub cpu: u32,         // percent of one server, [1-100]
    pub ram_mb: u32,      // [100-4096]
    pub arrival_time: f64,
    pub deadline: f64,    // informational, never enforced
    pub category: TaskCategory,
}

impl TaskDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        TaskDescriptor {
            name: name.into(),
            ..TaskDescriptor::default()
        }
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_cpu(mut self, cpu: u32) -> Self {
        self.cpu = cpu;
        self
    }

    pub fn with_ram(mut self, ram_mb: u32) -> Self {
        self.ram_mb = ram_mb;
        self
    }

    pub fn with_arrival(mut self, arrival_time: f64) -> Self {
        self.arrival_time = arrival_time;
        self
    }

    pub fn with_deadline(mut self, deadline: f64) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_category(mut self, category: TaskCategory) -> Self {
        self.category = category;
        self
    }
}

impl Default for TaskDescriptor {
    fn default() -> Self {
        TaskDescriptor {
            name: String::new(),
            priority: 1,
            cpu: 50,
            ram_mb: 512,
            arrival_time: 0.0,
            deadline: 10.0,
            category: TaskCategory::Compute,
        }
    }
}

// 任务元数据: 描述符 + 运行时状态
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TaskMeta {
    pub id: TaskId,
    pub name: String,
    pub priority: u8,
    pub cpu: u32,
    pub ram_mb: u32,
    pub arrival_time: f64,
    pub deadline: f64,
    pub category: TaskCategory,
    pub state: TaskState,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    pub remaining_time: Option<f64>,
}

impl TaskMeta {
    pub fn from_descriptor(id: TaskId, descriptor: TaskDescriptor) -> Self {
        TaskMeta {
            id,
            name: descriptor.name,
            priority: descriptor.priority,
            cpu: descriptor.cpu,
            ram_mb: descriptor.ram_mb,
            arrival_time: descriptor.arrival_time,
            deadline: descriptor.deadline,
            category: descriptor.category,
            state: TaskState::Pending,
            start_time: None,
            end_time: None,
            remaining_time: None,
        }
    }

    /// Moves the task forward; regressions and skips are refused and logged.
    pub fn advance_to(&mut self, next: TaskState) -> bool {
        if self.state.can_transition_to(next) {
            self.state = next;
            true
        } else {
            log::warn!(
                "Refusing state change for task {} ('{}'): {} -> {}",
                self.id,
                self.name,
                self.state,
                next
            );
            false
        }
    }

    pub fn turnaround_time(&self) -> f64 {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => end - start,
            _ => 0.0,
        }
    }

    pub fn wait_time(&self) -> Option<f64> {
        self.start_time.map(|start| start - self.arrival_time)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Normal,
    Warning,
    Danger,
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServerStatus::Normal => "normal",
            ServerStatus::Warning => "warning",
            ServerStatus::Danger => "danger",
        };
        f.write_str(s)
    }
}

/// Read-only view of one server, for reporting.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ServerSnapshot {
    pub id: usize,
    pub name: String,
    pub status: ServerStatus,
    pub load: f64,
    pub cpu_usage: f64,
    pub ram_usage: f64,
    pub running_task: Option<TaskId>,
    pub backlog_len: usize,
    pub total_processed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_only_move_forward() {
        assert!(TaskState::Pending.can_transition_to(TaskState::Running));
        assert!(TaskState::Pending.can_transition_to(TaskState::Queued));
        assert!(TaskState::Queued.can_transition_to(TaskState::Running));
        assert!(TaskState::Running.can_transition_to(TaskState::Completed));

        assert!(!TaskState::Running.can_transition_to(TaskState::Queued));
        assert!(!TaskState::Completed.can_transition_to(TaskState::Running));
        assert!(!TaskState::Pending.can_transition_to(TaskState::Completed));
        assert!(!TaskState::Queued.can_transition_to(TaskState::Pending));
    }

    #[test]
    fn advance_to_refuses_regression() {
        let mut task = TaskMeta::from_descriptor(0, TaskDescriptor::new("t"));
        assert!(task.advance_to(TaskState::Running));
        assert!(!task.advance_to(TaskState::Queued));
        assert_eq!(task.state, TaskState::Running);
    }

    #[test]
    fn category_parsing() {
        assert_eq!("Network".parse::<TaskCategory>().unwrap(), TaskCategory::Network);
        assert!("gpu".parse::<TaskCategory>().is_err());
    }

    #[test]
    fn turnaround_requires_both_timestamps() {
        let mut task = TaskMeta::from_descriptor(1, TaskDescriptor::new("t").with_arrival(2.0));
        assert_eq!(task.turnaround_time(), 0.0);
        task.start_time = Some(3.0);
        task.end_time = Some(8.0);
        assert_eq!(task.turnaround_time(), 5.0);
        assert_eq!(task.wait_time(), Some(1.0));
    }
}
