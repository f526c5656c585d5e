// core/src/workload.rs
//! Demo and bulk task generation. Only talks to the scheduler through
//! `submit`.
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::str::FromStr;

use crate::error::SchedulerError;
use crate::scheduler::Scheduler;
use crate::utils::models::{TaskCategory, TaskDescriptor, TaskId};

const DEMO_TEMPLATES: [(&str, u8, u32, u32); 7] = [
    ("DataProcess-1", 2, 45, 512),
    ("Analytics-1", 3, 60, 768),
    ("Backup-1", 1, 30, 256),
    ("Report-1", 2, 50, 512),
    ("Compute-1", 3, 75, 1024),
    ("Search-1", 2, 55, 640),
    ("Sync-1", 1, 25, 128),
];

/// The fixed demo set: arrival 0, deadline 10, categories in rotation.
pub fn demo_descriptors() -> Vec<TaskDescriptor> {
    DEMO_TEMPLATES
        .iter()
        .enumerate()
        .map(|(index, &(name, priority, cpu, ram))| {
            TaskDescriptor::new(name)
                .with_priority(priority)
                .with_cpu(cpu)
                .with_ram(ram)
                .with_arrival(0.0)
                .with_deadline(10.0)
                .with_category(TaskCategory::ALL[index % TaskCategory::ALL.len()])
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WorkloadPattern {
    #[default]
    Normal,
    Burst,
    Heavy,
}

impl FromStr for WorkloadPattern {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(WorkloadPattern::Normal),
            "burst" => Ok(WorkloadPattern::Burst),
            "heavy" => Ok(WorkloadPattern::Heavy),
            other => Err(SchedulerError::UnknownPattern(other.to_string())),
        }
    }
}

impl fmt::Display for WorkloadPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkloadPattern::Normal => f.write_str("normal"),
            WorkloadPattern::Burst => f.write_str("burst"),
            WorkloadPattern::Heavy => f.write_str("heavy"),
        }
    }
}

pub struct WorkloadGenerator {
    rng: StdRng,
}

impl WorkloadGenerator {
    /// Seeded generators are reproducible; `None` seeds from entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        WorkloadGenerator { rng }
    }

    fn sample(&mut self, pattern: WorkloadPattern) -> (u8, u32, u32) {
        let rng = &mut self.rng;
        match pattern {
            WorkloadPattern::Normal => (
                rng.gen_range(1..=4),
                rng.gen_range(40.0..80.0_f64).round() as u32,
                rng.gen_range(400.0..700.0_f64).round() as u32,
            ),
            WorkloadPattern::Burst => (
                if rng.gen_bool(0.7) { 4 } else { rng.gen_range(1..=3) },
                if rng.gen_bool(0.5) { 80 } else { 30 },
                if rng.gen_bool(0.5) { 1500 } else { 400 },
            ),
            WorkloadPattern::Heavy => (
                rng.gen_range(3..=4),
                rng.gen_range(70.0..100.0_f64).round() as u32,
                rng.gen_range(1000.0..2000.0_f64).round() as u32,
            ),
        }
    }

    /// `first_index` numbers the generated names: Task-<first_index>, ...
    pub fn generate(&mut self, count: usize, pattern: WorkloadPattern, first_index: u64) -> Vec<TaskDescriptor> {
        (0..count as u64)
            .map(|offset| {
                let (priority, cpu, ram) = self.sample(pattern);
                let deadline = 10.0 + self.rng.gen_range(0.0..10.0);
                let category = TaskCategory::ALL[self.rng.gen_range(0..TaskCategory::ALL.len())];
                TaskDescriptor::new(format!("Task-{}", first_index + offset))
                    .with_priority(priority)
                    .with_cpu(cpu)
                    .with_ram(ram)
                    .with_arrival(0.0)
                    .with_deadline(deadline)
                    .with_category(category)
            })
            .collect()
    }

    /// Generates `count` tasks and submits them; returns their ids in order.
    pub fn submit_bulk(&mut self, scheduler: &mut Scheduler, count: usize, pattern: WorkloadPattern) -> Vec<TaskId> {
        let descriptors = self.generate(count, pattern, scheduler.next_task_id());
        log::info!("Submitting {} generated '{}' tasks", count, pattern);
        descriptors
            .into_iter()
            .map(|descriptor| scheduler.submit(descriptor).id)
            .collect()
    }
}
