// core/src/scheduler/mod.rs
pub mod metrics;
pub mod policy;
pub mod server;
pub mod shared;

use log::{debug, info, warn};
use std::collections::{HashMap, VecDeque};

use crate::utils::config::SimConfig;
use crate::utils::models::{ServerSnapshot, TaskDescriptor, TaskId, TaskMeta, TaskState};
use crate::utils::DEFAULT_BASE_QUANTUM;
use metrics::Metrics;
use policy::{select_server, PlacementPolicy};
use server::Server;

// Countdown slack for accumulated float error from fractional time steps.
const COMPLETION_EPSILON: f64 = 1e-9;

/// Where a task currently lives. Every known task is in exactly one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskLocation {
    Pending,
    Running { server: usize },
    Backlog { server: usize },
    Completed,
}

/// Why admission stopped before the pending queue was empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdmissionStall {
    /// No servers to place onto.
    EmptyPool,
    /// The queue head has not arrived yet and blocks everything behind it.
    AwaitingArrival { task_id: TaskId, arrival_time: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub task_id: TaskId,
    pub server: usize,
    /// true when the task went straight into the running slot
    pub started: bool,
}

/// What happened during one call to [`Scheduler::step`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    pub time: f64,
    pub admitted: Vec<Placement>,
    pub completed: Vec<TaskId>,
    pub promoted: Vec<Placement>,
    pub stall: Option<AdmissionStall>,
}

/// Discrete-time cluster scheduler.
///
/// Task records are stored once, in an arena keyed by id; the pending
/// queue, server slots, backlogs and completed history only hold ids.
#[derive(Debug, Clone)]
pub struct Scheduler {
    servers: Vec<Server>,
    tasks: HashMap<TaskId, TaskMeta>,
    pending: VecDeque<TaskId>,
    completed: Vec<TaskId>,
    current_time: f64,
    policy: PlacementPolicy,
    base_quantum: f64,
    next_task_id: TaskId,
    submitted_since_reset: u64,
}

impl Scheduler {
    pub fn new(server_count: usize, policy: PlacementPolicy) -> Self {
        Scheduler::with_quantum(server_count, policy, DEFAULT_BASE_QUANTUM)
    }

    pub fn with_quantum(server_count: usize, policy: PlacementPolicy, base_quantum: f64) -> Self {
        info!(
            "Initialising scheduler: {} servers, policy {}, quantum {}",
            server_count, policy, base_quantum
        );
        Scheduler {
            servers: (0..server_count).map(Server::new).collect(),
            tasks: HashMap::new(),
            pending: VecDeque::new(),
            completed: Vec::new(),
            current_time: 0.0,
            policy,
            base_quantum,
            next_task_id: 0,
            submitted_since_reset: 0,
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Scheduler::with_quantum(config.servers, config.policy, config.base_quantum)
    }

    // --- Submission ---

    /// Queues a task at the back of the pending queue. No validation here.
    pub fn submit(&mut self, descriptor: TaskDescriptor) -> &TaskMeta {
        let id = self.next_task_id;
        self.next_task_id += 1;
        self.submitted_since_reset += 1;

        let task = TaskMeta::from_descriptor(id, descriptor);
        debug!(
            "Submitted task {} ('{}'): cpu={} ram={}MB arrival={}",
            id, task.name, task.cpu, task.ram_mb, task.arrival_time
        );
        self.pending.push_back(id);
        self.tasks.entry(id).or_insert(task)
    }

    // --- Time advancement ---

    /// Advances the clock by `dt`, admits what can be admitted, then runs
    /// every busy server for `dt`.
    pub fn step(&mut self, dt: f64) -> StepReport {
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            warn!("Ignoring invalid time step {}; clock not advanced", dt);
            0.0
        };
        self.current_time += dt;

        let mut report = StepReport { time: self.current_time, ..StepReport::default() };
        report.stall = self.admit(&mut report.admitted);

        let now = self.current_time;
        let quantum = self.base_quantum;
        for server in self.servers.iter_mut() {
            let Some(task_id) = server.running else { continue };
            let Some(task) = self.tasks.get_mut(&task_id) else {
                warn!("Running task {} on {} missing from task table; clearing slot", task_id, server.name);
                server.running = None;
                server.clear_usage();
                continue;
            };

            let remaining = task.remaining_time.unwrap_or(quantum) - dt;
            task.remaining_time = Some(remaining);
            server.apply_usage(task);

            if remaining > COMPLETION_EPSILON {
                continue;
            }

            task.advance_to(TaskState::Completed);
            task.end_time = Some(now);
            debug!("Task {} ('{}') completed on {} at t={}", task_id, task.name, server.name, now);
            self.completed.push(task_id);
            report.completed.push(task_id);
            server.total_processed += 1;
            server.running = None;
            server.clear_usage();

            if let Some(next_id) = server.backlog.pop_front() {
                if let Some(next) = self.tasks.get_mut(&next_id) {
                    next.advance_to(TaskState::Running);
                    next.start_time = Some(now);
                    next.remaining_time = Some(quantum);
                    debug!("Promoted task {} from backlog of {}", next_id, server.name);
                }
                server.running = Some(next_id);
                report.promoted.push(Placement { task_id: next_id, server: server.id, started: true });
            }
        }

        report
    }

    // Pops tasks off the pending head until it is empty or blocked.
    fn admit(&mut self, placements: &mut Vec<Placement>) -> Option<AdmissionStall> {
        while let Some(&task_id) = self.pending.front() {
            let Some(task) = self.tasks.get(&task_id) else {
                warn!("Pending task {} missing from task table; dropping it", task_id);
                self.pending.pop_front();
                continue;
            };

            if task.arrival_time > self.current_time {
                debug!(
                    "Admission blocked: task {} arrives at {} (now {})",
                    task_id, task.arrival_time, self.current_time
                );
                return Some(AdmissionStall::AwaitingArrival {
                    task_id,
                    arrival_time: task.arrival_time,
                });
            }

            let Some(index) = select_server(self.policy, &self.servers) else {
                warn!("Admission stalled: server pool is empty ({} tasks pending)", self.pending.len());
                return Some(AdmissionStall::EmptyPool);
            };

            self.pending.pop_front();
            let server = &mut self.servers[index];
            let started = server.running.is_none();
            if let Some(task) = self.tasks.get_mut(&task_id) {
                if started {
                    task.advance_to(TaskState::Running);
                    task.start_time = Some(self.current_time);
                    task.remaining_time = Some(self.base_quantum);
                    server.running = Some(task_id);
                } else {
                    task.advance_to(TaskState::Queued);
                    server.backlog.push_back(task_id);
                }
            }
            debug!(
                "Placed task {} on {} ({})",
                task_id,
                server.name,
                if started { "running" } else { "backlog" }
            );
            placements.push(Placement { task_id, server: index, started });
        }
        None
    }

    /// Steps until nothing is pending or running, or `max_steps` is hit.
    /// Returns the number of steps taken.
    pub fn run_until_drained(&mut self, dt: f64, max_steps: u64) -> u64 {
        let mut steps = 0;
        while steps < max_steps && !self.is_drained() {
            let report = self.step(dt);
            steps += 1;
            if report.stall == Some(AdmissionStall::EmptyPool) {
                break;
            }
        }
        steps
    }

    // --- Configuration ---

    pub fn policy(&self) -> PlacementPolicy {
        self.policy
    }

    /// Takes effect from the next step.
    pub fn set_policy(&mut self, policy: PlacementPolicy) {
        if self.policy != policy {
            info!("Placement policy changed: {} -> {}", self.policy, policy);
        }
        self.policy = policy;
    }

    pub fn base_quantum(&self) -> f64 {
        self.base_quantum
    }

    // --- Reset ---

    /// Clears every task and the clock; servers keep their identity.
    /// Task ids keep increasing across resets.
    pub fn reset(&mut self) {
        info!(
            "Resetting scheduler at t={} ({} tasks discarded)",
            self.current_time,
            self.tasks.len()
        );
        self.pending.clear();
        self.completed.clear();
        self.tasks.clear();
        self.current_time = 0.0;
        self.submitted_since_reset = 0;
        for server in self.servers.iter_mut() {
            server.reset();
        }
    }

    /// Resets and rebuilds the pool with `server_count` servers.
    pub fn reset_with_pool(&mut self, server_count: usize) {
        self.reset();
        self.servers = (0..server_count).map(Server::new).collect();
        info!("Server pool rebuilt with {} servers", server_count);
    }

    // --- Queries ---

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    pub fn server_snapshots(&self) -> Vec<ServerSnapshot> {
        self.servers.iter().map(Server::snapshot).collect()
    }

    pub fn task(&self, id: TaskId) -> Option<&TaskMeta> {
        self.tasks.get(&id)
    }

    /// Id that the next submission will receive.
    pub fn next_task_id(&self) -> TaskId {
        self.next_task_id
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn pending_tasks(&self) -> impl Iterator<Item = &TaskMeta> {
        self.pending.iter().filter_map(|id| self.tasks.get(id))
    }

    /// Completed tasks in completion order.
    pub fn completed_tasks(&self) -> impl Iterator<Item = &TaskMeta> {
        self.completed.iter().filter_map(|id| self.tasks.get(id))
    }

    pub fn is_drained(&self) -> bool {
        self.pending.is_empty() && self.servers.iter().all(Server::is_idle)
    }

    pub fn task_location(&self, id: TaskId) -> Option<TaskLocation> {
        if self.pending.contains(&id) {
            return Some(TaskLocation::Pending);
        }
        for server in &self.servers {
            if server.running == Some(id) {
                return Some(TaskLocation::Running { server: server.id });
            }
            if server.backlog.contains(&id) {
                return Some(TaskLocation::Backlog { server: server.id });
            }
        }
        if self.completed.contains(&id) {
            return Some(TaskLocation::Completed);
        }
        None
    }

    pub fn metrics(&self) -> Metrics {
        Metrics::compute(
            self.completed_tasks(),
            self.submitted_since_reset,
            self.pending.len(),
            &self.servers,
            self.current_time,
        )
    }
}
