// core/src/lib.rs
pub mod error;
pub mod scheduler;
pub mod utils;
pub mod workload;

pub use error::{Result, SchedulerError};
pub use scheduler::metrics::{Metrics, MetricsHistory, MetricsSample};
pub use scheduler::policy::PlacementPolicy;
pub use scheduler::shared::{run_ticker, SharedScheduler, TickerOptions};
pub use scheduler::{AdmissionStall, Placement, Scheduler, StepReport, TaskLocation};
pub use utils::config::SimConfig;
pub use utils::models::{ServerSnapshot, ServerStatus, TaskCategory, TaskDescriptor, TaskId, TaskMeta, TaskState};
