// core/src/error.rs
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SchedulerError>;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid task: {}", .0.join("; "))]
    InvalidTask(Vec<String>),

    #[error("unknown placement policy: {0}")]
    UnknownPolicy(String),

    #[error("unknown task category: {0}")]
    UnknownCategory(String),

    #[error("unknown workload pattern: {0}")]
    UnknownPattern(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("failed to install logger: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchedulerError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        SchedulerError::Config(msg.into())
    }
}
