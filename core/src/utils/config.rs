// core/src/utils/config.rs
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, SchedulerError};
use crate::scheduler::policy::PlacementPolicy;
use crate::utils::{DEFAULT_BASE_QUANTUM, DEFAULT_HISTORY_WINDOW, DEFAULT_SERVER_COUNT};

/// Simulation settings, read from a JSON file with kebab-case keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct SimConfig {
    pub servers: usize,
    pub policy: PlacementPolicy,
    pub base_quantum: f64,
    pub time_step: f64,
    pub max_steps: u64,
    pub tick_interval_ms: u64,
    pub log_level: String,
    pub log_path: Option<PathBuf>,
    pub history_window: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            servers: DEFAULT_SERVER_COUNT,
            policy: PlacementPolicy::RoundRobin,
            base_quantum: DEFAULT_BASE_QUANTUM,
            time_step: 1.0,
            max_steps: 1000,
            tick_interval_ms: 1000,
            log_level: "info".to_string(),
            log_path: None,
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }
}

impl SimConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: SimConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.base_quantum.is_finite() && self.base_quantum > 0.0) {
            return Err(SchedulerError::config(format!(
                "base-quantum must be a positive number, got {}",
                self.base_quantum
            )));
        }
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(SchedulerError::config(format!(
                "time-step must be a positive number, got {}",
                self.time_step
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(SchedulerError::config("tick-interval-ms must be at least 1"));
        }
        if self.history_window == 0 {
            return Err(SchedulerError::config("history-window must be at least 1"));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_keys_take_defaults() {
        let config: SimConfig = serde_json::from_str(r#"{"servers": 2}"#).unwrap();
        assert_eq!(config.servers, 2);
        assert_eq!(config.policy, PlacementPolicy::RoundRobin);
        assert_eq!(config.base_quantum, DEFAULT_BASE_QUANTUM);
    }

    #[test]
    fn reads_kebab_case_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"servers": 3, "policy": "least-loaded", "time-step": 0.5, "log-level": "debug"}}"#
        )
        .unwrap();

        let config = SimConfig::from_file(file.path()).unwrap();
        assert_eq!(config.servers, 3);
        assert_eq!(config.policy, PlacementPolicy::LeastLoaded);
        assert_eq!(config.time_step, 0.5);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn rejects_non_positive_quantum() {
        let config = SimConfig { base_quantum: 0.0, ..SimConfig::default() };
        assert!(matches!(config.validate(), Err(SchedulerError::Config(_))));
    }

    #[test]
    fn rejects_zero_tick_interval() {
        let config = SimConfig { tick_interval_ms: 0, ..SimConfig::default() };
        assert!(matches!(config.validate(), Err(SchedulerError::Config(_))));
    }
}
