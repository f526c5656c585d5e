// core/src/utils/validation.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SchedulerError};
use crate::utils::models::{TaskCategory, TaskDescriptor};

/// Task input as it arrives from a file or form: numbers may be strings,
/// missing, or garbage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTaskDescriptor {
    pub name: Option<String>,
    pub priority: Option<Value>,
    pub cpu: Option<Value>,
    pub ram: Option<Value>,
    pub arrival_time: Option<Value>,
    pub deadline: Option<Value>,
    pub category: Option<String>,
}

// Accepts JSON numbers and numeric strings ("12", " 7.5 ").
fn parse_number(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn parse_int(value: Option<&Value>) -> Option<i64> {
    parse_number(value).map(|n| n.trunc() as i64)
}

/// Returns every validation failure for the descriptor; empty means valid.
pub fn validate_descriptor(raw: &RawTaskDescriptor) -> Vec<String> {
    let mut errors = Vec::new();

    if raw.name.as_deref().map(str::trim).unwrap_or("").is_empty() {
        errors.push("Task name is required".to_string());
    }

    match parse_int(raw.priority.as_ref()) {
        Some(p) if (1..=4).contains(&p) => {}
        _ => errors.push("Priority must be between 1 and 4".to_string()),
    }

    match parse_int(raw.cpu.as_ref()) {
        Some(c) if (1..=100).contains(&c) => {}
        _ => errors.push("CPU must be between 1 and 100".to_string()),
    }

    match parse_int(raw.ram.as_ref()) {
        Some(r) if (100..=4096).contains(&r) => {}
        _ => errors.push("RAM must be between 100 and 4096".to_string()),
    }

    if let Some(arrival) = parse_number(raw.arrival_time.as_ref()) {
        if arrival < 0.0 {
            errors.push("Arrival time must be non-negative".to_string());
        }
    }

    if let Some(deadline) = parse_number(raw.deadline.as_ref()) {
        if deadline < 0.0 {
            errors.push("Deadline must be non-negative".to_string());
        }
    }

    if let Some(category) = raw.category.as_deref() {
        if category.parse::<TaskCategory>().is_err() {
            errors.push(format!("Unknown category '{}'", category));
        }
    }

    errors
}

impl RawTaskDescriptor {
    /// Fills unparseable fields with defaults (priority 1, cpu 50, ram 512,
    /// arrival 0, deadline 10, category compute). Zero counts as unparseable,
    /// matching the form behaviour this input format comes from.
    pub fn into_descriptor(self) -> TaskDescriptor {
        let defaults = TaskDescriptor::default();
        let non_zero = |v: i64| v != 0;

        TaskDescriptor {
            name: self.name.unwrap_or_default(),
            priority: parse_int(self.priority.as_ref())
                .filter(|v| non_zero(*v))
                .map(|v| v.clamp(0, u8::MAX as i64) as u8)
                .unwrap_or(defaults.priority),
            cpu: parse_int(self.cpu.as_ref())
                .filter(|v| non_zero(*v))
                .map(|v| v.clamp(0, u32::MAX as i64) as u32)
                .unwrap_or(defaults.cpu),
            ram_mb: parse_int(self.ram.as_ref())
                .filter(|v| non_zero(*v))
                .map(|v| v.clamp(0, u32::MAX as i64) as u32)
                .unwrap_or(defaults.ram_mb),
            arrival_time: parse_number(self.arrival_time.as_ref())
                .unwrap_or(defaults.arrival_time),
            deadline: parse_number(self.deadline.as_ref())
                .filter(|v| *v != 0.0)
                .unwrap_or(defaults.deadline),
            category: self
                .category
                .as_deref()
                .and_then(|c| c.parse().ok())
                .unwrap_or(defaults.category),
        }
    }
}

impl TaskDescriptor {
    /// Validates raw input and converts it, or returns the failure list.
    pub fn checked(raw: RawTaskDescriptor) -> Result<TaskDescriptor> {
        let errors = validate_descriptor(&raw);
        if errors.is_empty() {
            Ok(raw.into_descriptor())
        } else {
            Err(SchedulerError::InvalidTask(errors))
        }
    }
}
