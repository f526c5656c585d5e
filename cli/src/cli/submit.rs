use anyhow::{Context, Result};
use colored::*;
use std::{fs, path::Path};

use cloudsched_core::utils::validation::{validate_descriptor, RawTaskDescriptor};
use cloudsched_core::TaskDescriptor;

/// Outcome of checking one entry of a task file.
pub struct CheckedEntry {
    pub index: usize,
    pub name: String,
    pub result: std::result::Result<TaskDescriptor, Vec<String>>,
}

pub fn read_raw_tasks(path: &Path) -> Result<Vec<RawTaskDescriptor>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read task file: {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| {
        format!(
            "Failed to parse task file: {}. Expected format: [{{\"name\": \"...\", \"priority\": 1-4, \"cpu\": 1-100, \"ram\": 100-4096, \"arrivalTime\": N?, \"deadline\": N?, \"category\": \"compute\"?}}, ...]",
            path.display()
        )
    })
}

pub fn check_entries(raw: Vec<RawTaskDescriptor>) -> Vec<CheckedEntry> {
    raw.into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let name = entry.name.clone().unwrap_or_default();
            let errors = validate_descriptor(&entry);
            let result = if errors.is_empty() { Ok(entry.into_descriptor()) } else { Err(errors) };
            CheckedEntry { index, name, result }
        })
        .collect()
}

/// Reads a task file, reports invalid entries on stderr and returns the
/// valid descriptors in file order.
pub fn load_task_file(path: &Path) -> Result<Vec<TaskDescriptor>> {
    let entries = check_entries(read_raw_tasks(path)?);
    let total = entries.len();
    let mut accepted = Vec::with_capacity(total);

    for entry in entries {
        match entry.result {
            Ok(descriptor) => accepted.push(descriptor),
            Err(errors) => {
                log::warn!("Skipping task #{} ('{}'): {}", entry.index, entry.name, errors.join("; "));
                eprintln!(
                    "{} Skipping task #{} ('{}'): {}",
                    "[WARN]".yellow(),
                    entry.index,
                    entry.name,
                    errors.join("; ")
                );
            }
        }
    }

    log::info!("Loaded {} of {} tasks from {}", accepted.len(), total, path.display());
    Ok(accepted)
}
