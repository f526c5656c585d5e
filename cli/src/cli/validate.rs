use anyhow::{anyhow, Result};
use colored::*;
use std::path::Path;
use structopt::StructOpt;

use crate::cli::submit::{check_entries, read_raw_tasks};

#[derive(StructOpt, Debug)]
pub struct ValidateCommand {
    /// JSON file with an array of task descriptors
    #[structopt(long)]
    tasks: String,
}

impl ValidateCommand {
    pub fn execute(self) -> Result<()> {
        let entries = check_entries(read_raw_tasks(Path::new(&self.tasks))?);
        let total = entries.len();
        let mut invalid = 0;

        for entry in &entries {
            match &entry.result {
                Ok(descriptor) => println!(
                    "{} #{} '{}' priority={} cpu={} ram={}MB arrival={} category={}",
                    "[OK]".green(),
                    entry.index,
                    descriptor.name.cyan(),
                    descriptor.priority,
                    descriptor.cpu,
                    descriptor.ram_mb,
                    descriptor.arrival_time,
                    descriptor.category
                ),
                Err(errors) => {
                    invalid += 1;
                    println!("{} #{} '{}'", "[INVALID]".red(), entry.index, entry.name);
                    for error in errors {
                        println!("    - {}", error);
                    }
                }
            }
        }

        if invalid > 0 {
            return Err(anyhow!("{} {} of {} tasks are invalid", "[ERROR]".red(), invalid, total));
        }
        println!("{} All {} tasks are valid", "[SUCCESS]".green(), total);
        Ok(())
    }
}
