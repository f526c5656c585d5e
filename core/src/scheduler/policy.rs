// core/src/scheduler/policy.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SchedulerError;
use crate::scheduler::server::{load, Server};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementPolicy {
    #[default]
    RoundRobin,
    LeastLoaded,
}

impl FromStr for PlacementPolicy {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "round-robin" | "roundrobin" | "rr" => Ok(PlacementPolicy::RoundRobin),
            "least-loaded" | "leastloaded" | "ll" => Ok(PlacementPolicy::LeastLoaded),
            other => Err(SchedulerError::UnknownPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for PlacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementPolicy::RoundRobin => f.write_str("round-robin"),
            PlacementPolicy::LeastLoaded => f.write_str("least-loaded"),
        }
    }
}

/// Picks the index of the server that should receive the next admitted
/// task. `None` only for an empty pool. Ties always go to the lower index.
pub fn select_server(policy: PlacementPolicy, servers: &[Server]) -> Option<usize> {
    match policy {
        PlacementPolicy::RoundRobin => select_round_robin(servers),
        PlacementPolicy::LeastLoaded => select_least_loaded(servers),
    }
}

fn select_round_robin(servers: &[Server]) -> Option<usize> {
    if let Some(idle) = servers.iter().position(Server::is_idle) {
        return Some(idle);
    }
    // min_by_key keeps the first of equal elements
    servers
        .iter()
        .enumerate()
        .min_by_key(|(_, server)| server.backlog.len())
        .map(|(index, _)| index)
}

fn select_least_loaded(servers: &[Server]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, server) in servers.iter().enumerate() {
        let candidate = load(server);
        match best {
            Some((_, best_load)) if candidate >= best_load => {}
            _ => best = Some((index, candidate)),
        }
    }
    best.map(|(index, _)| index)
}
