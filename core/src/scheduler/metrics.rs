// core/src/scheduler/metrics.rs
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

use crate::scheduler::server::{load, Server};
use crate::utils::models::TaskMeta;
use crate::utils::{round2, DEFAULT_HISTORY_WINDOW};

/// Aggregate view of a scheduler. Floating fields are rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub total_submitted: u64,
    pub total_completed: usize,
    pub pending_count: usize,
    #[serde(with = "fixed2")]
    pub avg_wait_time: f64,
    #[serde(with = "fixed2")]
    pub throughput: f64,
    #[serde(with = "fixed2")]
    pub avg_turnaround_time: f64,
    #[serde(with = "fixed2")]
    pub avg_load: f64,
    #[serde(with = "fixed2")]
    pub current_time: f64,
}

/// Serializes a float as a fixed two-decimal string ("0.20"); reads back
/// either that string or a plain number.
mod fixed2 {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:.2}", value))
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Ok(n),
            Repr::Text(s) => s.trim().parse().map_err(D::Error::custom),
        }
    }
}

impl Metrics {
    pub fn compute<'a, I>(
        completed: I,
        total_submitted: u64,
        pending_count: usize,
        servers: &[Server],
        current_time: f64,
    ) -> Self
    where
        I: IntoIterator<Item = &'a TaskMeta>,
    {
        let mut completed_count = 0usize;
        let mut wait_sum = 0.0;
        let mut wait_samples = 0usize;
        let mut turnaround_sum = 0.0;

        for task in completed {
            completed_count += 1;
            // negative waits come from head-blocked arrivals and are dropped
            let wait = task.start_time.unwrap_or(0.0) - task.arrival_time;
            if wait >= 0.0 {
                wait_sum += wait;
                wait_samples += 1;
            }
            turnaround_sum += task.turnaround_time();
        }

        let avg_wait_time = if wait_samples > 0 { wait_sum / wait_samples as f64 } else { 0.0 };
        let avg_turnaround_time =
            if completed_count > 0 { turnaround_sum / completed_count as f64 } else { 0.0 };
        let throughput = completed_count as f64 / current_time.max(1.0);
        let avg_load = if servers.is_empty() {
            0.0
        } else {
            servers.iter().map(load).sum::<f64>() / servers.len() as f64
        };

        Metrics {
            total_submitted,
            total_completed: completed_count,
            pending_count,
            avg_wait_time: round2(avg_wait_time),
            throughput: round2(throughput),
            avg_turnaround_time: round2(avg_turnaround_time),
            avg_load: round2(avg_load),
            current_time,
        }
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:.2} submitted={} completed={} pending={} avgWait={:.2} throughput={:.2} avgTurnaround={:.2} avgLoad={:.2}",
            self.current_time,
            self.total_submitted,
            self.total_completed,
            self.pending_count,
            self.avg_wait_time,
            self.throughput,
            self.avg_turnaround_time,
            self.avg_load
        )
    }
}

/// One point of the metrics time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSample {
    pub time: f64,
    pub avg_wait_time: f64,
    pub throughput: f64,
    pub avg_turnaround_time: f64,
    pub server_loads: Vec<f64>,
}

impl MetricsSample {
    pub fn capture(metrics: &Metrics, servers: &[Server]) -> Self {
        MetricsSample {
            time: metrics.current_time,
            avg_wait_time: metrics.avg_wait_time,
            throughput: metrics.throughput,
            avg_turnaround_time: metrics.avg_turnaround_time,
            server_loads: servers.iter().map(|s| round2(load(s))).collect(),
        }
    }
}

/// Sliding window over the most recent samples; the oldest is evicted first.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsHistory {
    window: usize,
    samples: VecDeque<MetricsSample>,
}

impl MetricsHistory {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        MetricsHistory { window, samples: VecDeque::with_capacity(window) }
    }

    pub fn record(&mut self, sample: MetricsSample) {
        if self.samples.len() == self.window {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn samples(&self) -> impl Iterator<Item = &MetricsSample> {
        self.samples.iter()
    }

    pub fn latest(&self) -> Option<&MetricsSample> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl Default for MetricsHistory {
    fn default() -> Self {
        MetricsHistory::new(DEFAULT_HISTORY_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::models::{TaskDescriptor, TaskState};

    fn finished(id: u64, arrival: f64, start: f64, end: f64) -> TaskMeta {
        let mut task = TaskMeta::from_descriptor(id, TaskDescriptor::new("t").with_arrival(arrival));
        task.state = TaskState::Completed;
        task.start_time = Some(start);
        task.end_time = Some(end);
        task
    }

    #[test]
    fn zero_time_and_no_completions() {
        let metrics = Metrics::compute(std::iter::empty(), 0, 0, &[], 0.0);
        assert_eq!(format!("{:.2}", metrics.throughput), "0.00");
        assert_eq!(format!("{:.2}", metrics.avg_wait_time), "0.00");
        assert_eq!(metrics.avg_load, 0.0);
    }

    #[test]
    fn negative_waits_are_excluded() {
        let tasks = vec![finished(0, 0.0, 4.0, 9.0), finished(1, 10.0, 5.0, 10.0)];
        let metrics = Metrics::compute(&tasks, 2, 0, &[], 10.0);
        assert_eq!(metrics.avg_wait_time, 4.0);
        assert_eq!(metrics.throughput, 0.2);
        assert_eq!(metrics.avg_turnaround_time, 5.0);
    }

    #[test]
    fn averages_are_rounded() {
        let tasks = vec![finished(0, 0.0, 1.0, 2.0), finished(1, 0.0, 1.0, 2.0), finished(2, 0.0, 0.0, 1.0)];
        let metrics = Metrics::compute(&tasks, 3, 0, &[], 3.0);
        assert_eq!(metrics.avg_wait_time, 0.67);
        assert_eq!(metrics.throughput, 1.0);
    }

    #[test]
    fn json_uses_fixed_two_decimals() {
        let tasks = vec![finished(0, 0.0, 4.0, 9.0), finished(1, 10.0, 5.0, 10.0)];
        let metrics = Metrics::compute(&tasks, 2, 0, &[], 10.0);

        let value = serde_json::to_value(&metrics).unwrap();
        assert_eq!(value["throughput"], "0.20");
        assert_eq!(value["avgWaitTime"], "4.00");
        assert_eq!(value["avgLoad"], "0.00");
        assert_eq!(value["totalCompleted"], 2);

        let back: Metrics = serde_json::from_value(value).unwrap();
        assert_eq!(back, metrics);
    }

    #[test]
    fn history_evicts_oldest() {
        let mut history = MetricsHistory::new(2);
        for t in 1..=3 {
            let metrics = Metrics::compute(std::iter::empty(), 0, 0, &[], t as f64);
            history.record(MetricsSample::capture(&metrics, &[]));
        }
        assert_eq!(history.len(), 2);
        let times: Vec<f64> = history.samples().map(|s| s.time).collect();
        assert_eq!(times, vec![2.0, 3.0]);
        assert_eq!(history.latest().map(|s| s.time), Some(3.0));
    }
}
