// core/src/scheduler/shared.rs
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::time::{interval, MissedTickBehavior};

use crate::scheduler::metrics::{Metrics, MetricsHistory, MetricsSample};
use crate::scheduler::policy::PlacementPolicy;
use crate::scheduler::{Scheduler, StepReport};
use crate::utils::models::{ServerSnapshot, TaskDescriptor, TaskMeta};

const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Scheduler behind a single lock, so a step is atomic with respect to
/// every read.
#[derive(Debug, Clone)]
pub struct SharedScheduler {
    inner: Arc<RwLock<Scheduler>>,
}

impl SharedScheduler {
    pub fn new(scheduler: Scheduler) -> Self {
        SharedScheduler { inner: Arc::new(RwLock::new(scheduler)) }
    }

    pub async fn submit(&self, descriptor: TaskDescriptor) -> TaskMeta {
        self.inner.write().await.submit(descriptor).clone()
    }

    pub async fn step(&self, dt: f64) -> StepReport {
        self.inner.write().await.step(dt)
    }

    pub async fn set_policy(&self, policy: PlacementPolicy) {
        self.inner.write().await.set_policy(policy);
    }

    pub async fn reset(&self) {
        self.inner.write().await.reset();
    }

    pub async fn metrics(&self) -> Metrics {
        self.inner.read().await.metrics()
    }

    pub async fn server_snapshots(&self) -> Vec<ServerSnapshot> {
        self.inner.read().await.server_snapshots()
    }

    pub async fn is_drained(&self) -> bool {
        self.inner.read().await.is_drained()
    }

    /// Runs `f` against the scheduler under the read lock.
    pub async fn with_read<R>(&self, f: impl FnOnce(&Scheduler) -> R) -> R {
        let guard = self.inner.read().await;
        f(&*guard)
    }
}

#[derive(Debug, Clone)]
pub struct TickerOptions {
    pub time_step: f64,
    pub interval: Duration,
    pub max_steps: u64,
    pub history_window: usize,
    /// stop once nothing is pending or running
    pub stop_when_drained: bool,
}

/// Steps the shared scheduler on a fixed wall-clock interval until
/// `max_steps`, the workload drains, or `shutdown` flips to true. Each
/// step's metrics are handed to `on_tick` and recorded in the returned
/// history.
pub async fn run_ticker<F>(
    shared: SharedScheduler,
    options: TickerOptions,
    mut shutdown: watch::Receiver<bool>,
    mut on_tick: F,
) -> MetricsHistory
where
    F: FnMut(&StepReport, &Metrics),
{
    info!(
        "Ticker started: dt={} every {:?}, at most {} steps",
        options.time_step, options.interval, options.max_steps
    );
    let mut history = MetricsHistory::new(options.history_window);
    // tokio rejects a zero period
    let mut ticker = interval(options.interval.max(MIN_TICK_INTERVAL));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut steps = 0u64;

    while steps < options.max_steps {
        tokio::select! {
            _ = ticker.tick() => {}
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    info!("Shutdown signal received, stopping ticker after {} steps.", steps);
                    break;
                }
                continue;
            }
        }

        // step and sample under one write lock
        let (report, metrics, sample) = {
            let mut guard = shared.inner.write().await;
            let report = guard.step(options.time_step);
            let metrics = guard.metrics();
            let sample = MetricsSample::capture(&metrics, guard.servers());
            (report, metrics, sample)
        };
        steps += 1;
        debug!("Tick {}: {}", steps, metrics);
        history.record(sample);
        on_tick(&report, &metrics);

        if options.stop_when_drained && shared.is_drained().await {
            info!("Workload drained after {} steps.", steps);
            break;
        }
    }

    history
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(max_steps: u64) -> TickerOptions {
        TickerOptions {
            time_step: 1.0,
            interval: Duration::from_millis(1),
            max_steps,
            history_window: 3,
            stop_when_drained: true,
        }
    }

    #[tokio::test]
    async fn ticker_drains_workload() {
        let shared = SharedScheduler::new(Scheduler::new(2, PlacementPolicy::RoundRobin));
        for i in 0..3 {
            shared.submit(TaskDescriptor::new(format!("t{}", i))).await;
        }
        let (_tx, rx) = watch::channel(false);

        let mut ticks = 0;
        let history = run_ticker(shared.clone(), options(100), rx, |_, _| ticks += 1).await;

        assert!(shared.is_drained().await);
        assert_eq!(shared.metrics().await.total_completed, 3);
        assert_eq!(ticks, 10);
        assert_eq!(history.len(), 3);
        assert_eq!(history.latest().map(|s| s.time), Some(10.0));
    }

    #[tokio::test]
    async fn ticker_respects_max_steps() {
        let shared = SharedScheduler::new(Scheduler::new(1, PlacementPolicy::LeastLoaded));
        shared.submit(TaskDescriptor::new("long")).await;
        let (_tx, rx) = watch::channel(false);

        run_ticker(shared.clone(), options(2), rx, |_, _| {}).await;
        assert_eq!(shared.metrics().await.current_time, 2.0);
        assert_eq!(shared.with_read(|s| s.completed_tasks().count()).await, 0);
    }

    #[tokio::test]
    async fn ticker_stops_on_shutdown() {
        let shared = SharedScheduler::new(Scheduler::new(1, PlacementPolicy::RoundRobin));
        shared.submit(TaskDescriptor::new("t")).await;
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let opts = TickerOptions { interval: Duration::from_secs(3600), ..options(100) };
        // first tick of an interval fires immediately, so one step may run
        run_ticker(shared.clone(), opts, rx, |_, _| {}).await;
        assert!(shared.metrics().await.current_time <= 1.0);
    }

    #[tokio::test]
    async fn zero_interval_is_clamped() {
        let shared = SharedScheduler::new(Scheduler::new(1, PlacementPolicy::RoundRobin));
        shared.submit(TaskDescriptor::new("t")).await;
        let (_tx, rx) = watch::channel(false);

        let opts = TickerOptions { interval: Duration::ZERO, ..options(100) };
        run_ticker(shared.clone(), opts, rx, |_, _| {}).await;
        assert!(shared.is_drained().await);
        assert_eq!(shared.metrics().await.current_time, 5.0);
    }
}
