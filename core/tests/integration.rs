use cloudsched_core::workload::{WorkloadGenerator, WorkloadPattern};
use cloudsched_core::{
    PlacementPolicy, Scheduler, TaskDescriptor, TaskId, TaskLocation, TaskState,
};
use std::collections::HashMap;

fn ids(scheduler: &Scheduler) -> std::ops::Range<TaskId> {
    // ids are contiguous when no reset happened
    0..scheduler.next_task_id()
}

/// Every task sits in exactly one place, and that place agrees with its state.
fn assert_partition(scheduler: &Scheduler) {
    let mut seen = 0;
    for id in ids(scheduler) {
        let task = scheduler.task(id).expect("task in arena");
        let location = scheduler.task_location(id).expect("task has a location");
        let expected = match location {
            TaskLocation::Pending => TaskState::Pending,
            TaskLocation::Backlog { .. } => TaskState::Queued,
            TaskLocation::Running { .. } => TaskState::Running,
            TaskLocation::Completed => TaskState::Completed,
        };
        assert_eq!(task.state, expected, "task {} at {:?}", id, location);
        seen += 1;
    }

    let backlog_total: usize = scheduler.servers().iter().map(|s| s.backlog.len()).sum();
    let running_total = scheduler.servers().iter().filter(|s| s.running.is_some()).count();
    let completed_total = scheduler.completed_tasks().count();
    assert_eq!(
        scheduler.pending_len() + backlog_total + running_total + completed_total,
        seen
    );

    for server in scheduler.servers() {
        if let Some(running) = server.running {
            assert!(!server.backlog.contains(&running));
        }
    }
}

#[cfg(test)]
mod scheduler_tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn round_robin_scenario_two_servers_three_tasks() -> Result<()> {
        let mut scheduler = Scheduler::new(2, PlacementPolicy::RoundRobin);
        let t1 = scheduler.submit(TaskDescriptor::new("task1")).id;
        let t2 = scheduler.submit(TaskDescriptor::new("task2")).id;
        let t3 = scheduler.submit(TaskDescriptor::new("task3")).id;

        let report = scheduler.step(5.0);
        assert_eq!(report.completed, vec![t1, t2]);

        let task1 = scheduler.task(t1).unwrap();
        assert_eq!(task1.state, TaskState::Completed);
        assert_eq!(task1.end_time, Some(5.0));
        assert_eq!(scheduler.task(t2).unwrap().end_time, Some(5.0));
        assert_eq!(scheduler.servers()[0].total_processed, 1);
        assert_eq!(scheduler.servers()[1].total_processed, 1);

        // task3 went into server0's backlog and was promoted when it emptied
        assert_eq!(report.admitted[2].server, 0);
        assert!(!report.admitted[2].started);
        assert_eq!(scheduler.task_location(t3), Some(TaskLocation::Running { server: 0 }));
        assert_partition(&scheduler);

        let report = scheduler.step(5.0);
        assert_eq!(report.completed, vec![t3]);
        assert_eq!(scheduler.task(t3).unwrap().end_time, Some(10.0));
        assert!(scheduler.is_drained());
        Ok(())
    }

    #[test]
    fn least_loaded_places_on_lighter_server() -> Result<()> {
        let mut scheduler = Scheduler::with_quantum(2, PlacementPolicy::LeastLoaded, 100.0);
        // heavy task lands on server0 (tie -> pool order) and drives its load to 0.9
        let heavy = scheduler.submit(TaskDescriptor::new("heavy").with_cpu(100).with_ram(3277)).id;
        scheduler.step(1.0);
        assert_eq!(scheduler.task_location(heavy), Some(TaskLocation::Running { server: 0 }));

        // light task lands on server1 and gives it load 0.1
        let light = scheduler.submit(TaskDescriptor::new("light").with_cpu(10).with_ram(410)).id;
        scheduler.step(1.0);
        assert_eq!(scheduler.task_location(light), Some(TaskLocation::Running { server: 1 }));

        let snapshots = scheduler.server_snapshots();
        assert!((snapshots[0].load - 0.9).abs() < 0.01);
        assert!((snapshots[1].load - 0.1).abs() < 0.01);

        let next = scheduler.submit(TaskDescriptor::new("next")).id;
        scheduler.step(1.0);
        assert_eq!(scheduler.task_location(next), Some(TaskLocation::Backlog { server: 1 }));
        assert_partition(&scheduler);
        Ok(())
    }

    #[test]
    fn metrics_at_time_zero() -> Result<()> {
        let scheduler = Scheduler::new(4, PlacementPolicy::RoundRobin);
        let metrics = scheduler.metrics();
        assert_eq!(format!("{:.2}", metrics.throughput), "0.00");
        assert_eq!(format!("{:.2}", metrics.avg_wait_time), "0.00");
        assert_eq!(metrics.total_submitted, 0);
        assert_eq!(metrics.pending_count, 0);
        Ok(())
    }

    #[test]
    fn running_to_completion_drains_everything() -> Result<()> {
        for policy in [PlacementPolicy::RoundRobin, PlacementPolicy::LeastLoaded] {
            let mut scheduler = Scheduler::new(3, policy);
            WorkloadGenerator::new(Some(11)).submit_bulk(&mut scheduler, 20, WorkloadPattern::Burst);

            let mut steps = 0;
            while !scheduler.is_drained() && steps < 500 {
                scheduler.step(1.0);
                assert_partition(&scheduler);
                steps += 1;
            }

            let metrics = scheduler.metrics();
            assert!(scheduler.is_drained(), "{} did not drain", policy);
            assert_eq!(metrics.pending_count, 0);
            assert_eq!(metrics.total_completed as u64, metrics.total_submitted);
            assert_eq!(metrics.total_completed, 20);
            assert!(scheduler.servers().iter().all(|s| s.backlog.is_empty() && s.running.is_none()));
        }
        Ok(())
    }

    #[test]
    fn states_never_regress() -> Result<()> {
        let mut scheduler = Scheduler::new(2, PlacementPolicy::RoundRobin);
        for i in 0..6 {
            scheduler.submit(TaskDescriptor::new(format!("t{}", i)).with_arrival(i as f64));
        }

        let mut last: HashMap<TaskId, TaskState> = HashMap::new();
        for _ in 0..40 {
            scheduler.step(0.5);
            for id in ids(&scheduler) {
                let state = scheduler.task(id).unwrap().state;
                if let Some(previous) = last.insert(id, state) {
                    assert!(previous == state || previous.can_transition_to(state),
                        "task {} went {} -> {}", id, previous, state);
                }
            }
        }

        for task in scheduler.completed_tasks() {
            let (start, end) = (task.start_time.unwrap(), task.end_time.unwrap());
            assert!(start <= end);
            assert!(start >= task.arrival_time);
        }
        Ok(())
    }

    #[test]
    fn reset_clears_state_but_ids_continue() -> Result<()> {
        let mut scheduler = Scheduler::new(2, PlacementPolicy::RoundRobin);
        for d in cloudsched_core::workload::demo_descriptors() {
            scheduler.submit(d);
        }
        scheduler.step(3.0);
        let before = scheduler.next_task_id();

        scheduler.reset();
        let metrics = scheduler.metrics();
        assert_eq!(metrics.pending_count, 0);
        assert_eq!(metrics.total_completed, 0);
        assert_eq!(scheduler.current_time(), 0.0);
        assert_eq!(scheduler.servers().len(), 2);
        assert!(scheduler.servers().iter().all(|s| s.backlog.is_empty()
            && s.running.is_none()
            && s.total_processed == 0
            && s.cpu_usage == 0.0));

        let id = scheduler.submit(TaskDescriptor::new("after")).id;
        assert_eq!(id, before);
        assert!(scheduler.task(0).is_none());
        Ok(())
    }

    #[test]
    fn wait_time_counts_backlog_time() -> Result<()> {
        let mut scheduler = Scheduler::new(1, PlacementPolicy::RoundRobin);
        scheduler.submit(TaskDescriptor::new("a"));
        scheduler.submit(TaskDescriptor::new("b"));
        scheduler.run_until_drained(5.0, 10);

        // a: starts at 5 (wait 5); b: promoted at 5 (wait 5), done at 10
        let metrics = scheduler.metrics();
        assert_eq!(metrics.total_completed, 2);
        assert_eq!(metrics.avg_wait_time, 5.0);
        assert_eq!(metrics.throughput, 0.2);
        assert_eq!(metrics.avg_turnaround_time, 2.5);
        Ok(())
    }
}
