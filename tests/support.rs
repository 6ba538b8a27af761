//! Shared helpers for integration tests.

#![allow(dead_code)]

use garage_dispatch::config::ShopConfig;
use garage_dispatch::dispatcher::{Dispatcher, ShopState};
use garage_dispatch::scheduler::job::{QueueItem, Specialization};
use garage_dispatch::scheduler::registry::{Worker, WorkerRegistry};

pub fn worker(
    id: &str,
    spec: Specialization,
    efficiency: f64,
    capacity: f64,
    max_jobs: usize,
) -> Worker {
    Worker {
        id: id.to_string(),
        name: format!("Mechanic {}", id),
        specialization: spec,
        current_jobs: Vec::new(),
        total_capacity_hours: capacity,
        current_workload_hours: 0.0,
        max_concurrent_jobs: max_jobs,
        efficiency,
        rating: 4.5,
        experience_years: 5,
    }
}

/// Dispatcher over an explicit worker pool, no persistence.
pub fn dispatcher_with(workers: Vec<Worker>) -> Dispatcher {
    let config = ShopConfig::default().with_seed(7);
    let mut state = ShopState::empty(&config);
    state.registry = WorkerRegistry::from_workers(workers);
    Dispatcher::from_state(config, state)
}

/// Check the structural invariants that must hold after every mutation:
/// workload sums, slot limits, and no service id in two places at once.
pub fn assert_invariants(workers: &[Worker], queue: &[QueueItem]) {
    let mut seen = std::collections::HashSet::new();

    for w in workers {
        let sum: f64 = w.current_jobs.iter().map(|j| j.duration).sum();
        assert!(
            (w.current_workload_hours - sum).abs() < 1e-9,
            "worker {} workload {} != job sum {}",
            w.id,
            w.current_workload_hours,
            sum
        );
        assert!(
            w.current_jobs.len() <= w.max_concurrent_jobs,
            "worker {} holds {} jobs, limit {}",
            w.id,
            w.current_jobs.len(),
            w.max_concurrent_jobs
        );
        for job in &w.current_jobs {
            assert!(
                seen.insert(job.service_id.clone()),
                "service {} appears twice",
                job.service_id
            );
            assert!(job.completion_time >= job.start_time);
        }
        // The timeline is serial: jobs in insertion order never overlap
        for pair in w.current_jobs.windows(2) {
            assert!(
                pair[1].start_time >= pair[0].completion_time,
                "worker {} timeline overlaps",
                w.id
            );
        }
    }

    for item in queue {
        assert!(
            seen.insert(item.service_id.clone()),
            "service {} is both active and queued",
            item.service_id
        );
    }
}
