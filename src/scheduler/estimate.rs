//! Wait-time estimation for queued work.

use chrono::{DateTime, Utc};

use crate::scheduler::registry::WorkerRegistry;

/// Returned when the shop has no workers at all.
const NO_WORKERS_ESTIMATE: f64 = 4.0;
/// Assumed remaining time when no job is still running.
const IDLE_SHOP_ESTIMATE: f64 = 1.0;
/// Extra expected wait per job already queued ahead.
const PER_QUEUED_JOB_HOURS: f64 = 1.0;
/// Estimates are capped here; beyond this they carry no information.
const MAX_ESTIMATE_HOURS: f64 = 8.0;

/// Expected wait in hours for a job enqueued right now.
///
/// Averages the positive remaining time of every job on every worker's
/// timeline, then adds an hour per item already queued. Jobs whose computed
/// completion has passed contribute nothing.
pub fn estimate_wait(registry: &WorkerRegistry, queue_len: usize, now: DateTime<Utc>) -> f64 {
    if registry.is_empty() {
        return NO_WORKERS_ESTIMATE;
    }

    let mut total_remaining = 0.0;
    let mut active_jobs = 0usize;
    for worker in registry.workers() {
        for job in &worker.current_jobs {
            let remaining = remaining_hours(job.completion_time, now);
            if remaining > 0.0 {
                total_remaining += remaining;
                active_jobs += 1;
            }
        }
    }

    let avg_remaining = if active_jobs == 0 {
        IDLE_SHOP_ESTIMATE
    } else {
        total_remaining / active_jobs as f64
    };

    let estimate = avg_remaining + queue_len as f64 * PER_QUEUED_JOB_HOURS;
    estimate.min(MAX_ESTIMATE_HOURS)
}

fn remaining_hours(completion: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (completion - now).num_milliseconds() as f64 / 3_600_000.0
}
