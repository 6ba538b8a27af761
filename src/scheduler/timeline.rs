//! Serial per-worker timeline allocation.
//!
//! A worker can hold several jobs at once (up to `max_concurrent_jobs`) but
//! the timeline is strictly serial: a new job starts at the later of "now"
//! and the latest completion already on the timeline. "Concurrent" means
//! queued on this worker, not executed in parallel.

use chrono::{DateTime, Duration, Utc};

use crate::scheduler::job::{AssignedJob, Job, JobRequest, JobStatus};
use crate::scheduler::registry::Worker;

/// Generate a service id in the shop's `VOL_<timestamp><worker>` format,
/// suffixed with a counter if the second-granularity timestamp collides.
pub fn next_service_id<F>(now: DateTime<Utc>, worker_id: &str, mut in_use: F) -> String
where
    F: FnMut(&str) -> bool,
{
    let base = format!("VOL_{}{}", now.format("%Y%m%d%H%M%S"), worker_id);
    if !in_use(&base) {
        return base;
    }
    let mut n = 2u32;
    loop {
        let candidate = format!("{}-{}", base, n);
        if !in_use(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn hours_to_duration(hours: f64) -> Duration {
    Duration::milliseconds((hours * 3_600_000.0).round() as i64)
}

/// Build the job record for a request committed to `worker`.
///
/// The duration is divided by the worker's efficiency, and the start slides
/// to the end of the worker's existing timeline. The caller appends the job
/// through the registry so workload is recomputed there.
pub fn allocate(worker: &Worker, request: &JobRequest, service_id: String, now: DateTime<Utc>) -> Job {
    let adjusted = request.duration_hours / worker.efficiency;

    let start_time = worker
        .current_jobs
        .iter()
        .map(|j| j.completion_time)
        .max()
        .map_or(now, |latest| latest.max(now));

    Job {
        service_id,
        car_model: request.car_model.clone(),
        service_category: request.category,
        original_duration: request.duration_hours,
        duration: adjusted,
        start_time,
        completion_time: start_time + hours_to_duration(adjusted),
        assigned_at: now,
        status: JobStatus::Active,
    }
}

/// Assignment summary emitted after the job has been committed and the
/// worker's workload recomputed. `worker` must already hold the job.
pub fn assignment_summary(worker: &Worker, job: &Job) -> AssignedJob {
    AssignedJob {
        service_id: job.service_id.clone(),
        worker_id: worker.id.clone(),
        worker_name: worker.name.clone(),
        specialization: worker.specialization,
        efficiency: worker.efficiency,
        rating: worker.rating,
        completion_time: job.completion_time,
        adjusted_duration: (job.duration * 100.0).round() / 100.0,
        workload_percentage: worker.workload_percentage(),
        current_jobs_count: worker.current_jobs.len(),
        immediate_start: worker.current_jobs.len() == 1,
    }
}
