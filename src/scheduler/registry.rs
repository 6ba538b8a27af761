use serde::{Deserialize, Serialize};

use crate::config::ShopConfig;
use crate::rng::PoolRng;
use crate::scheduler::job::{Job, Specialization};

const FIRST_NAMES: &[&str] = &[
    "Alex", "Brian", "Chris", "David", "Eric", "Frank", "George", "Henry", "Ian", "John", "Kevin",
    "Liam", "Mike", "Nathan", "Oscar", "Paul", "Quinn", "Ryan", "Steve", "Tom",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Miller", "Davis", "Garcia", "Rodriguez",
    "Wilson", "Martinez", "Anderson", "Taylor", "Thomas", "Moore", "Jackson", "Martin", "Lee",
    "Thompson", "White",
];

/// A mechanic in the pool with a serial job timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    pub id: String,
    pub name: String,
    pub specialization: Specialization,
    /// Insertion order is timeline order: each job starts after the previous
    /// one's computed completion
    pub current_jobs: Vec<Job>,
    pub total_capacity_hours: f64,
    /// Always recomputed from current_jobs, never incremented in place
    pub current_workload_hours: f64,
    pub max_concurrent_jobs: usize,
    /// Speed multiplier; > 1 means faster than the baseline estimate
    pub efficiency: f64,
    pub rating: f64,
    pub experience_years: u32,
}

impl Worker {
    /// Whether this worker can take another job: a free slot and enough
    /// capacity left after the safety buffer.
    pub fn has_room(&self, buffer_hours: f64) -> bool {
        self.current_jobs.len() < self.max_concurrent_jobs
            && self.current_workload_hours < self.total_capacity_hours - buffer_hours
    }

    /// Whether this worker qualifies for a trade requirement. General
    /// maintenance workers qualify for everything.
    pub fn matches_trade(&self, required: Option<Specialization>) -> bool {
        match required {
            None => true,
            Some(req) => {
                self.specialization == req
                    || self.specialization == Specialization::GeneralMaintenance
            }
        }
    }

    pub fn workload_percentage(&self) -> f64 {
        if self.total_capacity_hours <= 0.0 {
            return 0.0;
        }
        self.current_workload_hours / self.total_capacity_hours * 100.0
    }

    fn recompute_workload(&mut self) {
        self.current_workload_hours = self.current_jobs.iter().map(|j| j.duration).sum();
    }
}

/// Specialization banding over worker ordinals (1-based): the first fifth of
/// the pool are engine specialists, the next fifth brake experts, the next
/// fifth AC technicians, and the remainder general maintenance.
pub fn specialization_for_ordinal(ordinal: usize, pool_size: usize) -> Specialization {
    let fifth = (pool_size / 5).max(1);
    if ordinal <= fifth {
        Specialization::EngineSpecialist
    } else if ordinal <= fifth * 2 {
        Specialization::BrakeExpert
    } else if ordinal <= fifth * 3 {
        Specialization::AcTechnician
    } else {
        Specialization::GeneralMaintenance
    }
}

/// Owns the worker pool and applies all mutations to worker state.
#[derive(Debug, Default)]
pub struct WorkerRegistry {
    workers: Vec<Worker>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_workers(workers: Vec<Worker>) -> Self {
        Self { workers }
    }

    /// Populate an empty registry with the default pool. Specializations are
    /// banded by ordinal; efficiency, rating, and experience are drawn from
    /// the injected RNG so a seeded config reproduces the same pool.
    pub fn initialize(&mut self, config: &ShopConfig, rng: &mut PoolRng) {
        self.workers.clear();
        for i in 1..=config.worker_count {
            let first = rng.pick(FIRST_NAMES);
            let last = rng.pick(LAST_NAMES);
            self.workers.push(Worker {
                id: format!("W{:02}", i),
                name: format!("{} {}", first, last),
                specialization: specialization_for_ordinal(i, config.worker_count),
                current_jobs: Vec::new(),
                total_capacity_hours: config.total_capacity_hours,
                current_workload_hours: 0.0,
                max_concurrent_jobs: config.max_concurrent_jobs,
                efficiency: rng.ratio_between(0.8, 1.2),
                rating: rng.ratio_between(4.0, 5.0),
                experience_years: rng.int_between(1, 15),
            });
        }
        tracing::info!(count = self.workers.len(), "Initialized default worker pool");
    }

    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn find(&self, worker_id: &str) -> Option<&Worker> {
        self.workers.iter().find(|w| w.id == worker_id)
    }

    pub fn find_mut(&mut self, worker_id: &str) -> Option<&mut Worker> {
        self.workers.iter_mut().find(|w| w.id == worker_id)
    }

    /// Append a job to a worker's timeline and recompute workload from
    /// scratch. Returns false if the worker is unknown.
    pub fn apply_job_add(&mut self, worker_id: &str, job: Job) -> bool {
        match self.find_mut(worker_id) {
            Some(worker) => {
                worker.current_jobs.push(job);
                worker.recompute_workload();
                true
            }
            None => false,
        }
    }

    /// Remove a job by service id and recompute workload. Returns false if
    /// the worker is unknown or did not hold the job.
    pub fn apply_job_remove(&mut self, worker_id: &str, service_id: &str) -> bool {
        match self.find_mut(worker_id) {
            Some(worker) => {
                let before = worker.current_jobs.len();
                worker.current_jobs.retain(|j| j.service_id != service_id);
                if worker.current_jobs.len() == before {
                    return false;
                }
                worker.recompute_workload();
                true
            }
            None => false,
        }
    }

    /// Candidate selection: workers with room for another job, optionally
    /// filtered by trade (general workers always qualify).
    pub fn available_workers(
        &self,
        required: Option<Specialization>,
        buffer_hours: f64,
    ) -> Vec<&Worker> {
        self.workers
            .iter()
            .filter(|w| w.has_room(buffer_hours) && w.matches_trade(required))
            .collect()
    }

    /// Id of the first available worker in registry order, ignoring trade.
    /// Used by the queue drain pass.
    pub fn first_available(&self, buffer_hours: f64) -> Option<String> {
        self.workers
            .iter()
            .find(|w| w.has_room(buffer_hours))
            .map(|w| w.id.clone())
    }

    pub fn total_capacity_hours(&self) -> f64 {
        self.workers.iter().map(|w| w.total_capacity_hours).sum()
    }

    pub fn utilized_capacity_hours(&self) -> f64 {
        self.workers.iter().map(|w| w.current_workload_hours).sum()
    }

    pub fn total_active_jobs(&self) -> usize {
        self.workers.iter().map(|w| w.current_jobs.len()).sum()
    }
}
