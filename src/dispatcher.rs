//! The dispatcher owns all mutable scheduling state behind one lock.
//!
//! Assignment (selector -> scorer -> allocator), completion (remove + queue
//! drain), and reset each run as a single write-locked critical section, so
//! concurrent submissions never observe a worker between two mutations.
//! Snapshots for dashboards take the read lock. Persistence happens after the
//! mutation and is best-effort: the in-memory state is authoritative.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::config::ShopConfig;
use crate::error::{DispatchError, Result};
use crate::rng::PoolRng;
use crate::scheduler::job::{
    AssignedJob, AssignmentResult, Job, JobRequest, QueueItem, QueuedJob, ServiceCategory,
};
use crate::scheduler::registry::WorkerRegistry;
use crate::scheduler::{assigner, estimate, timeline};
use crate::store;

/// Index entry mapping an active service id back to its worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveService {
    pub worker_id: String,
    pub worker_name: String,
    pub job: Job,
}

/// FIFO queue of jobs waiting for capacity.
#[derive(Debug, Default)]
pub struct WaitQueue {
    items: Vec<QueueItem>,
}

impl WaitQueue {
    pub fn from_items(items: Vec<QueueItem>) -> Self {
        Self { items }
    }

    pub fn push(&mut self, item: QueueItem) {
        self.items.push(item);
    }

    /// Remove an item without assigning it. Used both for promotion and for
    /// "completed while still queued" cancellation.
    pub fn cancel(&mut self, service_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.service_id != service_id);
        self.items.len() != before
    }

    pub fn contains(&self, service_id: &str) -> bool {
        self.items.iter().any(|i| i.service_id == service_id)
    }

    pub fn items(&self) -> &[QueueItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// All scheduling state guarded by the dispatcher lock.
pub struct ShopState {
    pub registry: WorkerRegistry,
    pub queue: WaitQueue,
    pub active: HashMap<String, ActiveService>,
    pub rng: PoolRng,
}

impl ShopState {
    pub fn empty(config: &ShopConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => PoolRng::seeded(seed),
            None => PoolRng::from_clock(),
        };
        Self {
            registry: WorkerRegistry::new(),
            queue: WaitQueue::default(),
            active: HashMap::new(),
            rng,
        }
    }

    pub fn with_default_pool(config: &ShopConfig) -> Self {
        let mut state = Self::empty(config);
        state.registry.initialize(config, &mut state.rng);
        state
    }
}

/// Per-worker row in a dashboard snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerStatusRow {
    pub id: String,
    pub name: String,
    pub specialization: String,
    pub workload_percentage: f64,
    pub current_jobs: usize,
    pub max_jobs: usize,
    pub current_workload: f64,
    pub total_capacity: f64,
    pub efficiency: f64,
    pub rating: f64,
    pub is_available: bool,
    pub status: WorkloadStatus,
    pub jobs_list: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkloadStatus {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShopSummary {
    pub total_workers: usize,
    pub total_active_jobs: usize,
    pub available_workers: usize,
    pub queued_services: usize,
    pub total_capacity: f64,
    pub utilized_capacity: f64,
    pub total_capacity_utilization: f64,
}

/// Read-only view of the whole shop for dashboards and the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct ShopSnapshot {
    pub workers: Vec<WorkerStatusRow>,
    pub queue: Vec<QueueItem>,
    pub summary: ShopSummary,
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Entry point for all scheduling operations.
pub struct Dispatcher {
    state: Arc<RwLock<ShopState>>,
    config: ShopConfig,
}

impl Dispatcher {
    /// Create a dispatcher with the default pool, loading persisted state
    /// first when a state path is configured. A load failure falls back to
    /// the default pool rather than failing.
    pub fn new(config: ShopConfig) -> Self {
        let state = match &config.state_path {
            Some(path) => store::load_or_default(path, &config),
            None => ShopState::with_default_pool(&config),
        };
        Self::from_state(config, state)
    }

    /// Wrap an already-built state, e.g. one assembled by a test or loaded
    /// through some other channel.
    pub fn from_state(config: ShopConfig, state: ShopState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
            config,
        }
    }

    /// Create a dispatcher with no workers. The pool initializes itself on
    /// the first assignment, mirroring recovery from an empty state file.
    pub fn empty(config: ShopConfig) -> Self {
        Self {
            state: Arc::new(RwLock::new(ShopState::empty(&config))),
            config,
        }
    }

    /// Submit a job for assignment. Either commits it to a worker's timeline
    /// or parks it in the wait queue; never errors for lack of capacity.
    pub async fn assign(
        &self,
        duration_hours: f64,
        category: ServiceCategory,
        car_model: &str,
    ) -> Result<AssignmentResult> {
        if !duration_hours.is_finite() || duration_hours <= 0.0 {
            return Err(DispatchError::InvalidDuration(duration_hours));
        }
        let request = JobRequest {
            duration_hours,
            category,
            car_model: car_model.to_string(),
        };

        let result = {
            let mut state = self.state.write().await;

            if state.registry.is_empty() {
                tracing::warn!("No workers registered, initializing default pool");
                let ShopState { registry, rng, .. } = &mut *state;
                registry.initialize(&self.config, rng);
            }

            let now = Utc::now();
            let buffer = self.config.capacity_buffer_hours;
            match assigner::choose_worker(&state.registry, category, buffer) {
                Some(worker_id) => {
                    AssignmentResult::Assigned(Self::commit(&mut state, &worker_id, &request, now))
                }
                None => AssignmentResult::Queued(Self::enqueue(&mut state, &request, now)),
            }
        };

        self.persist().await;
        Ok(result)
    }

    /// Mark a service finished. Removes it from its worker (recomputing the
    /// workload) and immediately drains the wait queue inside the same
    /// critical section, so a freed worker is offered to queued work before
    /// anyone else can observe the gap. Returns false for unknown ids.
    pub async fn complete(&self, service_id: &str) -> bool {
        let found = {
            let mut state = self.state.write().await;

            if let Some(entry) = state.active.remove(service_id) {
                if !state.registry.apply_job_remove(&entry.worker_id, service_id) {
                    tracing::error!(
                        service_id,
                        worker_id = %entry.worker_id,
                        "Active index out of sync with worker jobs"
                    );
                }
                tracing::info!(
                    service_id,
                    worker_id = %entry.worker_id,
                    "Service completed"
                );
                let promoted = Self::drain(&mut state, self.config.capacity_buffer_hours);
                for assigned in &promoted {
                    tracing::info!(
                        service_id = %assigned.service_id,
                        worker_id = %assigned.worker_id,
                        "Promoted queued service"
                    );
                }
                true
            } else if state.queue.cancel(service_id) {
                tracing::info!(service_id, "Removed service from queue");
                true
            } else {
                false
            }
        };

        if found {
            self.persist().await;
        }
        found
    }

    /// Current worker records, cloned under the read lock.
    pub async fn workers(&self) -> Vec<crate::scheduler::registry::Worker> {
        self.state.read().await.registry.workers().to_vec()
    }

    pub async fn find_worker(
        &self,
        worker_id: &str,
    ) -> Option<crate::scheduler::registry::Worker> {
        self.state.read().await.registry.find(worker_id).cloned()
    }

    /// Queue contents in FIFO order, cloned under the read lock.
    pub async fn queued_items(&self) -> Vec<QueueItem> {
        self.state.read().await.queue.items().to_vec()
    }

    /// Read-only view for dashboards. Consistent under the read lock.
    pub async fn snapshot(&self) -> ShopSnapshot {
        let state = self.state.read().await;
        let buffer = self.config.capacity_buffer_hours;

        let workers: Vec<WorkerStatusRow> = state
            .registry
            .workers()
            .iter()
            .map(|w| {
                let pct = w.workload_percentage();
                let status = if pct < 40.0 {
                    WorkloadStatus::Low
                } else if pct < 70.0 {
                    WorkloadStatus::Medium
                } else {
                    WorkloadStatus::High
                };
                WorkerStatusRow {
                    id: w.id.clone(),
                    name: w.name.clone(),
                    specialization: w.specialization.to_string(),
                    workload_percentage: round1(pct),
                    current_jobs: w.current_jobs.len(),
                    max_jobs: w.max_concurrent_jobs,
                    current_workload: round2(w.current_workload_hours),
                    total_capacity: w.total_capacity_hours,
                    efficiency: w.efficiency,
                    rating: w.rating,
                    is_available: w.has_room(buffer),
                    status,
                    jobs_list: w
                        .current_jobs
                        .iter()
                        .map(|j| format!("{} ({})", j.car_model, j.service_category))
                        .collect(),
                }
            })
            .collect();

        let total_capacity = state.registry.total_capacity_hours();
        let utilized = state.registry.utilized_capacity_hours();
        let utilization = if total_capacity > 0.0 {
            utilized / total_capacity * 100.0
        } else {
            0.0
        };

        ShopSnapshot {
            summary: ShopSummary {
                total_workers: state.registry.workers().len(),
                total_active_jobs: state.registry.total_active_jobs(),
                available_workers: state.registry.available_workers(None, buffer).len(),
                queued_services: state.queue.len(),
                total_capacity,
                utilized_capacity: utilized,
                total_capacity_utilization: round1(utilization),
            },
            queue: state.queue.items().to_vec(),
            workers,
        }
    }

    /// Clear everything and reinitialize the default pool.
    pub async fn reset(&self) {
        {
            let mut state = self.state.write().await;
            state.queue.clear();
            state.active.clear();
            let fresh = ShopState::with_default_pool(&self.config);
            state.registry = fresh.registry;
            tracing::info!("Shop state reset to default pool");
        }
        self.persist().await;
    }

    /// Commit a request to a specific worker's timeline and index it.
    fn commit(
        state: &mut ShopState,
        worker_id: &str,
        request: &JobRequest,
        now: DateTime<Utc>,
    ) -> AssignedJob {
        let active = &state.active;
        let service_id = timeline::next_service_id(now, worker_id, |id| active.contains_key(id));

        // choose_worker only returns ids present in the registry
        let worker = state
            .registry
            .find(worker_id)
            .expect("chosen worker exists in registry");
        let job = timeline::allocate(worker, request, service_id.clone(), now);

        state.registry.apply_job_add(worker_id, job.clone());
        let worker = state.registry.find(worker_id).expect("worker still exists");
        let summary = timeline::assignment_summary(worker, &job);

        state.active.insert(
            service_id,
            ActiveService {
                worker_id: worker.id.clone(),
                worker_name: worker.name.clone(),
                job,
            },
        );

        tracing::info!(
            service_id = %summary.service_id,
            worker_id = %summary.worker_id,
            specialization = %summary.specialization,
            completion = %summary.completion_time,
            "Assigned service"
        );
        summary
    }

    /// Park a request in the wait queue with a wait-time snapshot.
    fn enqueue(state: &mut ShopState, request: &JobRequest, now: DateTime<Utc>) -> QueuedJob {
        let base = format!("QUEUE_{}", now.format("%Y%m%d%H%M%S"));
        let mut service_id = base.clone();
        let mut n = 2u32;
        while state.queue.contains(&service_id) {
            service_id = format!("{}-{}", base, n);
            n += 1;
        }

        // The snapshot stored on the item sees the queue before this job
        // joins it; the returned estimate sees the queue including it.
        let wait_snapshot = estimate::estimate_wait(&state.registry, state.queue.len(), now);
        state.queue.push(QueueItem {
            service_id: service_id.clone(),
            car_model: request.car_model.clone(),
            service_category: request.category,
            job_duration: request.duration_hours,
            added_to_queue: now,
            estimated_wait_hours: wait_snapshot,
        });

        let queue_position = state.queue.len();
        let estimated_wait_hours =
            estimate::estimate_wait(&state.registry, state.queue.len(), now);
        tracing::info!(
            service_id = %service_id,
            queue_position,
            estimated_wait_hours,
            "Service queued, no worker has capacity"
        );
        QueuedJob {
            service_id,
            queue_position,
            estimated_wait_hours,
            job_duration: request.duration_hours,
        }
    }

    /// Offer queued jobs to freed capacity, FIFO over a snapshot of the
    /// queue. Promotion deliberately ignores the specialization ladder and
    /// takes the first available worker in registry order; unassignable
    /// items stay queued in their original order.
    fn drain(state: &mut ShopState, buffer_hours: f64) -> Vec<AssignedJob> {
        let pending: Vec<QueueItem> = state.queue.items().to_vec();
        let mut promoted = Vec::new();

        for item in pending {
            let Some(worker_id) = state.registry.first_available(buffer_hours) else {
                continue;
            };
            state.queue.cancel(&item.service_id);
            let request = JobRequest {
                duration_hours: item.job_duration,
                category: item.service_category,
                car_model: item.car_model.clone(),
            };
            promoted.push(Self::commit(state, &worker_id, &request, Utc::now()));
        }

        promoted
    }

    /// Best-effort save of the current state. Never rolls back memory.
    async fn persist(&self) {
        let Some(path) = &self.config.state_path else {
            return;
        };
        let state = self.state.read().await;
        if let Err(e) = store::save(path, &state) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to persist workload state");
        }
    }
}
