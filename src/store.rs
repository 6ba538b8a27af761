//! JSON persistence for the workload state.
//!
//! The file is a convenience snapshot, not a source of truth while the
//! process runs: loads happen once at startup, saves are best-effort after
//! each mutation. Any load failure falls back to the default pool. Worker
//! records written by older builds may lack newer fields; a single backfill
//! pass fills those with defaults at load time.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ShopConfig;
use crate::dispatcher::{ActiveService, ShopState, WaitQueue};
use crate::error::Result;
use crate::rng::PoolRng;
use crate::scheduler::job::{Job, QueueItem, Specialization};
use crate::scheduler::registry::{specialization_for_ordinal, Worker, WorkerRegistry};

/// Bump when the worker record gains fields that need backfilling.
const CURRENT_VERSION: u32 = 1;

/// Worker record as written to disk. Fields added after the first release
/// are optional so older files still parse; `backfill` fills them in.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedWorker {
    id: String,
    name: String,
    #[serde(default)]
    specialization: Option<Specialization>,
    #[serde(default)]
    current_jobs: Vec<Job>,
    total_capacity_hours: f64,
    #[serde(default)]
    current_workload_hours: f64,
    #[serde(default)]
    max_concurrent_jobs: Option<usize>,
    #[serde(default)]
    efficiency: Option<f64>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    experience_years: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedState {
    #[serde(default)]
    version: u32,
    workers: Vec<PersistedWorker>,
    #[serde(default)]
    active_services: HashMap<String, ActiveService>,
    #[serde(default)]
    service_queue: Vec<QueueItem>,
    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,
}

/// Parse the worker ordinal out of a `W07`-style id for the banding rule.
fn ordinal_from_id(id: &str, fallback: usize) -> usize {
    id.trim_start_matches(|c: char| !c.is_ascii_digit())
        .parse()
        .unwrap_or(fallback)
}

/// One explicit migration pass over loaded worker records. Missing fields
/// get the same defaults a fresh pool would draw. Returns how many records
/// were touched.
fn backfill(
    workers: Vec<PersistedWorker>,
    config: &ShopConfig,
    rng: &mut PoolRng,
) -> (Vec<Worker>, usize) {
    let pool_size = workers.len().max(1);
    let mut migrated = 0usize;

    let filled = workers
        .into_iter()
        .enumerate()
        .map(|(idx, pw)| {
            let complete = pw.specialization.is_some()
                && pw.max_concurrent_jobs.is_some()
                && pw.efficiency.is_some()
                && pw.rating.is_some()
                && pw.experience_years.is_some();
            if !complete {
                migrated += 1;
            }

            let ordinal = ordinal_from_id(&pw.id, idx + 1);
            let mut worker = Worker {
                id: pw.id,
                name: pw.name,
                specialization: pw
                    .specialization
                    .unwrap_or_else(|| specialization_for_ordinal(ordinal, pool_size)),
                current_jobs: pw.current_jobs,
                total_capacity_hours: pw.total_capacity_hours,
                current_workload_hours: pw.current_workload_hours,
                max_concurrent_jobs: pw.max_concurrent_jobs.unwrap_or(config.max_concurrent_jobs),
                efficiency: pw.efficiency.unwrap_or_else(|| rng.ratio_between(0.8, 1.2)),
                rating: pw.rating.unwrap_or_else(|| rng.ratio_between(4.0, 5.0)),
                experience_years: pw
                    .experience_years
                    .unwrap_or_else(|| rng.int_between(1, 15)),
            };
            // Trust the jobs, not the stored sum
            worker.current_workload_hours = worker.current_jobs.iter().map(|j| j.duration).sum();
            worker
        })
        .collect();

    (filled, migrated)
}

/// Load the workload state, falling back to the default pool on any failure.
pub fn load_or_default(path: &Path, config: &ShopConfig) -> ShopState {
    match try_load(path, config) {
        Ok(state) => {
            tracing::info!(
                path = %path.display(),
                workers = state.registry.workers().len(),
                active = state.active.len(),
                queued = state.queue.len(),
                "Workload state loaded"
            );
            state
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Could not load workload state, initializing default pool"
            );
            ShopState::with_default_pool(config)
        }
    }
}

fn try_load(path: &Path, config: &ShopConfig) -> Result<ShopState> {
    let raw = fs::read_to_string(path)?;
    let persisted: PersistedState = serde_json::from_str(&raw)?;

    let mut state = ShopState::empty(config);
    let (workers, migrated) = backfill(persisted.workers, config, &mut state.rng);
    if migrated > 0 {
        tracing::info!(migrated, "Backfilled legacy worker records");
    }
    if persisted.version < CURRENT_VERSION {
        tracing::debug!(
            from = persisted.version,
            to = CURRENT_VERSION,
            "Upgraded state file version"
        );
    }

    state.registry = WorkerRegistry::from_workers(workers);
    state.queue = WaitQueue::from_items(persisted.service_queue);
    state.active = persisted.active_services;
    Ok(state)
}

/// Write the current state to disk.
pub fn save(path: &Path, state: &ShopState) -> Result<()> {
    let persisted = PersistedState {
        version: CURRENT_VERSION,
        workers: state
            .registry
            .workers()
            .iter()
            .map(|w| PersistedWorker {
                id: w.id.clone(),
                name: w.name.clone(),
                specialization: Some(w.specialization),
                current_jobs: w.current_jobs.clone(),
                total_capacity_hours: w.total_capacity_hours,
                current_workload_hours: w.current_workload_hours,
                max_concurrent_jobs: Some(w.max_concurrent_jobs),
                efficiency: Some(w.efficiency),
                rating: Some(w.rating),
                experience_years: Some(w.experience_years),
            })
            .collect(),
        active_services: state.active.clone(),
        service_queue: state.queue.items().to_vec(),
        last_updated: Some(Utc::now()),
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_string_pretty(&persisted)?)?;
    Ok(())
}
