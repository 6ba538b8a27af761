use std::path::PathBuf;

/// Tunables for the default worker pool and scheduling behavior.
///
/// The numeric defaults mirror the production shop: 20 mechanics, 8h daily
/// capacity, 3 concurrent job slots, and a 2h safety buffer held back from
/// each worker's capacity so a single long job cannot overcommit a day.
#[derive(Debug, Clone)]
pub struct ShopConfig {
    /// Number of workers created when the registry initializes an empty pool
    pub worker_count: usize,
    /// Daily capacity budget per worker, in hours
    pub total_capacity_hours: f64,
    /// Concurrent job slots per worker
    pub max_concurrent_jobs: usize,
    /// Hours reserved against overcommitment when checking availability
    pub capacity_buffer_hours: f64,
    /// Seed for the worker attribute RNG. None derives one from the clock.
    pub seed: Option<u64>,
    /// Where to persist the workload snapshot, if anywhere
    pub state_path: Option<PathBuf>,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            worker_count: 20,
            total_capacity_hours: 8.0,
            max_concurrent_jobs: 3,
            capacity_buffer_hours: 2.0,
            seed: None,
            state_path: None,
        }
    }
}

impl ShopConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_worker_count(mut self, count: usize) -> Self {
        self.worker_count = count;
        self
    }

    pub fn with_state_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_path = Some(path.into());
        self
    }
}
