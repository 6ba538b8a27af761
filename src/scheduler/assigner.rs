//! Worker selection: weighted scoring plus the dispatch fallback ladder.

use crate::scheduler::job::{ServiceCategory, Specialization};
use crate::scheduler::registry::{Worker, WorkerRegistry};

/// Weighted score for a candidate against a trade requirement. Higher is
/// better. The weights favor an exact trade match, then spare capacity and
/// free slots, then efficiency.
pub fn score_worker(worker: &Worker, required: Specialization) -> f64 {
    let mut score = 0.0;
    if worker.specialization == required {
        score += 50.0;
    } else if worker.specialization == Specialization::GeneralMaintenance {
        score += 25.0;
    }
    score += (worker.total_capacity_hours - worker.current_workload_hours) * 10.0;
    score += (worker.max_concurrent_jobs - worker.current_jobs.len()) as f64 * 20.0;
    score += (worker.efficiency - 1.0) * 30.0;
    score
}

/// Highest-scoring candidate. Ties resolve to the earliest candidate in
/// registry iteration order (strict comparison), so the pick is stable.
pub fn pick_best<'a>(candidates: &[&'a Worker], required: Specialization) -> Option<&'a Worker> {
    let mut best: Option<(&Worker, f64)> = None;
    for candidate in candidates {
        let score = score_worker(candidate, required);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((candidate, score)),
        }
    }
    best.map(|(w, _)| w)
}

/// Candidate with the lowest committed workload, first in registry order on
/// ties. Used by the fallback rungs of the ladder.
fn least_loaded<'a>(candidates: &[&'a Worker]) -> Option<&'a Worker> {
    let mut best: Option<&Worker> = None;
    for candidate in candidates {
        match best {
            Some(b) if candidate.current_workload_hours >= b.current_workload_hours => {}
            _ => best = Some(candidate),
        }
    }
    best
}

/// The full dispatch ladder for a fresh submission. In order:
/// 1. scored pick among trade-qualified candidates,
/// 2. least-loaded general maintenance worker,
/// 3. least-loaded worker with any trade,
/// 4. none — the caller queues the job.
pub fn choose_worker(
    registry: &WorkerRegistry,
    category: ServiceCategory,
    buffer_hours: f64,
) -> Option<String> {
    let required = category.required_specialization();

    let candidates = registry.available_workers(Some(required), buffer_hours);
    if let Some(worker) = pick_best(&candidates, required) {
        tracing::debug!(
            worker_id = %worker.id,
            specialization = %worker.specialization,
            "Scored pick for {} service",
            category
        );
        return Some(worker.id.clone());
    }

    if required != Specialization::GeneralMaintenance {
        let general =
            registry.available_workers(Some(Specialization::GeneralMaintenance), buffer_hours);
        if let Some(worker) = least_loaded(&general) {
            tracing::debug!(worker_id = %worker.id, "Falling back to general pool");
            return Some(worker.id.clone());
        }
    }

    let any = registry.available_workers(None, buffer_hours);
    if let Some(worker) = least_loaded(&any) {
        tracing::debug!(worker_id = %worker.id, "Falling back to least-loaded worker");
        return Some(worker.id.clone());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worker(id: &str, spec: Specialization, efficiency: f64, workload: f64) -> Worker {
        Worker {
            id: id.to_string(),
            name: format!("Worker {}", id),
            specialization: spec,
            current_jobs: Vec::new(),
            total_capacity_hours: 8.0,
            current_workload_hours: workload,
            max_concurrent_jobs: 3,
            efficiency,
            rating: 4.5,
            experience_years: 5,
        }
    }

    #[test]
    fn exact_trade_match_outscores_general() {
        let brake = worker("W01", Specialization::BrakeExpert, 1.0, 0.0);
        let general = worker("W02", Specialization::GeneralMaintenance, 1.0, 0.0);
        let s_brake = score_worker(&brake, Specialization::BrakeExpert);
        let s_general = score_worker(&general, Specialization::BrakeExpert);
        assert!(s_brake > s_general);
        assert!((s_brake - s_general - 25.0).abs() < 1e-9);
    }

    #[test]
    fn score_components_add_up() {
        // match 50 + capacity (8-3)*10 + slots (3-0)*20 + efficiency 0.2*30
        let w = worker("W01", Specialization::EngineSpecialist, 1.2, 3.0);
        let score = score_worker(&w, Specialization::EngineSpecialist);
        assert!((score - (50.0 + 50.0 + 60.0 + 6.0)).abs() < 1e-9);
    }

    #[test]
    fn pick_best_is_deterministic_on_ties() {
        let a = worker("W01", Specialization::BrakeExpert, 1.0, 2.0);
        let b = worker("W02", Specialization::BrakeExpert, 1.0, 2.0);
        let candidates = vec![&a, &b];
        for _ in 0..10 {
            let picked = pick_best(&candidates, Specialization::BrakeExpert).unwrap();
            assert_eq!(picked.id, "W01");
        }
    }

    #[test]
    fn pick_best_prefers_lighter_workload() {
        let busy = worker("W01", Specialization::AcTechnician, 1.0, 5.0);
        let idle = worker("W02", Specialization::AcTechnician, 1.0, 0.0);
        let candidates = vec![&busy, &idle];
        let picked = pick_best(&candidates, Specialization::AcTechnician).unwrap();
        assert_eq!(picked.id, "W02");
    }

    #[test]
    fn pick_best_empty_candidates() {
        assert!(pick_best(&[], Specialization::BrakeExpert).is_none());
    }

    #[test]
    fn ladder_uses_general_pool_when_trade_is_full() {
        // over the buffered capacity of 8 - 2
        let brake = worker("W01", Specialization::BrakeExpert, 1.0, 7.0);
        let general = worker("W02", Specialization::GeneralMaintenance, 1.0, 1.0);
        let registry = WorkerRegistry::from_workers(vec![brake, general]);

        let chosen = choose_worker(&registry, ServiceCategory::Brake, 2.0);
        assert_eq!(chosen.as_deref(), Some("W02"));
    }

    #[test]
    fn ladder_returns_none_when_everyone_is_full() {
        let a = worker("W01", Specialization::BrakeExpert, 1.0, 7.5);
        let b = worker("W02", Specialization::GeneralMaintenance, 1.0, 7.5);
        let registry = WorkerRegistry::from_workers(vec![a, b]);

        assert!(choose_worker(&registry, ServiceCategory::Major, 2.0).is_none());
    }
}
