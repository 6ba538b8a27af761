mod support;

use garage_dispatch::config::ShopConfig;
use garage_dispatch::dispatcher::Dispatcher;
use garage_dispatch::scheduler::job::{AssignmentResult, ServiceCategory, Specialization};
use support::assert_invariants;
use tempfile::TempDir;

fn config_at(dir: &TempDir, seed: u64) -> ShopConfig {
    ShopConfig::default()
        .with_seed(seed)
        .with_state_path(dir.path().join("workload.json"))
}

#[tokio::test]
async fn state_survives_restart() {
    let dir = TempDir::new().unwrap();

    let assigned_id;
    {
        let dispatcher = Dispatcher::new(config_at(&dir, 42));
        let result = dispatcher
            .assign(3.0, ServiceCategory::Major, "Touareg")
            .await
            .unwrap();
        let AssignmentResult::Assigned(a) = result else {
            panic!("expected assignment");
        };
        assigned_id = a.service_id;
    }

    // A fresh dispatcher over the same file sees the same world
    let dispatcher = Dispatcher::new(config_at(&dir, 42));
    let workers = dispatcher.workers().await;
    assert_eq!(workers.len(), 20);
    assert_eq!(
        workers.iter().map(|w| w.current_jobs.len()).sum::<usize>(),
        1
    );
    assert_invariants(&workers, &dispatcher.queued_items().await);

    // And the restored job is completable
    assert!(dispatcher.complete(&assigned_id).await);
}

#[tokio::test]
async fn queued_items_survive_restart() {
    let dir = TempDir::new().unwrap();
    let config = config_at(&dir, 42).with_worker_count(1);

    {
        let dispatcher = Dispatcher::new(config.clone());
        for i in 0..5 {
            dispatcher
                .assign(1.0, ServiceCategory::General, &format!("Car-{}", i))
                .await
                .unwrap();
        }
    }

    let dispatcher = Dispatcher::new(config);
    let queue = dispatcher.queued_items().await;
    assert!(!queue.is_empty());
    // FIFO order preserved across the restart
    let models: Vec<&str> = queue.iter().map(|i| i.car_model.as_str()).collect();
    let mut sorted = models.clone();
    sorted.sort();
    assert_eq!(models, sorted);
}

#[tokio::test]
async fn missing_file_falls_back_to_default_pool() {
    let dir = TempDir::new().unwrap();
    let dispatcher = Dispatcher::new(config_at(&dir, 7));
    assert_eq!(dispatcher.workers().await.len(), 20);
}

#[tokio::test]
async fn corrupt_file_falls_back_to_default_pool() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("workload.json");
    std::fs::write(&path, "{not json at all").unwrap();

    let dispatcher = Dispatcher::new(
        ShopConfig::default().with_seed(7).with_state_path(&path),
    );
    assert_eq!(dispatcher.workers().await.len(), 20);

    // The fallback pool is fully usable
    let result = dispatcher
        .assign(2.0, ServiceCategory::Ac, "Sharan")
        .await
        .unwrap();
    assert!(!result.is_queued());
}

/// Worker records written before the specialization/efficiency fields
/// existed are backfilled once at load: banding by id ordinal, bounded
/// draws for the rest.
#[tokio::test]
async fn legacy_worker_records_are_backfilled() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("workload.json");
    let legacy = serde_json::json!({
        "workers": [
            {"id": "W01", "name": "Old Hand", "total_capacity_hours": 8.0},
            {"id": "W02", "name": "Older Hand", "total_capacity_hours": 8.0},
            {"id": "W05", "name": "Ancient Hand", "total_capacity_hours": 8.0},
        ]
    });
    std::fs::write(&path, serde_json::to_string(&legacy).unwrap()).unwrap();

    let dispatcher = Dispatcher::new(
        ShopConfig::default().with_seed(7).with_state_path(&path),
    );
    let workers = dispatcher.workers().await;
    assert_eq!(workers.len(), 3);

    for w in &workers {
        assert_eq!(w.max_concurrent_jobs, 3);
        assert!((0.8..=1.2).contains(&w.efficiency));
        assert!((4.0..=5.0).contains(&w.rating));
        assert!((1..=15).contains(&w.experience_years));
        assert!(w.current_jobs.is_empty());
        assert_eq!(w.current_workload_hours, 0.0);
    }
    // Banding over the W-number: a pool of 3 puts W01 in the first band
    assert_eq!(workers[0].specialization, Specialization::EngineSpecialist);
}

/// Unwritable state paths must not break scheduling; persistence is
/// best-effort and memory stays authoritative.
#[tokio::test]
async fn save_failure_does_not_block_assignment() {
    let dir = TempDir::new().unwrap();
    let blocking_file = dir.path().join("not-a-dir");
    std::fs::write(&blocking_file, "x").unwrap();

    let dispatcher = Dispatcher::new(
        ShopConfig::default()
            .with_seed(7)
            .with_state_path(blocking_file.join("workload.json")),
    );

    let result = dispatcher
        .assign(2.0, ServiceCategory::General, "Lupo")
        .await
        .unwrap();
    assert!(!result.is_queued());
    assert_eq!(dispatcher.snapshot().await.summary.total_active_jobs, 1);
}
