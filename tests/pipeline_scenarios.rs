//! End-to-end scenarios for the full engine.
//!
//! These run the real wiring — thread-backed kernel, wall-clock ticks,
//! in-memory blob storage — with noise disabled and a fixed seed, so every
//! worker classifies each dataset identically and consensus is unanimous.

use std::sync::Arc;
use std::time::{Duration, Instant};

use laxity_pipeline::config::PipelineConfig;
use laxity_pipeline::kernel::TaskPrimitive;
use laxity_pipeline::engine::Engine;
use laxity_pipeline::infra::{MemBlobStore, MemorySink};
use laxity_pipeline::kernel::{MonotonicClock, ThreadKernel};

fn fast_config() -> PipelineConfig {
    let mut cfg = PipelineConfig {
        success_probability: 1.0,
        rng_seed: Some(42),
        ..PipelineConfig::default()
    };
    cfg.timing.producer_period = 50;
    cfg.timing.producer_deadline = 30;
    cfg.timing.producer_budget = 10;
    cfg.timing.dispatcher_deadline = 50;
    cfg.timing.dispatcher_budget = 10;
    cfg.timing.worker_deadline = 25;
    cfg.timing.worker_budget = 5;
    cfg.timing.load_period = 100;
    cfg.timing.load_deadline = 100;
    cfg.timing.load_budget = 10;
    cfg
}

fn wait_for_reports(sink: &MemorySink, count: usize, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    while sink.len() < count {
        assert!(
            Instant::now() < deadline,
            "timed out with {} of {count} reports",
            sink.len()
        );
        std::thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn noise_free_pipeline_reaches_unanimous_consensus() {
    let cfg = fast_config();
    let kernel = Arc::new(ThreadKernel::new());
    let sink = Arc::new(MemorySink::new());
    let store = Arc::new(MemBlobStore::new());

    let _handle = Engine::start(
        cfg,
        kernel,
        Arc::new(MonotonicClock::new()),
        store.clone(),
        sink.clone(),
    )
    .unwrap();

    wait_for_reports(&sink, 2, Duration::from_secs(10));

    // With noise disabled every worker scans the same dataset with the same
    // deterministic rule, so whichever way the vote goes it is 9-0.
    for report in sink.reports() {
        assert_eq!(report.pool_size, 9);
        assert_eq!(report.agreeing, 9);
    }
}

#[test]
fn dispatch_populates_the_full_task_set_once() {
    let cfg = fast_config();
    let kernel = Arc::new(ThreadKernel::new());
    let sink = Arc::new(MemorySink::new());

    let handle = Engine::start(
        cfg,
        kernel.clone(),
        Arc::new(MonotonicClock::new()),
        Arc::new(MemBlobStore::new()),
        sink.clone(),
    )
    .unwrap();

    wait_for_reports(&sink, 3, Duration::from_secs(10));

    // Scheduler + producer + dispatcher + load generator + 9 lazy workers,
    // with no re-creation across rounds.
    assert_eq!(kernel.task_count(), 13);

    // The scheduler holds the top of the priority range; pipeline tasks
    // live strictly below it.
    assert_eq!(kernel.priority_of(handle.scheduler()), Some(15));
    for task in [handle.producer(), handle.dispatcher(), handle.load()] {
        let priority = kernel.priority_of(task).unwrap();
        assert!(priority < 15, "task priority {priority} not below scheduler");
        assert!(priority >= 1);
    }
}

#[test]
fn reclaimed_datasets_do_not_accumulate() {
    let cfg = fast_config();
    let sink = Arc::new(MemorySink::new());
    let store = Arc::new(MemBlobStore::new());

    let _handle = Engine::start(
        cfg,
        Arc::new(ThreadKernel::new()),
        Arc::new(MonotonicClock::new()),
        store.clone(),
        sink.clone(),
    )
    .unwrap();

    wait_for_reports(&sink, 3, Duration::from_secs(10));

    // Each consumed dataset is deleted after its consensus round; at most
    // the in-flight dataset and the one being written remain.
    assert!(store.len() <= 2, "{} datasets leaked", store.len());
}
