//! Engine wiring.
//!
//! Mirrors the startup order of the reference system: seed the RNG, build
//! the guarded descriptor table and the three bounded channels, create the
//! pipeline tasks at the base priority, and finally create the laxity
//! scheduler at the top of the priority range. Worker tasks are not created
//! here; the dispatcher populates the pool lazily on first dispatch.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use crossbeam_channel::bounded;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::config::PipelineConfig;
use crate::core::{
    AppResult, DescriptorTable, LaxityScheduler, DISPATCHER_SLOT, LOAD_SLOT, PRODUCER_SLOT,
};
use crate::infra::{BlobStore, ConsensusSink, FsBlobStore, StdoutSink};
use crate::kernel::{MonotonicClock, TaskHandle, TaskPrimitive, ThreadKernel, TickClock};
use crate::tasks::{Dispatcher, LoadGenerator, Producer, TaskContext, WorkerFactory};

/// Handles to the started engine. The engine itself runs indefinitely on
/// kernel tasks; this handle exists for observation, not control — there is
/// no shutdown protocol.
pub struct EngineHandle {
    table: Arc<Mutex<DescriptorTable>>,
    kernel: Arc<dyn TaskPrimitive>,
    scheduler: TaskHandle,
    producer: TaskHandle,
    dispatcher: TaskHandle,
    load: TaskHandle,
}

impl EngineHandle {
    /// The shared descriptor table.
    #[must_use]
    pub fn table(&self) -> &Arc<Mutex<DescriptorTable>> {
        &self.table
    }

    /// The kernel the engine was started on.
    #[must_use]
    pub fn kernel(&self) -> &Arc<dyn TaskPrimitive> {
        &self.kernel
    }

    /// Handle of the laxity scheduler task.
    #[must_use]
    pub fn scheduler(&self) -> TaskHandle {
        self.scheduler
    }

    /// Handle of the producer task.
    #[must_use]
    pub fn producer(&self) -> TaskHandle {
        self.producer
    }

    /// Handle of the dispatcher task.
    #[must_use]
    pub fn dispatcher(&self) -> TaskHandle {
        self.dispatcher
    }

    /// Handle of the load generator task.
    #[must_use]
    pub fn load(&self) -> TaskHandle {
        self.load
    }
}

/// Builds and starts the full pipeline.
pub struct Engine;

impl Engine {
    /// Start the engine on the given collaborators.
    ///
    /// # Errors
    ///
    /// Configuration validation failures and task spawn failures.
    pub fn start(
        config: PipelineConfig,
        kernel: Arc<dyn TaskPrimitive>,
        clock: Arc<dyn TickClock>,
        store: Arc<dyn BlobStore>,
        sink: Arc<dyn ConsensusSink>,
    ) -> AppResult<EngineHandle> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

        let seed = config.rng_seed.unwrap_or_else(wall_clock_seed);
        let table = Arc::new(Mutex::new(DescriptorTable::new(config.task_count())));

        let (handoff_tx, handoff_rx) = bounded(1);
        let (fan_out_tx, fan_out_rx) = bounded(config.pool_size);
        let (fan_in_tx, fan_in_rx) = bounded(config.pool_size);

        let base = config.priorities.base;
        let ctx = |slot: usize| TaskContext {
            table: Arc::clone(&table),
            kernel: Arc::clone(&kernel),
            clock: Arc::clone(&clock),
            slot,
            base_priority: base,
        };

        let producer = Producer::new(
            ctx(PRODUCER_SLOT),
            Arc::clone(&store),
            handoff_tx,
            &config,
            StdRng::seed_from_u64(seed),
        );
        let producer_handle = kernel
            .spawn("T1", base, Box::new(move |h| producer.run(h)))
            .context("spawning producer")?;

        let factory = WorkerFactory::new(
            ctx(DISPATCHER_SLOT),
            Arc::clone(&store),
            fan_out_rx,
            fan_in_tx,
            &config,
            // Worker seeds come after the producer's in the stream.
            seed.wrapping_add(1),
        );
        let dispatcher = Dispatcher::new(
            ctx(DISPATCHER_SLOT),
            Arc::clone(&store),
            handoff_rx,
            fan_out_tx,
            fan_in_rx,
            sink,
            factory,
            &config,
        );
        let dispatcher_handle = kernel
            .spawn("T2", base, Box::new(move |h| dispatcher.run(h)))
            .context("spawning dispatcher")?;

        let load = LoadGenerator::new(ctx(LOAD_SLOT), &config);
        let load_handle = kernel
            .spawn("T4", base, Box::new(move |h| load.run(h)))
            .context("spawning load generator")?;

        let scheduler = LaxityScheduler::new(
            Arc::clone(&table),
            Arc::clone(&kernel),
            Arc::clone(&clock),
            config.priorities.scheduler,
            config.timing.scheduler_period,
        );
        let scheduler_handle = kernel
            .spawn(
                "LLF",
                config.priorities.scheduler,
                Box::new(move |_h| scheduler.run()),
            )
            .context("spawning laxity scheduler")?;

        info!(
            pool_size = config.pool_size,
            scheduler_period = config.timing.scheduler_period,
            seed,
            "engine started"
        );

        Ok(EngineHandle {
            table,
            kernel,
            scheduler: scheduler_handle,
            producer: producer_handle,
            dispatcher: dispatcher_handle,
            load: load_handle,
        })
    }

    /// Start with the default collaborators: thread-backed kernel,
    /// wall-clock ticks, filesystem storage under the current directory,
    /// and stdout for consensus lines.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::start`].
    pub fn start_default(config: PipelineConfig) -> AppResult<EngineHandle> {
        Self::start(
            config,
            Arc::new(ThreadKernel::new()),
            Arc::new(MonotonicClock::new()),
            Arc::new(FsBlobStore::new(".")),
            Arc::new(StdoutSink),
        )
    }
}

/// Seed derived from wall-clock time, the reference system's startup seed.
fn wall_clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_nanos() & u128::from(u64::MAX)).unwrap_or(0))
        .unwrap_or(0)
}
