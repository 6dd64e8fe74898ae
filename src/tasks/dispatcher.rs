//! Sporadic dispatcher/aggregator.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info, warn};

use crate::config::PipelineConfig;
use crate::core::{majority, PipelineError, WORKER_BASE_SLOT};
use crate::infra::{BlobStore, ConsensusSink};
use crate::kernel::{TaskHandle, Tick};

use super::{TaskContext, Worker};

/// Lifecycle state of one worker pool slot. A slot transitions from
/// `Vacant` to `Running` exactly once, on the first dispatch that needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerSlot {
    /// No worker has been created for this pool position yet.
    Vacant,
    /// The worker exists and is blocked on the fan-out channel between
    /// activations.
    Running(TaskHandle),
}

/// Builds and spawns worker bodies on demand.
pub struct WorkerFactory {
    ctx_template: TaskContext,
    store: Arc<dyn BlobStore>,
    fan_out: Receiver<String>,
    fan_in: Sender<bool>,
    threshold: f64,
    min_positives: usize,
    success_probability: f64,
    deadline: Tick,
    budget: Tick,
    seed: u64,
}

impl WorkerFactory {
    /// Build a factory from the shared context and configuration. The
    /// context's slot field is ignored; each spawned worker gets its own.
    pub fn new(
        ctx_template: TaskContext,
        store: Arc<dyn BlobStore>,
        fan_out: Receiver<String>,
        fan_in: Sender<bool>,
        config: &PipelineConfig,
        seed: u64,
    ) -> Self {
        Self {
            ctx_template,
            store,
            fan_out,
            fan_in,
            threshold: config.magnitude_threshold,
            min_positives: config.min_positives,
            success_probability: config.success_probability,
            deadline: config.timing.worker_deadline,
            budget: config.timing.worker_budget,
            seed,
        }
    }

    /// Spawn the worker for pool position `index`, named after its position.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Spawn`] if the kernel cannot create the task.
    pub fn spawn(&self, index: usize) -> Result<TaskHandle, PipelineError> {
        let ctx = TaskContext {
            slot: WORKER_BASE_SLOT + index,
            ..self.ctx_template.clone()
        };
        let worker = Worker::new(
            ctx,
            Arc::clone(&self.store),
            self.fan_out.clone(),
            self.fan_in.clone(),
            // Independent noise per worker: distinct stream per pool index.
            StdRng::seed_from_u64(self.seed.wrapping_add(index as u64)),
            self.threshold,
            self.min_positives,
            self.success_probability,
            self.deadline,
            self.budget,
        );
        let name = format!("T3.{}", index + 1);
        let base = self.ctx_template.base_priority;
        self.ctx_template
            .kernel
            .spawn(&name, base, Box::new(move |h| worker.run(h)))
    }
}

/// Sporadic task that turns each produced dataset into a consensus report:
/// fan the name out to the pool, drain exactly one vote per worker, resolve
/// the majority, report it, and reclaim the dataset.
pub struct Dispatcher {
    ctx: TaskContext,
    store: Arc<dyn BlobStore>,
    handoff: Receiver<String>,
    fan_out: Sender<String>,
    fan_in: Receiver<bool>,
    sink: Arc<dyn ConsensusSink>,
    factory: WorkerFactory,
    slots: Vec<WorkerSlot>,
    pool_size: usize,
    deadline: Tick,
    budget: Tick,
}

impl Dispatcher {
    /// Build the dispatcher body.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ctx: TaskContext,
        store: Arc<dyn BlobStore>,
        handoff: Receiver<String>,
        fan_out: Sender<String>,
        fan_in: Receiver<bool>,
        sink: Arc<dyn ConsensusSink>,
        factory: WorkerFactory,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            ctx,
            store,
            handoff,
            fan_out,
            fan_in,
            sink,
            factory,
            slots: vec![WorkerSlot::Vacant; config.pool_size],
            pool_size: config.pool_size,
            deadline: config.timing.dispatcher_deadline,
            budget: config.timing.dispatcher_budget,
        }
    }

    /// Sporadic loop: block on the handoff channel, then run one dispatch
    /// round per received dataset name.
    pub fn run(mut self, handle: TaskHandle) {
        self.ctx.register(handle, self.deadline);

        loop {
            let name = match self.handoff.recv() {
                Ok(name) => name,
                Err(_) => {
                    debug!("handoff channel closed; dispatcher exiting");
                    return;
                }
            };
            if !self.dispatch_round(handle, &name) {
                return;
            }
        }
    }

    /// One full fan-out/fan-in/report round. Returns `false` when a channel
    /// closed and the loop should exit.
    fn dispatch_round(&mut self, handle: TaskHandle, name: &str) -> bool {
        let now = self.ctx.clock.now();
        self.ctx.activate(now, self.budget);
        self.ctx.kernel.note_running(handle);

        for index in 0..self.pool_size {
            if self.slots[index] == WorkerSlot::Vacant {
                match self.factory.spawn(index) {
                    Ok(worker) => {
                        self.ctx.table.lock().set_handle(WORKER_BASE_SLOT + index, worker);
                        self.slots[index] = WorkerSlot::Running(worker);
                        info!(index, "worker created on first dispatch");
                    }
                    Err(e) => {
                        error!(index, error = %e, "worker creation failed");
                    }
                }
            }
            if self.fan_out.send(name.to_owned()).is_err() {
                debug!("fan-out channel closed; dispatcher exiting");
                return false;
            }
        }

        // Exactly one vote per worker. Votes are not correlated back to
        // senders; only the tally matters.
        let mut positives = 0;
        for _ in 0..self.pool_size {
            match self.fan_in.recv() {
                Ok(true) => positives += 1,
                Ok(false) => {}
                Err(_) => {
                    debug!("fan-in channel closed; dispatcher exiting");
                    return false;
                }
            }
        }

        let consensus = majority(positives, self.pool_size);
        self.sink.report(&consensus);

        if let Err(e) = self.store.delete(name) {
            warn!(name = %name, error = %e, "failed to reclaim dataset; leaking it");
        }

        self.ctx.complete(handle);
        true
    }
}
