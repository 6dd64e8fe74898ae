//! Periodic dataset producer.

use std::io::{self, Write};
use std::sync::Arc;

use crossbeam_channel::Sender;
use rand::rngs::StdRng;
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::infra::BlobStore;
use crate::kernel::{TaskHandle, Tick};
use crate::util::rng::{random_blob_name, NormalSource};

use super::TaskContext;

/// Periodic task that synthesizes a dataset of normally-distributed values
/// into a freshly named blob and hands the name downstream. The capacity-1
/// handoff channel means at most one dataset is ever in flight.
pub struct Producer {
    ctx: TaskContext,
    store: Arc<dyn BlobStore>,
    handoff: Sender<String>,
    rng: StdRng,
    normal: NormalSource,
    dataset_len: usize,
    period: Tick,
    deadline: Tick,
    budget: Tick,
}

impl Producer {
    /// Build the producer body.
    pub fn new(
        ctx: TaskContext,
        store: Arc<dyn BlobStore>,
        handoff: Sender<String>,
        config: &PipelineConfig,
        rng: StdRng,
    ) -> Self {
        Self {
            ctx,
            store,
            handoff,
            rng,
            normal: NormalSource::standard(),
            dataset_len: config.dataset_len,
            period: config.timing.producer_period,
            deadline: config.timing.producer_deadline,
            budget: config.timing.producer_budget,
        }
    }

    /// Periodic loop: activate, generate, hand off, deactivate, sleep to the
    /// next absolute period boundary. A storage failure skips the cycle
    /// entirely; there is no retry.
    pub fn run(mut self, handle: TaskHandle) {
        self.ctx.register(handle, self.deadline);
        let mut last_wake = self.ctx.clock.now();

        loop {
            // Activation time is the window start, not the instant the body
            // got scheduled, so laxity is measured against the period grid.
            self.ctx.activate(last_wake, self.budget);
            self.ctx.kernel.note_running(handle);

            let name = random_blob_name(&mut self.rng);
            match self.write_dataset(&name) {
                Ok(()) => {
                    debug!(name = %name, values = self.dataset_len, "dataset written");
                    if self.handoff.send(name).is_err() {
                        debug!("handoff channel closed; producer exiting");
                        return;
                    }
                    self.ctx.complete(handle);
                }
                Err(e) => {
                    warn!(name = %name, error = %e, "dataset creation failed; skipping cycle");
                    self.ctx.deactivate();
                }
            }

            self.ctx.clock.delay_until(&mut last_wake, self.period);
        }
    }

    fn write_dataset(&mut self, name: &str) -> io::Result<()> {
        let mut writer = self.store.create(name)?;
        for _ in 0..self.dataset_len {
            writeln!(writer, "{:.6}", self.normal.sample(&mut self.rng))?;
        }
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DescriptorTable, PRODUCER_SLOT};
    use crate::infra::MemBlobStore;
    use crate::kernel::{MonotonicClock, TaskPrimitive, ThreadKernel};
    use crossbeam_channel::bounded;
    use parking_lot::Mutex;
    use rand::SeedableRng;
    use std::io::BufRead;
    use std::time::Duration;

    fn small_config() -> PipelineConfig {
        let mut cfg = PipelineConfig::default();
        cfg.dataset_len = 50;
        cfg.timing.producer_period = 5;
        cfg
    }

    #[test]
    fn producer_writes_dataset_and_hands_off_name() {
        let cfg = small_config();
        let table = Arc::new(Mutex::new(DescriptorTable::new(cfg.task_count())));
        let kernel: Arc<ThreadKernel> = Arc::new(ThreadKernel::new());
        let clock = Arc::new(MonotonicClock::new());
        let store = MemBlobStore::new();
        let (tx, rx) = bounded(1);

        let ctx = TaskContext {
            table: table.clone(),
            kernel: kernel.clone(),
            clock,
            slot: PRODUCER_SLOT,
            base_priority: cfg.priorities.base,
        };
        let producer = Producer::new(
            ctx,
            Arc::new(store.clone()),
            tx,
            &cfg,
            StdRng::seed_from_u64(3),
        );
        kernel
            .spawn("T1", 1, Box::new(move |h| producer.run(h)))
            .unwrap();

        let name = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(name.starts_with("f/") && name.ends_with(".txt"));
        assert!(store.contains(&name));

        // Every line parses back as a decimal value, in order.
        let reader = store.open(&name).unwrap();
        let values: Vec<f64> = reader
            .lines()
            .map(|l| l.unwrap().parse().unwrap())
            .collect();
        assert_eq!(values.len(), 50);

        // The producer registered itself and its deadline in the table.
        let t = table.lock();
        assert!(t.slot(PRODUCER_SLOT).handle.is_some());
        assert_eq!(t.slot(PRODUCER_SLOT).deadline_offset, 300);
    }

    #[test]
    fn handoff_backpressure_caps_in_flight_datasets_at_one() {
        let cfg = small_config();
        let table = Arc::new(Mutex::new(DescriptorTable::new(cfg.task_count())));
        let kernel: Arc<ThreadKernel> = Arc::new(ThreadKernel::new());
        let store = MemBlobStore::new();
        let (tx, rx) = bounded::<String>(1);

        let ctx = TaskContext {
            table,
            kernel: kernel.clone(),
            clock: Arc::new(MonotonicClock::new()),
            slot: PRODUCER_SLOT,
            base_priority: cfg.priorities.base,
        };
        let producer = Producer::new(
            ctx,
            Arc::new(store.clone()),
            tx,
            &cfg,
            StdRng::seed_from_u64(4),
        );
        kernel
            .spawn("T1", 1, Box::new(move |h| producer.run(h)))
            .unwrap();

        // Without a consumer the producer can complete at most two cycles:
        // one dataset delivered into the channel slot, one blocked in send.
        std::thread::sleep(Duration::from_millis(100));
        assert!(store.len() <= 2, "produced {} datasets unchecked", store.len());
        drop(rx);
    }
}
