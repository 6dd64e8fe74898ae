//! Periodic CPU load generator.

use std::hint;

use tracing::trace;

use crate::config::PipelineConfig;
use crate::kernel::{TaskHandle, Tick};

use super::TaskContext;

/// Periodic task with no data dependency that burns its worst-case
/// execution time on every activation. It exists purely to contend for CPU
/// so the scheduler has non-trivial laxity orderings to resolve.
pub struct LoadGenerator {
    ctx: TaskContext,
    period: Tick,
    deadline: Tick,
    budget: Tick,
}

impl LoadGenerator {
    /// Build the load generator body.
    pub fn new(ctx: TaskContext, config: &PipelineConfig) -> Self {
        Self {
            ctx,
            period: config.timing.load_period,
            deadline: config.timing.load_deadline,
            budget: config.timing.load_budget,
        }
    }

    /// Periodic loop: activate, spin for the full budget, deactivate, sleep
    /// to the next absolute period boundary.
    pub fn run(self, handle: TaskHandle) {
        self.ctx.register(handle, self.deadline);
        let mut last_wake = self.ctx.clock.now();

        loop {
            self.ctx.activate(last_wake, self.budget);
            self.ctx.kernel.note_running(handle);
            trace!(window_start = last_wake, "load burst begins");

            // A genuine busy-wait on the tick counter, not a sleep: the
            // point is to occupy the CPU for the whole budget.
            while self.ctx.clock.now().saturating_sub(last_wake) < self.budget {
                hint::spin_loop();
            }

            self.ctx.complete(handle);
            self.ctx.clock.delay_until(&mut last_wake, self.period);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DescriptorTable, LOAD_SLOT};
    use crate::kernel::{MonotonicClock, TaskPrimitive, ThreadKernel};
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn load_generator_toggles_active_across_its_window() {
        let mut cfg = PipelineConfig::default();
        cfg.timing.load_period = 40;
        cfg.timing.load_budget = 15;
        cfg.timing.load_deadline = 40;

        let table = Arc::new(Mutex::new(DescriptorTable::new(cfg.task_count())));
        let kernel: Arc<ThreadKernel> = Arc::new(ThreadKernel::new());
        let ctx = TaskContext {
            table: table.clone(),
            kernel: kernel.clone(),
            clock: Arc::new(MonotonicClock::new()),
            slot: LOAD_SLOT,
            base_priority: cfg.priorities.base,
        };
        let load = LoadGenerator::new(ctx, &cfg);
        kernel
            .spawn("T4", 1, Box::new(move |h| load.run(h)))
            .unwrap();

        // Mid-burst the slot is active with the configured budget.
        std::thread::sleep(Duration::from_millis(5));
        {
            let t = table.lock();
            assert!(t.slot(LOAD_SLOT).active);
            assert_eq!(t.slot(LOAD_SLOT).remaining_budget, 15);
            assert_eq!(t.slot(LOAD_SLOT).deadline_offset, 40);
        }

        // After the burst but before the next period it is inactive.
        std::thread::sleep(Duration::from_millis(20));
        assert!(!table.lock().slot(LOAD_SLOT).active);
    }
}
