//! Least Laxity First scheduler.
//!
//! Runs at the highest priority in the system on a period far shorter than
//! any task deadline. Each pass takes the descriptor table lock exactly
//! once: it charges a tick of budget to the currently running task,
//! recomputes every active laxity against one consistent `now`, and
//! reassigns kernel priorities in ascending-laxity order. Holding the lock
//! for the whole pass trades a little contention for a simple correctness
//! argument.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::kernel::{Priority, TaskPrimitive, Tick, TickClock};

use super::descriptor::DescriptorTable;

/// The LLF control loop.
pub struct LaxityScheduler {
    table: Arc<Mutex<DescriptorTable>>,
    kernel: Arc<dyn TaskPrimitive>,
    clock: Arc<dyn TickClock>,
    /// The scheduler's own priority; assignment starts one level below.
    top_priority: Priority,
    period: Tick,
}

impl LaxityScheduler {
    /// Create a scheduler over the shared descriptor table.
    pub fn new(
        table: Arc<Mutex<DescriptorTable>>,
        kernel: Arc<dyn TaskPrimitive>,
        clock: Arc<dyn TickClock>,
        top_priority: Priority,
        period: Tick,
    ) -> Self {
        Self {
            table,
            kernel,
            clock,
            top_priority,
            period,
        }
    }

    /// One scheduling pass at the clock's current tick.
    pub fn pass(&self) {
        let now = self.clock.now();
        let current = self.kernel.current_task();

        let table = &mut *self.table.lock();
        table.tick_update(now, current);
        for (slot, priority) in table.assign_priorities(self.top_priority) {
            if let Some(handle) = table.slot(slot).handle {
                trace!(slot, priority, laxity = table.slot(slot).laxity, "reprioritize");
                self.kernel.set_priority(handle, priority);
            }
        }
    }

    /// Run passes forever on the fixed period, waking on absolute time so
    /// the control loop never drifts.
    pub fn run(&self) {
        let mut last_wake = self.clock.now();
        loop {
            self.pass();
            self.clock.delay_until(&mut last_wake, self.period);
        }
    }
}
