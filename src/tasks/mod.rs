//! Task bodies for the pipeline.
//!
//! Each body is a struct owning its collaborators plus a `run` loop that the
//! kernel drives on a dedicated schedulable task. All of them follow the
//! same activation protocol: mark the descriptor slot active with a fresh
//! budget under the table lock, invoke the kernel trace hook, do the unit of
//! work, then mark the slot inactive and drop back to the base priority
//! before blocking again.

pub mod dispatcher;
pub mod load;
pub mod producer;
pub mod worker;

pub use dispatcher::{Dispatcher, WorkerFactory, WorkerSlot};
pub use load::LoadGenerator;
pub use producer::Producer;
pub use worker::Worker;

use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::DescriptorTable;
use crate::kernel::{Priority, TaskHandle, TaskPrimitive, Tick, TickClock};

/// Shared collaborators plus the descriptor slot a task body operates on.
#[derive(Clone)]
pub struct TaskContext {
    /// The guarded descriptor table every task shares.
    pub table: Arc<Mutex<DescriptorTable>>,
    /// Kernel task primitive.
    pub kernel: Arc<dyn TaskPrimitive>,
    /// Tick clock.
    pub clock: Arc<dyn TickClock>,
    /// This task's slot in the descriptor table.
    pub slot: usize,
    /// Priority every task resets itself to on completion.
    pub base_priority: Priority,
}

impl TaskContext {
    /// Record this task's handle and constant relative deadline in its slot.
    /// Called once at the top of every `run` body, before the first
    /// activation.
    pub fn register(&self, handle: TaskHandle, deadline_offset: Tick) {
        let mut table = self.table.lock();
        table.set_handle(self.slot, handle);
        table.set_deadline(self.slot, deadline_offset);
    }

    /// Mark the slot active at the start of an execution window with a fresh
    /// budget.
    pub fn activate(&self, activation_time: Tick, budget: Tick) {
        self.table.lock().activate(self.slot, activation_time, budget);
    }

    /// Mark the slot inactive without touching priority. Used on the failure
    /// paths that abandon an activation.
    pub fn deactivate(&self) {
        self.table.lock().deactivate(self.slot);
    }

    /// Finish a unit of work: mark inactive and reset to the base priority.
    /// The reset must happen before the task next blocks, otherwise a
    /// finished task would retain its elevated level indefinitely.
    pub fn complete(&self, handle: TaskHandle) {
        self.table.lock().deactivate(self.slot);
        self.kernel.set_priority(handle, self.base_priority);
    }
}
