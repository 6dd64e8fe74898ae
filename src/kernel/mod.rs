//! External kernel collaborator interfaces.
//!
//! The engine assumes a preemptive priority-based kernel underneath it. The
//! two primitives it consumes are modelled here as traits: a task primitive
//! (create, reprioritize, observe the running task) and a monotonic tick
//! clock with an absolute-time periodic wake. The thread-backed adapters in
//! this module stand in for the kernel in a hosted process.

pub mod clock;
pub mod thread;

pub use clock::{ManualClock, MonotonicClock, TickClock};
pub use thread::ThreadKernel;

use crate::core::PipelineError;

/// Monotonic tick count, in milliseconds since the clock's epoch.
pub type Tick = u64;

/// A kernel priority level. Priorities form a flat integer range: the
/// scheduler occupies the top level and all idle pipeline tasks share the
/// base level.
pub type Priority = u32;

/// Opaque handle to a schedulable task, owned by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(pub u64);

/// Entry point of a schedulable task. The body receives its own handle so it
/// can reset its priority and mark itself running without consulting shared
/// state first.
pub type TaskBody = Box<dyn FnOnce(TaskHandle) + Send + 'static>;

/// Kernel task primitive: creation, priority mutation, and the trace hook
/// that tracks the single currently-running task.
pub trait TaskPrimitive: Send + Sync {
    /// Create a schedulable task with the given name and initial priority.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Spawn`] if the underlying kernel refuses to
    /// create the task.
    fn spawn(&self, name: &str, priority: Priority, body: TaskBody) -> Result<TaskHandle, PipelineError>;

    /// Change the priority of an existing task.
    fn set_priority(&self, handle: TaskHandle, priority: Priority);

    /// Current priority of a task, if the handle is known.
    fn priority_of(&self, handle: TaskHandle) -> Option<Priority>;

    /// The task most recently marked running via [`Self::note_running`].
    /// At most one task is running system-wide at any instant.
    fn current_task(&self) -> Option<TaskHandle>;

    /// Trace hook invoked by a task body when it begins doing work in an
    /// activation window. The scheduler never calls this for itself, so it
    /// is excluded from budget accounting by construction.
    fn note_running(&self, handle: TaskHandle);
}
