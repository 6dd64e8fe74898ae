//! Thread-backed adapter for the kernel task primitive.
//!
//! A hosted process cannot preempt its own threads, so priorities are
//! recorded in a registry rather than enforced by a dispatcher. The registry
//! is the scheduler's observable contract: every `set_priority` the laxity
//! scheduler issues lands here, and tests assert against it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, error};

use crate::core::PipelineError;

use super::{Priority, TaskBody, TaskHandle, TaskPrimitive};

/// Registered state for one spawned task.
#[derive(Debug)]
struct TaskState {
    name: String,
    priority: Priority,
}

/// Kernel adapter that backs each task with a dedicated OS thread and keeps
/// a priority registry in place of a preemptive dispatcher.
#[derive(Debug, Default)]
pub struct ThreadKernel {
    next_id: AtomicU64,
    registry: RwLock<HashMap<TaskHandle, TaskState>>,
    current: Mutex<Option<TaskHandle>>,
}

impl ThreadKernel {
    /// Create an empty kernel adapter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Name a task was spawned under, if the handle is known.
    #[must_use]
    pub fn name_of(&self, handle: TaskHandle) -> Option<String> {
        self.registry.read().get(&handle).map(|s| s.name.clone())
    }

    /// Number of tasks spawned so far.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.registry.read().len()
    }
}

impl TaskPrimitive for ThreadKernel {
    fn spawn(&self, name: &str, priority: Priority, body: TaskBody) -> Result<TaskHandle, PipelineError> {
        let handle = TaskHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.registry.write().insert(
            handle,
            TaskState { name: name.to_owned(), priority },
        );

        let thread_name = name.to_owned();
        let result = thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                debug!(task = %thread_name, "task started");
                body(handle);
                debug!(task = %thread_name, "task exited");
            });

        match result {
            Ok(_join) => Ok(handle),
            Err(e) => {
                self.registry.write().remove(&handle);
                error!(task = name, error = %e, "failed to spawn task thread");
                Err(PipelineError::Spawn(e.to_string()))
            }
        }
    }

    fn set_priority(&self, handle: TaskHandle, priority: Priority) {
        if let Some(state) = self.registry.write().get_mut(&handle) {
            state.priority = priority;
        }
    }

    fn priority_of(&self, handle: TaskHandle) -> Option<Priority> {
        self.registry.read().get(&handle).map(|s| s.priority)
    }

    fn current_task(&self) -> Option<TaskHandle> {
        *self.current.lock()
    }

    fn note_running(&self, handle: TaskHandle) {
        *self.current.lock() = Some(handle);
    }
}
