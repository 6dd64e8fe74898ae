//! Shared task descriptor table.
//!
//! One fixed-size table holds the scheduling state of every pipeline task:
//! activation time, relative deadline, remaining execution budget, laxity,
//! and the active flag. Every task reads and writes its own slot under the
//! same single exclusive lock the scheduler takes for its pass, so no task
//! ever observes a half-updated laxity snapshot.

use crate::kernel::{Priority, TaskHandle, Tick};

/// Slot index of the periodic producer.
pub const PRODUCER_SLOT: usize = 0;
/// Slot index of the dispatcher/aggregator.
pub const DISPATCHER_SLOT: usize = 1;
/// Slot index of the periodic load generator.
pub const LOAD_SLOT: usize = 2;
/// First worker slot; workers occupy `WORKER_BASE_SLOT..task_count`.
pub const WORKER_BASE_SLOT: usize = 3;

/// Signed laxity value. Negative laxity means the task can no longer meet
/// its deadline even if it runs uninterrupted.
pub type Laxity = i64;

/// Per-task scheduling state.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskDescriptor {
    /// Handle of the underlying schedulable task. `None` until the slot is
    /// populated (worker slots are populated lazily on first dispatch).
    pub handle: Option<TaskHandle>,
    /// Tick at which the current execution window began.
    pub activation_time: Tick,
    /// Relative deadline from activation; constant per task kind.
    pub deadline_offset: Tick,
    /// Ticks of execution still owed in the current window. Signed so the
    /// decrement that crosses zero is representable; eligibility always
    /// checks `> 0`.
    pub remaining_budget: i64,
    /// Laxity at the last scheduler pass. Meaningful only while `active`.
    pub laxity: Laxity,
    /// True from activation until the task finishes its unit of work.
    pub active: bool,
}

impl TaskDescriptor {
    /// Laxity at tick `now`: time to deadline minus remaining execution.
    #[must_use]
    pub fn laxity_at(&self, now: Tick) -> Laxity {
        self.activation_time as Laxity + self.deadline_offset as Laxity
            - now as Laxity
            - self.remaining_budget
    }
}

/// Fixed-size descriptor table, zero-initialized at startup and mutated only
/// under one exclusive lock. Never resized at runtime; the only population
/// after startup is the lazy worker handle assignment, once per slot.
#[derive(Debug)]
pub struct DescriptorTable {
    slots: Vec<TaskDescriptor>,
}

impl DescriptorTable {
    /// Create a table with `task_count` zeroed slots.
    #[must_use]
    pub fn new(task_count: usize) -> Self {
        Self {
            slots: vec![TaskDescriptor::default(); task_count],
        }
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when the table has no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Read a slot.
    #[must_use]
    pub fn slot(&self, index: usize) -> &TaskDescriptor {
        &self.slots[index]
    }

    /// Mutate a slot.
    pub fn slot_mut(&mut self, index: usize) -> &mut TaskDescriptor {
        &mut self.slots[index]
    }

    /// Record the kernel handle backing a slot.
    pub fn set_handle(&mut self, index: usize, handle: TaskHandle) {
        self.slots[index].handle = Some(handle);
    }

    /// Record the constant relative deadline of a slot's task kind.
    pub fn set_deadline(&mut self, index: usize, deadline_offset: Tick) {
        self.slots[index].deadline_offset = deadline_offset;
    }

    /// Mark a slot active at the start of an execution window with a fresh
    /// budget.
    pub fn activate(&mut self, index: usize, activation_time: Tick, budget: Tick) {
        let slot = &mut self.slots[index];
        slot.activation_time = activation_time;
        slot.remaining_budget = budget as i64;
        slot.active = true;
    }

    /// Mark a slot inactive until its next activation.
    pub fn deactivate(&mut self, index: usize) {
        self.slots[index].active = false;
    }

    /// One scheduler tick over the table: charge one tick of budget to the
    /// currently running task, then recompute laxity for every active slot.
    pub fn tick_update(&mut self, now: Tick, current: Option<TaskHandle>) {
        for slot in &mut self.slots {
            if !slot.active {
                continue;
            }
            if slot.handle.is_some() && slot.handle == current {
                slot.remaining_budget -= 1;
            }
            slot.laxity = slot.laxity_at(now);
        }
    }

    /// Selection-sort priority assignment in ascending-laxity order.
    ///
    /// Repeatedly scans for the active, not-yet-assigned slot with remaining
    /// budget and minimum laxity, handing out strictly descending levels
    /// starting one below `below`. The strict `<` comparison means laxity
    /// ties go to the lowest slot index. Inactive or exhausted slots are
    /// skipped and keep whatever priority they already had. O(n²) over a
    /// small fixed task count.
    #[must_use]
    pub fn assign_priorities(&self, below: Priority) -> Vec<(usize, Priority)> {
        let n = self.slots.len();
        let mut assigned = vec![false; n];
        let mut out = Vec::with_capacity(n);
        let mut priority = below - 1;

        for _ in 0..n {
            let mut best: Option<usize> = None;
            for (j, slot) in self.slots.iter().enumerate() {
                if !slot.active || assigned[j] || slot.remaining_budget <= 0 {
                    continue;
                }
                if best.is_none_or(|b| slot.laxity < self.slots[b].laxity) {
                    best = Some(j);
                }
            }
            let Some(j) = best else { break };
            out.push((j, priority));
            assigned[j] = true;
            priority -= 1;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_slot(activation: Tick, deadline: Tick, budget: i64) -> TaskDescriptor {
        TaskDescriptor {
            handle: None,
            activation_time: activation,
            deadline_offset: deadline,
            remaining_budget: budget,
            laxity: 0,
            active: true,
        }
    }

    #[test]
    fn laxity_formula_matches_invariant() {
        let slot = active_slot(1000, 300, 100);
        // activation + deadline - now - remaining = 1000 + 300 - 1050 - 100
        assert_eq!(slot.laxity_at(1050), 150);
    }

    #[test]
    fn laxity_can_go_negative_past_deadline() {
        let slot = active_slot(0, 100, 50);
        assert_eq!(slot.laxity_at(200), -150);
    }

    #[test]
    fn tick_update_charges_only_the_running_task() {
        let mut table = DescriptorTable::new(3);
        let running = TaskHandle(7);
        let other = TaskHandle(8);
        table.set_handle(0, running);
        table.set_handle(1, other);
        table.set_deadline(0, 300);
        table.set_deadline(1, 300);
        table.activate(0, 0, 100);
        table.activate(1, 0, 100);

        table.tick_update(10, Some(running));
        assert_eq!(table.slot(0).remaining_budget, 99);
        assert_eq!(table.slot(1).remaining_budget, 100);
        // Both active slots had laxity refreshed against the same `now`.
        assert_eq!(table.slot(0).laxity, 300 - 10 - 99);
        assert_eq!(table.slot(1).laxity, 300 - 10 - 100);
    }

    #[test]
    fn tick_update_skips_inactive_slots() {
        let mut table = DescriptorTable::new(2);
        let h = TaskHandle(1);
        table.set_handle(0, h);
        table.activate(0, 0, 50);
        table.deactivate(0);
        table.slot_mut(0).laxity = 123;

        table.tick_update(40, Some(h));
        assert_eq!(table.slot(0).remaining_budget, 50);
        assert_eq!(table.slot(0).laxity, 123);
    }

    #[test]
    fn priorities_descend_in_ascending_laxity_order() {
        let mut table = DescriptorTable::new(3);
        for i in 0..3 {
            table.activate(i, 0, 10);
        }
        table.slot_mut(0).laxity = 50;
        table.slot_mut(1).laxity = 5;
        table.slot_mut(2).laxity = 20;

        let assignment = table.assign_priorities(15);
        assert_eq!(assignment, vec![(1, 14), (2, 13), (0, 12)]);
    }

    #[test]
    fn laxity_ties_break_to_lowest_slot_index() {
        let mut table = DescriptorTable::new(3);
        for i in 0..3 {
            table.activate(i, 0, 10);
            table.slot_mut(i).laxity = 7;
        }

        let assignment = table.assign_priorities(10);
        assert_eq!(assignment, vec![(0, 9), (1, 8), (2, 7)]);
    }

    #[test]
    fn inactive_and_exhausted_slots_are_excluded() {
        let mut table = DescriptorTable::new(4);
        for i in 0..4 {
            table.activate(i, 0, 10);
            table.slot_mut(i).laxity = i as Laxity;
        }
        table.deactivate(1);
        table.slot_mut(2).remaining_budget = 0;
        table.slot_mut(3).remaining_budget = -1;

        let assignment = table.assign_priorities(10);
        assert_eq!(assignment, vec![(0, 9)]);
    }

    #[test]
    fn empty_table_assigns_nothing() {
        let table = DescriptorTable::new(0);
        assert!(table.assign_priorities(10).is_empty());
        assert!(table.is_empty());
    }
}
