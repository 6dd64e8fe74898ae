//! Pipeline and scheduler configuration structures.
//!
//! Defaults mirror the reference task set: a 1 s producer, a 2 s load
//! generator, nine classifier workers, and a 1 ms scheduler period, with
//! deadlines and worst-case budgets per task kind.

use serde::{Deserialize, Serialize};

use crate::kernel::{Priority, Tick};

/// Per-kind timing parameters, all in ticks (milliseconds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Producer activation period.
    pub producer_period: Tick,
    /// Producer relative deadline.
    pub producer_deadline: Tick,
    /// Producer worst-case execution budget.
    pub producer_budget: Tick,
    /// Dispatcher relative deadline (sporadic, no period).
    pub dispatcher_deadline: Tick,
    /// Dispatcher worst-case execution budget.
    pub dispatcher_budget: Tick,
    /// Worker relative deadline (sporadic, no period).
    pub worker_deadline: Tick,
    /// Worker worst-case execution budget.
    pub worker_budget: Tick,
    /// Load generator activation period.
    pub load_period: Tick,
    /// Load generator relative deadline.
    pub load_deadline: Tick,
    /// Load generator worst-case execution budget, which it burns in full.
    pub load_budget: Tick,
    /// Scheduler pass period; far shorter than any deadline.
    pub scheduler_period: Tick,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            producer_period: 1000,
            producer_deadline: 300,
            producer_budget: 100,
            dispatcher_deadline: 1000,
            dispatcher_budget: 100,
            worker_deadline: 500,
            worker_budget: 50,
            load_period: 2000,
            load_deadline: 2000,
            load_budget: 500,
            scheduler_period: 1,
        }
    }
}

/// Priority space layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityConfig {
    /// Level shared by all idle pipeline tasks, and the level each task
    /// resets itself to on completion.
    pub base: Priority,
    /// The scheduler's own level, the top of the range; laxity assignment
    /// hands out strictly descending levels starting one below it.
    pub scheduler: Priority,
}

impl Default for PriorityConfig {
    fn default() -> Self {
        Self { base: 1, scheduler: 15 }
    }
}

/// Root engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of classifier workers.
    pub pool_size: usize,
    /// Values written per dataset.
    pub dataset_len: usize,
    /// Absolute-value threshold a value must exceed to qualify.
    pub magnitude_threshold: f64,
    /// Qualifying values needed for a raw `true` verdict; the worker stops
    /// scanning as soon as this many are seen.
    pub min_positives: usize,
    /// Probability a worker reports its raw verdict unchanged. `1.0`
    /// disables the noise entirely, which tests rely on.
    pub success_probability: f64,
    /// Seed for all task-local RNGs; `None` seeds from wall-clock time at
    /// startup.
    pub rng_seed: Option<u64>,
    /// Timing parameters.
    pub timing: TimingConfig,
    /// Priority space layout.
    pub priorities: PriorityConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pool_size: 9,
            dataset_len: 200,
            magnitude_threshold: 2.0,
            min_positives: 10,
            success_probability: 0.8,
            rng_seed: None,
            timing: TimingConfig::default(),
            priorities: PriorityConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Total descriptor slots: producer, dispatcher, load generator, and the
    /// worker pool.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.pool_size + 3
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// A description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.pool_size == 0 {
            return Err("pool_size must be greater than 0".into());
        }
        if self.dataset_len == 0 {
            return Err("dataset_len must be greater than 0".into());
        }
        if self.min_positives == 0 {
            return Err("min_positives must be greater than 0".into());
        }
        if !(0.0..=1.0).contains(&self.success_probability) {
            return Err("success_probability must be within [0, 1]".into());
        }
        if self.timing.scheduler_period == 0 {
            return Err("scheduler_period must be greater than 0".into());
        }
        if self.timing.producer_period == 0 || self.timing.load_period == 0 {
            return Err("periods must be greater than 0".into());
        }
        for (name, budget) in [
            ("producer_budget", self.timing.producer_budget),
            ("dispatcher_budget", self.timing.dispatcher_budget),
            ("worker_budget", self.timing.worker_budget),
            ("load_budget", self.timing.load_budget),
        ] {
            if budget == 0 {
                return Err(format!("{name} must be greater than 0"));
            }
        }
        // Every task needs its own level between base and the scheduler.
        let needed = self.task_count() as u64 + u64::from(self.priorities.base);
        if u64::from(self.priorities.scheduler) <= needed {
            return Err(format!(
                "scheduler priority {} leaves no room for {} descending task levels above base {}",
                self.priorities.scheduler,
                self.task_count(),
                self.priorities.base
            ));
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// A parse or validation failure description.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
