//! # Laxity Pipeline
//!
//! A real-time task coordination engine built around a Least Laxity First
//! (LLF) scheduler. A tight-period control loop recomputes the laxity of
//! every active task under a single shared lock and reassigns priorities in
//! ascending-laxity order, while a pipeline of periodic and sporadic tasks
//! generates the workload being arbitrated:
//!
//! - a **periodic producer** writes a dataset of normally-distributed values
//!   to blob storage under a fresh random name and hands the name off;
//! - a **sporadic dispatcher** fans the name out to a lazily-created pool of
//!   classifier workers, drains their votes, and reports a majority-vote
//!   consensus;
//! - each **worker** scans the dataset for values exceeding a magnitude
//!   threshold, short-circuiting once enough qualify, then applies
//!   independent random noise to its verdict;
//! - a **periodic load generator** burns CPU to force non-trivial
//!   laxity-based ordering decisions.
//!
//! Kernel primitives (task creation, priorities, tick clock), blob storage,
//! and the console sink are external collaborators modelled as traits with
//! in-process adapters, so every scheduling decision is observable in tests.
//!
//! ```rust,ignore
//! use laxity_pipeline::config::PipelineConfig;
//! use laxity_pipeline::engine::Engine;
//!
//! laxity_pipeline::util::telemetry::init_tracing();
//! let handle = Engine::start_default(PipelineConfig::default())?;
//! // The engine runs indefinitely; consensus lines go to the console sink.
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Descriptor table, laxity scheduler, consensus rule, and errors.
pub mod core;
/// Configuration models for timing, pool sizing, and classification.
pub mod config;
/// Engine wiring: channels, descriptor table, and task spawning.
pub mod engine;
/// Infrastructure adapters for blob storage and the consensus sink.
pub mod infra;
/// External kernel collaborator interfaces and the thread-backed adapter.
pub mod kernel;
/// Task bodies for the producer/dispatcher/worker/load pipeline.
pub mod tasks;
/// Shared utilities.
pub mod util;
