//! Runs the pipeline indefinitely with the default collaborators.
//!
//! Consensus lines go to stdout; structured logs follow `RUST_LOG`.

use std::thread;

use laxity_pipeline::config::PipelineConfig;
use laxity_pipeline::core::AppResult;
use laxity_pipeline::engine::Engine;
use laxity_pipeline::util::telemetry::init_tracing;

fn main() -> AppResult<()> {
    init_tracing();

    let config = PipelineConfig::default();
    let _handle = Engine::start_default(config)?;

    // The engine has no shutdown protocol; it runs until the process is
    // killed.
    loop {
        thread::park();
    }
}
