//! Sporadic classifier worker.

use std::io::BufRead;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, warn};

use crate::infra::BlobStore;
use crate::kernel::{TaskHandle, Tick};

use super::TaskContext;

/// Scan a dataset stream for values whose absolute magnitude exceeds
/// `threshold`, stopping as soon as `min_positives` of them have been seen.
///
/// The short-circuit is the point: the verdict is `true` the instant the
/// count is reached, without consuming the rest of the stream. A read or
/// parse failure ends the stream early with whatever verdict the count so
/// far supports.
pub fn scan_dataset(reader: impl BufRead, threshold: f64, min_positives: usize) -> bool {
    let mut qualifying = 0;
    'stream: for line in reader.lines() {
        let Ok(line) = line else { break };
        for token in line.split_whitespace() {
            let Ok(value) = token.parse::<f64>() else {
                break 'stream;
            };
            if value.abs() > threshold {
                qualifying += 1;
                if qualifying >= min_positives {
                    return true;
                }
            }
        }
    }
    false
}

/// Flip a raw verdict with probability `1 - success_probability`, modelling
/// an unreliable classifier with a fixed false-report rate.
pub fn noisy_verdict<R: Rng + ?Sized>(raw: bool, success_probability: f64, rng: &mut R) -> bool {
    if rng.random::<f64>() > success_probability {
        !raw
    } else {
        raw
    }
}

/// Sporadic task that classifies datasets fanned out by the dispatcher and
/// votes a (possibly inverted) boolean back on the fan-in channel.
pub struct Worker {
    ctx: TaskContext,
    store: Arc<dyn BlobStore>,
    fan_out: Receiver<String>,
    fan_in: Sender<bool>,
    rng: StdRng,
    threshold: f64,
    min_positives: usize,
    success_probability: f64,
    deadline: Tick,
    budget: Tick,
}

impl Worker {
    /// Build a worker body.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ctx: TaskContext,
        store: Arc<dyn BlobStore>,
        fan_out: Receiver<String>,
        fan_in: Sender<bool>,
        rng: StdRng,
        threshold: f64,
        min_positives: usize,
        success_probability: f64,
        deadline: Tick,
        budget: Tick,
    ) -> Self {
        Self {
            ctx,
            store,
            fan_out,
            fan_in,
            rng,
            threshold,
            min_positives,
            success_probability,
            deadline,
            budget,
        }
    }

    /// Sporadic loop: block on the fan-out channel, classify, vote, repeat.
    ///
    /// A dataset that cannot be opened is abandoned without a vote; the
    /// dispatcher's fan-in drain then stalls on the missing result. That gap
    /// is a known property of the design, not something this loop papers
    /// over with a synthetic vote.
    pub fn run(mut self, handle: TaskHandle) {
        self.ctx.register(handle, self.deadline);

        loop {
            let name = match self.fan_out.recv() {
                Ok(name) => name,
                Err(_) => {
                    debug!("fan-out channel closed; worker exiting");
                    return;
                }
            };

            let now = self.ctx.clock.now();
            self.ctx.activate(now, self.budget);
            self.ctx.kernel.note_running(handle);

            let reader = match self.store.open(&name) {
                Ok(reader) => reader,
                Err(e) => {
                    warn!(name = %name, error = %e, "cannot open dataset; abandoning activation");
                    self.ctx.deactivate();
                    continue;
                }
            };

            let raw = scan_dataset(reader, self.threshold, self.min_positives);
            let verdict = noisy_verdict(raw, self.success_probability, &mut self.rng);
            debug!(name = %name, raw, verdict, "dataset classified");

            if self.fan_in.send(verdict).is_err() {
                debug!("fan-in channel closed; worker exiting");
                return;
            }
            self.ctx.complete(handle);
        }
    }
}
