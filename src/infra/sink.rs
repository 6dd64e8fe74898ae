//! Console sink for consensus reports.

use parking_lot::Mutex;
use tracing::info;

use crate::core::Consensus;

/// Destination for the one-line consensus report the dispatcher emits per
/// dataset.
pub trait ConsensusSink: Send + Sync {
    /// Report one consensus outcome.
    fn report(&self, consensus: &Consensus);
}

/// Writes the consensus line to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl ConsensusSink for StdoutSink {
    fn report(&self, consensus: &Consensus) {
        println!(
            "Consensus reached among {} of {} tasks. Consensus value {}",
            consensus.agreeing, consensus.pool_size, consensus.value
        );
        info!(
            agreeing = consensus.agreeing,
            pool_size = consensus.pool_size,
            value = consensus.value,
            "consensus reached"
        );
    }
}

/// Collects consensus reports in memory for assertions.
#[derive(Debug, Default)]
pub struct MemorySink {
    reports: Mutex<Vec<Consensus>>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all reports so far.
    #[must_use]
    pub fn reports(&self) -> Vec<Consensus> {
        self.reports.lock().clone()
    }

    /// Number of reports received.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.lock().len()
    }

    /// True when nothing has been reported yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.lock().is_empty()
    }
}

impl ConsensusSink for MemorySink {
    fn report(&self, consensus: &Consensus) {
        self.reports.lock().push(*consensus);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::majority;

    #[test]
    fn memory_sink_collects_reports_in_order() {
        let sink = MemorySink::new();
        sink.report(&majority(9, 9));
        sink.report(&majority(3, 9));

        let reports = sink.reports();
        assert_eq!(reports.len(), 2);
        assert!(reports[0].value);
        assert!(!reports[1].value);
        assert_eq!(reports[1].agreeing, 6);
    }
}
