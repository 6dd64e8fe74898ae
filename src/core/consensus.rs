//! Majority-vote consensus over independent boolean verdicts.

/// Outcome of a majority vote across the worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Consensus {
    /// The winning boolean value.
    pub value: bool,
    /// How many workers supported the winning side.
    pub agreeing: usize,
    /// Total number of voters.
    pub pool_size: usize,
}

/// Resolve a tally of positive votes into a consensus.
///
/// The majority threshold is `floor(pool_size / 2)`: strictly more positives
/// than that yields `true` with the positive count; otherwise the result is
/// `false` and the reported count is the size of the negative side. With the
/// default pool of 9 the threshold is 4, so 5 positives flip the outcome.
#[must_use]
pub fn majority(positives: usize, pool_size: usize) -> Consensus {
    let threshold = pool_size / 2;
    if positives > threshold {
        Consensus {
            value: true,
            agreeing: positives,
            pool_size,
        }
    } else {
        Consensus {
            value: false,
            agreeing: pool_size - positives,
            pool_size,
        }
    }
}
