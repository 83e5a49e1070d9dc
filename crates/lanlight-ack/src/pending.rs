//! Completion accounting for one wait, independent of any I/O.

use crate::error::{AckWaitCause, WaitForAcksError};
use crate::sequence_set::SequenceSet;

/// Effect of one matching acknowledgement on the pending set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckMark {
    /// Sequence was pending and is now satisfied; others remain.
    Accepted,
    /// Sequence was the last one pending.
    Complete,
    /// Sequence was never requested or was already satisfied.
    Ignored,
}

/// Outstanding sequence numbers and how many have been satisfied so far.
#[derive(Debug, Clone)]
pub struct PendingAcks {
    pending: SequenceSet,
    total: usize,
    received: usize,
}

impl PendingAcks {
    pub fn new(sequences: &[u8]) -> Self {
        let pending = SequenceSet::from_slice(sequences);
        let total = pending.len();
        Self {
            pending,
            total,
            received: 0,
        }
    }

    /// Distinct sequence numbers requested.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn received(&self) -> usize {
        self.received
    }

    pub fn remaining(&self) -> &SequenceSet {
        &self.pending
    }

    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }

    /// Record an acknowledgement for `sequence`.
    pub fn mark(&mut self, sequence: u8) -> AckMark {
        if !self.pending.remove(sequence) {
            return AckMark::Ignored;
        }
        self.received += 1;
        if self.pending.is_empty() {
            AckMark::Complete
        } else {
            AckMark::Accepted
        }
    }

    /// Error carrying the progress made so far.
    pub fn fail(&self, cause: impl Into<AckWaitCause>) -> WaitForAcksError {
        WaitForAcksError {
            received: self.received,
            total: self.total,
            cause: cause.into(),
        }
    }
}
