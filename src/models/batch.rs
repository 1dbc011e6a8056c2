/// Outcome of one batch run, reported on completion and on cancellation.
///
/// A batch is best effort across N items: per-item failures are counted
/// here, never retried and never abort the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Items the cursor has moved past (successes and failures alike)
    pub processed: usize,
    /// Items whose clipboard write or paste delivery failed
    pub failed: usize,
    /// Size of the snapshot the run started with
    pub total: usize,
}

impl BatchReport {
    pub fn new(total: usize) -> Self {
        Self {
            processed: 0,
            failed: 0,
            total,
        }
    }

    /// True once every snapshot item has been processed.
    pub fn is_complete(&self) -> bool {
        self.processed >= self.total
    }

    pub fn succeeded(&self) -> usize {
        self.processed - self.failed
    }
}

impl std::fmt::Display for BatchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} processed, {} failed",
            self.processed, self.total, self.failed
        )
    }
}
