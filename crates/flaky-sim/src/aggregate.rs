//! Per-target pass/fail counts, recomputed from the full log on every report

use crate::record::TrialRecord;
use std::collections::BTreeMap;

/// Pass and fail totals for one target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassFailCount {
    pub passed: u64,
    pub failed: u64,
}

impl PassFailCount {
    #[inline]
    pub fn new(passed: u64, failed: u64) -> Self {
        Self { passed, failed }
    }

    /// Total trials observed
    #[inline]
    pub fn total(&self) -> u64 {
        self.passed + self.failed
    }

    /// Fraction of trials that failed, `0.0` with no trials
    pub fn failure_rate(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.failed as f64 / total as f64,
        }
    }

    fn record(&mut self, passed: bool) {
        if passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Counts keyed by target, in lexicographic order
pub type TargetCounts = BTreeMap<String, PassFailCount>;

/// Group records by target and count outcomes
pub fn count_by_target<'a, I>(records: I) -> TargetCounts
where
    I: IntoIterator<Item = &'a TrialRecord>,
{
    let mut counts = TargetCounts::new();
    for record in records {
        counts.entry(record.url.clone()).or_default().record(record.passed);
    }
    counts
}
