//! Testing utilities for the flaky-sim workspace
//!
//! Shared fixtures: scratch artifact directories and log seeding.

#![allow(missing_docs)]

use flaky_sim::{LatencyRange, SuiteConfig, TargetCase, TrialLog, TrialRecord};
use tempfile::TempDir;

/// A configuration rooted in a temporary directory
///
/// The directory is removed when this value is dropped.
pub struct ScratchArtifacts {
    pub dir: TempDir,
    pub config: SuiteConfig,
}

impl ScratchArtifacts {
    /// Offline-friendly config: no latency, fixed seed, given targets
    pub fn new(targets: &[&str]) -> Self {
        let dir = TempDir::new().unwrap();
        let config = SuiteConfig::new()
            .with_output_dir(dir.path())
            .with_latency(LatencyRange::none())
            .with_seed(42)
            .with_targets(targets.iter().map(|url| TargetCase::new(*url, 200)).collect());
        Self { dir, config }
    }

    /// Open (creating if needed) the trial log
    pub fn log(&self) -> TrialLog {
        TrialLog::open(self.config.log_path()).unwrap()
    }

    /// Replace the log with raw text
    pub fn write_raw_log(&self, content: &str) {
        std::fs::write(self.config.log_path(), content).unwrap();
    }
}

/// A record with a fixed timestamp
pub fn record(url: &str, passed: bool) -> TrialRecord {
    TrialRecord::at(1_700_000_000.0, url, 200, passed)
}

/// Append `passed` passing and `failed` failing records for `url`
pub fn seed_outcomes(log: &TrialLog, url: &str, passed: usize, failed: usize) {
    for _ in 0..passed {
        log.append(&record(url, true)).unwrap();
    }
    for _ in 0..failed {
        log.append(&record(url, false)).unwrap();
    }
}
