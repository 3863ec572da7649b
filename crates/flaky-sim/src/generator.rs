//! Result generator
//!
//! Each trial is a biased coin flip: a uniform draw in `[0, 1)` below
//! [`PASS_PROBABILITY`] passes with the expected status, anything else fails
//! with [`FAILURE_STATUS`]. The record is appended to the trial log before a
//! failure is signaled, so the log sees every trial.

use crate::error::TrialError;
use crate::log::TrialLog;
use crate::record::{TrialRecord, FAILURE_STATUS};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Probability that a trial passes
pub const PASS_PROBABILITY: f64 = 0.8;

/// Outcome of a single draw
#[inline]
pub fn passes(draw: f64) -> bool {
    draw < PASS_PROBABILITY
}

/// Produces trial outcomes and appends them to the log
#[derive(Debug)]
pub struct ResultGenerator<R = StdRng> {
    log: TrialLog,
    rng: R,
}

impl ResultGenerator<StdRng> {
    /// Generator seeded from OS entropy
    #[must_use]
    pub fn from_entropy(log: TrialLog) -> Self {
        Self::with_rng(log, StdRng::from_entropy())
    }

    /// Reproducible generator
    #[must_use]
    pub fn seeded(log: TrialLog, seed: u64) -> Self {
        Self::with_rng(log, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ResultGenerator<R> {
    /// Generator over any random source
    #[inline]
    #[must_use]
    pub fn with_rng(log: TrialLog, rng: R) -> Self {
        Self { log, rng }
    }

    /// Log this generator appends to
    #[inline]
    pub fn log(&self) -> &TrialLog {
        &self.log
    }

    /// Run one trial against `target`
    ///
    /// Returns the appended record when the trial passes. When it fails the
    /// record is still appended and [`TrialError::SimulatedFailure`] is
    /// returned.
    pub fn run_trial(
        &mut self,
        target: &str,
        expected_status: u16,
    ) -> Result<TrialRecord, TrialError> {
        let draw: f64 = self.rng.gen();
        let passed = passes(draw);
        tracing::debug!("Draw for {}: {:.4} (passed: {})", target, draw, passed);

        let record = TrialRecord::new(target, expected_status, passed);
        self.log.append(&record)?;

        if passed {
            Ok(record)
        } else {
            tracing::warn!("Simulated failure for {} with status {}", target, FAILURE_STATUS);
            Err(TrialError::SimulatedFailure {
                target: target.to_string(),
                status: FAILURE_STATUS,
            })
        }
    }
}
