//! Suite runner
//!
//! Plays the role of the test harness: every target is checked
//! `repetitions` times, one trial at a time. A trial navigates to the target,
//! waits a random load delay, then flips the coin through the
//! [`ResultGenerator`]. Simulated failures and navigation errors are
//! collected rather than aborting the run; only a trial log failure stops it.

use crate::config::{SuiteConfig, TargetCase};
use crate::error::{LogError, TrialError};
use crate::generator::ResultGenerator;
use crate::log::TrialLog;
use crate::navigator::Navigator;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::HashMap;

/// A trial that did not pass
#[derive(Debug)]
pub struct TrialFailure {
    pub url: String,
    /// 1-based attempt number for this url within the run
    pub attempt: u32,
    pub error: TrialError,
}

/// Outcome of a suite run
#[derive(Debug, Default)]
pub struct SuiteSummary {
    /// Trials started
    pub executed: u64,
    /// Trials that passed
    pub passed: u64,
    pub failures: Vec<TrialFailure>,
}

impl SuiteSummary {
    pub fn all_passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failures produced by the coin flip
    pub fn simulated_failures(&self) -> usize {
        self.failures.iter().filter(|f| f.error.is_simulated()).count()
    }

    /// Failures where the page could not be opened
    pub fn navigation_failures(&self) -> usize {
        self.failures.len() - self.simulated_failures()
    }

    /// Human-readable summary
    pub fn generate_text(&self) -> String {
        let mut text = String::new();
        text.push_str("=== Flaky Suite Summary ===\n\n");
        text.push_str(&format!("Trials: {}\n", self.executed));
        text.push_str(&format!("Passed: {}\n", self.passed));
        text.push_str(&format!("Failed: {}\n", self.failures.len()));
        text.push_str(&format!("  Simulated: {}\n", self.simulated_failures()));
        text.push_str(&format!("  Navigation: {}\n", self.navigation_failures()));

        if !self.failures.is_empty() {
            text.push_str("\nFailures:\n");
            for failure in &self.failures {
                text.push_str(&format!(
                    "  [attempt {}] {}: {}\n",
                    failure.attempt, failure.url, failure.error
                ));
            }
        }
        text
    }
}

/// Runs the configured targets through the generator
pub struct FlakySuite<N> {
    config: SuiteConfig,
    navigator: N,
    generator: ResultGenerator<StdRng>,
    latency_rng: StdRng,
    attempts: HashMap<String, u32>,
}

impl<N: Navigator> FlakySuite<N> {
    /// Open the trial log and seed the random sources
    pub fn new(config: SuiteConfig, navigator: N) -> Result<Self, LogError> {
        let log = TrialLog::open(config.log_path())?;
        let mut master = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let generator = ResultGenerator::with_rng(log, StdRng::seed_from_u64(master.gen()));
        let latency_rng = StdRng::seed_from_u64(master.gen());

        Ok(Self {
            config,
            navigator,
            generator,
            latency_rng,
            attempts: HashMap::new(),
        })
    }

    pub fn log(&self) -> &TrialLog {
        self.generator.log()
    }

    /// Check every target `repetitions` times
    ///
    /// Fails only when the trial log cannot be written.
    pub async fn run(&mut self) -> Result<SuiteSummary, LogError> {
        tracing::info!(
            "Running {} targets x {} repetitions ({} trials)",
            self.config.targets.len(),
            self.config.repetitions,
            self.config.planned_trials()
        );

        let cases = self.config.targets.clone();
        let mut summary = SuiteSummary::default();
        for _ in 0..self.config.repetitions {
            for case in &cases {
                self.run_case(case, &mut summary).await?;
            }
        }

        tracing::info!(
            "Suite finished: {} trials, {} passed, {} failed",
            summary.executed,
            summary.passed,
            summary.failures.len()
        );
        Ok(summary)
    }

    /// Run a single trial for `case`
    pub async fn run_case(
        &mut self,
        case: &TargetCase,
        summary: &mut SuiteSummary,
    ) -> Result<(), LogError> {
        let attempt = {
            let counter = self.attempts.entry(case.url.clone()).or_insert(0);
            *counter += 1;
            *counter
        };
        summary.executed += 1;

        match self.trial(case).await {
            Ok(()) => {
                tracing::info!("PASS {} (attempt {})", case.url, attempt);
                summary.passed += 1;
                Ok(())
            }
            Err(error) if !error.is_recoverable() => {
                tracing::error!("Stopping suite: {}", error);
                match error {
                    TrialError::Log(e) => Err(e),
                    other => Err(LogError::Write(other.to_string())),
                }
            }
            Err(error) => {
                tracing::warn!("FAIL {} (attempt {}): {}", case.url, attempt, error);
                summary.failures.push(TrialFailure {
                    url: case.url.clone(),
                    attempt,
                    error,
                });
                Ok(())
            }
        }
    }

    async fn trial(&mut self, case: &TargetCase) -> Result<(), TrialError> {
        self.navigator.navigate(&case.url).await?;

        let delay = self.config.latency.sample(&mut self.latency_rng);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.generator
            .run_trial(&case.url, case.expected_status)
            .map(|_| ())
    }
}
