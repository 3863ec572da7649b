//! Suite configuration
//!
//! Everything lives under one output directory with fixed file names. A
//! configuration can be built in code or loaded from TOML:
//!
//! ```toml
//! output_dir = "artifacts"
//! repetitions = 5
//! seed = 42
//!
//! [latency]
//! min_ms = 100
//! max_ms = 500
//!
//! [[targets]]
//! url = "https://bbc.co.uk"
//! expected_status = 200
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Trial log file name
pub const LOG_FILE_NAME: &str = "test_results.csv";
/// Pass/fail chart file name
pub const REPORT_FILE_NAME: &str = "test_report.svg";
/// Stability table file name
pub const FLAKY_TESTS_FILE_NAME: &str = "flaky_tests.csv";
/// Stability chart file name
pub const FLAKY_REPORT_FILE_NAME: &str = "flaky_tests_report.svg";

/// A target and the status a passing check reports for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetCase {
    pub url: String,
    #[serde(default = "default_expected_status")]
    pub expected_status: u16,
}

impl TargetCase {
    #[inline]
    pub fn new(url: impl Into<String>, expected_status: u16) -> Self {
        Self {
            url: url.into(),
            expected_status,
        }
    }
}

fn default_expected_status() -> u16 {
    200
}

/// Bounds for the artificial page-load delay, inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl LatencyRange {
    #[inline]
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// No delay at all
    #[inline]
    pub fn none() -> Self {
        Self::new(0, 0)
    }

    pub fn is_zero(&self) -> bool {
        self.max_ms == 0
    }

    /// Pick a delay within the range
    pub fn sample<R: rand::Rng>(&self, rng: &mut R) -> Duration {
        if self.is_zero() {
            return Duration::ZERO;
        }
        Duration::from_millis(rng.gen_range(self.min_ms..=self.max_ms))
    }
}

impl Default for LatencyRange {
    fn default() -> Self {
        Self::new(100, 500)
    }
}

/// Suite configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Directory holding the log and the reports
    pub output_dir: PathBuf,
    /// How many times each target is checked per run
    pub repetitions: u32,
    /// Seed for reproducible runs, entropy when absent
    pub seed: Option<u64>,
    /// Artificial page-load delay
    pub latency: LatencyRange,
    /// Targets to check
    pub targets: Vec<TargetCase>,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("artifacts"),
            repetitions: 5,
            seed: None,
            latency: LatencyRange::default(),
            targets: default_targets(),
        }
    }
}

impl SuiteConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a TOML file; missing keys take defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the constraints a run relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.targets.is_empty() {
            return Err(ConfigError::Invalid("at least one target is required".into()));
        }
        if let Some(target) = self.targets.iter().find(|t| t.url.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "target with expected status {} has an empty url",
                target.expected_status
            )));
        }
        if self.repetitions == 0 {
            return Err(ConfigError::Invalid("repetitions must be positive".into()));
        }
        if self.latency.min_ms > self.latency.max_ms {
            return Err(ConfigError::Invalid(format!(
                "latency min {}ms exceeds max {}ms",
                self.latency.min_ms, self.latency.max_ms
            )));
        }
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_repetitions(mut self, repetitions: u32) -> Self {
        self.repetitions = repetitions;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_latency(mut self, latency: LatencyRange) -> Self {
        self.latency = latency;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_targets(mut self, targets: Vec<TargetCase>) -> Self {
        self.targets = targets;
        self
    }

    pub fn log_path(&self) -> PathBuf {
        self.output_dir.join(LOG_FILE_NAME)
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(REPORT_FILE_NAME)
    }

    pub fn flaky_tests_path(&self) -> PathBuf {
        self.output_dir.join(FLAKY_TESTS_FILE_NAME)
    }

    pub fn flaky_report_path(&self) -> PathBuf {
        self.output_dir.join(FLAKY_REPORT_FILE_NAME)
    }

    /// Total trials one run performs
    pub fn planned_trials(&self) -> u64 {
        self.targets.len() as u64 * u64::from(self.repetitions)
    }
}

/// Built-in target catalog
pub fn default_targets() -> Vec<TargetCase> {
    [
        "https://elverys.ie",
        "https://www.lifestylesports.com",
        "https://bbc.co.uk",
        "https://rte.ie",
        "https://www.jdsports.ie",
        "https://duke.edu",
        "https://en.wikipedia.org",
        "https://www.prodirectsport.com",
        "https://www.nike.com",
        "https://www.crocs.eu",
    ]
    .into_iter()
    .map(|url| TargetCase::new(url, 200))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_defaults() {
        let config = SuiteConfig::new();
        assert_eq!(config.targets.len(), 10);
        assert_eq!(config.repetitions, 5);
        assert_eq!(config.planned_trials(), 50);
        assert_eq!(config.log_path(), PathBuf::from("artifacts/test_results.csv"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SuiteConfig::from_toml_str(
            r#"
            repetitions = 2
            seed = 11

            [[targets]]
            url = "https://playwright.dev"

            [[targets]]
            url = "https://elverys.ie"
            expected_status = 204
            "#,
        )
        .unwrap();

        assert_eq!(config.repetitions, 2);
        assert_eq!(config.seed, Some(11));
        assert_eq!(config.output_dir, PathBuf::from("artifacts"));
        assert_eq!(config.latency, LatencyRange::default());
        assert_eq!(
            config.targets,
            vec![
                TargetCase::new("https://playwright.dev", 200),
                TargetCase::new("https://elverys.ie", 204),
            ]
        );
    }

    #[test]
    fn test_invalid_configs() {
        let empty = SuiteConfig::new().with_targets(Vec::new());
        assert!(matches!(empty.validate(), Err(ConfigError::Invalid(_))));

        let zero = SuiteConfig::new().with_repetitions(0);
        assert!(matches!(zero.validate(), Err(ConfigError::Invalid(_))));

        let inverted = SuiteConfig::new().with_latency(LatencyRange::new(500, 100));
        assert!(matches!(inverted.validate(), Err(ConfigError::Invalid(_))));

        let blank = SuiteConfig::new().with_targets(vec![TargetCase::new("  ", 200)]);
        assert!(matches!(blank.validate(), Err(ConfigError::Invalid(_))));

        assert!(matches!(
            SuiteConfig::from_toml_str("repetitions = \"five\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_latency_sample_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let range = LatencyRange::new(100, 500);
        for _ in 0..100 {
            let delay = range.sample(&mut rng);
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(500));
        }
        assert_eq!(LatencyRange::none().sample(&mut rng), Duration::ZERO);
    }
}
