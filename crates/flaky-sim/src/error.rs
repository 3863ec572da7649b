//! Error types for the flaky simulator
//!
//! One enum per concern:
//! - Trial log reads and writes
//! - Individual trials (simulated failures, navigation)
//! - Report generation
//! - Configuration loading

use std::path::PathBuf;

/// Trial log error
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// Log file could not be opened or created
    #[error("log I/O error at {path}: {source}")]
    Io {
        /// Log path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Log content could not be parsed
    #[error("read failure at line {line}: {reason}")]
    ReadFailure {
        /// 1-based line number, header is line 1
        line: u64,
        /// What was wrong with the line
        reason: String,
    },

    /// A record could not be appended
    #[error("failed to append record: {0}")]
    Write(String),
}

impl LogError {
    /// True when the log exists but its content is malformed
    pub fn is_read_failure(&self) -> bool {
        matches!(self, LogError::ReadFailure { .. })
    }
}

/// Navigation collaborator error
#[derive(Debug, thiserror::Error)]
#[error("navigation to {url} failed: {reason}")]
pub struct NavigationError {
    /// Target that could not be opened
    pub url: String,
    /// Driver message
    pub reason: String,
}

/// Trial error
#[derive(Debug, thiserror::Error)]
pub enum TrialError {
    /// Coin flip came up as a failure; the record is already logged
    #[error("simulated failure for {target} with status {status}")]
    SimulatedFailure {
        /// Target identifier
        target: String,
        /// Sentinel failure code
        status: u16,
    },

    /// Page could not be opened; no record was written
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    /// Record could not be appended
    #[error("trial log error: {0}")]
    Log(#[from] LogError),
}

impl TrialError {
    /// True for the randomized failure, false for infrastructure errors
    pub fn is_simulated(&self) -> bool {
        matches!(self, TrialError::SimulatedFailure { .. })
    }

    /// Whether the suite should keep running after this error
    pub fn is_recoverable(&self) -> bool {
        match self {
            TrialError::SimulatedFailure { .. } => true,
            TrialError::Navigation(_) => true,
            TrialError::Log(_) => false,
        }
    }
}

/// Report generation error
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Log holds a header but no records
    #[error("trial log is empty, no data to plot")]
    EmptyDataset,

    /// Log could not be read
    #[error("failed to read trial log: {0}")]
    Read(#[from] LogError),

    /// Chart backend failure
    #[error("failed to render {path}: {reason}")]
    Render {
        /// Image being rendered
        path: PathBuf,
        /// Backend message
        reason: String,
    },

    /// Stability table could not be written
    #[error("failed to write {path}: {reason}")]
    Write {
        /// Table path
        path: PathBuf,
        /// Writer message
        reason: String,
    },
}

impl ReportError {
    /// Empty or unreadable input, as opposed to output failures
    pub fn is_input_error(&self) -> bool {
        matches!(self, ReportError::EmptyDataset | ReportError::Read(_))
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Parsed config violates a constraint
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
