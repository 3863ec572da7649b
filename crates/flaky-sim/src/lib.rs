//! Flaky trial simulator
//!
//! Runs navigation checks whose outcome is a biased coin flip, appends every
//! outcome to an append-only CSV log, and reports pass/fail counts and
//! flakiness per target.
//!
//! Data flows one way:
//! 1. **Generator**: [`ResultGenerator::run_trial`] draws, records, signals
//! 2. **Trial log**: [`TrialLog`] keeps every record, never rewritten
//! 3. **Reporter**: [`report::generate`] recounts from the full log
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use flaky_sim::prelude::*;
//!
//! let config = SuiteConfig::new().with_seed(42);
//! let mut suite = FlakySuite::new(config.clone(), OfflineNavigator)?;
//! let summary = suite.run().await?;
//! println!("{}", summary.generate_text());
//!
//! match report::generate_best_effort(&config) {
//!     ReportStatus::Generated(report) => println!("{}", report.generate_text()),
//!     ReportStatus::Failed { preview, .. } => println!("{preview:?}"),
//! }
//! ```

pub mod aggregate;
pub mod chart;
pub mod config;
pub mod error;
pub mod generator;
pub mod log;
pub mod navigator;
pub mod record;
pub mod report;
pub mod stability;
pub mod suite;

// Re-exports
pub use aggregate::{count_by_target, PassFailCount, TargetCounts};
pub use config::{LatencyRange, SuiteConfig, TargetCase};
pub use error::*;
pub use generator::{ResultGenerator, PASS_PROBABILITY};
pub use log::TrialLog;
pub use record::{TrialRecord, FAILURE_STATUS};
pub use report::{ReportStatus, ReportSummary};
pub use stability::{Category, StabilityRow};
pub use suite::{FlakySuite, SuiteSummary, TrialFailure};

/// Common imports
pub mod prelude {
    pub use crate::config::{LatencyRange, SuiteConfig, TargetCase};
    pub use crate::error::{ConfigError, LogError, ReportError, TrialError};
    pub use crate::generator::ResultGenerator;
    pub use crate::log::TrialLog;
    pub use crate::navigator::{HttpNavigator, Navigator, OfflineNavigator};
    pub use crate::record::TrialRecord;
    pub use crate::report::{self, ReportStatus};
    pub use crate::suite::{FlakySuite, SuiteSummary};
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
