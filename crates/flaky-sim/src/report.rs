//! Result aggregator and reporter
//!
//! [`generate`] reads the whole trial log, counts outcomes per target and
//! renders the pass/fail chart, then categorizes targets by failure rate and
//! writes the stability table and chart. [`generate_best_effort`] wraps it so
//! that no failure escapes: the error is logged and the first few raw rows
//! of the log are returned for inspection.

use crate::aggregate::{count_by_target, TargetCounts};
use crate::chart;
use crate::config::SuiteConfig;
use crate::error::ReportError;
use crate::log::TrialLog;
use crate::stability::{self, Category, StabilityRow};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Raw rows dumped when a report fails
pub const PREVIEW_ROWS: usize = 5;

/// What a successful report produced
#[derive(Debug, Clone)]
pub struct ReportSummary {
    pub records: usize,
    pub counts: TargetCounts,
    pub stability: Vec<StabilityRow>,
    pub by_category: BTreeMap<Category, usize>,
    pub report_path: PathBuf,
    pub flaky_tests_path: PathBuf,
    pub flaky_report_path: PathBuf,
}

impl ReportSummary {
    /// Human-readable summary
    pub fn generate_text(&self) -> String {
        let mut text = String::new();
        text.push_str(&format!(
            "Reports generated: {} and {}\n",
            self.report_path.display(),
            self.flaky_report_path.display()
        ));
        text.push_str(&format!("Records analyzed: {}\n\n", self.records));

        text.push_str("Pass/Fail by URL:\n");
        for (url, count) in &self.counts {
            text.push_str(&format!(
                "  {url}: {} passed, {} failed\n",
                count.passed, count.failed
            ));
        }

        text.push_str("\nFlaky Tests Summary:\n");
        for (category, n) in &self.by_category {
            text.push_str(&format!("  {category}: {n}\n"));
        }
        text
    }
}

/// Outcome of a best-effort report
#[derive(Debug)]
pub enum ReportStatus {
    Generated(ReportSummary),
    Failed {
        error: ReportError,
        /// First raw rows of the log, empty if even a lenient read failed
        preview: Vec<String>,
    },
}

impl ReportStatus {
    pub fn is_generated(&self) -> bool {
        matches!(self, ReportStatus::Generated(_))
    }
}

/// Build every report from the trial log
pub fn generate(config: &SuiteConfig) -> Result<ReportSummary, ReportError> {
    let log = TrialLog::open(config.log_path())?;
    let records = log.records()?;
    if records.is_empty() {
        return Err(ReportError::EmptyDataset);
    }
    tracing::info!("Loaded {} records from {}", records.len(), log.path().display());

    let counts = count_by_target(&records);
    let report_path = config.report_path();
    chart::render_pass_fail(&report_path, &counts)?;

    let stability = stability::analyze(&counts);
    let flaky_tests_path = config.flaky_tests_path();
    stability::write_table(&flaky_tests_path, &stability)?;

    let by_category = stability::category_counts(&stability);
    let flaky_report_path = config.flaky_report_path();
    chart::render_stability(&flaky_report_path, &by_category)?;

    Ok(ReportSummary {
        records: records.len(),
        counts,
        stability,
        by_category,
        report_path,
        flaky_tests_path,
        flaky_report_path,
    })
}

/// Like [`generate`], but never fails
pub fn generate_best_effort(config: &SuiteConfig) -> ReportStatus {
    match generate(config) {
        Ok(summary) => ReportStatus::Generated(summary),
        Err(error) => {
            tracing::error!("Error generating reports: {}", error);
            let preview = preview_log(config);
            ReportStatus::Failed { error, preview }
        }
    }
}

fn preview_log(config: &SuiteConfig) -> Vec<String> {
    let path = config.log_path();
    let rows = TrialLog::open(&path).and_then(|log| log.preview(PREVIEW_ROWS));
    match rows {
        Ok(rows) => {
            tracing::warn!("Debugging trial log contents ({} rows):", rows.len());
            for row in &rows {
                tracing::warn!("  {}", row);
            }
            rows
        }
        Err(e) => {
            tracing::warn!("Failed to read trial log {}: {}", path.display(), e);
            Vec::new()
        }
    }
}
