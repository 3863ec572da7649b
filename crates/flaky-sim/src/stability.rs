//! Flakiness categorization
//!
//! Targets are bucketed by failure rate:
//!
//! | Failure rate | Category |
//! |--------------|----------|
//! | `< 0.2` | stable |
//! | `0.2 ..= 0.8` | flaky |
//! | `> 0.8` | problematic |

use crate::aggregate::TargetCounts;
use crate::error::ReportError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Failure rates below this are stable
pub const FLAKY_THRESHOLD: f64 = 0.2;

/// Failure rates above this are problematic
pub const MAX_FLAKY_THRESHOLD: f64 = 0.8;

/// Stability bucket for a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Stable,
    Flaky,
    Problematic,
}

impl Category {
    /// All categories in display order
    pub const ALL: [Category; 3] = [Category::Stable, Category::Flaky, Category::Problematic];

    /// Bucket a failure rate
    pub fn from_failure_rate(rate: f64) -> Self {
        if rate < FLAKY_THRESHOLD {
            Category::Stable
        } else if rate > MAX_FLAKY_THRESHOLD {
            Category::Problematic
        } else {
            Category::Flaky
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Stable => "stable",
            Category::Flaky => "flaky",
            Category::Problematic => "problematic",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the flaky-tests table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityRow {
    pub url: String,
    pub total_runs: u64,
    pub failures: u64,
    pub failure_rate: f64,
    pub categorization: Category,
}

/// Derive a stability row per target
pub fn analyze(counts: &TargetCounts) -> Vec<StabilityRow> {
    counts
        .iter()
        .map(|(url, count)| {
            let failure_rate = count.failure_rate();
            StabilityRow {
                url: url.clone(),
                total_runs: count.total(),
                failures: count.failed,
                failure_rate,
                categorization: Category::from_failure_rate(failure_rate),
            }
        })
        .collect()
}

/// Number of targets in each category; every category is present
pub fn category_counts(rows: &[StabilityRow]) -> BTreeMap<Category, usize> {
    let mut counts: BTreeMap<Category, usize> =
        Category::ALL.iter().map(|category| (*category, 0)).collect();
    for row in rows {
        *counts.entry(row.categorization).or_insert(0) += 1;
    }
    counts
}

/// Overwrite the flaky-tests table at `path`
pub fn write_table(path: &Path, rows: &[StabilityRow]) -> Result<(), ReportError> {
    let write_error = |reason: String| ReportError::Write {
        path: path.to_path_buf(),
        reason,
    };

    let mut writer = csv::Writer::from_path(path).map_err(|e| write_error(e.to_string()))?;
    if rows.is_empty() {
        writer
            .write_record(["url", "total_runs", "failures", "failure_rate", "categorization"])
            .map_err(|e| write_error(e.to_string()))?;
    }
    for row in rows {
        writer.serialize(row).map_err(|e| write_error(e.to_string()))?;
    }
    writer.flush().map_err(|e| write_error(e.to_string()))?;

    tracing::info!("Wrote stability table for {} targets to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::PassFailCount;
    use proptest::prelude::*;

    #[test]
    fn test_category_boundaries() {
        assert_eq!(Category::from_failure_rate(0.0), Category::Stable);
        assert_eq!(Category::from_failure_rate(0.19), Category::Stable);
        assert_eq!(Category::from_failure_rate(0.2), Category::Flaky);
        assert_eq!(Category::from_failure_rate(0.5), Category::Flaky);
        assert_eq!(Category::from_failure_rate(0.8), Category::Flaky);
        assert_eq!(Category::from_failure_rate(0.81), Category::Problematic);
        assert_eq!(Category::from_failure_rate(1.0), Category::Problematic);
    }

    #[test]
    fn test_analyze_and_count() {
        let counts: TargetCounts = [
            ("https://a".to_string(), PassFailCount::new(8, 2)),
            ("https://b".to_string(), PassFailCount::new(10, 0)),
            ("https://c".to_string(), PassFailCount::new(1, 9)),
        ]
        .into_iter()
        .collect();

        let rows = analyze(&counts);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].categorization, Category::Flaky);
        assert_eq!(rows[0].total_runs, 10);
        assert_eq!(rows[0].failures, 2);
        assert_eq!(rows[1].categorization, Category::Stable);
        assert_eq!(rows[2].categorization, Category::Problematic);

        let by_category = category_counts(&rows);
        assert_eq!(by_category[&Category::Stable], 1);
        assert_eq!(by_category[&Category::Flaky], 1);
        assert_eq!(by_category[&Category::Problematic], 1);
    }

    #[test]
    fn test_table_format() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("flaky_tests.csv");
        let counts: TargetCounts = [("https://a".to_string(), PassFailCount::new(3, 1))]
            .into_iter()
            .collect();

        write_table(&path, &analyze(&counts)).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "url,total_runs,failures,failure_rate,categorization\nhttps://a,4,1,0.25,flaky\n"
        );
    }

    #[test]
    fn test_empty_table_keeps_header() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("flaky_tests.csv");
        write_table(&path, &[]).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "url,total_runs,failures,failure_rate,categorization\n"
        );
    }

    proptest! {
        #[test]
        fn prop_category_is_monotonic(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(Category::from_failure_rate(lo) <= Category::from_failure_rate(hi));
        }
    }
}
