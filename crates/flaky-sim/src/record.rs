//! Trial records
//!
//! A [`TrialRecord`] is created once per trial and never mutated. Its status
//! code is always consistent with its pass flag: the expected code when the
//! trial passed, [`FAILURE_STATUS`] otherwise.

use serde::{Deserialize, Serialize};

/// Sentinel status recorded for every failed trial
pub const FAILURE_STATUS: u16 = 500;

/// Column names of the trial log, in order
pub const LOG_HEADER: [&str; 4] = ["timestamp", "url", "passed", "status"];

/// One row of the trial log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    /// Seconds since the Unix epoch, fractional
    pub timestamp: f64,
    /// Target identifier
    pub url: String,
    /// Outcome of the coin flip, stored as `0`/`1`
    #[serde(with = "bool_flag")]
    pub passed: bool,
    /// Expected status on pass, [`FAILURE_STATUS`] on fail
    pub status: u16,
}

impl TrialRecord {
    /// Build a record stamped with the current time
    #[inline]
    #[must_use]
    pub fn new(url: impl Into<String>, expected_status: u16, passed: bool) -> Self {
        Self::at(now_epoch_secs(), url, expected_status, passed)
    }

    /// Build a record with an explicit timestamp
    #[must_use]
    pub fn at(timestamp: f64, url: impl Into<String>, expected_status: u16, passed: bool) -> Self {
        Self {
            timestamp,
            url: url.into(),
            passed,
            status: status_for(expected_status, passed),
        }
    }

    /// Whether the status agrees with the pass flag for `expected_status`
    pub fn is_consistent_with(&self, expected_status: u16) -> bool {
        self.status == status_for(expected_status, self.passed)
    }
}

/// Status code that goes with an outcome
#[inline]
pub fn status_for(expected_status: u16, passed: bool) -> u16 {
    if passed {
        expected_status
    } else {
        FAILURE_STATUS
    }
}

/// Current wall-clock time as fractional epoch seconds
pub fn now_epoch_secs() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// `passed` column codec: writes `0`/`1`, reads `0`/`1` or `true`/`false`
mod bool_flag {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.trim() {
            "1" | "true" | "True" => Ok(true),
            "0" | "false" | "False" => Ok(false),
            other => Err(de::Error::custom(format!("invalid passed flag {other:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_failed_record_uses_sentinel() {
        let record = TrialRecord::at(1.5, "https://duke.edu", 200, false);
        assert_eq!(record.status, FAILURE_STATUS);
        assert!(!record.passed);
        assert!(record.is_consistent_with(200));
    }

    #[test]
    fn test_passed_record_keeps_expected_status() {
        let record = TrialRecord::at(1.5, "https://duke.edu", 204, true);
        assert_eq!(record.status, 204);
        assert!(record.is_consistent_with(204));
        assert!(!record.is_consistent_with(200));
    }

    #[test]
    fn test_timestamp_is_recent() {
        let record = TrialRecord::new("https://bbc.co.uk", 200, true);
        // 2020-01-01T00:00:00Z
        assert!(record.timestamp > 1_577_836_800.0);
    }

    proptest! {
        #[test]
        fn prop_status_matches_flag(expected in 100u16..600, passed in any::<bool>()) {
            let record = TrialRecord::at(0.0, "t", expected, passed);
            prop_assert!(record.is_consistent_with(expected));
            if passed {
                prop_assert_eq!(record.status, expected);
            } else {
                prop_assert_eq!(record.status, FAILURE_STATUS);
            }
        }
    }
}
