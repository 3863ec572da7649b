//! Append-only trial log
//!
//! The log is a comma-delimited file with the header
//! `timestamp,url,passed,status`. Records are only ever appended; nothing in
//! this crate rewrites or compacts the file. A single writer is assumed and
//! no locking is done.

use crate::error::LogError;
use crate::record::{TrialRecord, LOG_HEADER};
use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Handle to the trial log on disk
#[derive(Debug, Clone)]
pub struct TrialLog {
    path: PathBuf,
}

impl TrialLog {
    /// Open the log, creating it with a header if it is absent or empty
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LogError> {
        let log = Self { path: path.into() };
        log.ensure_initialized()?;
        Ok(log)
    }

    /// Location of the log file
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record
    pub fn append(&self, record: &TrialRecord) -> Result<(), LogError> {
        self.ensure_initialized()?;

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.io_error(source))?;

        // A row cut short by an interrupted write must not swallow this one.
        if !ends_with_newline(&mut file).map_err(|source| self.io_error(source))? {
            file.write_all(b"\n").map_err(|source| self.io_error(source))?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer
            .serialize(record)
            .map_err(|e| LogError::Write(e.to_string()))?;
        writer.flush().map_err(|source| self.io_error(source))?;

        tracing::debug!(
            "Appended trial record: url={} passed={} status={}",
            record.url,
            record.passed,
            record.status
        );
        Ok(())
    }

    /// Load every record, strictly
    ///
    /// Fails with [`LogError::ReadFailure`] on a wrong header, a row with the
    /// wrong number of fields, or a field that does not parse.
    pub fn records(&self) -> Result<Vec<TrialRecord>, LogError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| self.read_error(e))?;

        let headers = reader.headers().map_err(|e| self.read_error(e))?.clone();
        if !headers.iter().eq(LOG_HEADER.iter().copied()) {
            return Err(LogError::ReadFailure {
                line: 1,
                reason: format!(
                    "expected header {:?}, found {:?}",
                    LOG_HEADER.join(","),
                    headers.iter().collect::<Vec<_>>().join(",")
                ),
            });
        }

        reader
            .deserialize::<TrialRecord>()
            .map(|row| row.map_err(|e| self.read_error(e)))
            .collect()
    }

    /// Number of records in the log
    pub fn len(&self) -> Result<usize, LogError> {
        Ok(self.records()?.len())
    }

    /// True when the log holds no records
    pub fn is_empty(&self) -> Result<bool, LogError> {
        Ok(self.records()?.is_empty())
    }

    /// First `limit` data rows as raw text, read leniently
    ///
    /// Used for diagnostics when a strict load has failed, so rows with the
    /// wrong field count are returned as they are.
    pub fn preview(&self, limit: usize) -> Result<Vec<String>, LogError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| self.read_error(e))?;

        let mut rows = Vec::with_capacity(limit);
        for row in reader.records().take(limit) {
            let row = row.map_err(|e| self.read_error(e))?;
            rows.push(row.iter().collect::<Vec<_>>().join(","));
        }
        Ok(rows)
    }

    fn ensure_initialized(&self) -> Result<(), LogError> {
        let needs_header = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(source) => return Err(self.io_error(source)),
        };
        if !needs_header {
            return Ok(());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let mut writer = csv::Writer::from_path(&self.path).map_err(|e| self.read_error(e))?;
        writer
            .write_record(LOG_HEADER)
            .map_err(|e| LogError::Write(e.to_string()))?;
        writer.flush().map_err(|source| self.io_error(source))?;

        tracing::info!("Initialized trial log at {}", self.path.display());
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> LogError {
        LogError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_error(&self, err: csv::Error) -> LogError {
        let line = err.position().map_or(0, csv::Position::line);
        let reason = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(source) => self.io_error(source),
            _ => LogError::ReadFailure { line, reason },
        }
    }
}

fn ends_with_newline(file: &mut fs::File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn scratch() -> (TempDir, TrialLog) {
        let dir = TempDir::new().unwrap();
        let log = TrialLog::open(dir.path().join("artifacts/test_results.csv")).unwrap();
        (dir, log)
    }

    #[test]
    fn test_open_writes_header_once() {
        let (_dir, log) = scratch();
        let content = fs::read_to_string(log.path()).unwrap();
        assert_eq!(content, "timestamp,url,passed,status\n");

        let reopened = TrialLog::open(log.path()).unwrap();
        assert_eq!(fs::read_to_string(reopened.path()).unwrap(), content);
        assert!(reopened.is_empty().unwrap());
    }

    #[test]
    fn test_append_writes_flag_as_integer() {
        let (_dir, log) = scratch();
        log.append(&TrialRecord::at(1700000000.25, "https://rte.ie", 200, true))
            .unwrap();
        log.append(&TrialRecord::at(1700000001.5, "https://rte.ie", 200, false))
            .unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[1], "1700000000.25,https://rte.ie,1,200");
        assert_eq!(lines[2], "1700000001.5,https://rte.ie,0,500");

        let records = log.records().unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].passed);
        assert_eq!(records[1].status, 500);
    }

    #[test]
    fn test_wrong_field_count_is_read_failure() {
        let (_dir, log) = scratch();
        fs::write(
            log.path(),
            "timestamp,url,passed,status\n1.0,https://a,1,200\n2.0,https://a,1\n",
        )
        .unwrap();

        let err = log.records().unwrap_err();
        assert!(err.is_read_failure(), "unexpected error: {err}");
        match err {
            LogError::ReadFailure { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_wrong_header_is_read_failure() {
        let (_dir, log) = scratch();
        fs::write(log.path(), "when,where,ok,code\n1.0,https://a,1,200\n").unwrap();
        assert!(matches!(
            log.records(),
            Err(LogError::ReadFailure { line: 1, .. })
        ));
    }

    #[test]
    fn test_bad_flag_is_read_failure() {
        let (_dir, log) = scratch();
        fs::write(log.path(), "timestamp,url,passed,status\n1.0,https://a,maybe,200\n").unwrap();
        assert!(log.records().unwrap_err().is_read_failure());
    }

    #[test]
    fn test_preview_tolerates_ragged_rows() {
        let (_dir, log) = scratch();
        fs::write(
            log.path(),
            "timestamp,url,passed,status\n1.0,https://a,1,200\n2.0,https://a\n3.0,https://b,0,500\n",
        )
        .unwrap();

        let rows = log.preview(2).unwrap();
        assert_eq!(rows, vec!["1.0,https://a,1,200", "2.0,https://a"]);
    }

    #[test]
    fn test_append_after_truncated_row_starts_new_line() {
        let (_dir, log) = scratch();
        fs::write(log.path(), "timestamp,url,passed,status\n1.0,A,1,200").unwrap();

        log.append(&TrialRecord::at(2.0, "A", 200, false)).unwrap();

        assert_eq!(
            fs::read_to_string(log.path()).unwrap(),
            "timestamp,url,passed,status\n1.0,A,1,200\n2.0,A,0,500\n"
        );
        let records = log.records().unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].passed);
        assert!(!records[1].passed);
    }

    #[test]
    fn test_empty_file_gets_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test_results.csv");
        fs::write(&path, "").unwrap();
        let log = TrialLog::open(&path).unwrap();
        assert_eq!(log.len().unwrap(), 0);
        assert!(fs::read_to_string(&path).unwrap().starts_with("timestamp,"));
    }
}
