//! Per-user append-only CSV record logs.
//!
//! Each participant owns one flat CSV file with columns `Task` and
//! `Submission Time`. The header is written on first write and rows are only
//! ever appended, with a single exception: the task text of the most recent
//! row may be rewritten in place via [`TaskLog::edit_latest`].
//!
//! There is deliberately no caching layer. Every read goes back to the file,
//! so a dashboard render always reflects the log as it is on disk. Concurrent
//! writers are last-writer-wins on the underlying file; this is a trusted
//! local-file tool, not a database.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Timestamp format used in the `Submission Time` column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read record log {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write record log {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on record log {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("record log is empty, nothing to edit")]
    EmptyLog,
}

/// One submitted task with its submission instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Free-form task text
    pub task: String,

    /// Submission instant in local time, naive (no offset stored in the CSV)
    pub submitted_at: NaiveDateTime,
}

impl Record {
    pub fn new(task: impl Into<String>, submitted_at: NaiveDateTime) -> Self {
        Self {
            task: task.into(),
            submitted_at,
        }
    }

    /// The `Submission Time` column value for this record.
    pub fn formatted_time(&self) -> String {
        self.submitted_at.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Raw CSV row. Kept as strings so that rewriting the log for an edit
/// preserves rows this code cannot interpret.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Row {
    #[serde(rename = "Task")]
    task: String,

    #[serde(rename = "Submission Time")]
    submission_time: String,
}

impl Row {
    fn from_record(record: &Record) -> Self {
        Self {
            task: record.task.clone(),
            submission_time: record.formatted_time(),
        }
    }
}

/// Handle to one user's record log on disk.
#[derive(Debug, Clone)]
pub struct TaskLog {
    path: PathBuf,
}

impl TaskLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all usable records in file order.
    ///
    /// A missing file reads as an empty log. Rows whose timestamp does not
    /// parse are unusable: they are skipped with a warning rather than
    /// failing the whole view.
    pub fn read(&self) -> Result<Vec<Record>, StoreError> {
        let rows = self.read_rows()?;
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            match parse_timestamp(&row.submission_time) {
                Some(submitted_at) => records.push(Record {
                    task: row.task,
                    submitted_at,
                }),
                None => warn!(
                    "skipping record with unusable timestamp {:?} in {}",
                    row.submission_time,
                    self.path.display()
                ),
            }
        }
        Ok(records)
    }

    /// Append one record, writing the header on first write.
    pub fn append(&self, record: &Record) -> Result<(), StoreError> {
        let write_header = !self.path.exists();
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);
        writer
            .serialize(Row::from_record(record))
            .map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;
        writer.flush().map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }

    /// Replace the task text of the most recent row.
    ///
    /// The submission timestamp and all prior rows are left untouched; the
    /// log is rewritten row for row with only the last `Task` cell changed.
    pub fn edit_latest(&self, task: &str) -> Result<(), StoreError> {
        let mut rows = self.read_rows()?;
        let last = rows.last_mut().ok_or(StoreError::EmptyLog)?;
        last.task = task.to_string();

        let mut writer =
            csv::Writer::from_path(&self.path).map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;
        for row in &rows {
            writer.serialize(row).map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        writer.flush().map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }

    /// Raw bytes of the log file, for download. `None` when no log exists yet.
    pub fn export(&self) -> Result<Option<Vec<u8>>, StoreError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn read_rows(&self) -> Result<Vec<Row>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader =
            csv::Reader::from_path(&self.path).map_err(|source| StoreError::Read {
                path: self.path.clone(),
                source,
            })?;
        let mut rows = Vec::new();
        for result in reader.deserialize() {
            let row: Row = result.map_err(|source| StoreError::Read {
                path: self.path.clone(),
                source,
            })?;
            rows.push(row);
        }
        Ok(rows)
    }
}

/// Parse a `Submission Time` cell.
///
/// Accepts the format this code writes plus the `T`-separated ISO variant, so
/// logs produced by other tooling remain readable.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn temp_log() -> (tempfile::TempDir, TaskLog) {
        let dir = tempfile::tempdir().unwrap();
        let log = TaskLog::new(dir.path().join("Deep_tasks.csv"));
        (dir, log)
    }

    #[test]
    fn missing_file_reads_as_empty_log() {
        let (_dir, log) = temp_log();
        assert!(log.read().unwrap().is_empty());
    }

    #[test]
    fn first_append_writes_header_once() {
        let (_dir, log) = temp_log();
        log.append(&Record::new("pushups", ts(2024, 3, 1, 9, 0))).unwrap();
        log.append(&Record::new("run 5k", ts(2024, 3, 2, 9, 0))).unwrap();

        let contents = String::from_utf8(log.export().unwrap().unwrap()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "Task,Submission Time");
        assert_eq!(lines.len(), 3);
        assert_eq!(contents.matches("Task,Submission Time").count(), 1);
    }

    #[test]
    fn append_then_read_round_trips() {
        let (_dir, log) = temp_log();
        let record = Record::new("leetcode daily", ts(2024, 3, 1, 22, 15));
        log.append(&record).unwrap();

        assert_eq!(log.read().unwrap(), vec![record]);
    }

    #[test]
    fn edit_latest_changes_only_task_text() {
        let (_dir, log) = temp_log();
        let first = Record::new("pushups", ts(2024, 3, 1, 9, 0));
        let second = Record::new("run 5k", ts(2024, 3, 2, 9, 0));
        log.append(&first).unwrap();
        log.append(&second).unwrap();

        log.edit_latest("run 10k").unwrap();

        let records = log.read().unwrap();
        assert_eq!(records[0], first);
        assert_eq!(records[1].task, "run 10k");
        assert_eq!(records[1].submitted_at, second.submitted_at);
    }

    #[test]
    fn edit_latest_on_empty_log_is_rejected() {
        let (_dir, log) = temp_log();
        assert!(matches!(log.edit_latest("anything"), Err(StoreError::EmptyLog)));
    }

    #[test]
    fn unusable_timestamp_rows_are_skipped_not_fatal() {
        let (_dir, log) = temp_log();
        std::fs::write(
            log.path(),
            "Task,Submission Time\ngood,2024-03-01 09:00:00\nbad,not-a-date\nempty,\n",
        )
        .unwrap();

        let records = log.read().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].task, "good");
    }

    #[test]
    fn iso_t_separated_timestamps_are_accepted() {
        let (_dir, log) = temp_log();
        std::fs::write(
            log.path(),
            "Task,Submission Time\nported,2024-03-01T09:00:00.250\n",
        )
        .unwrap();

        let records = log.read().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].submitted_at.date(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }

    #[test]
    fn export_is_none_before_first_write() {
        let (_dir, log) = temp_log();
        assert!(log.export().unwrap().is_none());
    }
}
