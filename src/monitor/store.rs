//! Append-only JSON-lines log files, one per category.
//!
//! Reads are best-effort: a line that does not parse as the requested record
//! type is dropped and counted, never reported as an error. The only deletion
//! is truncating a whole file.

use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCategory {
    Invocations,
    Workflows,
    Status,
}

impl LogCategory {
    pub const ALL: [Self; 3] = [Self::Workflows, Self::Invocations, Self::Status];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Invocations => "agent-hq-invocations.log",
            Self::Workflows => "agent-hq-workflows.log",
            Self::Status => "agent-hq-status.log",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Invocations => "invocations",
            Self::Workflows => "workflows",
            Self::Status => "status",
        }
    }
}

impl std::fmt::Display for LogCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("log records must serialize to a JSON object")]
    NotAnObject,
}

/// Records recovered from a log file plus the number of lines dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadOutcome<T> {
    pub records: Vec<T>,
    pub skipped: usize,
}

/// Current instant as RFC 3339 UTC with milliseconds, e.g. `2026-10-19T08:00:00.000Z`.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Flat-file store rooted at one directory.
///
/// Assumes a single writer process; appends from several processes may
/// interleave.
#[derive(Debug, Clone)]
pub struct LogStore {
    dir: PathBuf,
}

impl LogStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, category: LogCategory) -> PathBuf {
        self.dir.join(category.file_name())
    }

    fn ensure_dir(&self) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| StoreError::CreateDir {
            path: self.dir.clone(),
            source,
        })
    }

    /// Stamp `record` with the current time and append it as one line.
    ///
    /// Returns the object exactly as written.
    pub fn append<T: Serialize>(&self, category: LogCategory, record: &T) -> Result<Value, StoreError> {
        let mut value = serde_json::to_value(record)?;
        let Value::Object(fields) = &mut value else {
            return Err(StoreError::NotAnObject);
        };
        fields.insert("timestamp".into(), Value::String(timestamp_now()));

        let mut line = serde_json::to_string(&value)?;
        line.push('\n');

        self.ensure_dir()?;
        let path = self.path(category);
        let write = || -> std::io::Result<()> {
            let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
            file.write_all(line.as_bytes())
        };
        write().map_err(|source| StoreError::Write {
            path: path.clone(),
            source,
        })?;

        debug!(category = %category, bytes = line.len(), "Appended log record");
        Ok(value)
    }

    /// Parse every line of `category` as `T`, in file order.
    ///
    /// Blank lines are ignored; lines that fail to parse are skipped and
    /// counted. With `limit` set to a positive value only the last `limit`
    /// parsed records are returned, oldest first. A missing file reads as
    /// empty.
    pub fn read_all<T: DeserializeOwned>(
        &self,
        category: LogCategory,
        limit: Option<usize>,
    ) -> Result<ReadOutcome<T>, StoreError> {
        self.ensure_dir()?;
        let path = self.path(category);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(ReadOutcome {
                    records: Vec::new(),
                    skipped: 0,
                })
            }
            Err(source) => return Err(StoreError::Read { path, source }),
        };
        let content = String::from_utf8_lossy(&bytes);

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<T>(line) {
                Ok(record) => records.push(record),
                Err(_) => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!(category = %category, skipped, "Skipped malformed log lines");
        }

        if let Some(limit) = limit.filter(|l| *l > 0) {
            if records.len() > limit {
                records.drain(..records.len() - limit);
            }
        }

        Ok(ReadOutcome { records, skipped })
    }

    /// Truncate the category's file to zero length. A missing file is left
    /// missing.
    pub fn clear(&self, category: LogCategory) -> Result<(), StoreError> {
        self.ensure_dir()?;
        let path = self.path(category);
        match OpenOptions::new().write(true).truncate(true).open(&path) {
            Ok(_) => {
                debug!(category = %category, "Cleared log");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Write { path, source }),
        }
    }

    pub fn clear_all(&self) -> Result<(), StoreError> {
        for category in LogCategory::ALL {
            self.clear(category)?;
        }
        Ok(())
    }
}
