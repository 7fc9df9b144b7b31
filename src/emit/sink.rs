//! Sinks that persist emitted audit records.
//!
//! A sink receives fully formatted JSON lines; routing and severity
//! tagging happen one level up, in the channel.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::error::{AuditError, AuditResult, SinkErrorKind};

/// Destination for formatted audit records, one JSON object per line.
pub trait Sink: Send + Sync {
    /// Persist one formatted record.
    fn write_line(&self, line: &str) -> AuditResult<()>;
}

/// Append-mode file sink with size-based rotation.
///
/// Thread-safe via internal mutex. When the file would exceed
/// `max_bytes`, existing backups shift (`audit.log.1` → `audit.log.2`,
/// ...), the live file becomes `.1`, and a fresh file is opened. With a
/// `backup_count` of zero the live file is truncated in place instead.
pub struct FileSink {
    file: Mutex<File>,
    path: PathBuf,
    max_bytes: u64,
    backup_count: usize,
}

impl FileSink {
    /// Open (or create) the audit log at `path`.
    ///
    /// Creates the parent directory if it doesn't exist. A `max_bytes` of
    /// zero disables rotation.
    pub fn new(path: &Path, max_bytes: u64, backup_count: usize) -> AuditResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                debug!(path = %parent.display(), "Creating audit log directory");
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = open_append(path)?;
        debug!(path = %path.display(), "File sink initialized");

        Ok(Self {
            file: Mutex::new(file),
            path: path.to_path_buf(),
            max_bytes,
            backup_count,
        })
    }

    /// Path to the live log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn rotate(&self, file: &mut File) -> AuditResult<()> {
        if self.backup_count == 0 {
            file.set_len(0).map_err(|e| rotate_error(&self.path, e))?;
            return Ok(());
        }

        // Shift existing backups up, dropping the oldest.
        for index in (1..self.backup_count).rev() {
            let from = backup_path(&self.path, index);
            if from.exists() {
                let to = backup_path(&self.path, index + 1);
                std::fs::rename(&from, &to).map_err(|e| rotate_error(&self.path, e))?;
            }
        }
        std::fs::rename(&self.path, backup_path(&self.path, 1))
            .map_err(|e| rotate_error(&self.path, e))?;

        *file = open_append(&self.path)?;
        debug!(path = %self.path.display(), "Audit log rotated");
        Ok(())
    }
}

impl Sink for FileSink {
    fn write_line(&self, line: &str) -> AuditResult<()> {
        let mut file = self.file.lock().map_err(|e| AuditError::Sink {
            kind: SinkErrorKind::Write {
                message: format!("Failed to acquire audit log lock: {e}"),
            },
        })?;

        if self.max_bytes > 0 {
            let current = file.metadata().map(|m| m.len()).unwrap_or(0);
            if current + line.len() as u64 + 1 > self.max_bytes {
                self.rotate(&mut file)?;
            }
        }

        writeln!(file, "{line}")?;

        // Sync for durability
        if let Err(e) = file.sync_data() {
            warn!(error = %e, "Failed to sync audit log");
        }

        Ok(())
    }
}

fn open_append(path: &Path) -> AuditResult<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| AuditError::Sink {
            kind: SinkErrorKind::Open {
                path: path.to_path_buf(),
                message: e.to_string(),
            },
        })
}

fn backup_path(path: &Path, index: usize) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

fn rotate_error(path: &Path, e: std::io::Error) -> AuditError {
    AuditError::Sink {
        kind: SinkErrorKind::Rotate {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
    }
}

/// Sink that writes records to stderr, for console routing.
pub struct ConsoleSink;

impl Sink for ConsoleSink {
    fn write_line(&self, line: &str) -> AuditResult<()> {
        let stderr = std::io::stderr();
        let mut handle = stderr.lock();
        writeln!(handle, "{line}")?;
        Ok(())
    }
}

/// Sink that captures records in memory, for tests.
#[derive(Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every record written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl Sink for MemorySink {
    fn write_line(&self, line: &str) -> AuditResult<()> {
        self.lines
            .lock()
            .map_err(|e| AuditError::Sink {
                kind: SinkErrorKind::Write {
                    message: format!("Memory sink lock poisoned: {e}"),
                },
            })?
            .push(line.to_string());
        Ok(())
    }
}

/// Sink that discards everything, for disabled channels.
pub struct NullSink;

impl Sink for NullSink {
    fn write_line(&self, _line: &str) -> AuditResult<()> {
        Ok(())
    }
}
