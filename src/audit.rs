//! Persisted audit trail of moves and undos.
//!
//! Every successful move, every successful undo and every failure is appended
//! to a plain text log, one line per event:
//!
//! ```text
//! 2026-10-19 14:03:11,482 - INFO - Moved: /data/photo.png -> /data/Images/photo.png
//! 2026-10-19 14:03:11,483 - ERROR - Error moving /data/a.txt -> /data/Text/a.txt: Permission denied
//! ```
//!
//! This is separate from the in-memory [`History`](crate::undo::History): the
//! log survives the process, the history does not.

use env_logger::{Builder, Logger, Target, WriteStyle};
use log::{Level, LevelFilter, Log, Record};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Default log file name, resolved against the current directory.
pub const DEFAULT_LOG_FILE: &str = "file_organizer.log";

const AUDIT_TARGET: &str = "file_sorter::audit";

/// Append-only, line-oriented event log.
///
/// Each handle owns its own `env_logger` logger writing into the file; it is
/// never installed as the global logger, so `RUST_LOG` does not affect it.
pub struct AuditLog {
    path: Option<PathBuf>,
    logger: Option<Logger>,
}

impl AuditLog {
    /// Opens (or creates) the log file at `path` in append mode.
    ///
    /// Missing parent folders are created. The stored path is canonical, so
    /// it can be compared against walked paths.
    ///
    /// # Arguments
    ///
    /// * `path` - Where the log is appended
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use file_sorter::AuditLog;
    /// use std::path::Path;
    ///
    /// let log = AuditLog::open(Path::new("file_organizer.log")).unwrap();
    /// assert!(log.path().is_some());
    /// ```
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let path = fs::canonicalize(path)?;

        let logger = Builder::new()
            .target(Target::Pipe(Box::new(file)))
            .write_style(WriteStyle::Never)
            .filter_level(LevelFilter::Info)
            .format(|buf, record| {
                writeln!(
                    buf,
                    "{} - {} - {}",
                    chrono::Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
                    record.level(),
                    record.args()
                )
            })
            .build();

        Ok(Self {
            path: Some(path),
            logger: Some(logger),
        })
    }

    /// A log that records nothing.
    pub fn disabled() -> Self {
        Self {
            path: None,
            logger: None,
        }
    }

    /// Canonical path of the backing file, if this log writes to one.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn moved(&mut self, source: &Path, destination: &Path) {
        self.record(
            Level::Info,
            format_args!("Moved: {} -> {}", source.display(), destination.display()),
        );
    }

    pub fn move_failed(&mut self, source: &Path, destination: &Path, reason: &str) {
        self.record(
            Level::Error,
            format_args!(
                "Error moving {} -> {}: {}",
                source.display(),
                destination.display(),
                reason
            ),
        );
    }

    pub fn undone(&mut self, from: &Path, to: &Path) {
        self.record(
            Level::Info,
            format_args!("Undone: {} -> {}", from.display(), to.display()),
        );
    }

    pub fn undo_failed(&mut self, from: &Path, to: &Path, reason: &str) {
        self.record(
            Level::Error,
            format_args!(
                "Error undoing {} -> {}: {}",
                from.display(),
                to.display(),
                reason
            ),
        );
    }

    /// Hands one event to the file logger. A failed write never aborts the
    /// batch that produced the event.
    fn record(&mut self, level: Level, args: fmt::Arguments<'_>) {
        let Some(logger) = self.logger.as_ref() else {
            return;
        };
        logger.log(
            &Record::builder()
                .level(level)
                .target(AUDIT_TARGET)
                .args(args)
                .build(),
        );
        logger.flush();
    }
}

impl fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditLog")
            .field("path", &self.path)
            .field("enabled", &self.logger.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_line_shape() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let log_path = temp_dir.path().join("audit.log");

        let mut log = AuditLog::open(&log_path).expect("Failed to open log");
        log.moved(Path::new("a"), Path::new("b"));

        let content = fs::read_to_string(&log_path).expect("Failed to read log");
        assert!(content.ends_with(" - INFO - Moved: a -> b\n"));
        // "YYYY-MM-DD HH:MM:SS,mmm"
        let stamp = content.split(" - ").next().unwrap();
        assert_eq!(stamp.len(), 23);
        assert_eq!(&stamp[19..20], ",");
    }

    #[test]
    fn test_open_stores_canonical_path() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::create_dir(temp_dir.path().join("sub")).unwrap();
        let indirect = temp_dir.path().join("sub").join("..").join("audit.log");

        let log = AuditLog::open(&indirect).expect("Failed to open log");

        let expected = fs::canonicalize(temp_dir.path().join("audit.log")).unwrap();
        assert_eq!(log.path(), Some(expected.as_path()));
    }

    #[test]
    fn test_open_appends() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let log_path = temp_dir.path().join("logs").join("audit.log");

        {
            let mut log = AuditLog::open(&log_path).expect("Failed to open log");
            log.moved(Path::new("/a/x.png"), Path::new("/a/Images/x.png"));
        }
        {
            let mut log = AuditLog::open(&log_path).expect("Failed to reopen log");
            log.undo_failed(
                Path::new("/a/Images/x.png"),
                Path::new("/a/x.png"),
                "not found",
            );
        }

        let content = fs::read_to_string(&log_path).expect("Failed to read log");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(" - INFO - Moved: /a/x.png -> /a/Images/x.png"));
        assert!(lines[1].contains(" - ERROR - Error undoing /a/Images/x.png -> /a/x.png: not found"));
    }

    #[test]
    fn test_disabled_log_has_no_path() {
        let mut log = AuditLog::disabled();
        log.moved(Path::new("a"), Path::new("b"));
        assert!(log.path().is_none());
    }
}
