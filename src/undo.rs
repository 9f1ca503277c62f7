/// Undo history and reversal of organize runs.
///
/// [`History`] is a last-in-first-out stack of [`MoveBatch`]es owned by the
/// [`FileOrganizer`](crate::FileOrganizer). Undoing pops the newest batch and
/// moves each of its files back, newest move first.
use crate::audit::AuditLog;
use crate::events::OrganizeListener;
use crate::file_organizer::{FileFailure, FileMover, MoveBatch, MoveRecord};
use log::info;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

/// Stack of reversible batches. Only non-empty batches are ever stored.
#[derive(Debug, Default)]
pub struct History {
    batches: Vec<MoveBatch>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a batch. Empty batches are dropped, so every stored batch has
    /// at least one move to reverse.
    pub fn push(&mut self, batch: MoveBatch) {
        if batch.is_empty() {
            return;
        }
        self.batches.push(batch);
    }

    pub fn pop(&mut self) -> Option<MoveBatch> {
        self.batches.pop()
    }

    /// The batch the next undo would reverse.
    pub fn peek(&self) -> Option<&MoveBatch> {
        self.batches.last()
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Iterates batches newest first.
    pub fn iter(&self) -> impl Iterator<Item = &MoveBatch> {
        self.batches.iter().rev()
    }
}

/// Represents the result of undoing one batch.
#[derive(Debug, Clone, Serialize)]
pub struct UndoReport {
    /// Root folder of the batch that was undone.
    pub root: PathBuf,
    /// Records that were reversed, in the order they were reversed.
    pub restored: Vec<MoveRecord>,
    /// Records that could not be reversed. `source` is the file's organized
    /// location, `destination` the original path it should have returned to.
    pub failures: Vec<FileFailure>,
}

impl UndoReport {
    pub fn total_processed(&self) -> usize {
        self.restored.len() + self.failures.len()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// What an undo request did.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UndoOutcome {
    /// The history was empty; nothing was touched.
    NothingToUndo,
    /// The newest batch was popped and reversed, possibly with failures.
    Undone(UndoReport),
}

/// Reverses recorded batches.
pub struct UndoManager;

impl UndoManager {
    /// Moves every file in `batch` back to where it came from.
    ///
    /// Records are processed newest first. A record whose file has vanished,
    /// whose original path is occupied again, or whose move fails is reported
    /// and skipped; the remaining records are still processed. Original parent
    /// folders that have since been removed are recreated. Category folders
    /// emptied by the undo are left in place.
    pub fn undo_batch(
        batch: MoveBatch,
        mover: &dyn FileMover,
        audit: &mut AuditLog,
        listener: &mut dyn OrganizeListener,
    ) -> UndoReport {
        info!(
            "Undoing {} moves under {}",
            batch.len(),
            batch.root.display()
        );
        listener.undo_started(batch.len());

        let mut report = UndoReport {
            root: batch.root.clone(),
            restored: Vec::new(),
            failures: Vec::new(),
        };

        for record in batch.records().iter().rev() {
            match Self::restore_file(record, mover) {
                Ok(()) => {
                    audit.undone(&record.destination, &record.source);
                    listener.file_restored(record);
                    report.restored.push(record.clone());
                }
                Err(reason) => {
                    audit.undo_failed(&record.destination, &record.source, &reason);
                    let failure = FileFailure {
                        source: record.destination.clone(),
                        destination: record.source.clone(),
                        reason,
                    };
                    listener.restore_failed(&failure);
                    report.failures.push(failure);
                }
            }
        }

        report
    }

    /// Restores a single file to its original location.
    fn restore_file(record: &MoveRecord, mover: &dyn FileMover) -> Result<(), String> {
        if record.destination.symlink_metadata().is_err() {
            return Err("file not found at its organized location".to_string());
        }
        if record.source.symlink_metadata().is_ok() {
            return Err("original location is occupied".to_string());
        }
        if let Some(parent) = record.source.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)
                .map_err(|e| format!("could not recreate {}: {}", parent.display(), e))?;
        }

        mover
            .move_file(&record.destination, &record.source)
            .map_err(|e| format!("failed to restore file: {}", e))
    }
}
