//! Per-file notifications for whatever sits in front of the organizer.
//!
//! The organizer never prints or pops up anything itself. Callers that want
//! live feedback (a progress bar, a GUI list) implement [`OrganizeListener`];
//! everything is also available afterwards in the returned reports.

use crate::file_organizer::{FileFailure, MoveRecord};

/// Receives events while an organize or undo runs. All methods default to
/// doing nothing.
pub trait OrganizeListener {
    /// The tree walk finished; `total` files are about to be processed.
    fn scan_finished(&mut self, _total: usize) {}

    fn file_moved(&mut self, _record: &MoveRecord) {}

    fn file_failed(&mut self, _failure: &FileFailure) {}

    /// An undo is about to reverse `total` records.
    fn undo_started(&mut self, _total: usize) {}

    fn file_restored(&mut self, _record: &MoveRecord) {}

    fn restore_failed(&mut self, _failure: &FileFailure) {}
}

/// Listener that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl OrganizeListener for NoopListener {}
