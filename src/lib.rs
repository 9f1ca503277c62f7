//! file-sorter - sort files into category folders, reversibly
//!
//! This library walks a folder, moves every file into a `Images`, `Documents`,
//! `Text`, `Music`, `Videos` or `Others` subfolder based on its extension, and
//! keeps an in-memory history of those moves so each run can be undone.

pub mod audit;
pub mod cli;
pub mod config;
pub mod events;
pub mod file_category;
pub mod file_organizer;
pub mod output;
pub mod undo;

pub use audit::AuditLog;
pub use config::{CompiledFilters, ConfigError, SorterConfig};
pub use events::{NoopListener, OrganizeListener};
pub use file_category::{Category, FileMapper};
pub use file_organizer::{
    FileFailure, FileMover, FileOrganizer, FsMover, MoveBatch, MoveRecord, OrganizeError,
    OrganizeReport, PlannedMove,
};
pub use undo::{History, UndoOutcome, UndoReport};
