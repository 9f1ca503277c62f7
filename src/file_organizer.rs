//! Moves files into category subdirectories and records what was moved.
//!
//! [`FileOrganizer`] walks a root directory, classifies every regular file by
//! extension, resolves name collisions with `_1`, `_2`, ... suffixes and moves
//! the file into `root/<Category>/`. Each run that moves at least one file
//! pushes a [`MoveBatch`] onto the organizer's [`History`] so it can later be
//! reversed with [`FileOrganizer::undo_last`].

use crate::audit::AuditLog;
use crate::config::{CompiledFilters, ConfigError, SorterConfig};
use crate::events::{NoopListener, OrganizeListener};
use crate::file_category::{Category, FileMapper};
use crate::undo::{History, UndoManager, UndoOutcome};
use chrono::{DateTime, Local};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::ffi::{OsStr, OsString};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// How many times a destination that turns up occupied at move time is
/// re-resolved before the file is reported as failed.
const MAX_COLLISION_RETRIES: u32 = 16;

/// A single completed move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveRecord {
    /// Where the file was before the move.
    pub source: PathBuf,
    /// Where the file was put.
    pub destination: PathBuf,
    /// The category folder it was sorted into.
    pub category: Category,
}

/// All moves produced by one organize run, in the order performed.
#[derive(Debug, Clone, Serialize)]
pub struct MoveBatch {
    pub root: PathBuf,
    pub created_at: DateTime<Local>,
    records: Vec<MoveRecord>,
}

impl MoveBatch {
    /// Starts an empty batch for `root`, stamped with the current local time.
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            created_at: Local::now(),
            records: Vec::new(),
        }
    }

    /// Appends a completed move. Records keep the order the moves happened in.
    pub fn push(&mut self, record: MoveRecord) {
        self.records.push(record);
    }

    /// The recorded moves, oldest first.
    pub fn records(&self) -> &[MoveRecord] {
        &self.records
    }

    /// Number of files moved in this batch.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A move (or undo) of one file that did not happen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    /// The file that should have moved.
    pub source: PathBuf,
    /// Where it was headed.
    pub destination: PathBuf,
    pub reason: String,
}

/// Outcome of [`FileOrganizer::organize`].
#[derive(Debug, Clone, Serialize)]
pub struct OrganizeReport {
    pub root: PathBuf,
    /// Successful moves. Identical to the batch pushed onto the history.
    pub batch: MoveBatch,
    /// Files that stayed where they were because their move failed.
    pub failures: Vec<FileFailure>,
}

impl OrganizeReport {
    /// Number of files that reached their category folder.
    pub fn moved_count(&self) -> usize {
        self.batch.len()
    }

    /// True when no file failed to move.
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of files moved into each category.
    pub fn category_counts(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for record in self.batch.records() {
            *counts.entry(record.category).or_insert(0) += 1;
        }
        counts
    }
}

/// A move that [`FileOrganizer::plan`] predicts the next run will make.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMove {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub category: Category,
}

/// Errors that stop an organize run before anything is touched.
#[derive(Debug, Error)]
pub enum OrganizeError {
    #[error("Folder does not exist: {}", path.display())]
    RootNotFound { path: PathBuf },

    #[error("Not a folder: {}", path.display())]
    RootNotADirectory { path: PathBuf },

    #[error("Cannot access folder {}: {}", path.display(), source)]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// The primitive that relocates one file.
///
/// Implementations must not overwrite an existing destination; they return an
/// [`io::ErrorKind::AlreadyExists`] error instead so the caller can pick the
/// next free name.
pub trait FileMover: Send {
    fn move_file(&self, source: &Path, destination: &Path) -> io::Result<()>;
}

/// Moves files with `rename`, falling back to copy and delete across devices.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsMover;

impl FileMover for FsMover {
    fn move_file(&self, source: &Path, destination: &Path) -> io::Result<()> {
        if destination.symlink_metadata().is_ok() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", destination.display()),
            ));
        }

        match fs::rename(source, destination) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                debug!(
                    "rename across devices, copying instead: {} -> {}",
                    source.display(),
                    destination.display()
                );
                copy_and_delete(source, destination)
            }
            Err(e) => Err(e),
        }
    }
}

/// Copies `source` to a newly created `destination`, then removes `source`.
///
/// Any failure after `destination` was created removes it again. A failed
/// move leaves only the original file.
fn copy_and_delete(source: &Path, destination: &Path) -> io::Result<()> {
    let mut reader = File::open(source)?;
    let mut writer = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)?;

    let result = io::copy(&mut reader, &mut writer)
        .and_then(|_| writer.set_permissions(reader.metadata()?.permissions()))
        .and_then(|_| writer.sync_all());
    drop(writer);

    if let Err(e) = result.and_then(|_| fs::remove_file(source)) {
        discard_copy(destination);
        return Err(e);
    }
    Ok(())
}

fn discard_copy(destination: &Path) {
    match fs::remove_file(destination) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(
            "Could not remove incomplete copy {}: {}",
            destination.display(),
            e
        ),
    }
}

/// Builds the `n`th candidate name: `name` itself for 0, `base_n.ext` after.
///
/// Works on the raw `OsStr`, so names that are not valid UTF-8 keep their
/// bytes. A stem made only of dots (`.bashrc`, `..a`) has no extension.
fn candidate_path(dir: &Path, file_name: &OsStr, n: u32) -> PathBuf {
    if n == 0 {
        return dir.join(file_name);
    }
    let name = Path::new(file_name);
    let mut candidate = OsString::new();
    match (name.file_stem(), name.extension()) {
        (Some(stem), Some(ext)) if !is_only_dots(stem) => {
            candidate.push(stem);
            candidate.push(format!("_{}.", n));
            candidate.push(ext);
        }
        _ => {
            candidate.push(file_name);
            candidate.push(format!("_{}", n));
        }
    }
    dir.join(candidate)
}

fn is_only_dots(stem: &OsStr) -> bool {
    stem.as_encoded_bytes().iter().all(|b| *b == b'.')
}

fn is_occupied(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Sorts files into category folders and keeps the undo history.
///
/// One organizer is created at process start and used for every organize and
/// undo request; its history lives exactly as long as it does.
pub struct FileOrganizer {
    mapper: FileMapper,
    filters: CompiledFilters,
    skip_category_dirs: bool,
    mover: Box<dyn FileMover>,
    audit: AuditLog,
    /// Canonical paths the walk never picks up, like the loaded config file.
    protected: Vec<PathBuf>,
    history: History,
}

impl FileOrganizer {
    /// Creates an organizer with the given mapping, no filters, category
    /// folders skipped, real filesystem moves and no audit log.
    pub fn new(mapper: FileMapper) -> Self {
        Self {
            mapper,
            filters: CompiledFilters::default(),
            skip_category_dirs: true,
            mover: Box::new(FsMover),
            audit: AuditLog::disabled(),
            protected: Vec::new(),
            history: History::new(),
        }
    }

    /// Creates an organizer from a loaded configuration file.
    ///
    /// The audit log is not opened here; attach one with
    /// [`with_audit_log`](Self::with_audit_log). The file the configuration
    /// was read from is never organized.
    pub fn from_config(config: &SorterConfig) -> Result<Self, ConfigError> {
        let filters = config.compile_filters()?;
        let mut organizer = Self::new(config.mapper())
            .with_filters(filters)
            .skip_category_dirs(config.organizer.skip_category_dirs);
        if let Some(source) = config.source() {
            organizer = organizer.protect_path(source);
        }
        Ok(organizer)
    }

    /// Replaces the walk filters.
    ///
    /// # Arguments
    ///
    /// * `filters` - Compiled `[filters]` rules; files they reject are left in place
    pub fn with_filters(mut self, filters: CompiledFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Replaces the move primitive used for both organize and undo.
    ///
    /// # Arguments
    ///
    /// * `mover` - Implementation that must refuse to overwrite an existing destination
    ///
    /// # Examples
    ///
    /// ```
    /// use file_sorter::{FileMapper, FileOrganizer, FsMover};
    ///
    /// let organizer = FileOrganizer::new(FileMapper::default()).with_mover(FsMover);
    /// assert!(organizer.history().is_empty());
    /// ```
    pub fn with_mover(mut self, mover: impl FileMover + 'static) -> Self {
        self.mover = Box::new(mover);
        self
    }

    /// Attaches the audit log. Its own file is never organized.
    pub fn with_audit_log(mut self, audit: AuditLog) -> Self {
        self.audit = audit;
        self
    }

    /// Keeps the file at `path` out of every walk.
    ///
    /// Paths that cannot be resolved (the file does not exist) are ignored.
    pub fn protect_path(mut self, path: &Path) -> Self {
        match fs::canonicalize(path) {
            Ok(canonical) => self.protected.push(canonical),
            Err(e) => debug!("Not protecting {}: {}", path.display(), e),
        }
        self
    }

    /// Whether top-level category folders (`root/Images`, ...) are left out of
    /// the walk. When they are walked, a file already sitting in its own
    /// category folder is left alone.
    pub fn skip_category_dirs(mut self, skip: bool) -> Self {
        self.skip_category_dirs = skip;
        self
    }

    /// The batches that can still be undone.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Organizes `root`. See [`organize_with`](Self::organize_with).
    pub fn organize(&mut self, root: &Path) -> OrganizeResult<OrganizeReport> {
        self.organize_with(root, &mut NoopListener)
    }

    /// Moves every regular file under `root` into `root/<Category>/`.
    ///
    /// The root is validated before anything is read. After that, failures
    /// are per file: a file that cannot be moved is reported in
    /// [`OrganizeReport::failures`] and the run continues. If at least one
    /// file moved, the batch is pushed onto the history.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use file_sorter::{FileMapper, FileOrganizer};
    /// use std::path::Path;
    ///
    /// let mut organizer = FileOrganizer::new(FileMapper::default());
    /// let report = organizer.organize(Path::new("/home/me/Downloads")).unwrap();
    /// println!("moved {} files", report.moved_count());
    /// ```
    pub fn organize_with(
        &mut self,
        root: &Path,
        listener: &mut dyn OrganizeListener,
    ) -> OrganizeResult<OrganizeReport> {
        let root = validate_root(root)?;
        let files = self.collect_files(&root);
        info!("Organizing {} files under {}", files.len(), root.display());
        listener.scan_finished(files.len());

        let mut batch = MoveBatch::new(root.clone());
        let mut failures = Vec::new();

        for source in files {
            let Some(file_name) = source.file_name().map(OsStr::to_os_string) else {
                continue;
            };
            let category = self.mapper.category_for(&file_name.to_string_lossy());
            let dest_dir = root.join(category.dir_name());

            if self.is_already_in_place(&source, &dest_dir) {
                debug!("Already in place: {}", source.display());
                continue;
            }

            match self.move_into(&source, &dest_dir, &file_name) {
                Ok(destination) => {
                    self.audit.moved(&source, &destination);
                    let record = MoveRecord {
                        source,
                        destination,
                        category,
                    };
                    listener.file_moved(&record);
                    batch.push(record);
                }
                Err((destination, e)) => {
                    self.audit
                        .move_failed(&source, &destination, &e.to_string());
                    let failure = FileFailure {
                        source,
                        destination,
                        reason: e.to_string(),
                    };
                    listener.file_failed(&failure);
                    failures.push(failure);
                }
            }
        }

        if !batch.is_empty() {
            self.history.push(batch.clone());
        }

        Ok(OrganizeReport {
            root,
            batch,
            failures,
        })
    }

    /// Predicts what [`organize`](Self::organize) would do, without touching
    /// the filesystem.
    pub fn plan(&self, root: &Path) -> OrganizeResult<Vec<PlannedMove>> {
        let root = validate_root(root)?;
        let mut reserved: HashSet<PathBuf> = HashSet::new();
        let mut planned = Vec::new();

        for source in self.collect_files(&root) {
            let Some(file_name) = source.file_name() else {
                continue;
            };
            let category = self.mapper.category_for(&file_name.to_string_lossy());
            let dest_dir = root.join(category.dir_name());
            if self.is_already_in_place(&source, &dest_dir) {
                continue;
            }

            let destination = (0..)
                .map(|n| candidate_path(&dest_dir, file_name, n))
                .find(|candidate| !is_occupied(candidate) && !reserved.contains(candidate))
                .unwrap_or_else(|| dest_dir.join(file_name));
            reserved.insert(destination.clone());
            planned.push(PlannedMove {
                source,
                destination,
                category,
            });
        }

        Ok(planned)
    }

    /// Reverses the most recent batch. See [`undo_last_with`](Self::undo_last_with).
    pub fn undo_last(&mut self) -> UndoOutcome {
        self.undo_last_with(&mut NoopListener)
    }

    /// Pops the most recent batch off the history and moves each of its files
    /// back, last move first. Returns [`UndoOutcome::NothingToUndo`] when the
    /// history is empty.
    pub fn undo_last_with(&mut self, listener: &mut dyn OrganizeListener) -> UndoOutcome {
        match self.history.pop() {
            Some(batch) => UndoOutcome::Undone(UndoManager::undo_batch(
                batch,
                &*self.mover,
                &mut self.audit,
                listener,
            )),
            None => {
                info!("Nothing to undo");
                UndoOutcome::NothingToUndo
            }
        }
    }

    /// Snapshot of the files to process, in a stable depth-first order.
    fn collect_files(&self, root: &Path) -> Vec<PathBuf> {
        let skip_category_dirs = self.skip_category_dirs;
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !(skip_category_dirs && is_category_dir(entry)));

        let mut files = Vec::new();
        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && self.should_organize(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => warn!("Skipping unreadable entry: {}", e),
            }
        }
        files
    }

    fn should_organize(&self, path: &Path) -> bool {
        if self.audit.path() == Some(path) || self.protected.iter().any(|p| p == path) {
            debug!("Protected file left in place: {}", path.display());
            return false;
        }
        self.filters.should_include(path)
    }

    fn is_already_in_place(&self, source: &Path, dest_dir: &Path) -> bool {
        !self.skip_category_dirs && source.parent() == Some(dest_dir)
    }

    /// Creates `dest_dir`, picks the first free name in it and moves `source`
    /// there. On failure returns the destination that was attempted.
    fn move_into(
        &self,
        source: &Path,
        dest_dir: &Path,
        file_name: &OsStr,
    ) -> Result<PathBuf, (PathBuf, io::Error)> {
        if let Err(e) = fs::create_dir_all(dest_dir) {
            return Err((dest_dir.join(file_name), e));
        }

        let mut n = 0;
        let mut retries = 0;
        loop {
            let candidate = candidate_path(dest_dir, file_name, n);
            if is_occupied(&candidate) {
                n += 1;
                continue;
            }
            match self.mover.move_file(source, &candidate) {
                Ok(()) => return Ok(candidate),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    retries += 1;
                    if retries > MAX_COLLISION_RETRIES {
                        return Err((candidate, e));
                    }
                    n += 1;
                }
                Err(e) => return Err((candidate, e)),
            }
        }
    }
}

impl std::fmt::Debug for FileOrganizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileOrganizer")
            .field("skip_category_dirs", &self.skip_category_dirs)
            .field("audit", &self.audit)
            .field("history_len", &self.history.len())
            .finish()
    }
}

/// Rejects a missing or non-directory root and returns it in canonical form,
/// with `..` and symlinks resolved.
fn validate_root(root: &Path) -> OrganizeResult<PathBuf> {
    let metadata = match fs::metadata(root) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(OrganizeError::RootNotFound {
                path: root.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(OrganizeError::RootUnreadable {
                path: root.to_path_buf(),
                source: e,
            });
        }
    };
    if !metadata.is_dir() {
        return Err(OrganizeError::RootNotADirectory {
            path: root.to_path_buf(),
        });
    }
    fs::canonicalize(root).map_err(|e| OrganizeError::RootUnreadable {
        path: root.to_path_buf(),
        source: e,
    })
}

fn is_category_dir(entry: &DirEntry) -> bool {
    entry.depth() == 1
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .and_then(Category::from_dir_name)
            .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    fn organizer() -> FileOrganizer {
        FileOrganizer::new(FileMapper::default())
    }

    /// Mover that reports every destination as taken the first `n` times.
    struct RacingMover {
        remaining: RefCell<u32>,
    }

    impl FileMover for RacingMover {
        fn move_file(&self, source: &Path, destination: &Path) -> io::Result<()> {
            let mut remaining = self.remaining.borrow_mut();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(io::Error::new(io::ErrorKind::AlreadyExists, "raced"));
            }
            FsMover.move_file(source, destination)
        }
    }

    #[test]
    fn test_candidate_path() {
        let dir = Path::new("/r/Images");
        assert_eq!(
            candidate_path(dir, OsStr::new("a.png"), 0),
            PathBuf::from("/r/Images/a.png")
        );
        assert_eq!(
            candidate_path(dir, OsStr::new("a.png"), 2),
            PathBuf::from("/r/Images/a_2.png")
        );
        assert_eq!(
            candidate_path(dir, OsStr::new("README"), 1),
            PathBuf::from("/r/Images/README_1")
        );
        assert_eq!(
            candidate_path(dir, OsStr::new("a.tar.GZ"), 1),
            PathBuf::from("/r/Images/a.tar_1.GZ")
        );
    }

    #[test]
    fn test_candidate_path_dot_names() {
        let dir = Path::new("/r/Others");
        let name = |s: &str, n| candidate_path(dir, OsStr::new(s), n);
        assert_eq!(name(".bashrc", 1), PathBuf::from("/r/Others/.bashrc_1"));
        assert_eq!(name(".hidden.png", 1), PathBuf::from("/r/Others/.hidden_1.png"));
        assert_eq!(name("..a", 1), PathBuf::from("/r/Others/..a_1"));
        assert_eq!(name("a.", 3), PathBuf::from("/r/Others/a_3."));
    }

    #[cfg(unix)]
    #[test]
    fn test_candidate_path_keeps_non_utf8_bytes() {
        use std::os::unix::ffi::OsStrExt;

        let dir = Path::new("/r/Images");
        let candidate = candidate_path(dir, OsStr::from_bytes(b"\xffpic.png"), 1);
        assert_eq!(
            candidate.file_name().unwrap().as_bytes(),
            b"\xffpic_1.png"
        );
    }

    #[test]
    fn test_copy_and_delete_moves_content() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let src = temp_dir.path().join("a.txt");
        let dst = temp_dir.path().join("b.txt");
        fs::write(&src, "payload").unwrap();

        copy_and_delete(&src, &dst).expect("copy failed");

        assert!(!src.exists());
        assert_eq!(fs::read_to_string(&dst).unwrap(), "payload");
    }

    #[test]
    fn test_copy_and_delete_leaves_existing_destination_alone() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let src = temp_dir.path().join("a.txt");
        let dst = temp_dir.path().join("b.txt");
        fs::write(&src, "a").unwrap();
        fs::write(&dst, "b").unwrap();

        let err = copy_and_delete(&src, &dst).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&dst).unwrap(), "b");
        assert_eq!(fs::read_to_string(&src).unwrap(), "a");
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_and_delete_removes_incomplete_copy() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        // A directory opens fine but fails on the first read.
        let src = temp_dir.path().join("not_a_file");
        let dst = temp_dir.path().join("copy.bin");
        fs::create_dir(&src).unwrap();

        assert!(copy_and_delete(&src, &dst).is_err());

        assert!(!dst.exists());
        assert!(src.is_dir());
    }

    #[test]
    fn test_fs_mover_refuses_overwrite() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let src = temp_dir.path().join("a.txt");
        let dst = temp_dir.path().join("b.txt");
        fs::write(&src, "a").unwrap();
        fs::write(&dst, "b").unwrap();

        let err = FsMover.move_file(&src, &dst).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&dst).unwrap(), "b");
        assert!(src.exists());
    }

    #[test]
    fn test_validate_root_rejects_missing_and_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file = temp_dir.path().join("plain.txt");
        fs::write(&file, "x").unwrap();

        assert!(matches!(
            validate_root(&temp_dir.path().join("missing")),
            Err(OrganizeError::RootNotFound { .. })
        ));
        assert!(matches!(
            validate_root(&file),
            Err(OrganizeError::RootNotADirectory { .. })
        ));
        assert!(validate_root(temp_dir.path()).is_ok());
    }

    #[test]
    fn test_organize_records_moves_in_walk_order() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("b.txt"), "b").unwrap();
        fs::write(root.join("a.png"), "a").unwrap();
        fs::write(root.join("sub").join("c.mp3"), "c").unwrap();

        let mut organizer = organizer();
        let report = organizer.organize(root).expect("organize failed");

        let names: Vec<_> = report
            .batch
            .records()
            .iter()
            .map(|r| r.source.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.png", "b.txt", "c.mp3"]);
        assert_eq!(organizer.history().len(), 1);
    }

    #[test]
    fn test_organize_empty_folder_pushes_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut organizer = organizer();

        let report = organizer.organize(temp_dir.path()).expect("organize failed");

        assert_eq!(report.moved_count(), 0);
        assert!(organizer.history().is_empty());
    }

    #[test]
    fn test_raced_destination_takes_next_suffix() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::write(root.join("a.png"), "a").unwrap();

        let mut organizer = organizer().with_mover(RacingMover {
            remaining: RefCell::new(2),
        });
        let report = organizer.organize(root).expect("organize failed");

        assert_eq!(report.moved_count(), 1);
        assert!(root.join("Images").join("a_2.png").exists());
    }

    #[test]
    fn test_endless_race_reports_failure() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::write(root.join("a.png"), "a").unwrap();

        let mut organizer = organizer().with_mover(RacingMover {
            remaining: RefCell::new(u32::MAX),
        });
        let report = organizer.organize(root).expect("organize failed");

        assert_eq!(report.moved_count(), 0);
        assert_eq!(report.failures.len(), 1);
        assert!(root.join("a.png").exists());
        assert!(organizer.history().is_empty());
    }

    #[test]
    fn test_plan_reserves_names_within_run() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::create_dir(root.join("x")).unwrap();
        fs::write(root.join("a.png"), "1").unwrap();
        fs::write(root.join("x").join("a.png"), "2").unwrap();

        let plan = organizer().plan(root).expect("plan failed");

        let destinations: Vec<_> = plan
            .iter()
            .map(|p| p.destination.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(destinations, ["a.png", "a_1.png"]);
        assert!(!root.join("Images").exists());
        assert!(root.join("a.png").exists());
    }

    #[test]
    fn test_walking_category_dirs_leaves_sorted_files_alone() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::create_dir(root.join("Images")).unwrap();
        fs::write(root.join("Images").join("a.png"), "a").unwrap();
        fs::write(root.join("Images").join("notes.txt"), "n").unwrap();

        let mut organizer = organizer().skip_category_dirs(false);
        let report = organizer.organize(root).expect("organize failed");

        assert_eq!(report.moved_count(), 1);
        assert!(root.join("Images").join("a.png").exists());
        assert!(!root.join("Images").join("a_1.png").exists());
        assert!(root.join("Text").join("notes.txt").exists());
    }
}
