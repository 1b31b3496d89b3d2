/// File organization: moving the entries of a source directory into the
/// category directories of a destination root.
///
/// An organization run validates its inputs, provisions the destination tree and
/// then yields one `MoveResult` per source entry. A failed move is reported and
/// the run continues with the next entry; only validation and provisioning
/// failures end the run early.
use crate::config::CompiledFilters;
use crate::directory_plan::{DirectoryPlan, ensure_tree};
use crate::file_category::{Category, ExtensionTable};
use log::{debug, info, warn};
use std::fs::{self, DirEntry, ReadDir};
use std::io;
use std::path::{Path, PathBuf};

/// Represents a single file organization operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// The original path of the entry before organization.
    pub original_path: PathBuf,
    /// The path of the entry after organization.
    pub new_path: PathBuf,
    /// The category the entry was routed to.
    pub category: Category,
}

impl Operation {
    /// File name shared by both paths.
    pub fn file_name(&self) -> String {
        self.original_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Outcome for one entry of the source directory.
#[derive(Debug)]
pub enum MoveResult {
    /// The entry was moved.
    Moved(Operation),
    /// Dry run: the entry would be moved.
    Planned(Operation),
    /// The entry was left in place.
    Skipped { path: PathBuf, reason: String },
    /// The entry could not be moved.
    Failed(OrganizeError),
}

impl MoveResult {
    /// Returns true for `Failed`.
    pub fn is_failure(&self) -> bool {
        matches!(self, MoveResult::Failed(_))
    }

    /// The operation behind a `Moved` or `Planned` result.
    pub fn operation(&self) -> Option<&Operation> {
        match self {
            MoveResult::Moved(op) | MoveResult::Planned(op) => Some(op),
            _ => None,
        }
    }
}

/// Errors that can occur during file organization.
#[derive(Debug)]
pub enum OrganizeError {
    /// The source or destination path is unusable.
    InvalidInput { path: PathBuf, reason: String },
    /// Failed to create a category directory.
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to move an entry to its category directory.
    FileMoveFailure {
        file_name: String,
        source: PathBuf,
        destination: PathBuf,
        source_error: std::io::Error,
    },
    /// An entry of the source listing could not be read.
    EntryReadFailed {
        directory: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput { path, reason } => {
                write!(f, "Invalid path {}: {}", path.display(), reason)
            }
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::FileMoveFailure {
                file_name,
                destination,
                source_error,
                ..
            } => {
                write!(
                    f,
                    "Error moving file {} to {}: {}",
                    file_name,
                    destination.display(),
                    source_error
                )
            }
            Self::EntryReadFailed { directory, source } => {
                write!(
                    f,
                    "Failed to read an entry of {}: {}",
                    directory.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for OrganizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidInput { .. } => None,
            Self::DirectoryCreationFailed { source, .. } => Some(source),
            Self::FileMoveFailure { source_error, .. } => Some(source_error),
            Self::EntryReadFailed { source, .. } => Some(source),
        }
    }
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Organizes the entries of a directory into category directories.
///
/// Holds the extension registry and entry filters used for every run.
#[derive(Debug, Clone, Default)]
pub struct FileOrganizer {
    table: ExtensionTable,
    filters: CompiledFilters,
}

impl FileOrganizer {
    pub fn new(table: ExtensionTable, filters: CompiledFilters) -> Self {
        Self { table, filters }
    }

    /// The extension registry in use.
    pub fn table(&self) -> &ExtensionTable {
        &self.table
    }

    /// Classifies an entry name.
    pub fn classify(&self, file_name: &str) -> Category {
        self.table.classify(file_name)
    }

    /// Starts an organization run from `source` into `destination`.
    ///
    /// The source must be an existing, readable directory. The destination
    /// tree is provisioned before this returns; the moves themselves happen
    /// as the returned iterator is consumed, one entry per `next()`.
    ///
    /// # Errors
    ///
    /// * `InvalidInput` if the source is missing, not a directory or
    ///   unreadable, or if the destination exists as a file. Nothing is
    ///   changed on disk in that case.
    /// * `DirectoryCreationFailed` if the destination tree cannot be created.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use filemover::file_organizer::{FileOrganizer, MoveResult};
    /// use std::path::Path;
    ///
    /// let organizer = FileOrganizer::default();
    /// let run = organizer
    ///     .organize(Path::new("/home/me/Downloads"), Path::new("/home/me/Sorted"))
    ///     .expect("cannot start");
    /// for result in run {
    ///     match result {
    ///         MoveResult::Moved(op) => println!("Moved file: {}", op.file_name()),
    ///         MoveResult::Failed(e) => eprintln!("{}", e),
    ///         _ => {}
    ///     }
    /// }
    /// ```
    pub fn organize(&self, source: &Path, destination: &Path) -> OrganizeResult<Organize<'_>> {
        let entries = validate(source, destination)?;

        info!(
            "Provisioning destination tree under {}",
            destination.display()
        );
        let plan = ensure_tree(destination)?;

        info!("Moving entries of {}", source.display());
        Ok(Organize::new(self, source, plan, entries, false))
    }

    /// Dry run: validates like [`organize`](Self::organize) and yields
    /// `Planned` results without creating directories or moving anything.
    pub fn plan(&self, source: &Path, destination: &Path) -> OrganizeResult<Organize<'_>> {
        let entries = validate(source, destination)?;
        let plan = DirectoryPlan::new(destination);
        Ok(Organize::new(self, source, plan, entries, true))
    }
}

/// Checks both roots and opens the source listing.
fn validate(source: &Path, destination: &Path) -> OrganizeResult<ReadDir> {
    let metadata = fs::metadata(source).map_err(|e| OrganizeError::InvalidInput {
        path: source.to_path_buf(),
        reason: format!("source directory is not accessible: {}", e),
    })?;
    if !metadata.is_dir() {
        return Err(OrganizeError::InvalidInput {
            path: source.to_path_buf(),
            reason: "source is not a directory".to_string(),
        });
    }

    if destination.as_os_str().is_empty() {
        return Err(OrganizeError::InvalidInput {
            path: destination.to_path_buf(),
            reason: "destination path is empty".to_string(),
        });
    }
    if destination.exists() && !destination.is_dir() {
        return Err(OrganizeError::InvalidInput {
            path: destination.to_path_buf(),
            reason: "destination is not a directory".to_string(),
        });
    }

    fs::read_dir(source).map_err(|e| OrganizeError::InvalidInput {
        path: source.to_path_buf(),
        reason: format!("source directory cannot be listed: {}", e),
    })
}

/// A running organization pass over one source directory.
///
/// Yields one `MoveResult` per immediate entry of the source, in the order the
/// filesystem lists them. The pass runs once; it cannot be restarted.
pub struct Organize<'a> {
    organizer: &'a FileOrganizer,
    source: PathBuf,
    plan: DirectoryPlan,
    entries: ReadDir,
    dry_run: bool,
    plan_paths: Vec<PathBuf>,
    planned_dirs: Vec<PathBuf>,
}

impl<'a> Organize<'a> {
    fn new(
        organizer: &'a FileOrganizer,
        source: &Path,
        plan: DirectoryPlan,
        entries: ReadDir,
        dry_run: bool,
    ) -> Self {
        // Canonical forms of the planned directories that exist, so a
        // destination nested in the source is never moved into itself.
        let plan_paths = plan.directories();
        let planned_dirs = plan_paths
            .iter()
            .filter_map(|dir| dir.canonicalize().ok())
            .collect();

        Self {
            organizer,
            source: source.to_path_buf(),
            plan,
            entries,
            dry_run,
            plan_paths,
            planned_dirs,
        }
    }

    /// The destination layout of this pass.
    pub fn plan(&self) -> &DirectoryPlan {
        &self.plan
    }

    fn is_planned_dir(&self, entry: &DirEntry) -> bool {
        if self.planned_dirs.is_empty() {
            return false;
        }
        match entry.file_type() {
            Ok(file_type) if file_type.is_dir() => entry
                .path()
                .canonicalize()
                .map(|path| self.planned_dirs.contains(&path))
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Returns true if `destination` is itself a category directory, as for
    /// an extensionless entry named `Music`.
    fn targets_planned_dir(&self, destination: &Path) -> bool {
        self.plan_paths.iter().any(|dir| dir == destination)
            || destination
                .canonicalize()
                .map(|path| self.planned_dirs.contains(&path))
                .unwrap_or(false)
    }

    fn process(&self, entry: DirEntry) -> MoveResult {
        let path = entry.path();
        let os_name = entry.file_name();
        let file_name = os_name.to_string_lossy().to_string();

        if self.is_planned_dir(&entry) {
            debug!("Skipping destination directory {}", path.display());
            return MoveResult::Skipped {
                path,
                reason: "destination directory".to_string(),
            };
        }

        if !self.organizer.filters.should_include(Path::new(&os_name)) {
            debug!("Skipping {} (excluded by filters)", file_name);
            return MoveResult::Skipped {
                path,
                reason: "excluded by filters".to_string(),
            };
        }

        let category = self.organizer.classify(&file_name);
        let destination = self.plan.destination_for(category, &os_name);
        debug!(
            "{} -> {} ({:?})",
            file_name,
            destination.display(),
            category
        );

        if self.targets_planned_dir(&destination) {
            warn!(
                "Not moving {}: {} is a category directory",
                file_name,
                destination.display()
            );
            return MoveResult::Failed(OrganizeError::FileMoveFailure {
                file_name,
                source: path,
                destination,
                source_error: io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "destination is a category directory",
                ),
            });
        }

        let operation = Operation {
            original_path: path,
            new_path: destination,
            category,
        };

        if self.dry_run {
            return MoveResult::Planned(operation);
        }

        match move_entry(&operation.original_path, &operation.new_path) {
            Ok(()) => MoveResult::Moved(operation),
            Err(e) => {
                warn!("Error moving file {}: {}", file_name, e);
                MoveResult::Failed(OrganizeError::FileMoveFailure {
                    file_name,
                    source: operation.original_path,
                    destination: operation.new_path,
                    source_error: e,
                })
            }
        }
    }
}

impl Iterator for Organize<'_> {
    type Item = MoveResult;

    fn next(&mut self) -> Option<MoveResult> {
        let result = match self.entries.next()? {
            Ok(entry) => self.process(entry),
            Err(e) => {
                warn!("Failed to read an entry of {}: {}", self.source.display(), e);
                MoveResult::Failed(OrganizeError::EntryReadFailed {
                    directory: self.source.clone(),
                    source: e,
                })
            }
        };
        Some(result)
    }
}

/// Moves `source` to `destination`, replacing whatever is there.
///
/// The rename is tried first, so an existing file (or, on Unix, an empty
/// directory replaced by a directory) is swapped in one step. Only when that
/// rename is refused because of what sits at `destination` (a directory in the
/// way, a non-empty directory, a file where a directory should go) is the
/// obstacle removed and the rename retried: an empty directory via
/// `remove_dir`, a file in the way of a directory via `remove_file`. Any other
/// rename error leaves the destination untouched. A failure of the retried
/// rename leaves the destination removed. When the rename crosses filesystems
/// a regular file is copied and the original deleted; directories are not
/// copied and nothing at the destination is removed.
pub fn move_entry(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            if !is_regular_file(source) {
                return Err(e);
            }
            debug!(
                "Rename across devices, copying {} instead",
                source.display()
            );
            fs::copy(source, destination)?;
            fs::remove_file(source)
        }
        Err(e) => {
            if source == destination
                || !blocked_by_destination(&e)
                || !clear_destination(source, destination)?
            {
                return Err(e);
            }
            fs::rename(source, destination)
        }
    }
}

fn blocked_by_destination(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::IsADirectory
            | io::ErrorKind::NotADirectory
            | io::ErrorKind::DirectoryNotEmpty
            | io::ErrorKind::AlreadyExists
    ) || (cfg!(windows) && e.kind() == io::ErrorKind::PermissionDenied)
}

/// Removes whatever blocks a rename to `destination`. Returns false when
/// nothing was in the way, so the original rename error stands.
fn clear_destination(source: &Path, destination: &Path) -> io::Result<bool> {
    let Ok(existing) = fs::symlink_metadata(destination) else {
        return Ok(false);
    };

    if existing.is_dir() {
        fs::remove_dir(destination)?;
        Ok(true)
    } else if fs::symlink_metadata(source)?.is_dir() {
        fs::remove_file(destination)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

fn is_regular_file(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.is_file())
        .unwrap_or(false)
}
