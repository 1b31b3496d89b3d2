/// Destination layout for an organization run.
///
/// A `DirectoryPlan` maps every category to a concrete directory under a chosen
/// destination root. `ensure_tree` materializes the plan on disk before any file
/// is moved.
use crate::file_category::Category;
use crate::file_organizer::{OrganizeError, OrganizeResult};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Concrete category directories under one destination root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryPlan {
    root: PathBuf,
}

impl DirectoryPlan {
    /// Computes the plan for a destination root without touching the disk.
    ///
    /// # Examples
    ///
    /// ```
    /// use filemover::directory_plan::DirectoryPlan;
    /// use filemover::file_category::Category;
    /// use std::path::Path;
    ///
    /// let plan = DirectoryPlan::new("/data/sorted");
    /// assert_eq!(plan.dir_for(Category::Audio), Path::new("/data/sorted/Music"));
    /// assert_eq!(plan.dir_for(Category::PdfLike), Path::new("/data/sorted/Docs/PDFs"));
    /// assert_eq!(plan.dir_for(Category::General), Path::new("/data/sorted"));
    /// ```
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The destination root. `General` files land here.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory that receives files of the given category.
    pub fn dir_for(&self, category: Category) -> PathBuf {
        category
            .dir_components()
            .iter()
            .fold(self.root.clone(), |path, component| path.join(component))
    }

    /// Destination path for an entry name classified into `category`.
    pub fn destination_for(&self, category: Category, file_name: impl AsRef<Path>) -> PathBuf {
        self.dir_for(category).join(file_name)
    }

    /// Every directory the plan needs, parents before children, root first.
    pub fn directories(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = vec![self.root.clone()];
        for category in Category::ALL {
            let components = category.dir_components();
            for depth in 1..=components.len() {
                let dir = components[..depth]
                    .iter()
                    .fold(self.root.clone(), |path, component| path.join(component));
                if !dirs.contains(&dir) {
                    dirs.push(dir);
                }
            }
        }
        dirs
    }
}

/// Creates every directory of the plan rooted at `destination_root`.
///
/// Missing parents are created as needed and directories that already exist
/// are left alone, so calling this on a provisioned tree is a no-op. There is
/// no rollback: directories created before a failure stay on disk.
///
/// # Errors
///
/// Returns `OrganizeError::DirectoryCreationFailed` if a planned path exists as
/// something other than a directory or cannot be created.
///
/// # Examples
///
/// ```no_run
/// use filemover::directory_plan::ensure_tree;
/// use std::path::Path;
///
/// let plan = ensure_tree(Path::new("/data/sorted")).expect("provisioning failed");
/// assert!(plan.root().is_dir());
/// ```
pub fn ensure_tree(destination_root: &Path) -> OrganizeResult<DirectoryPlan> {
    let plan = DirectoryPlan::new(destination_root);

    for dir in plan.directories() {
        if dir.is_dir() {
            continue;
        }

        if dir.exists() {
            return Err(OrganizeError::DirectoryCreationFailed {
                path: dir.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "path exists and is not a directory",
                ),
            });
        }

        debug!("Creating directory {}", dir.display());
        fs::create_dir_all(&dir).map_err(|e| OrganizeError::DirectoryCreationFailed {
            path: dir.clone(),
            source: e,
        })?;
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_plan_paths() {
        let plan = DirectoryPlan::new("/dest");
        assert_eq!(plan.dir_for(Category::Audio), PathBuf::from("/dest/Music"));
        assert_eq!(
            plan.dir_for(Category::Pictures),
            PathBuf::from("/dest/Pictures")
        );
        assert_eq!(plan.dir_for(Category::Documents), PathBuf::from("/dest/Docs"));
        assert_eq!(
            plan.dir_for(Category::Presentations),
            PathBuf::from("/dest/Docs/PowerPoints")
        );
        assert_eq!(
            plan.dir_for(Category::PdfLike),
            PathBuf::from("/dest/Docs/PDFs")
        );
        assert_eq!(
            plan.dir_for(Category::Archives),
            PathBuf::from("/dest/ZipFiles")
        );
        assert_eq!(plan.dir_for(Category::Video), PathBuf::from("/dest/video"));
        assert_eq!(plan.dir_for(Category::General), PathBuf::from("/dest"));
        assert_eq!(
            plan.destination_for(Category::Audio, "song.mp3"),
            PathBuf::from("/dest/Music/song.mp3")
        );
    }

    #[test]
    fn test_plan_directories_are_unique_and_ordered() {
        let plan = DirectoryPlan::new("/dest");
        let dirs = plan.directories();
        assert_eq!(dirs.len(), 8);
        assert_eq!(dirs[0], PathBuf::from("/dest"));

        let docs = dirs.iter().position(|d| d == Path::new("/dest/Docs"));
        let pdfs = dirs.iter().position(|d| d == Path::new("/dest/Docs/PDFs"));
        assert!(docs.is_some() && pdfs.is_some());
        assert!(docs < pdfs);
    }

    #[test]
    fn test_ensure_tree_creates_layout() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().join("sorted");

        let plan = ensure_tree(&root).expect("Failed to provision tree");

        for dir in plan.directories() {
            assert!(dir.is_dir(), "Directory should exist: {}", dir.display());
        }
        assert!(root.join("Docs").join("PowerPoints").is_dir());
    }

    #[test]
    fn test_ensure_tree_is_idempotent() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();

        let first = ensure_tree(root).expect("First provisioning failed");
        fs::write(root.join("Music").join("keep.mp3"), "data").expect("Failed to write file");
        let second = ensure_tree(root).expect("Second provisioning failed");

        assert_eq!(first, second);
        assert!(root.join("Music").join("keep.mp3").exists());
    }

    #[test]
    fn test_ensure_tree_fails_when_file_blocks_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::write(root.join("Music"), "not a directory").expect("Failed to write file");

        let result = ensure_tree(root);
        match result {
            Err(OrganizeError::DirectoryCreationFailed { path, .. }) => {
                assert_eq!(path, root.join("Music"));
            }
            other => panic!("Expected DirectoryCreationFailed, got {:?}", other),
        }
    }
}
