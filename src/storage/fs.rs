use crate::storage::traits::{OutputStore, StorageError, StorageResult};
use std::path::{Component, Path, PathBuf};

/// Filesystem-backed output store rooted at the export directory
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Creates the store, creating the root directory if needed
    pub fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|source| StorageError::Write {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    /// Resolves a relative path inside the root
    ///
    /// Absolute paths and `..` components are rejected so that names derived
    /// from remote data cannot escape the export directory.
    pub fn resolve(&self, relative: &Path) -> StorageResult<PathBuf> {
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || relative.as_os_str().is_empty() {
            return Err(StorageError::InvalidPath(relative.to_path_buf()));
        }
        Ok(self.root.join(relative))
    }
}

impl OutputStore for FsStore {
    fn write_bytes(&self, relative: &Path, bytes: &[u8]) -> StorageResult<()> {
        let path = self.resolve(relative)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        std::fs::write(&path, bytes).map_err(|source| StorageError::Write { path, source })
    }

    fn root(&self) -> &Path {
        &self.root
    }
}
