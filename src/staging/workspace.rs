//! Scratch workspace owned by a single pass.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tempfile::TempDir;

use crate::error::Result;

const WORKSPACE_PREFIX: &str = "prereqs-";

/// Uniquely named temporary directory holding one subdirectory per
/// prerequisite. Removed with everything inside it when dropped.
#[derive(Debug)]
pub struct ScratchWorkspace {
    dir: TempDir,
}

impl ScratchWorkspace {
    /// Create a workspace in the system temp directory.
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix(WORKSPACE_PREFIX).tempdir()?;
        tracing::debug!("Created scratch workspace {}", dir.path().display());
        Ok(Self { dir })
    }

    /// Create a workspace inside `parent`.
    pub fn new_in(parent: &Path) -> Result<Self> {
        fs::create_dir_all(parent)?;
        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(parent)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create (if needed) and return the subdirectory for `name`.
    ///
    /// `name` must be a single plain path component, so the result always
    /// lives inside the workspace.
    pub fn subdir(&self, name: &str) -> Result<PathBuf> {
        let mut components = Path::new(name).components();
        if !matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        ) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{}' is not a plain directory name", name),
            )
            .into());
        }

        let path = self.dir.path().join(name);
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Remove the workspace now, reporting failures instead of ignoring them.
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()?;
        tracing::debug!("Removed scratch workspace {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subdir_is_created_inside_workspace() {
        let workspace = ScratchWorkspace::new().unwrap();
        let sub = workspace.subdir("vcredist2010").unwrap();

        assert!(sub.is_dir());
        assert!(sub.starts_with(workspace.path()));
    }

    #[test]
    fn subdir_rejects_names_leaving_workspace() {
        let parent = tempfile::TempDir::new().unwrap();
        let workspace = ScratchWorkspace::new_in(parent.path()).unwrap();

        for name in ["../escape", "/tmp/escape", "..", ".", "a/b", ""] {
            let err = workspace.subdir(name).unwrap_err();
            assert!(err.to_string().contains("plain directory name"), "{name}: {err}");
        }

        workspace.close().unwrap();
        assert_eq!(fs::read_dir(parent.path()).unwrap().count(), 0);
    }

    #[test]
    fn drop_removes_everything() {
        let workspace = ScratchWorkspace::new().unwrap();
        let root = workspace.path().to_path_buf();
        let sub = workspace.subdir("dx").unwrap();
        fs::write(sub.join("dx.7z"), b"archive").unwrap();

        drop(workspace);
        assert!(!root.exists());
    }

    #[test]
    fn close_removes_workspace() {
        let parent = tempfile::TempDir::new().unwrap();
        let workspace = ScratchWorkspace::new_in(parent.path()).unwrap();
        let root = workspace.path().to_path_buf();
        assert!(root.starts_with(parent.path()));

        workspace.close().unwrap();
        assert!(!root.exists());
    }

    #[test]
    fn workspaces_are_unique() {
        let a = ScratchWorkspace::new().unwrap();
        let b = ScratchWorkspace::new().unwrap();
        assert_ne!(a.path(), b.path());
    }
}
