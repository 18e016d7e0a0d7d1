//! Job-scoped scratch directories
//!
//! `create` and `remove` are idempotent. [`ScratchDir`] removes its directory
//! when dropped, so every exit path of a job cleans up after itself.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Recursively create `path`; succeeds if it already exists
pub fn create(path: impl AsRef<Path>) -> io::Result<()> {
    std::fs::create_dir_all(path.as_ref())
}

/// Recursively delete `path`; succeeds if it does not exist
pub fn remove(path: impl AsRef<Path>) -> io::Result<()> {
    match std::fs::remove_dir_all(path.as_ref()) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// A directory that lives exactly as long as this guard
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
    armed: bool,
}

impl ScratchDir {
    /// Create (or reuse) the directory at `path`
    pub fn create(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        create(&path)?;
        debug!("Scratch directory ready: {}", path.display());
        Ok(Self { path, armed: true })
    }

    /// Directory location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of a file inside the directory
    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.path.join(name)
    }

    /// Remove the directory now, reporting any failure
    pub fn close(mut self) -> io::Result<()> {
        self.armed = false;
        remove(&self.path)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = remove(&self.path) {
            warn!("Failed to remove {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("a/b/c");
        create(&dir).unwrap();
        create(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_remove_missing_is_ok() {
        let root = tempfile::tempdir().unwrap();
        remove(root.path().join("never-created")).unwrap();
    }

    #[test]
    fn test_remove_is_recursive() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("job");
        create(dir.join("nested")).unwrap();
        std::fs::write(dir.join("nested/page-0000.pdf"), b"x").unwrap();
        remove(&dir).unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn test_scratch_dir_removed_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("job");
        {
            let scratch = ScratchDir::create(&dir).unwrap();
            std::fs::write(scratch.join("page.png"), b"x").unwrap();
            assert!(dir.exists());
        }
        assert!(!dir.exists());
    }

    #[test]
    fn test_scratch_dir_close() {
        let root = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::create(root.path().join("job")).unwrap();
        let path = scratch.path().to_path_buf();
        scratch.close().unwrap();
        assert!(!path.exists());
    }
}
