use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Removes the file at `path` when dropped.
///
/// The guard is created before the file is known to exist, so a missing file on
/// drop is not an error.
#[derive(Debug)]
#[must_use = "the file is deleted as soon as the guard is dropped"]
pub struct ScopedFile {
    path: PathBuf,
}

impl ScopedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AsRef<Path> for ScopedFile {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScopedFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Removed scoped file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove scoped file"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4.processing");
        std::fs::write(&path, b"data").unwrap();

        {
            let guard = ScopedFile::new(&path);
            assert_eq!(guard.path(), path.as_path());
            assert!(path.exists());
        }

        assert!(!path.exists());
    }

    #[test]
    fn test_missing_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let guard = ScopedFile::new(dir.path().join("never-created"));
        drop(guard);
    }
}
