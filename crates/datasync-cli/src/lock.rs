//! Single-instance guard.
//!
//! The lock file is created with `create_new`, so two processes racing for
//! it cannot both succeed. It holds the owner's process id and is removed
//! when the guard drops.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("Another run holds the lock file {}", .0.display())]
    Held(PathBuf),

    #[error("Failed to create lock file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug)]
pub struct LockFile {
    path: PathBuf,
}

impl LockFile {
    pub fn acquire(path: impl AsRef<Path>) -> Result<Self, LockError> {
        let path = path.as_ref().to_path_buf();
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Err(LockError::Held(path)),
            Err(source) => return Err(LockError::Io { path, source }),
        };
        // From here on the guard owns the file, so a failed write still removes it.
        let guard = Self { path };
        if let Err(source) = writeln!(file, "{}", std::process::id()) {
            return Err(LockError::Io {
                path: guard.path.clone(),
                source,
            });
        }
        tracing::debug!(path = %guard.path.display(), "Acquired lock file");
        Ok(guard)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove lock file");
        }
    }
}
