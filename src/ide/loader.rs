//! Loading document text.

use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Failure to produce a document's text.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LoadError {
    pub fn path(&self) -> &Path {
        match self {
            LoadError::NotFound(path) | LoadError::Io { path, .. } => path,
        }
    }
}

/// Source of document text for paths without an in-memory overlay.
pub trait DocumentLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<String, LoadError>;
}

/// Reads documents from the file system.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsLoader;

impl DocumentLoader for FsLoader {
    fn load(&self, path: &Path) -> Result<String, LoadError> {
        std::fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
            _ => LoadError::Io {
                path: path.to_path_buf(),
                source,
            },
        })
    }
}

/// Lexically remove `.` and `..` components.
///
/// Does not touch the file system, so symlinks are not resolved.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
