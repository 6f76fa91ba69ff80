//! Filesystem loader.

use compono_types::{ContentLoader, LoadError};
use std::io;
use std::path::{Path, PathBuf};

/// Reads documents from disk.
///
/// A document lives at `<root>/<base_uri>/<relative_path>`. An absolute
/// `base_uri` ignores the root.
#[derive(Debug, Clone)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    /// Create a loader resolving base URIs against `root`.
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// The directory base URIs are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, base_uri: &str, relative_path: &str) -> PathBuf {
        self.root.join(base_uri).join(relative_path)
    }
}

impl Default for FsLoader {
    fn default() -> Self {
        Self::new(Path::new("."))
    }
}

impl ContentLoader for FsLoader {
    fn load(&self, base_uri: &str, relative_path: &str) -> Result<String, LoadError> {
        crate::check_relative(relative_path)?;
        let path = self.path_for(base_uri, relative_path);
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                tracing::debug!(path = %path.display(), bytes = text.len(), "compono.loader.fs.read");
                Ok(text)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(LoadError::NotFound(path.display().to_string()))
            }
            Err(e) => Err(LoadError::Io {
                uri: path.display().to_string(),
                source: e,
            }),
        }
    }
}
