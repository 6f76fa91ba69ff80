#![deny(missing_docs)]
//! Content loaders for compono.
//!
//! The runtime asks a [`ContentLoader`] for a document by repository base URI
//! and relative path (`Calc/IAdd.json`). Two loaders ship here:
//!
//! - [`MemoryLoader`] keeps documents in a map; good for tests and for
//!   embedding documents with `include_str!`.
//! - [`FsLoader`] reads `<root>/<base_uri>/<relative_path>` from disk.
//!
//! Loading is synchronous. It happens once per document, when a class is
//! first instantiated, so it never sits on a call path.

mod fs;
mod memory;

pub use compono_types::ContentLoader;
pub use fs::FsLoader;
pub use memory::MemoryLoader;

use compono_types::LoadError;
use std::path::{Component, Path};

/// Reject relative paths that would climb out of a repository.
pub(crate) fn check_relative(relative_path: &str) -> Result<(), LoadError> {
    let path = Path::new(relative_path);
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(LoadError::NotFound(format!(
            "{relative_path} is not a repository-relative path"
        )));
    }
    Ok(())
}
