//! The content-loader seam: raw documents from component repositories.

use crate::error::LoadError;

/// Reads raw documents (interface definitions, object schemas) from a
/// repository.
///
/// The runtime resolves a dotted name to a repository base URI and a
/// relative path, then asks the loader for the text. Loading happens once
/// per name, synchronously, while a composition is being assembled.
///
/// Implementations:
/// - `MemoryLoader`: documents held in a map (tests, embedded setups)
/// - `FsLoader`: files under a base directory
pub trait ContentLoader: Send + Sync {
    /// Load the document at `relative_path` under `base_uri`.
    fn load(&self, base_uri: &str, relative_path: &str) -> Result<String, LoadError>;
}

impl<T: ContentLoader + ?Sized> ContentLoader for std::sync::Arc<T> {
    fn load(&self, base_uri: &str, relative_path: &str) -> Result<String, LoadError> {
        (**self).load(base_uri, relative_path)
    }
}
