//! In-memory loader.

use compono_types::{ContentLoader, LoadError};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Documents keyed by `(base_uri, relative_path)`.
///
/// Documents can be added after the loader has been handed to a runtime;
/// the runtime sees them on its next load.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    documents: RwLock<HashMap<(String, String), String>>,
}

impl MemoryLoader {
    /// Create an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a document.
    pub fn insert(
        &self,
        base_uri: impl Into<String>,
        relative_path: impl Into<String>,
        text: impl Into<String>,
    ) {
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((base_uri.into(), relative_path.into()), text.into());
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with_document(
        self,
        base_uri: impl Into<String>,
        relative_path: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.insert(base_uri, relative_path, text);
        self
    }

    /// Number of documents held.
    pub fn len(&self) -> usize {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no documents are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ContentLoader for MemoryLoader {
    fn load(&self, base_uri: &str, relative_path: &str) -> Result<String, LoadError> {
        crate::check_relative(relative_path)?;
        let text = self
            .documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(base_uri.to_owned(), relative_path.to_owned()))
            .cloned();
        match text {
            Some(text) => {
                tracing::trace!(base_uri, relative_path, "compono.loader.memory.hit");
                Ok(text)
            }
            None => Err(LoadError::NotFound(format!("{base_uri}/{relative_path}"))),
        }
    }
}
