//! FixtureLoader: serves documents from a map.

use crate::error::LoadError;
use crate::loader::ContentLoader;
use std::collections::HashMap;

/// A loader over `(base_uri, relative_path) -> text`.
#[derive(Debug, Default, Clone)]
pub struct FixtureLoader {
    documents: HashMap<(String, String), String>,
}

impl FixtureLoader {
    /// Create an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// A loader holding the calculator interface documents under
    /// [`super::CALC_REPO`].
    pub fn calculator() -> Self {
        let mut loader = Self::new();
        for (path, doc) in super::calculator_documents() {
            loader.insert(super::CALC_REPO, path, doc);
        }
        loader
    }

    /// Add a document.
    pub fn insert(
        &mut self,
        base_uri: impl Into<String>,
        relative_path: impl Into<String>,
        text: impl Into<String>,
    ) -> &mut Self {
        self.documents
            .insert((base_uri.into(), relative_path.into()), text.into());
        self
    }
}

impl ContentLoader for FixtureLoader {
    fn load(&self, base_uri: &str, relative_path: &str) -> Result<String, LoadError> {
        self.documents
            .get(&(base_uri.to_owned(), relative_path.to_owned()))
            .cloned()
            .ok_or_else(|| LoadError::NotFound(format!("{base_uri}/{relative_path}")))
    }
}
