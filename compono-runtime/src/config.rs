//! Runtime configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a [`Runtime`](crate::Runtime) finds documents and completes calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Namespace root → repository base URI.
    pub component_repos: BTreeMap<String, String>,
    /// Extension of interface and object-schema documents.
    pub document_extension: String,
    /// Yield to the scheduler once before a component call returns.
    pub defer_completion: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            component_repos: BTreeMap::new(),
            document_extension: "json".into(),
            defer_completion: true,
        }
    }
}

impl RuntimeConfig {
    /// Add a repository for a namespace root.
    #[must_use]
    pub fn with_repo(mut self, namespace_root: impl Into<String>, base_uri: impl Into<String>) -> Self {
        self.component_repos
            .insert(namespace_root.into(), base_uri.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let config: RuntimeConfig =
            serde_json::from_str(r#"{"component_repos": {"Calc": "fixtures"}}"#).unwrap();
        assert_eq!(config.component_repos["Calc"], "fixtures");
        assert_eq!(config.document_extension, "json");
        assert!(config.defer_completion);
    }
}
