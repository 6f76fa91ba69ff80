//! Adaptor scopes: include/exclude globs over `Class@method` paths.

use serde::{Deserialize, Serialize};

/// Separates the class name from the method name in a method path.
pub const METHOD_SEPARATOR: &str = "@";

/// Form the `Class@method` path a scope is matched against.
pub fn method_path(class_name: &str, method: &str) -> String {
    format!("{class_name}{METHOD_SEPARATOR}{method}")
}

/// Which methods an injection applies to.
///
/// A method path matches when it matches no `exclude` glob and at least one
/// `include` glob. In a glob, `**` matches letters and dots, `*` matches
/// letters, `?` matches exactly one letter; everything else is literal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    /// Globs a method path must match one of.
    #[serde(default)]
    pub include: Vec<String>,
    /// Globs a method path must match none of.
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Scope {
    /// An empty scope, matching nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an include glob.
    #[must_use]
    pub fn include(mut self, glob: impl Into<String>) -> Self {
        self.include.push(glob.into());
        self
    }

    /// Add an exclude glob.
    #[must_use]
    pub fn exclude(mut self, glob: impl Into<String>) -> Self {
        self.exclude.push(glob.into());
        self
    }
}
