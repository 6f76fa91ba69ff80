//! Glob scopes over method paths.

use compono_types::{CompositionError, Scope};
use regex::Regex;

/// Translate a scope glob into an anchored regex source.
///
/// `**` matches a run of letters and dots, `*` a run of letters within one
/// segment, `?` exactly one letter. Every other character is literal.
pub fn glob_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() * 2 + 2);
    out.push('^');
    let mut chars = glob.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                out.push_str("[A-Za-z.]*");
            }
            '*' => out.push_str("[A-Za-z]*"),
            '?' => out.push_str("[A-Za-z]"),
            other => {
                let mut buf = [0u8; 4];
                out.push_str(&regex::escape(other.encode_utf8(&mut buf)));
            }
        }
    }
    out.push('$');
    out
}

fn compile(glob: &str) -> Result<Regex, CompositionError> {
    Regex::new(&glob_to_regex(glob)).map_err(|e| CompositionError::InvalidScopePattern {
        pattern: glob.to_owned(),
        reason: e.to_string(),
    })
}

/// A compiled [`Scope`].
#[derive(Debug, Clone)]
pub struct ScopeMatcher {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl ScopeMatcher {
    /// Compile every glob of a scope.
    pub fn compile(scope: &Scope) -> Result<Self, CompositionError> {
        Ok(Self {
            include: scope.include.iter().map(|g| compile(g)).collect::<Result<_, _>>()?,
            exclude: scope.exclude.iter().map(|g| compile(g)).collect::<Result<_, _>>()?,
        })
    }

    /// Whether `path` is in scope. Exclusion wins over inclusion.
    pub fn matches(&self, path: &str) -> bool {
        if self.exclude.iter().any(|re| re.is_match(path)) {
            return false;
        }
        self.include.iter().any(|re| re.is_match(path))
    }

    /// Keep the in-scope paths, preserving order.
    pub fn filter<'a, I>(&self, paths: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        paths
            .into_iter()
            .filter(|p| self.matches(p))
            .map(str::to_owned)
            .collect()
    }
}
