//! Argument lists and call results.

use crate::error::CallError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::ops::Deref;
use std::pin::Pin;

/// A heap-allocated, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The completion of a method call: a JSON result or a [`CallError`].
pub type CallResult = Result<Value, CallError>;

/// Ordered positional arguments of a method call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Args(Vec<Value>);

impl Args {
    /// Create an argument list.
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// An empty argument list.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// The argument at `index`, failing the call if it is absent.
    pub fn require(&self, index: usize) -> Result<&Value, CallError> {
        self.0
            .get(index)
            .ok_or_else(|| CallError::failed(format!("Arg {index} is missing")))
    }

    /// The argument at `index` as an integer.
    pub fn int(&self, index: usize) -> Result<i64, CallError> {
        let value = self.require(index)?;
        value
            .as_i64()
            .ok_or_else(|| CallError::failed(format!("Arg {index} is not an integer: {value}")))
    }

    /// The argument at `index` as a string.
    pub fn str(&self, index: usize) -> Result<&str, CallError> {
        let value = self.require(index)?;
        value
            .as_str()
            .ok_or_else(|| CallError::failed(format!("Arg {index} is not a string: {value}")))
    }

    /// Consume into the underlying vector.
    pub fn into_vec(self) -> Vec<Value> {
        self.0
    }
}

impl Deref for Args {
    type Target = [Value];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Value>> for Args {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl FromIterator<Value> for Args {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Build an [`Args`] list from JSON-convertible expressions.
///
/// ```
/// use compono_types::args;
/// let a = args![5, "x"];
/// assert_eq!(a.len(), 2);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::value::Args::empty()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::value::Args::new(vec![$($crate::__private::serde_json::json!($value)),+])
    };
}
