//! Typed ID wrappers for entities, adaptors and injections.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Typed ID wrappers keep entity ids, adaptor ids and injection ids apart.
/// They are plain strings underneath; the registry only requires uniqueness.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new typed ID from anything that converts to String.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&$name> for $name {
            fn from(id: &$name) -> Self {
                id.clone()
            }
        }
    };
}

typed_id!(
    EntityId,
    "Unique identifier for a component or composite, unique across the whole registry."
);
typed_id!(AdaptorId, "Unique identifier for an adaptor instance.");
typed_id!(InjectionId, "Identifier for one application of an advice list.");
