use thiserror::Error;

/// Object-schema failures.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// No entity type with this name.
    #[error("unknown entity type: {0}")]
    UnknownType(String),

    /// The entity type has no such property.
    #[error("{entity} has no property {property}")]
    UnknownProperty {
        /// Entity type name.
        entity: String,
        /// Requested property.
        property: String,
    },

    /// A value does not fit the declared property type.
    #[error("{entity}.{property} expects {expected}, got {actual}")]
    TypeMismatch {
        /// Entity type name.
        entity: String,
        /// Property being set.
        property: String,
        /// Declared type.
        expected: String,
        /// Offending value.
        actual: String,
    },

    /// A non-nullable property is null.
    #[error("{entity}.{property} is not nullable")]
    NullViolation {
        /// Entity type name.
        entity: String,
        /// Offending property.
        property: String,
    },

    /// The declared key is not one of the properties.
    #[error("key {key} of {entity} is not a declared property")]
    MissingKey {
        /// Entity type name.
        entity: String,
        /// Declared key.
        key: String,
    },

    /// The document is malformed.
    #[error("schema parse error: {0}")]
    Parse(String),
}
