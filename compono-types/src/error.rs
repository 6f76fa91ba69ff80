//! Error types for composition, calls and loading.
//!
//! Composition errors carry a stable symbolic [`ErrorCode`]. The `Display`
//! output is `"<Code>: <templated message>"`, but callers should match on the
//! variant or on [`CompositionError::code`], never on the text.

use crate::id::{AdaptorId, EntityId};
use std::fmt;
use thiserror::Error;

/// Stable symbolic codes for every composition error.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A composite id is already in use.
    CompositeAlreadyExist,
    /// A component id is already in use.
    ComponentAlreadyExist,
    /// An adaptor id is already in use.
    AdaptorAlreadyExists,
    /// A class lacks a method its interfaces declare.
    FunctionNotImplemented,
    /// More than one child component implements the interface being exposed.
    DuplicateInterfacesWithinComposite,
    /// An acquisitor declaration names an unknown cardinality.
    UndefinedAcquisitorType,
    /// An entity is not a child of the composite performing an operation.
    ChildEntityNotExist,
    /// The binding source does not declare the acquisitor.
    BindingFailureAcquisitor,
    /// The binding target does not provide the interface.
    BindingFailureInterface,
    /// A class, interface or schema could not be loaded.
    EntityLoadingError,
    /// A transaction is already active.
    TransactionAlreadyStarted,
    /// No transaction is active.
    NotTransactionStarted,
    /// A short name is already used for another exposed interface.
    ExposeInterfaceFailure,
    /// No exposed interface is registered under a short name.
    NoShortNameFound,
    /// No binding satisfies an acquisitor.
    NoBindingFound,
    /// An advice function is missing from an adaptor.
    IncompleteAdaptor,
    /// No adaptor instance is registered under an id.
    AdaptorNotFound,
    /// No entity is registered under an id.
    EntityNotFound,
    /// A scope glob could not be compiled.
    InvalidScopePattern,
}

impl ErrorCode {
    /// The stable symbolic code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CompositeAlreadyExist => "CompositeAlreadyExist",
            Self::ComponentAlreadyExist => "ComponentAlreadyExist",
            Self::AdaptorAlreadyExists => "AdaptorAlreadyExists",
            Self::FunctionNotImplemented => "FunctionNotImplemented",
            Self::DuplicateInterfacesWithinComposite => "DuplicateInterfacesWithinComposite",
            Self::UndefinedAcquisitorType => "UndefinedAcquisitorType",
            Self::ChildEntityNotExist => "ChildEntityNotExist",
            Self::BindingFailureAcquisitor => "BindingFailureAcquisitor",
            Self::BindingFailureInterface => "BindingFailureInterface",
            Self::EntityLoadingError => "EntityLoadingError",
            Self::TransactionAlreadyStarted => "TransactionAlreadyStarted",
            Self::NotTransactionStarted => "NotTransactionStarted",
            Self::ExposeInterfaceFailure => "ExposeInterfaceFailure",
            Self::NoShortNameFound => "NoShortNameFound",
            Self::NoBindingFound => "NoBindingFound",
            Self::IncompleteAdaptor => "IncompleteAdaptor",
            Self::AdaptorNotFound => "AdaptorNotFound",
            Self::EntityNotFound => "EntityNotFound",
            Self::InvalidScopePattern => "InvalidScopePattern",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration, lookup and transaction-state errors.
///
/// Raised synchronously by composition operations and never retried.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionError {
    /// A composite id is already in use.
    #[error("CompositeAlreadyExist: Composite {0} already exists")]
    CompositeAlreadyExist(EntityId),

    /// A component id is already in use.
    #[error("ComponentAlreadyExist: Component {0} already exists")]
    ComponentAlreadyExist(EntityId),

    /// An adaptor id is already in use.
    #[error("AdaptorAlreadyExists: Adaptor instance already exists: ID={0}")]
    AdaptorAlreadyExists(AdaptorId),

    /// A class lacks a method its interfaces declare.
    #[error(
        "FunctionNotImplemented: Interface {interface}, Function {function} is not implemented in Component {component}"
    )]
    FunctionNotImplemented {
        /// Interface declaring the method.
        interface: String,
        /// The missing method.
        function: String,
        /// Id of the component being created.
        component: EntityId,
    },

    /// More than one child component implements the interface being exposed.
    #[error(
        "DuplicateInterfacesWithinComposite: Duplicate component interfaces {interface} are found within composite {composite}"
    )]
    DuplicateInterfacesWithinComposite {
        /// The ambiguous interface.
        interface: String,
        /// The exposing composite.
        composite: EntityId,
    },

    /// An acquisitor declaration names an unknown cardinality.
    #[error("UndefinedAcquisitorType: Undefined Acquisitor Type: {0}")]
    UndefinedAcquisitorType(String),

    /// An entity is not a child of the composite performing an operation.
    #[error("ChildEntityNotExist: Entity {entity} does not exist in composite {composite}")]
    ChildEntityNotExist {
        /// The entity that was looked up.
        entity: EntityId,
        /// The composite that was searched.
        composite: EntityId,
    },

    /// The binding source does not declare the acquisitor.
    #[error("BindingFailureAcquisitor: Binding Failure: Component {entity} does not have acquisitor {interface}")]
    BindingFailureAcquisitor {
        /// Binding source.
        entity: EntityId,
        /// Requested interface.
        interface: String,
    },

    /// The binding target does not provide the interface.
    #[error("BindingFailureInterface: Binding Failure: Component {entity} does not have interface {interface}")]
    BindingFailureInterface {
        /// Binding target.
        entity: EntityId,
        /// Requested interface.
        interface: String,
    },

    /// A class, interface or schema could not be loaded.
    #[error("EntityLoadingError: Error loading component/adaptor from {name}: {reason}")]
    EntityLoadingError {
        /// Name of the class or document.
        name: String,
        /// What went wrong.
        reason: String,
    },

    /// A transaction is already active.
    #[error(
        "TransactionAlreadyStarted: A transactional phase already started. No nested transaction allowed."
    )]
    TransactionAlreadyStarted,

    /// No transaction is active.
    #[error("NotTransactionStarted: No transactional phase need to be committed.")]
    NotTransactionStarted,

    /// A short name is already used for another exposed interface.
    #[error(
        "ExposeInterfaceFailure: Short name {short_name} has been used for an exposed interface of composite {composite}"
    )]
    ExposeInterfaceFailure {
        /// The contested short name.
        short_name: String,
        /// The exposing composite.
        composite: EntityId,
    },

    /// No exposed interface is registered under a short name.
    #[error("NoShortNameFound: No short name found for interface {short_name} in composite {composite}")]
    NoShortNameFound {
        /// The short name that was looked up.
        short_name: String,
        /// The composite that was searched.
        composite: EntityId,
    },

    /// No binding satisfies an acquisitor.
    #[error(
        "NoBindingFound: No entity found to provide interface {interface} for the acquiring component {component}"
    )]
    NoBindingFound {
        /// The acquired interface.
        interface: String,
        /// The acquiring component.
        component: EntityId,
    },

    /// An advice function is missing from an adaptor.
    #[error("IncompleteAdaptor: Adaptor {adaptor} does not provide advice function {function}")]
    IncompleteAdaptor {
        /// The adaptor instance.
        adaptor: AdaptorId,
        /// The missing advice function.
        function: String,
    },

    /// No adaptor instance is registered under an id.
    #[error("AdaptorNotFound: Adaptor instance not found: ID={0}")]
    AdaptorNotFound(AdaptorId),

    /// No entity is registered under an id.
    #[error("EntityNotFound: Entity {0} does not exist")]
    EntityNotFound(EntityId),

    /// A scope glob could not be compiled.
    #[error("InvalidScopePattern: Scope pattern {pattern} is invalid: {reason}")]
    InvalidScopePattern {
        /// The offending glob.
        pattern: String,
        /// Compiler message.
        reason: String,
    },
}

impl CompositionError {
    /// The stable symbolic code of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::CompositeAlreadyExist(_) => ErrorCode::CompositeAlreadyExist,
            Self::ComponentAlreadyExist(_) => ErrorCode::ComponentAlreadyExist,
            Self::AdaptorAlreadyExists(_) => ErrorCode::AdaptorAlreadyExists,
            Self::FunctionNotImplemented { .. } => ErrorCode::FunctionNotImplemented,
            Self::DuplicateInterfacesWithinComposite { .. } => {
                ErrorCode::DuplicateInterfacesWithinComposite
            }
            Self::UndefinedAcquisitorType(_) => ErrorCode::UndefinedAcquisitorType,
            Self::ChildEntityNotExist { .. } => ErrorCode::ChildEntityNotExist,
            Self::BindingFailureAcquisitor { .. } => ErrorCode::BindingFailureAcquisitor,
            Self::BindingFailureInterface { .. } => ErrorCode::BindingFailureInterface,
            Self::EntityLoadingError { .. } => ErrorCode::EntityLoadingError,
            Self::TransactionAlreadyStarted => ErrorCode::TransactionAlreadyStarted,
            Self::NotTransactionStarted => ErrorCode::NotTransactionStarted,
            Self::ExposeInterfaceFailure { .. } => ErrorCode::ExposeInterfaceFailure,
            Self::NoShortNameFound { .. } => ErrorCode::NoShortNameFound,
            Self::NoBindingFound { .. } => ErrorCode::NoBindingFound,
            Self::IncompleteAdaptor { .. } => ErrorCode::IncompleteAdaptor,
            Self::AdaptorNotFound(_) => ErrorCode::AdaptorNotFound,
            Self::EntityNotFound(_) => ErrorCode::EntityNotFound,
            Self::InvalidScopePattern { .. } => ErrorCode::InvalidScopePattern,
        }
    }

    /// Wrap a loader failure for the named class or document.
    pub fn loading(name: impl Into<String>, err: impl fmt::Display) -> Self {
        Self::EntityLoadingError {
            name: name.into(),
            reason: err.to_string(),
        }
    }
}

/// Failures delivered through a method's completion.
///
/// These are the only errors adaptor advices are expected to observe and
/// rewrite.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// A domain-level failure raised by component or advice logic.
    #[error("{0}")]
    Failed(String),

    /// A lookup miss raised while the call resolved a dependency.
    #[error(transparent)]
    Composition(#[from] CompositionError),

    /// The target entity has no such method.
    #[error("method {method} not found on {entity}")]
    MethodNotFound {
        /// Entity that was called.
        entity: EntityId,
        /// Method name.
        method: String,
    },
}

impl CallError {
    /// Shorthand for [`CallError::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Content loader errors.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum LoadError {
    /// No document exists at the resolved location.
    #[error("not found: {0}")]
    NotFound(String),

    /// Reading the document failed.
    #[error("io error reading {uri}: {source}")]
    Io {
        /// The resolved location.
        uri: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The document could not be parsed.
    #[error("parse error in {uri}: {message}")]
    Parse {
        /// The resolved location.
        uri: String,
        /// Parser message.
        message: String,
    },

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
