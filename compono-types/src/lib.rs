//! # compono-types: protocol types for a reflective component framework
//!
//! This crate defines the vocabulary shared by every part of compono:
//! what a component class looks like, how interfaces are described, how a
//! method is called and how it completes, and what an adaptor advice is.
//! It holds no runtime state. The runtime registry, the dispatch chains and
//! the loaders live in their own crates and meet here.
//!
//! ## The pieces
//!
//! | Concern | Types | What it does |
//! |---------|-------|--------------|
//! | Identity | [`EntityId`], [`AdaptorId`], [`InjectionId`] | Typed string ids |
//! | Contracts | [`InterfaceDef`], [`MethodSignature`] | Named sets of method signatures |
//! | Classes | [`ComponentClass`], [`AcquisitorDecl`], [`ClassCatalog`] | Declarations + method tables |
//! | Calls | [`Args`], [`CallResult`], [`Service`], [`ComponentContext`] | The async completion contract |
//! | Interception | [`AdviceType`], [`Advice`], [`AdaptorClass`], [`JoinPoint`] | Cross-cutting behavior |
//! | Scoping | [`Scope`] | Include/exclude globs over `Class@method` |
//! | Loading | [`ContentLoader`] | Raw documents from a repository |
//!
//! ## Calling convention
//!
//! Every interface method is an async function from an instance handle and
//! an argument list to a [`CallResult`]. Runtime failures travel through the
//! `Err` side of that result and never as a synchronous composition error.
//! Composition failures are [`CompositionError`] values with a stable
//! [`ErrorCode`].

#![deny(missing_docs)]

pub mod advice;
pub mod class;
pub mod error;
pub mod id;
pub mod interface;
pub mod loader;
pub mod scope;
pub mod service;
pub mod value;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use advice::{AdaptorClass, Advice, AdviceFn, AdviceType, JoinPoint, Proceed};
pub use class::{
    AcquisitorDecl, Cardinality, ClassCatalog, ClassDeclaration, ComponentClass, Constructor,
    MethodFn,
};
pub use error::{CallError, CompositionError, ErrorCode, LoadError};
pub use id::{AdaptorId, EntityId, InjectionId};
pub use interface::{InterfaceDef, MethodSignature};
pub use loader::ContentLoader;
pub use scope::{METHOD_SEPARATOR, Scope, method_path};
pub use service::{ComponentContext, Instance, InstanceState, Service};
pub use value::{Args, BoxFuture, CallResult};

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}
