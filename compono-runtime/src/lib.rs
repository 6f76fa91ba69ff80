//! # compono-runtime: the composition engine
//!
//! A [`Runtime`] is the registry of everything live in one composition:
//! composites, component instances, loaded classes and interfaces,
//! bindings, adaptors and injections. It is an explicit context object;
//! create one at the composition root and hand clones to whoever needs it.
//!
//! ## Flow
//!
//! 1. [`Runtime::create_root_composite`] and [`Composite::create_component`]
//!    build the graph. Classes come from the [`ClassCatalog`](compono_types::ClassCatalog);
//!    interface and object-schema documents come from the
//!    [`ContentLoader`](compono_types::ContentLoader), once per name.
//! 2. [`Composite::bind`] wires an acquisitor to a provider. Inside
//!    [`Runtime::init_transaction`] / [`Runtime::commit`] the operations are
//!    buffered and applied all or nothing.
//! 3. [`Composite::expose_interface`] and [`Composite::expose_acquisitor`]
//!    lift a child's contract to the composite boundary.
//! 4. [`Runtime::apply_adaptor`] layers advice stages over matched
//!    `Class@method` paths.
//! 5. [`Component::invoke`] runs a method through its dispatch chain.
//!
//! Composition errors are returned synchronously as
//! [`CompositionError`](compono_types::CompositionError). Call failures only
//! ever arrive through the call's result.
//!
//! ## Tracing
//!
//! Composition steps emit `debug` events (`compono.component.created`,
//! `compono.binding.bound`, ...). Transactions and injections emit `info`
//! events. No subscriber is installed.

#![deny(missing_docs)]

mod adaptor;
mod binding;
mod component;
mod composite;
mod config;
mod loading;
mod runtime;
mod state;

pub use binding::{Binding, BindingOp, BindingTable, CommitType};
pub use component::{Component, Provider};
pub use composite::Composite;
pub use config::RuntimeConfig;
pub use runtime::{Entity, Runtime};
pub use state::{AdaptorInstance, ChildEntry, EntityKind, ExposedInterface};
