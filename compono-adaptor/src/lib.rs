//! # compono-adaptor: the interception engine
//!
//! Two pieces, both free of registry state:
//!
//! - [`ScopeMatcher`] compiles an include/exclude [`Scope`](compono_types::Scope)
//!   into anchored regexes and decides which `Class@method` paths an
//!   injection touches.
//! - [`DispatchChain`] is one method's call path: an ordered list of advice
//!   [`Stage`]s around the pristine implementation. Stages wrap in list
//!   order, so the last stage is outermost. Resetting the list restores the
//!   pristine method.
//!
//! The runtime owns one chain per `(class, method)` pair and swaps stage
//! lists when an injection is applied.

#![deny(missing_docs)]

pub mod chain;
pub mod scope;

pub use chain::{DispatchChain, Stage};
pub use scope::{ScopeMatcher, glob_to_regex};
