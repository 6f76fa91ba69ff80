//! The call-side protocol: services, instance contexts and instance state.

use crate::class::AcquisitorDecl;
use crate::error::CompositionError;
use crate::id::EntityId;
use crate::value::{Args, CallResult};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex, PoisonError};

/// Something that can be called by method name.
///
/// A bound provider is a `Service`: either a component reached through its
/// dispatch chain, or a composite forwarding to the child that exposes the
/// bound interface. Callers do not know which.
#[async_trait]
pub trait Service: Send + Sync {
    /// Id of the entity behind this service.
    fn id(&self) -> &EntityId;

    /// Invoke a method. Completion is delivered through the returned result;
    /// runtime failures never surface as composition errors.
    async fn invoke(&self, method: &str, args: Args) -> CallResult;
}

/// What a component method sees of its own instance.
///
/// Method bodies receive an [`Instance`] and use it to reach acquired
/// services and per-instance state. The registry owns the instance; the
/// context is only a handle.
pub trait ComponentContext: Send + Sync {
    /// The instance id.
    fn id(&self) -> &EntityId;

    /// The instance's class name.
    fn class_name(&self) -> &str;

    /// Resolve the single provider bound for `interface`.
    ///
    /// Looks at this component's own bindings first and falls back to the
    /// owning composite's bindings. Fails with `NoBindingFound` when neither
    /// has one.
    fn acquire(&self, interface: &str) -> Result<Arc<dyn Service>, CompositionError>;

    /// Resolve every provider bound for `interface`, possibly none.
    fn acquire_all(&self, interface: &str) -> Result<Vec<Arc<dyn Service>>, CompositionError>;

    /// Acquisitor declarations of this instance's class, inherited ones included.
    fn acquisitors(&self) -> Vec<AcquisitorDecl>;

    /// Per-instance state.
    fn state(&self) -> &InstanceState;
}

/// Shared handle to a component instance, as given to method bodies.
pub type Instance = Arc<dyn ComponentContext>;

/// Mutable per-instance fields, stored as a JSON object.
///
/// Constructors seed it and methods read and write it. It doubles as the
/// instance's custom metadata for introspection.
#[derive(Debug, Default)]
pub struct InstanceState {
    fields: Mutex<Map<String, Value>>,
}

impl InstanceState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a field.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.fields
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Write a field, returning the previous value.
    pub fn set(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.fields
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value)
    }

    /// Remove a field.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.fields
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }

    /// Snapshot of every field.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.fields
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
