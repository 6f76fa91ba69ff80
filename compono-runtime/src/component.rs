//! Component handles and forwarding providers.

use crate::runtime::Runtime;
use crate::state::ComponentRecord;
use async_trait::async_trait;
use compono_adaptor::DispatchChain;
use compono_types::{
    AcquisitorDecl, Advice, Args, CallError, CallResult, ComponentContext, CompositionError,
    EntityId, Instance, InstanceState, Service, class, method_path,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A handle to a component instance in a [`Runtime`].
///
/// This is also the [`Instance`] method bodies receive.
#[derive(Clone)]
pub struct Component {
    runtime: Runtime,
    record: Arc<ComponentRecord>,
}

impl Component {
    pub(crate) fn new(runtime: Runtime, record: Arc<ComponentRecord>) -> Self {
        Self { runtime, record }
    }

    /// Instance id.
    pub fn id(&self) -> &EntityId {
        &self.record.id
    }

    /// Class name.
    pub fn class_name(&self) -> &str {
        &self.record.class.name
    }

    /// The owning composite.
    pub fn owner(&self) -> &EntityId {
        &self.record.owner
    }

    /// Implemented interfaces, inherited ones included.
    pub fn interfaces(&self) -> Vec<String> {
        self.record.class.interfaces.clone()
    }

    /// Declared acquisitors, inherited ones included.
    pub fn acquisitors(&self) -> Vec<AcquisitorDecl> {
        self.record.class.acquisitors.clone()
    }

    /// The acquisitor declared for `interface`, if any.
    pub fn acquisitor(&self, interface: &str) -> Option<AcquisitorDecl> {
        self.record
            .class
            .acquisitors
            .iter()
            .find(|a| a.interface == interface)
            .cloned()
    }

    /// Per-instance state.
    pub fn state(&self) -> &InstanceState {
        &self.record.state
    }

    /// Snapshot of the per-instance state.
    pub fn custom_metadata(&self) -> Map<String, Value> {
        self.record.state.snapshot()
    }

    /// Active advice lists for the methods of `interface`, keyed by method.
    ///
    /// Methods running their pristine implementation are omitted.
    pub fn adaptor_advices(&self, interface: &str) -> BTreeMap<String, Vec<Advice>> {
        let state = self.runtime.read();
        let Some(def) = state.interfaces.get(interface) else {
            return BTreeMap::new();
        };
        def.method_names()
            .filter_map(|method| {
                let path = method_path(self.class_name(), method);
                let (_, advices) = state.method_injections.get(&path)?;
                Some((method.to_owned(), advices.clone()))
            })
            .collect()
    }

    fn chain(&self, method: &str) -> Result<DispatchChain, CallError> {
        let path = method_path(self.class_name(), method);
        if let Some(chain) = self.runtime.read().chains.get(&path) {
            return Ok(chain.clone());
        }
        class::find_method(&self.record.class.lineage, method)
            .map(DispatchChain::new)
            .ok_or_else(|| CallError::MethodNotFound {
                entity: self.id().clone(),
                method: method.to_owned(),
            })
    }

    /// Call a method through its dispatch chain.
    ///
    /// Completion is deferred: the call yields to the scheduler once before
    /// its result is handed back, whichever path produced it.
    pub async fn invoke(&self, method: &str, args: Args) -> CallResult {
        tracing::trace!(component = %self.id(), method, "compono.component.invoke");
        let outcome = match self.chain(method) {
            Ok(chain) => {
                let instance: Instance = Arc::new(self.clone());
                chain.invoke(instance, method, args).await
            }
            Err(e) => Err(e),
        };
        if self.runtime.config().defer_completion {
            tokio::task::yield_now().await;
        }
        outcome
    }

    /// Call a method on the tokio runtime and hand its result to `done`.
    ///
    /// # Panics
    ///
    /// Panics if called outside the context of a tokio runtime, as
    /// [`tokio::spawn`] does.
    pub fn invoke_with<F>(&self, method: &str, args: Args, done: F) -> tokio::task::JoinHandle<()>
    where
        F: FnOnce(CallResult) + Send + 'static,
    {
        let this = self.clone();
        let method = method.to_owned();
        tokio::spawn(async move {
            let outcome = this.invoke(&method, args).await;
            done(outcome);
        })
    }

    fn resolve(&self, interface: &str) -> Vec<Arc<dyn Service>> {
        let state = self.runtime.read();
        state
            .providers_for(&self.record, interface)
            .into_iter()
            .filter_map(|id| self.runtime.service_in(&state, &id, interface))
            .collect()
    }
}

impl ComponentContext for Component {
    fn id(&self) -> &EntityId {
        &self.record.id
    }

    fn class_name(&self) -> &str {
        &self.record.class.name
    }

    fn acquire(&self, interface: &str) -> Result<Arc<dyn Service>, CompositionError> {
        self.resolve(interface)
            .into_iter()
            .next()
            .ok_or_else(|| CompositionError::NoBindingFound {
                interface: interface.to_owned(),
                component: self.record.id.clone(),
            })
    }

    fn acquire_all(&self, interface: &str) -> Result<Vec<Arc<dyn Service>>, CompositionError> {
        Ok(self.resolve(interface))
    }

    fn acquisitors(&self) -> Vec<AcquisitorDecl> {
        self.record.class.acquisitors.clone()
    }

    fn state(&self) -> &InstanceState {
        &self.record.state
    }
}

#[async_trait]
impl Service for Component {
    fn id(&self) -> &EntityId {
        &self.record.id
    }

    async fn invoke(&self, method: &str, args: Args) -> CallResult {
        Component::invoke(self, method, args).await
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.record.id)
            .field("class", &self.record.class.name)
            .field("owner", &self.record.owner)
            .finish()
    }
}

/// A composite's exposed interface, callable like the component behind it.
///
/// Returned by [`Composite::interface`](crate::Composite::interface) and
/// handed out when a binding targets a composite. Each call looks up the
/// exposing child again, so re-exposure is picked up by live handles.
#[derive(Clone)]
pub struct Provider {
    runtime: Runtime,
    entity: EntityId,
    interface: String,
}

impl Provider {
    pub(crate) fn new(runtime: Runtime, entity: EntityId, interface: String) -> Self {
        Self {
            runtime,
            entity,
            interface,
        }
    }

    /// The composite forwarding the calls.
    pub fn entity(&self) -> &EntityId {
        &self.entity
    }

    /// Full name of the forwarded interface.
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// The child component currently exposing the interface.
    pub fn target(&self) -> Result<Component, CompositionError> {
        let state = self.runtime.read();
        state
            .composites
            .get(&self.entity)
            .and_then(|c| {
                c.exposed_interfaces
                    .iter()
                    .find(|e| e.interface == self.interface)
            })
            .and_then(|e| state.components.get(&e.provider))
            .map(|record| Component::new(self.runtime.clone(), Arc::clone(record)))
            .ok_or_else(|| CompositionError::NoBindingFound {
                interface: self.interface.clone(),
                component: self.entity.clone(),
            })
    }

    fn declares(&self, method: &str) -> bool {
        self.runtime
            .read()
            .interfaces
            .get(&self.interface)
            .is_none_or(|def| def.method(method).is_some())
    }
}

#[async_trait]
impl Service for Provider {
    fn id(&self) -> &EntityId {
        &self.entity
    }

    async fn invoke(&self, method: &str, args: Args) -> CallResult {
        let target = if self.declares(method) {
            self.target().map_err(CallError::from)
        } else {
            Err(CallError::MethodNotFound {
                entity: self.entity.clone(),
                method: method.to_owned(),
            })
        };
        match target {
            Ok(target) => {
                tracing::trace!(
                    composite = %self.entity,
                    interface = %self.interface,
                    target = %target.id(),
                    method,
                    "compono.composite.forward"
                );
                target.invoke(method, args).await
            }
            // Forwarded calls defer inside the target; early failures defer here.
            Err(e) => {
                if self.runtime.config().defer_completion {
                    tokio::task::yield_now().await;
                }
                Err(e)
            }
        }
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("entity", &self.entity)
            .field("interface", &self.interface)
            .finish()
    }
}
