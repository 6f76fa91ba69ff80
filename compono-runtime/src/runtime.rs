//! The runtime registry.

use crate::binding::{Binding, BindingOp, Transaction};
use crate::component::{Component, Provider};
use crate::composite::Composite;
use crate::config::RuntimeConfig;
use crate::state::{ChildEntry, CompositeRecord, EntityKind, State};
use compono_schema::{EntityObject, EntityType, Schema, SchemaError};
use compono_types::{
    ClassCatalog, CompositionError, ContentLoader, EntityId, InterfaceDef, Service,
};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The registry of every live entity, interface, class and binding.
///
/// Cloning is cheap; clones share the same registry. Composition operations
/// are synchronous and take the registry lock for their whole duration.
/// Method calls only take it to look up a dispatch chain and never hold it
/// across an await.
#[derive(Clone)]
pub struct Runtime {
    inner: Arc<Inner>,
}

struct Inner {
    catalog: ClassCatalog,
    loader: Box<dyn ContentLoader>,
    config: RuntimeConfig,
    state: RwLock<State>,
}

/// Any addressable entity.
#[derive(Debug, Clone)]
pub enum Entity {
    /// A component instance.
    Component(Component),
    /// A composite.
    Composite(Composite),
}

impl Entity {
    /// Entity id.
    pub fn id(&self) -> &EntityId {
        match self {
            Self::Component(c) => c.id(),
            Self::Composite(c) => c.id(),
        }
    }

    /// Entity kind.
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Component(_) => EntityKind::Component,
            Self::Composite(_) => EntityKind::Composite,
        }
    }
}

impl Runtime {
    /// Create a runtime with the default configuration.
    pub fn new(catalog: ClassCatalog, loader: impl ContentLoader + 'static) -> Self {
        Self::with_config(catalog, loader, RuntimeConfig::default())
    }

    /// Create a runtime with a configuration.
    pub fn with_config(
        catalog: ClassCatalog,
        loader: impl ContentLoader + 'static,
        config: RuntimeConfig,
    ) -> Self {
        let state = State {
            repos: config.component_repos.clone(),
            ..State::default()
        };
        Self {
            inner: Arc::new(Inner {
                catalog,
                loader: Box::new(loader),
                config,
                state: RwLock::new(state),
            }),
        }
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, State> {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The configuration this runtime was built with.
    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    /// The class catalog.
    pub fn catalog(&self) -> &ClassCatalog {
        &self.inner.catalog
    }

    pub(crate) fn loader(&self) -> &dyn ContentLoader {
        self.inner.loader.as_ref()
    }

    // --- Entities ---

    /// Create a root composite.
    ///
    /// Fails with `CompositeAlreadyExist` if any entity already uses `id`.
    pub fn create_root_composite(
        &self,
        id: impl Into<EntityId>,
    ) -> Result<Composite, CompositionError> {
        let id = id.into();
        let mut state = self.write();
        if state.contains_entity(&id) {
            return Err(CompositionError::CompositeAlreadyExist(id));
        }
        state.composites.insert(id.clone(), CompositeRecord::default());
        state.connectivity.insert(id.clone(), Vec::new());
        state.roots.push(id.clone());
        tracing::debug!(composite = %id, "compono.composite.root_created");
        Ok(Composite::new(self.clone(), id))
    }

    /// Look up any entity. `None` if nothing is registered under `id`.
    pub fn get_entity(&self, id: &EntityId) -> Option<Entity> {
        self.get_component(id)
            .map(Entity::Component)
            .or_else(|| self.get_composite(id).map(Entity::Composite))
    }

    /// Look up a component instance.
    pub fn get_component(&self, id: &EntityId) -> Option<Component> {
        let record = self.read().components.get(id).cloned()?;
        Some(Component::new(self.clone(), record))
    }

    /// Look up a composite.
    pub fn get_composite(&self, id: &EntityId) -> Option<Composite> {
        self.read()
            .composites
            .contains_key(id)
            .then(|| Composite::new(self.clone(), id.clone()))
    }

    /// Ids of the root composites, in creation order.
    pub fn root_composites(&self) -> Vec<EntityId> {
        self.read().roots.clone()
    }

    /// Direct children of a composite, in creation order.
    pub fn children(&self, id: &EntityId) -> Vec<ChildEntry> {
        self.read().children(id).to_vec()
    }

    /// Kind of the entity registered under `id`.
    pub fn kind_of(&self, id: &EntityId) -> Option<EntityKind> {
        self.read().kind_of(id)
    }

    /// Names of the component classes loaded so far, sorted.
    pub fn loaded_classes(&self) -> Vec<String> {
        self.read().classes.keys().cloned().collect()
    }

    /// A loaded interface definition.
    pub fn interface(&self, name: &str) -> Option<Arc<InterfaceDef>> {
        self.read().interfaces.get(name).cloned()
    }

    /// The service a binding target stands for: the component itself, or
    /// a provider forwarding `interface` through a composite.
    pub(crate) fn service_in(
        &self,
        state: &State,
        id: &EntityId,
        interface: &str,
    ) -> Option<Arc<dyn Service>> {
        if let Some(record) = state.components.get(id) {
            let component = Component::new(self.clone(), Arc::clone(record));
            return Some(Arc::new(component));
        }
        if state.composites.contains_key(id) {
            let provider = Provider::new(self.clone(), id.clone(), interface.to_owned());
            return Some(Arc::new(provider));
        }
        None
    }

    // --- Repositories ---

    /// Map a namespace root to the base URI its documents are loaded from.
    pub fn add_component_repo(&self, base_uri: impl Into<String>, namespace_root: impl Into<String>) {
        let (base_uri, namespace_root) = (base_uri.into(), namespace_root.into());
        tracing::debug!(namespace = %namespace_root, base_uri = %base_uri, "compono.repo.added");
        self.write().repos.insert(namespace_root, base_uri);
    }

    /// Namespace root → base URI.
    pub fn component_repos(&self) -> BTreeMap<String, String> {
        self.read().repos.clone()
    }

    // --- Transactions ---

    /// Start buffering `bind`/`unbind` operations.
    pub fn init_transaction(&self) -> Result<(), CompositionError> {
        let mut state = self.write();
        if state.transaction.is_some() {
            return Err(CompositionError::TransactionAlreadyStarted);
        }
        state.transaction = Some(Transaction::default());
        tracing::info!("compono.transaction.started");
        Ok(())
    }

    /// Apply every buffered operation, all or nothing.
    ///
    /// Each operation is validated again against the current registry and
    /// applied to a staged copy of the binding set. The canonical set is
    /// replaced only if every operation succeeds. On failure nothing is
    /// applied and the transaction stays active with its buffer intact, so
    /// the caller can still [`rollback`](Self::rollback).
    ///
    /// No registry operation removes entities, acquisitors or exposed
    /// interfaces, and `bind` validates before buffering, so with the
    /// current API the re-validation always passes and the failure branch
    /// is not reachable from outside the crate.
    pub fn commit(&self) -> Result<(), CompositionError> {
        let mut state = self.write();
        let Some(transaction) = state.transaction.as_ref() else {
            return Err(CompositionError::NotTransactionStarted);
        };

        let mut staged = state.bindings.clone();
        for op in &transaction.pending {
            let b = &op.binding;
            let binding = state.validate_binding(&op.composite, &b.source, &b.target, &b.interface)?;
            staged.apply(&BindingOp {
                binding,
                ..op.clone()
            });
        }

        let applied = transaction.pending.len();
        state.bindings = staged;
        state.transaction = None;
        tracing::info!(operations = applied, "compono.transaction.committed");
        Ok(())
    }

    /// Discard every buffered operation.
    pub fn rollback(&self) -> Result<(), CompositionError> {
        let mut state = self.write();
        let Some(transaction) = state.transaction.take() else {
            return Err(CompositionError::NotTransactionStarted);
        };
        tracing::info!(
            discarded = transaction.pending.len(),
            "compono.transaction.rolled_back"
        );
        Ok(())
    }

    /// Whether a transaction is active.
    pub fn in_transaction(&self) -> bool {
        self.read().transaction.is_some()
    }

    /// Operations buffered by the active transaction.
    pub fn pending_operations(&self) -> Vec<BindingOp> {
        self.read()
            .transaction
            .as_ref()
            .map(|t| t.pending.clone())
            .unwrap_or_default()
    }

    // --- Binding queries ---

    /// Bindings where `id` is the acquiring side.
    pub fn service_providers(&self, id: &EntityId) -> Vec<Binding> {
        self.read().bindings.from_source(id)
    }

    /// Bindings where `id` is the providing side.
    pub fn service_consumers(&self, id: &EntityId) -> Vec<Binding> {
        self.read().bindings.to_target(id)
    }

    /// Every canonical binding.
    pub fn bindings(&self) -> Vec<Binding> {
        self.read().bindings.iter().cloned().collect()
    }

    // --- Object schemas ---

    /// An entity type from the object schemas loaded so far.
    pub fn schema(&self, type_name: &str) -> Option<Arc<EntityType>> {
        self.read().schema.entity(type_name)
    }

    /// Every loaded entity type.
    pub fn object_schema(&self) -> Schema {
        self.read().schema.clone()
    }

    /// A fresh typed object of a loaded entity type.
    pub fn new_object(&self, type_name: &str) -> Result<EntityObject, SchemaError> {
        self.schema(type_name)
            .map(EntityObject::new)
            .ok_or_else(|| SchemaError::UnknownType(type_name.to_owned()))
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.debug_struct("Runtime")
            .field("roots", &state.roots)
            .field("components", &state.components.len())
            .field("classes", &state.classes.keys().collect::<Vec<_>>())
            .field("bindings", &state.bindings.len())
            .field("in_transaction", &state.transaction.is_some())
            .finish()
    }
}
