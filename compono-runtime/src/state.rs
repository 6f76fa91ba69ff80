//! Registry tables and the records they hold.

use crate::binding::{Binding, BindingTable, Transaction};
use compono_adaptor::DispatchChain;
use compono_schema::Schema;
use compono_types::{
    AcquisitorDecl, AdaptorClass, AdaptorId, Advice, ComponentClass, CompositionError, EntityId,
    InjectionId, InstanceState, InterfaceDef,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

/// The two kinds of addressable node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// A leaf unit of behavior.
    Component,
    /// A container of components and composites.
    Composite,
}

/// An edge of the connectivity graph: one direct child of a composite.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChildEntry {
    /// Child id.
    pub id: EntityId,
    /// Child kind.
    pub kind: EntityKind,
}

/// An interface a composite exposes at its boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposedInterface {
    /// Name callers use on the composite.
    pub short_name: String,
    /// Full interface name.
    pub interface: String,
    /// The child component the calls are forwarded to.
    pub provider: EntityId,
}

/// A component class after loading: lineage, resolved declarations and the
/// interface methods that get dispatch chains.
pub(crate) struct LoadedClass {
    pub(crate) name: String,
    pub(crate) lineage: Vec<Arc<ComponentClass>>,
    pub(crate) interfaces: Vec<String>,
    pub(crate) acquisitors: Vec<AcquisitorDecl>,
    pub(crate) methods: Vec<String>,
}

impl fmt::Debug for LoadedClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedClass")
            .field("name", &self.name)
            .field("interfaces", &self.interfaces)
            .field("acquisitors", &self.acquisitors)
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub(crate) struct ComponentRecord {
    pub(crate) id: EntityId,
    pub(crate) class: Arc<LoadedClass>,
    pub(crate) owner: EntityId,
    pub(crate) state: InstanceState,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct CompositeRecord {
    pub(crate) parent: Option<EntityId>,
    pub(crate) exposed_interfaces: Vec<ExposedInterface>,
    pub(crate) exposed_acquisitors: Vec<AcquisitorDecl>,
}

/// A registered adaptor: an id bound to an adaptor class.
#[derive(Debug, Clone)]
pub struct AdaptorInstance {
    id: AdaptorId,
    class: Arc<AdaptorClass>,
}

impl AdaptorInstance {
    pub(crate) fn new(id: AdaptorId, class: Arc<AdaptorClass>) -> Self {
        Self { id, class }
    }

    /// Instance id.
    pub fn id(&self) -> &AdaptorId {
        &self.id
    }

    /// Adaptor class name.
    pub fn class_name(&self) -> &str {
        self.class.name()
    }

    pub(crate) fn class(&self) -> &AdaptorClass {
        &self.class
    }
}

#[derive(Debug, Default)]
pub(crate) struct State {
    pub(crate) components: HashMap<EntityId, Arc<ComponentRecord>>,
    pub(crate) composites: HashMap<EntityId, CompositeRecord>,
    pub(crate) roots: Vec<EntityId>,
    pub(crate) connectivity: HashMap<EntityId, Vec<ChildEntry>>,
    pub(crate) classes: BTreeMap<String, Arc<LoadedClass>>,
    pub(crate) chains: HashMap<String, DispatchChain>,
    pub(crate) interfaces: HashMap<String, Arc<InterfaceDef>>,
    pub(crate) adaptors: HashMap<AdaptorId, AdaptorInstance>,
    pub(crate) adaptor_classes: BTreeSet<String>,
    /// Active injection and advice list per `Class@method` path.
    pub(crate) method_injections: HashMap<String, (InjectionId, Vec<Advice>)>,
    pub(crate) bindings: BindingTable,
    pub(crate) transaction: Option<Transaction>,
    pub(crate) repos: BTreeMap<String, String>,
    pub(crate) schema: Schema,
    pub(crate) loaded_schemas: BTreeSet<String>,
}

impl State {
    pub(crate) fn contains_entity(&self, id: &EntityId) -> bool {
        self.components.contains_key(id) || self.composites.contains_key(id)
    }

    pub(crate) fn kind_of(&self, id: &EntityId) -> Option<EntityKind> {
        if self.components.contains_key(id) {
            Some(EntityKind::Component)
        } else if self.composites.contains_key(id) {
            Some(EntityKind::Composite)
        } else {
            None
        }
    }

    pub(crate) fn children(&self, id: &EntityId) -> &[ChildEntry] {
        self.connectivity
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub(crate) fn is_child(&self, composite: &EntityId, id: &EntityId) -> bool {
        self.children(composite).iter().any(|c| &c.id == id)
    }

    /// Register a new child under `parent` in the connectivity graph.
    pub(crate) fn attach(&mut self, parent: &EntityId, child: ChildEntry) {
        self.connectivity
            .entry(parent.clone())
            .or_default()
            .push(child);
    }

    /// The acquisitor `id` declares (component) or exposes (composite) for
    /// `interface`.
    pub(crate) fn acquisitor_of(&self, id: &EntityId, interface: &str) -> Option<AcquisitorDecl> {
        if let Some(component) = self.components.get(id) {
            return component
                .class
                .acquisitors
                .iter()
                .find(|a| a.interface == interface)
                .cloned();
        }
        self.composites.get(id).and_then(|c| {
            c.exposed_acquisitors
                .iter()
                .find(|a| a.interface == interface)
                .cloned()
        })
    }

    /// Whether `id` implements (component) or exposes (composite) `interface`.
    pub(crate) fn provides(&self, id: &EntityId, interface: &str) -> bool {
        if let Some(component) = self.components.get(id) {
            return component.class.interfaces.iter().any(|i| i == interface);
        }
        self.composites.get(id).is_some_and(|c| {
            c.exposed_interfaces
                .iter()
                .any(|e| e.interface == interface)
        })
    }

    /// Check a `bind`/`unbind` performed by `composite` and produce the
    /// binding record it concerns.
    pub(crate) fn validate_binding(
        &self,
        composite: &EntityId,
        source: &EntityId,
        target: &EntityId,
        interface: &str,
    ) -> Result<Binding, CompositionError> {
        if !self.composites.contains_key(composite) {
            return Err(CompositionError::EntityNotFound(composite.clone()));
        }
        for entity in [source, target] {
            if !self.is_child(composite, entity) {
                return Err(CompositionError::ChildEntityNotExist {
                    entity: entity.clone(),
                    composite: composite.clone(),
                });
            }
        }
        let acquisitor = self.acquisitor_of(source, interface).ok_or_else(|| {
            CompositionError::BindingFailureAcquisitor {
                entity: source.clone(),
                interface: interface.to_owned(),
            }
        })?;
        if !self.provides(target, interface) {
            return Err(CompositionError::BindingFailureInterface {
                entity: target.clone(),
                interface: interface.to_owned(),
            });
        }
        Ok(Binding {
            source: source.clone(),
            target: target.clone(),
            interface: interface.to_owned(),
            cardinality: acquisitor.cardinality,
        })
    }

    /// Providers satisfying `interface` for a component: its own bindings,
    /// or failing that its owning composite's.
    pub(crate) fn providers_for(&self, component: &ComponentRecord, interface: &str) -> Vec<EntityId> {
        let own: Vec<_> = self
            .bindings
            .targets(&component.id, interface)
            .cloned()
            .collect();
        if !own.is_empty() {
            return own;
        }
        self.bindings
            .targets(&component.owner, interface)
            .cloned()
            .collect()
    }
}
