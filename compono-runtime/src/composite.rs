//! Composite handles: children, exposure and wiring.

use crate::binding::{BindingOp, CommitType};
use crate::component::{Component, Provider};
use crate::runtime::Runtime;
use crate::state::{ChildEntry, ComponentRecord, CompositeRecord, EntityKind, ExposedInterface};
use compono_types::{AcquisitorDecl, CompositionError, EntityId, InstanceState, class};
use std::fmt;
use std::sync::Arc;

/// A handle to a composite in a [`Runtime`].
#[derive(Clone)]
pub struct Composite {
    runtime: Runtime,
    id: EntityId,
}

impl Composite {
    pub(crate) fn new(runtime: Runtime, id: EntityId) -> Self {
        Self { runtime, id }
    }

    /// Composite id.
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// The runtime this composite lives in.
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// The containing composite, `None` for a root composite.
    pub fn parent(&self) -> Option<EntityId> {
        self.runtime
            .read()
            .composites
            .get(&self.id)
            .and_then(|c| c.parent.clone())
    }

    /// Direct children, in creation order.
    pub fn children(&self) -> Vec<ChildEntry> {
        self.runtime.children(&self.id)
    }

    /// Create a nested composite.
    ///
    /// Fails with `CompositeAlreadyExist` if any entity already uses `id`.
    pub fn create_composite(&self, id: impl Into<EntityId>) -> Result<Composite, CompositionError> {
        let id = id.into();
        let mut state = self.runtime.write();
        if !state.composites.contains_key(&self.id) {
            return Err(CompositionError::EntityNotFound(self.id.clone()));
        }
        if state.contains_entity(&id) {
            return Err(CompositionError::CompositeAlreadyExist(id));
        }
        state.composites.insert(
            id.clone(),
            CompositeRecord {
                parent: Some(self.id.clone()),
                ..CompositeRecord::default()
            },
        );
        state.connectivity.insert(id.clone(), Vec::new());
        state.attach(
            &self.id,
            ChildEntry {
                id: id.clone(),
                kind: EntityKind::Composite,
            },
        );
        tracing::debug!(composite = %id, parent = %self.id, "compono.composite.created");
        Ok(Composite::new(self.runtime.clone(), id))
    }

    /// Instantiate a component class inside this composite.
    ///
    /// Loads the class on first use (lineage, interfaces, object schemas),
    /// fails with `FunctionNotImplemented` if an interface method has no
    /// implementation, runs constructors root ancestor first, then registers
    /// the instance. Nothing is registered if any step fails.
    pub fn create_component(
        &self,
        class_name: &str,
        id: impl Into<EntityId>,
    ) -> Result<Component, CompositionError> {
        let id = id.into();
        let mut state = self.runtime.write();
        if !state.composites.contains_key(&self.id) {
            return Err(CompositionError::EntityNotFound(self.id.clone()));
        }
        if state.contains_entity(&id) {
            return Err(CompositionError::ComponentAlreadyExist(id));
        }

        let loaded = self.runtime.load_class(&mut state, class_name, &id)?;
        let instance_state = InstanceState::new();
        class::construct(&loaded.lineage, &instance_state);

        let record = Arc::new(ComponentRecord {
            id: id.clone(),
            class: loaded,
            owner: self.id.clone(),
            state: instance_state,
        });
        state.components.insert(id.clone(), Arc::clone(&record));
        state.attach(
            &self.id,
            ChildEntry {
                id: id.clone(),
                kind: EntityKind::Component,
            },
        );
        tracing::debug!(
            component = %id,
            class = %class_name,
            composite = %self.id,
            "compono.component.created"
        );
        Ok(Component::new(self.runtime.clone(), record))
    }

    // --- Exposure ---

    /// Expose the interface of a direct child component under `short_name`.
    ///
    /// Returns `Ok(false)` if no child component implements `interface`.
    /// Fails with `DuplicateInterfacesWithinComposite` if more than one
    /// does, and with `ExposeInterfaceFailure` if `short_name` already
    /// stands for another interface. Nested composites are not searched.
    pub fn expose_interface(
        &self,
        interface: &str,
        short_name: &str,
    ) -> Result<bool, CompositionError> {
        let mut state = self.runtime.write();
        let record = state
            .composites
            .get(&self.id)
            .ok_or_else(|| CompositionError::EntityNotFound(self.id.clone()))?;
        if record
            .exposed_interfaces
            .iter()
            .any(|e| e.short_name == short_name && e.interface != interface)
        {
            return Err(CompositionError::ExposeInterfaceFailure {
                short_name: short_name.to_owned(),
                composite: self.id.clone(),
            });
        }

        let matches: Vec<EntityId> = state
            .children(&self.id)
            .iter()
            .filter(|c| c.kind == EntityKind::Component)
            .filter(|c| state.provides(&c.id, interface))
            .map(|c| c.id.clone())
            .collect();
        let provider = match matches.as_slice() {
            [] => return Ok(false),
            [one] => one.clone(),
            _ => {
                return Err(CompositionError::DuplicateInterfacesWithinComposite {
                    interface: interface.to_owned(),
                    composite: self.id.clone(),
                });
            }
        };

        let exposed = ExposedInterface {
            short_name: short_name.to_owned(),
            interface: interface.to_owned(),
            provider: provider.clone(),
        };
        if let Some(record) = state.composites.get_mut(&self.id) {
            record
                .exposed_interfaces
                .retain(|e| e.short_name != short_name);
            record.exposed_interfaces.push(exposed);
        }
        tracing::debug!(
            composite = %self.id,
            interface = %interface,
            short_name = %short_name,
            provider = %provider,
            "compono.composite.interface_exposed"
        );
        Ok(true)
    }

    /// Expose an acquisitor of direct child components at this composite's
    /// boundary, so the containing composite can bind it.
    ///
    /// Returns `Ok(false)` if no child component declares it. The
    /// cardinality is taken from the first declaring child.
    pub fn expose_acquisitor(&self, interface: &str) -> Result<bool, CompositionError> {
        let mut state = self.runtime.write();
        if !state.composites.contains_key(&self.id) {
            return Err(CompositionError::EntityNotFound(self.id.clone()));
        }
        let declared = state
            .children(&self.id)
            .iter()
            .filter(|c| c.kind == EntityKind::Component)
            .find_map(|c| state.acquisitor_of(&c.id, interface));
        let Some(acquisitor) = declared else {
            return Ok(false);
        };

        if let Some(record) = state.composites.get_mut(&self.id) {
            if !record
                .exposed_acquisitors
                .iter()
                .any(|a| a.interface == interface)
            {
                record.exposed_acquisitors.push(acquisitor.clone());
            }
        }
        tracing::debug!(
            composite = %self.id,
            interface = %interface,
            cardinality = %acquisitor.cardinality,
            "compono.composite.acquisitor_exposed"
        );
        Ok(true)
    }

    /// Interfaces exposed at this boundary, in exposure order.
    pub fn exposed_interfaces(&self) -> Vec<ExposedInterface> {
        self.runtime
            .read()
            .composites
            .get(&self.id)
            .map(|c| c.exposed_interfaces.clone())
            .unwrap_or_default()
    }

    /// Acquisitors exposed at this boundary, in exposure order.
    pub fn exposed_acquisitors(&self) -> Vec<AcquisitorDecl> {
        self.runtime
            .read()
            .composites
            .get(&self.id)
            .map(|c| c.exposed_acquisitors.clone())
            .unwrap_or_default()
    }

    /// A forwarding handle for the interface exposed under `short_name`.
    ///
    /// Fails with `NoShortNameFound` if nothing is exposed under it.
    pub fn interface(&self, short_name: &str) -> Result<Provider, CompositionError> {
        let state = self.runtime.read();
        let exposed = state
            .composites
            .get(&self.id)
            .and_then(|c| c.exposed_interfaces.iter().find(|e| e.short_name == short_name))
            .ok_or_else(|| CompositionError::NoShortNameFound {
                short_name: short_name.to_owned(),
                composite: self.id.clone(),
            })?;
        Ok(Provider::new(
            self.runtime.clone(),
            self.id.clone(),
            exposed.interface.clone(),
        ))
    }

    // --- Wiring ---

    /// Satisfy `source`'s acquisitor for `interface` with `target`.
    ///
    /// Both must be direct children of this composite. While a transaction
    /// is active the validated operation is buffered instead of applied.
    pub fn bind(
        &self,
        source: impl Into<EntityId>,
        target: impl Into<EntityId>,
        interface: &str,
    ) -> Result<(), CompositionError> {
        self.record(CommitType::Bind, source.into(), target.into(), interface)
    }

    /// Remove a binding. Validated exactly like [`bind`](Self::bind).
    pub fn unbind(
        &self,
        source: impl Into<EntityId>,
        target: impl Into<EntityId>,
        interface: &str,
    ) -> Result<(), CompositionError> {
        self.record(CommitType::Unbind, source.into(), target.into(), interface)
    }

    fn record(
        &self,
        commit_type: CommitType,
        source: EntityId,
        target: EntityId,
        interface: &str,
    ) -> Result<(), CompositionError> {
        let mut state = self.runtime.write();
        let binding = state.validate_binding(&self.id, &source, &target, interface)?;
        let op = BindingOp {
            commit_type,
            composite: self.id.clone(),
            binding,
        };

        if let Some(transaction) = state.transaction.as_mut() {
            tracing::debug!(
                op = ?op.commit_type,
                source = %source,
                target = %target,
                interface = %interface,
                "compono.binding.buffered"
            );
            transaction.pending.push(op);
            return Ok(());
        }

        state.bindings.apply(&op);
        match commit_type {
            CommitType::Bind => tracing::debug!(
                source = %source,
                target = %target,
                interface = %interface,
                cardinality = %op.binding.cardinality,
                "compono.binding.bound"
            ),
            CommitType::Unbind => tracing::debug!(
                source = %source,
                target = %target,
                interface = %interface,
                "compono.binding.unbound"
            ),
        }
        Ok(())
    }
}

impl fmt::Debug for Composite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composite").field("id", &self.id).finish()
    }
}
