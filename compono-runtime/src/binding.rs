//! Binding records and the transaction buffer.

use compono_types::{Cardinality, EntityId};
use serde::{Deserialize, Serialize};

/// A satisfied acquisitor: `source` acquires `interface` from `target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Binding {
    /// The acquiring entity.
    pub source: EntityId,
    /// The providing entity.
    pub target: EntityId,
    /// The bound interface.
    pub interface: String,
    /// Cardinality of the source's acquisitor.
    pub cardinality: Cardinality,
}

/// Whether a buffered operation adds or removes a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommitType {
    /// Record the binding.
    Bind,
    /// Remove the binding.
    Unbind,
}

/// One validated `bind`/`unbind`, as buffered by a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingOp {
    /// Bind or unbind.
    pub commit_type: CommitType,
    /// The composite that performed the operation.
    pub composite: EntityId,
    /// The binding added or removed.
    pub binding: Binding,
}

/// The canonical binding set.
///
/// A `Single` acquisitor holds at most one record per `(source, interface)`:
/// binding again replaces it. `Multiple` acquisitors accumulate distinct
/// targets; binding a target twice is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingTable {
    entries: Vec<Binding>,
}

impl BindingTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a binding.
    pub fn bind(&mut self, binding: Binding) {
        match binding.cardinality {
            Cardinality::Single => {
                self.entries
                    .retain(|b| !(b.source == binding.source && b.interface == binding.interface));
                self.entries.push(binding);
            }
            Cardinality::Multiple => {
                if !self.entries.contains(&binding) {
                    self.entries.push(binding);
                }
            }
        }
    }

    /// Remove a binding. Returns whether a record was removed.
    pub fn unbind(&mut self, binding: &Binding) -> bool {
        let before = self.entries.len();
        self.entries.retain(|b| {
            !(b.source == binding.source
                && b.target == binding.target
                && b.interface == binding.interface)
        });
        before != self.entries.len()
    }

    /// Apply a buffered operation.
    pub fn apply(&mut self, op: &BindingOp) {
        match op.commit_type {
            CommitType::Bind => self.bind(op.binding.clone()),
            CommitType::Unbind => {
                self.unbind(&op.binding);
            }
        }
    }

    /// Targets bound to `source` for `interface`, in binding order.
    pub fn targets<'a>(
        &'a self,
        source: &'a EntityId,
        interface: &'a str,
    ) -> impl Iterator<Item = &'a EntityId> + 'a {
        self.entries
            .iter()
            .filter(move |b| &b.source == source && b.interface == interface)
            .map(|b| &b.target)
    }

    /// Bindings where `id` is the source.
    pub fn from_source(&self, id: &EntityId) -> Vec<Binding> {
        self.entries.iter().filter(|b| &b.source == id).cloned().collect()
    }

    /// Bindings where `id` is the target.
    pub fn to_target(&self, id: &EntityId) -> Vec<Binding> {
        self.entries.iter().filter(|b| &b.target == id).cloned().collect()
    }

    /// Every binding, in binding order.
    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.entries.iter()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no bindings.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An active transaction: operations validated but not yet applied.
#[derive(Debug, Clone, Default)]
pub(crate) struct Transaction {
    pub(crate) pending: Vec<BindingOp>,
}
