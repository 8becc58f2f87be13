//! Model store seam and an in-memory implementation.
//!
//! The importer realizes every node, pin, flow, partition and diagram as an
//! element of a host [`ModelStore`]. All mutations happen inside a single
//! [`Transaction`]; if the guard is dropped without [`Transaction::commit`],
//! the store is rolled back.

use std::{
    collections::HashMap,
    ops::{Deref, DerefMut},
};

use indexmap::IndexMap;
use log::{debug, error, trace};

use actiflow_core::semantic::{ElementId, ElementKind, ElementSpec};

use crate::error::StoreError;

/// Transactional model store owned by the host application.
pub trait ModelStore {
    /// Returns the root model new top-level elements are created in.
    fn primary_model(&self) -> ElementId;

    fn begin_transaction(&mut self, label: &str) -> Result<(), StoreError>;

    fn commit(&mut self) -> Result<(), StoreError>;

    fn rollback(&mut self) -> Result<(), StoreError>;

    /// Creates an element under `owner` and returns its handle.
    fn add_element(&mut self, spec: ElementSpec, owner: ElementId)
    -> Result<ElementId, StoreError>;

    fn move_element(&mut self, element: ElementId, new_owner: ElementId)
    -> Result<(), StoreError>;

    /// Records `node` as a member of the lane `partition`.
    ///
    /// A node is in at most one partition; assigning it again moves it.
    fn assign_partition(&mut self, partition: ElementId, node: ElementId)
    -> Result<(), StoreError>;
}

/// Scoped transaction over a [`ModelStore`].
///
/// Dereferences to the store so engine code can mutate through the guard.
///
/// # Examples
///
/// ```
/// use actiflow::store::{MemoryModel, ModelStore, Transaction};
/// use actiflow_core::semantic::{ElementKind, ElementSpec};
///
/// let mut model = MemoryModel::new();
/// let root = model.primary_model();
/// {
///     let mut tx = Transaction::begin(&mut model, "scratch").unwrap();
///     tx.add_element(ElementSpec::new(ElementKind::Activity, "A"), root)
///         .unwrap();
///     // dropped without commit
/// }
/// assert_eq!(model.len(), 1);
/// ```
pub struct Transaction<'s, S: ModelStore + ?Sized> {
    store: &'s mut S,
    label: String,
    committed: bool,
}

impl<'s, S: ModelStore + ?Sized> Transaction<'s, S> {
    /// Opens a transaction named `label`.
    pub fn begin(store: &'s mut S, label: &str) -> Result<Self, StoreError> {
        store.begin_transaction(label)?;
        debug!(label; "Transaction opened");
        Ok(Self {
            store,
            label: label.to_string(),
            committed: false,
        })
    }

    /// Commits the transaction.
    ///
    /// On failure the guard is still dropped uncommitted, so the store is
    /// rolled back.
    pub fn commit(mut self) -> Result<(), StoreError> {
        self.store.commit()?;
        self.committed = true;
        debug!(label = self.label.as_str(); "Transaction committed");
        Ok(())
    }
}

impl<S: ModelStore + ?Sized> Deref for Transaction<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.store
    }
}

impl<S: ModelStore + ?Sized> DerefMut for Transaction<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.store
    }
}

impl<S: ModelStore + ?Sized> Drop for Transaction<'_, S> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match self.store.rollback() {
            Ok(()) => debug!(label = self.label.as_str(); "Transaction rolled back"),
            Err(err) => {
                error!(label = self.label.as_str(), err:%; "Failed to roll back transaction")
            }
        }
    }
}

/// An element held by [`MemoryModel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredElement {
    spec: ElementSpec,
    owner: Option<ElementId>,
}

impl StoredElement {
    pub fn spec(&self) -> &ElementSpec {
        &self.spec
    }

    pub fn kind(&self) -> ElementKind {
        self.spec.kind()
    }

    pub fn name(&self) -> &str {
        self.spec.name()
    }

    /// Returns the owner; `None` only for the primary model.
    pub fn owner(&self) -> Option<ElementId> {
        self.owner
    }
}

#[derive(Debug, Clone, Default)]
struct ModelState {
    elements: IndexMap<ElementId, StoredElement>,
    members: IndexMap<ElementId, Vec<ElementId>>,
    lane_of: HashMap<ElementId, ElementId>,
    next_id: u32,
}

impl ModelState {
    fn allocate(&mut self) -> ElementId {
        self.next_id += 1;
        ElementId::new(self.next_id)
    }

    fn insert(&mut self, spec: ElementSpec, owner: Option<ElementId>) -> ElementId {
        let id = self.allocate();
        self.elements.insert(id, StoredElement { spec, owner });
        id
    }

    fn is_ancestor(&self, ancestor: ElementId, mut element: ElementId) -> bool {
        loop {
            if element == ancestor {
                return true;
            }
            match self.elements.get(&element).and_then(|e| e.owner) {
                Some(owner) => element = owner,
                None => return false,
            }
        }
    }
}

/// In-memory [`ModelStore`].
///
/// Transactions are single-level: beginning one snapshots the whole model
/// and rolling back restores the snapshot. Every mutation except
/// [`MemoryModel::add_package`] requires an open transaction.
///
/// # Examples
///
/// ```
/// use actiflow::store::{MemoryModel, ModelStore};
/// use actiflow_core::semantic::{ElementKind, ElementSpec};
///
/// let mut model = MemoryModel::new();
/// let pkg = model.add_package("Processes");
///
/// model.begin_transaction("import").unwrap();
/// let activity = model
///     .add_element(ElementSpec::new(ElementKind::Activity, "Flow"), pkg)
///     .unwrap();
/// model.commit().unwrap();
///
/// assert_eq!(model.owned_by(pkg).collect::<Vec<_>>(), [activity]);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryModel {
    primary: ElementId,
    state: ModelState,
    snapshot: Option<(String, ModelState)>,
}

impl Default for MemoryModel {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryModel {
    /// Creates a model holding only the primary model package.
    pub fn new() -> Self {
        let mut state = ModelState::default();
        let primary = state.insert(ElementSpec::new(ElementKind::Package, "Model"), None);
        Self {
            primary,
            state,
            snapshot: None,
        }
    }

    /// Adds a package under the primary model outside any transaction.
    ///
    /// Used to prepare containers before an import.
    pub fn add_package(&mut self, name: &str) -> ElementId {
        let primary = self.primary;
        self.state
            .insert(ElementSpec::new(ElementKind::Package, name), Some(primary))
    }

    pub fn element(&self, id: ElementId) -> Option<&StoredElement> {
        self.state.elements.get(&id)
    }

    /// Iterates elements owned by `owner`, in creation order.
    pub fn owned_by(&self, owner: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        self.state
            .elements
            .iter()
            .filter(move |(_, element)| element.owner == Some(owner))
            .map(|(id, _)| *id)
    }

    /// Returns the members of `partition`, in assignment order.
    pub fn members_of(&self, partition: ElementId) -> &[ElementId] {
        self.state
            .members
            .get(&partition)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns the partition `node` is assigned to.
    pub fn partition_of(&self, node: ElementId) -> Option<ElementId> {
        self.state.lane_of.get(&node).copied()
    }

    /// Iterates all elements of `kind`, in creation order.
    pub fn elements_of_kind(
        &self,
        kind: ElementKind,
    ) -> impl Iterator<Item = (ElementId, &StoredElement)> + '_ {
        self.state
            .elements
            .iter()
            .filter(move |(_, element)| element.kind() == kind)
            .map(|(id, element)| (*id, element))
    }

    /// Total number of elements, the primary model included.
    pub fn len(&self) -> usize {
        self.state.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.elements.is_empty()
    }

    pub fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }

    fn require_transaction(&self) -> Result<(), StoreError> {
        if self.in_transaction() {
            Ok(())
        } else {
            Err(StoreError::NoTransaction)
        }
    }

    fn require_element(&self, id: ElementId) -> Result<&StoredElement, StoreError> {
        self.state
            .elements
            .get(&id)
            .ok_or(StoreError::UnknownElement(id))
    }
}

impl ModelStore for MemoryModel {
    fn primary_model(&self) -> ElementId {
        self.primary
    }

    fn begin_transaction(&mut self, label: &str) -> Result<(), StoreError> {
        if let Some((open, _)) = &self.snapshot {
            return Err(StoreError::TransactionOpen(open.clone()));
        }
        self.snapshot = Some((label.to_string(), self.state.clone()));
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        self.snapshot
            .take()
            .map(|_| ())
            .ok_or(StoreError::NoTransaction)
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        let (_, state) = self.snapshot.take().ok_or(StoreError::NoTransaction)?;
        self.state = state;
        Ok(())
    }

    fn add_element(
        &mut self,
        spec: ElementSpec,
        owner: ElementId,
    ) -> Result<ElementId, StoreError> {
        self.require_transaction()?;
        self.require_element(owner)?;
        trace!(kind:? = spec.kind(), name = spec.name(), owner:%; "Adding element");
        Ok(self.state.insert(spec, Some(owner)))
    }

    fn move_element(&mut self, element: ElementId, new_owner: ElementId) -> Result<(), StoreError> {
        self.require_transaction()?;
        self.require_element(new_owner)?;
        if element == self.primary || self.state.is_ancestor(element, new_owner) {
            return Err(StoreError::InvalidMove {
                element,
                owner: new_owner,
            });
        }
        let stored = self
            .state
            .elements
            .get_mut(&element)
            .ok_or(StoreError::UnknownElement(element))?;
        stored.owner = Some(new_owner);
        Ok(())
    }

    fn assign_partition(&mut self, partition: ElementId, node: ElementId) -> Result<(), StoreError> {
        self.require_transaction()?;
        if self.require_element(partition)?.kind() != ElementKind::Partition {
            return Err(StoreError::WrongKind {
                element: partition,
                expected: "partition",
            });
        }
        if !self.require_element(node)?.kind().is_node() {
            return Err(StoreError::WrongKind {
                element: node,
                expected: "activity node",
            });
        }

        if let Some(previous) = self.state.lane_of.insert(node, partition) {
            if let Some(members) = self.state.members.get_mut(&previous) {
                members.retain(|member| *member != node);
            }
        }
        self.state.members.entry(partition).or_default().push(node);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(kind: ElementKind, name: &str) -> ElementSpec {
        ElementSpec::new(kind, name)
    }

    #[test]
    fn test_mutation_requires_transaction() {
        let mut model = MemoryModel::new();
        let root = model.primary_model();
        let err = model
            .add_element(spec(ElementKind::Activity, "A"), root)
            .unwrap_err();
        assert!(matches!(err, StoreError::NoTransaction));
    }

    #[test]
    fn test_nested_transaction_rejected() {
        let mut model = MemoryModel::new();
        model.begin_transaction("outer").unwrap();
        let err = model.begin_transaction("inner").unwrap_err();
        assert!(matches!(err, StoreError::TransactionOpen(label) if label == "outer"));
    }

    #[test]
    fn test_rollback_restores_state() {
        let mut model = MemoryModel::new();
        let pkg = model.add_package("P");
        let before = model.len();

        model.begin_transaction("t").unwrap();
        let activity = model
            .add_element(spec(ElementKind::Activity, "A"), model.primary_model())
            .unwrap();
        model.move_element(activity, pkg).unwrap();
        model.rollback().unwrap();

        assert_eq!(model.len(), before);
        assert!(model.element(activity).is_none());
        assert!(!model.in_transaction());
    }

    #[test]
    fn test_transaction_guard_rolls_back_on_drop() {
        let mut model = MemoryModel::new();
        let root = model.primary_model();
        {
            let mut tx = Transaction::begin(&mut model, "guarded").unwrap();
            tx.add_element(spec(ElementKind::Activity, "A"), root).unwrap();
        }
        assert_eq!(model.len(), 1);

        let tx = Transaction::begin(&mut model, "kept").unwrap();
        tx.commit().unwrap();
        assert!(!model.in_transaction());
    }

    #[test]
    fn test_assign_partition_moves_membership() {
        let mut model = MemoryModel::new();
        let root = model.primary_model();
        model.begin_transaction("t").unwrap();
        let activity = model.add_element(spec(ElementKind::Activity, "A"), root).unwrap();
        let x = model.add_element(spec(ElementKind::Partition, "X"), activity).unwrap();
        let y = model.add_element(spec(ElementKind::Partition, "Y"), activity).unwrap();
        let node = model
            .add_element(spec(ElementKind::StructuredNode, "N"), activity)
            .unwrap();

        model.assign_partition(x, node).unwrap();
        model.assign_partition(y, node).unwrap();

        assert!(model.members_of(x).is_empty());
        assert_eq!(model.members_of(y), [node]);
        assert_eq!(model.partition_of(node), Some(y));

        let err = model.assign_partition(node, x).unwrap_err();
        assert!(matches!(err, StoreError::WrongKind { .. }));
    }

    #[test]
    fn test_move_into_descendant_rejected() {
        let mut model = MemoryModel::new();
        let root = model.primary_model();
        model.begin_transaction("t").unwrap();
        let outer = model.add_element(spec(ElementKind::Activity, "A"), root).unwrap();
        let inner = model
            .add_element(spec(ElementKind::StructuredNode, "N"), outer)
            .unwrap();

        assert!(model.move_element(outer, inner).is_err());
        assert!(model.move_element(root, outer).is_err());
        assert!(model.move_element(inner, root).is_ok());
        assert_eq!(model.element(inner).unwrap().owner(), Some(root));
    }
}
