//! Name-indexed activity graph built during synthesis.
//!
//! [`ActivityGraph`] mirrors the nodes, control flows and partitions the
//! importer realizes in the model store, keyed by the [`ElementId`] the store
//! returned. It keeps explicit per-scope indexes so later stages look nodes
//! up by name instead of walking the owned-element tree.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use actiflow_core::{
    identifier::Id,
    semantic::{Edge, ElementId, Node, NodeKind, Partition},
};

/// Arena of graph entities created during one import.
#[derive(Debug, Clone, Default)]
pub struct ActivityGraph {
    nodes: IndexMap<ElementId, Node>,
    edges: IndexMap<ElementId, Edge>,
    partitions: IndexMap<ElementId, Partition>,
    nodes_by_owner: HashMap<ElementId, Vec<ElementId>>,
    edges_by_owner: HashMap<ElementId, Vec<ElementId>>,
    names: HashMap<(ElementId, Id), ElementId>,
}

impl ActivityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node to its owner's scope.
    ///
    /// The first node added under a given name stays the one returned by
    /// [`ActivityGraph::find_child`].
    pub fn add_node(&mut self, node: Node) {
        let id = node.id();
        self.nodes_by_owner.entry(node.owner()).or_default().push(id);
        self.names.entry((node.owner(), node.name())).or_insert(id);
        self.nodes.insert(id, node);
    }

    pub fn add_edge(&mut self, edge: Edge) {
        self.edges_by_owner
            .entry(edge.owner())
            .or_default()
            .push(edge.id());
        self.edges.insert(edge.id(), edge);
    }

    pub fn add_partition(&mut self, partition: Partition) {
        self.partitions.insert(partition.id(), partition);
    }

    /// Records `node` as a member of `partition`, leaving any previous one.
    ///
    /// Returns `false` when either element is unknown.
    pub fn assign(&mut self, partition: ElementId, node: ElementId) -> bool {
        if !self.partitions.contains_key(&partition) {
            return false;
        }
        let Some(entry) = self.nodes.get_mut(&node) else {
            return false;
        };
        let previous = entry.partition();
        entry.set_partition(partition);

        if let Some(previous) = previous.and_then(|p| self.partitions.get_mut(&p)) {
            previous.remove_member(node);
        }
        if let Some(lane) = self.partitions.get_mut(&partition) {
            lane.add_member(node);
        }
        true
    }

    pub fn node(&self, id: ElementId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn edge(&self, id: ElementId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn partition(&self, id: ElementId) -> Option<&Partition> {
        self.partitions.get(&id)
    }

    /// Iterates the nodes owned by `owner`, in creation order.
    pub fn nodes_of(&self, owner: ElementId) -> impl Iterator<Item = &Node> {
        self.nodes_by_owner
            .get(&owner)
            .into_iter()
            .flatten()
            .filter_map(|id| self.nodes.get(id))
    }

    /// Iterates the control flows owned by `owner`, in creation order.
    pub fn edges_of(&self, owner: ElementId) -> impl Iterator<Item = &Edge> {
        self.edges_by_owner
            .get(&owner)
            .into_iter()
            .flatten()
            .filter_map(|id| self.edges.get(id))
    }

    /// Finds the first node named `name` owned by `owner`.
    pub fn find_child(&self, owner: ElementId, name: Id) -> Option<ElementId> {
        self.names.get(&(owner, name)).copied()
    }

    /// Finds the first initial or final node owned by `owner`.
    pub fn find_control(&self, owner: ElementId, initial: bool) -> Option<ElementId> {
        self.nodes_of(owner)
            .find(|node| match node.kind() {
                NodeKind::Initial => initial,
                NodeKind::Final => !initial,
                NodeKind::StructuredContainer { .. } | NodeKind::BehaviorCall { .. } => false,
            })
            .map(Node::id)
    }

    /// Returns the `(source name, target name)` pairs of the flows owned by
    /// `owner`.
    pub fn flow_names(&self, owner: ElementId) -> HashSet<(Id, Id)> {
        self.edges_of(owner)
            .filter_map(|edge| {
                let source = self.nodes.get(&edge.source())?.name();
                let target = self.nodes.get(&edge.target())?.name();
                Some((source, target))
            })
            .collect()
    }

    /// Returns the name of the partition `node` belongs to.
    pub fn partition_name_of(&self, node: ElementId) -> Option<Id> {
        let partition = self.nodes.get(&node)?.partition()?;
        self.partitions.get(&partition).map(Partition::name)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn partitions(&self) -> impl Iterator<Item = &Partition> {
        self.partitions.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }
}
