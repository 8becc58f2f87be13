//! Actor lanes.
//!
//! Lanes are derived from the actor cells of a row subset, in order of first
//! appearance, and realized as partitions owned by the root activity. A
//! nested diagram reuses the main diagram's lane order: inherited actors come
//! first in the parent's order, then actors only the sub rows introduce.

use indexmap::{IndexMap, IndexSet};
use log::debug;

use actiflow_core::{
    identifier::Id,
    row::ActivityRow,
    semantic::{ElementId, ElementKind, ElementSpec, Partition},
};

use crate::{error::StoreError, graph::ActivityGraph, store::ModelStore};

/// Ordered actor name to partition mapping for one diagram.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaneSet {
    lanes: IndexMap<Id, ElementId>,
}

impl LaneSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a lane; an actor already present keeps its original lane.
    pub fn insert(&mut self, actor: Id, partition: ElementId) {
        self.lanes.entry(actor).or_insert(partition);
    }

    /// Returns the left-most lane.
    pub fn first(&self) -> Option<ElementId> {
        self.lanes.first().map(|(_, partition)| *partition)
    }

    pub fn get(&self, actor: Id) -> Option<ElementId> {
        self.lanes.get(&actor).copied()
    }

    /// Returns the left-to-right position of the lane for `actor`.
    pub fn index_of(&self, actor: Id) -> Option<usize> {
        self.lanes.get_index_of(&actor)
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Iterates `(actor, partition)` pairs left to right.
    pub fn iter(&self) -> impl Iterator<Item = (Id, ElementId)> + '_ {
        self.lanes
            .iter()
            .map(|(actor, partition)| (*actor, *partition))
    }

    pub fn names(&self) -> impl Iterator<Item = Id> + '_ {
        self.lanes.keys().copied()
    }

    pub fn partitions(&self) -> Vec<ElementId> {
        self.lanes.values().copied().collect()
    }
}

/// Collects the actors of the main rows, in first-appearance order.
///
/// # Examples
///
/// ```
/// # use actiflow::partition::top_level_actors;
/// # use actiflow_core::row::ActivityRow;
/// let rows = [
///     ActivityRow::main("Action A").with_actor("X"),
///     ActivityRow::sub("1.1", "Action A").with_actor("Z"),
///     ActivityRow::main("Action B"),
///     ActivityRow::main("Action C").with_actor("X"),
/// ];
/// let actors: Vec<String> = top_level_actors(&rows).iter().map(|a| a.to_string()).collect();
/// assert_eq!(actors, ["X", "<Unassigned>"]);
/// ```
pub fn top_level_actors(rows: &[ActivityRow]) -> Vec<Id> {
    rows.iter()
        .filter(|row| !row.is_sub_action())
        .map(|row| Id::new(row.actor_name()))
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// Orders the actors of `sub_rows` for a nested diagram.
///
/// Actors that also have a lane in `inherited` come first, in `inherited`'s
/// order; the rest follow in first-appearance order.
pub fn nested_actors<'a>(
    inherited: impl IntoIterator<Item = Id>,
    sub_rows: impl IntoIterator<Item = &'a ActivityRow>,
) -> Vec<Id> {
    let mut needed: IndexSet<Id> = sub_rows
        .into_iter()
        .map(|row| Id::new(row.actor_name()))
        .collect();

    let mut order = Vec::with_capacity(needed.len());
    for actor in inherited {
        if needed.shift_remove(&actor) {
            order.push(actor);
        }
    }
    order.extend(needed);
    order
}

/// Creates one partition per actor under `owner`, in order.
pub fn create_partitions<S: ModelStore + ?Sized>(
    store: &mut S,
    graph: &mut ActivityGraph,
    owner: ElementId,
    actors: &[Id],
) -> Result<LaneSet, StoreError> {
    let mut lanes = LaneSet::new();
    for actor in actors {
        let id = store.add_element(
            ElementSpec::new(ElementKind::Partition, actor.to_string()),
            owner,
        )?;
        graph.add_partition(Partition::new(id, *actor));
        lanes.insert(*actor, id);
    }
    debug!(owner:%, lanes = lanes.len(); "Created partitions");
    Ok(lanes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryModel;

    fn names(actors: &[Id]) -> Vec<String> {
        actors.iter().map(Id::to_string).collect()
    }

    #[test]
    fn test_top_level_actors_ignore_sub_rows() {
        let rows = [
            ActivityRow::main("Action A").with_actor("Y"),
            ActivityRow::sub("1.1", "Action A").with_actor("Q"),
            ActivityRow::main("Action B").with_actor("X"),
            ActivityRow::main("Action C").with_actor(" Y "),
        ];
        assert_eq!(names(&top_level_actors(&rows)), ["Y", "X"]);
    }

    #[test]
    fn test_top_level_actors_empty() {
        let rows = [ActivityRow::sub("1.1", "Action A")];
        assert!(top_level_actors(&rows).is_empty());
    }

    #[test]
    fn test_nested_actors_keep_parent_order() {
        let inherited = [Id::new("X"), Id::new("Y"), Id::new("Z")];
        let rows = [
            ActivityRow::sub("1.1", "A").with_actor("New"),
            ActivityRow::sub("1.2", "A").with_actor("Z"),
            ActivityRow::sub("1.3", "A").with_actor("X"),
            ActivityRow::sub("1.4", "A"),
        ];
        assert_eq!(
            names(&nested_actors(inherited, &rows)),
            ["X", "Z", "New", "<Unassigned>"]
        );
    }

    #[test]
    fn test_create_partitions() {
        let mut model = MemoryModel::new();
        let mut graph = ActivityGraph::new();
        let root = model.primary_model();
        model.begin_transaction("lanes").unwrap();

        let actors = [Id::new("X"), Id::new("Y")];
        let lanes = create_partitions(&mut model, &mut graph, root, &actors).unwrap();

        assert_eq!(lanes.len(), 2);
        assert_eq!(lanes.index_of(Id::new("Y")), Some(1));
        let first = lanes.first().unwrap();
        assert_eq!(model.element(first).unwrap().name(), "X");
        assert_eq!(graph.partition(first).unwrap().name(), Id::new("X"));
    }
}
