//! Graph synthesis.
//!
//! Turns the ordered activity rows of one import into nodes, pins, lane
//! memberships and control flows, realizing every element in the model store
//! and mirroring it in the [`ActivityGraph`].
//!
//! Main rows are chained `Initial → main₁ → … → mainₙ → Final` under the root
//! activity. A sub row becomes a child of the nearest preceding main row with
//! its parent name; sub rows whose parent cannot be resolved are skipped.

use indexmap::IndexMap;
use log::{debug, info, trace, warn};

use actiflow_core::{
    identifier::Id,
    row::{ActionKind, ActionTypeSelection, ActivityRow},
    semantic::{Edge, ElementId, ElementKind, ElementSpec, Node, NodeKind, Pin, PinRole},
};

use crate::{
    config::ImportConfig, error::StoreError, graph::ActivityGraph, partition::LaneSet,
    store::ModelStore,
};

/// Result of synthesizing the main scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesis {
    initial: ElementId,
    final_node: ElementId,
    main_nodes: IndexMap<String, ElementId>,
    sub_rows: IndexMap<ElementId, Vec<usize>>,
    skipped_rows: Vec<String>,
}

impl Synthesis {
    pub fn initial(&self) -> ElementId {
        self.initial
    }

    pub fn final_node(&self) -> ElementId {
        self.final_node
    }

    /// Main node by row name.
    ///
    /// When two main rows share a name the later one is kept.
    pub fn main_node(&self, name: &str) -> Option<ElementId> {
        self.main_nodes.get(name).copied()
    }

    /// Iterates `(row name, node)` pairs in first-appearance order.
    pub fn main_nodes(&self) -> impl Iterator<Item = (&str, ElementId)> {
        self.main_nodes
            .iter()
            .map(|(name, node)| (name.as_str(), *node))
    }

    /// Iterates `(parent node, sub row indices)` in order of the parent's
    /// first sub row. Indices point into the synthesized rows.
    pub fn sub_rows(&self) -> impl Iterator<Item = (ElementId, &[usize])> {
        self.sub_rows
            .iter()
            .map(|(parent, rows)| (*parent, rows.as_slice()))
    }

    /// Names of sub rows whose parent could not be resolved.
    pub fn skipped_rows(&self) -> &[String] {
        &self.skipped_rows
    }
}

/// Creates activity graph elements for one import.
#[derive(Debug, Clone, Copy)]
pub struct GraphSynthesizer<'a> {
    naming: &'a ImportConfig,
    selection: &'a ActionTypeSelection,
}

impl<'a> GraphSynthesizer<'a> {
    pub fn new(naming: &'a ImportConfig, selection: &'a ActionTypeSelection) -> Self {
        Self { naming, selection }
    }

    /// Synthesizes every row under the root activity `scope`.
    ///
    /// `lanes` are the main diagram lanes; main rows join the lane of their
    /// actor and sub rows the same-named lane, if any.
    pub fn synthesize<S: ModelStore + ?Sized>(
        &self,
        store: &mut S,
        graph: &mut ActivityGraph,
        scope: ElementId,
        rows: &[ActivityRow],
        lanes: &LaneSet,
    ) -> Result<Synthesis, StoreError> {
        info!(rows = rows.len(), lanes = lanes.len(); "Synthesizing activity graph");

        let initial = self.create_control(store, graph, scope, NodeKind::Initial, lanes.first())?;
        let mut last_main = initial;
        let mut main_nodes = IndexMap::new();
        let mut sub_rows: IndexMap<ElementId, Vec<usize>> = IndexMap::new();
        let mut skipped_rows = Vec::new();

        for (index, row) in rows.iter().enumerate() {
            if row.is_sub_action() {
                let parent = row
                    .parent_name()
                    .and_then(|name| main_nodes.get(name).copied());
                let Some(parent) = parent else {
                    warn!(
                        row = row.name(),
                        parent = row.parent_name().unwrap_or_default();
                        "Skipping sub row with unresolved parent"
                    );
                    skipped_rows.push(row.name().to_string());
                    continue;
                };
                let node = self.create_action(store, graph, parent, row)?;
                if let Some(lane) = lanes.get(Id::new(row.actor_name())) {
                    assign(store, graph, lane, node)?;
                }
                sub_rows.entry(parent).or_default().push(index);
                trace!(row = row.name(), parent:%; "Created sub node");
            } else {
                let node = self.create_action(store, graph, scope, row)?;
                if let Some(lane) = lanes.get(Id::new(row.actor_name())) {
                    assign(store, graph, lane, node)?;
                }
                connect(store, graph, scope, last_main, node)?;
                last_main = node;
                main_nodes.insert(row.name().to_string(), node);
                trace!(row = row.name(); "Created main node");
            }
        }

        let final_node = self.create_control(store, graph, scope, NodeKind::Final, lanes.first())?;
        connect(store, graph, scope, last_main, final_node)?;

        debug!(
            main = main_nodes.len(),
            skipped = skipped_rows.len(),
            nodes = graph.node_count(),
            flows = graph.edge_count();
            "Synthesis finished"
        );
        Ok(Synthesis {
            initial,
            final_node,
            main_nodes,
            sub_rows,
            skipped_rows,
        })
    }

    /// Creates an initial or final node under `owner`, joining `lane` when
    /// given.
    pub fn create_control<S: ModelStore + ?Sized>(
        &self,
        store: &mut S,
        graph: &mut ActivityGraph,
        owner: ElementId,
        kind: NodeKind,
        lane: Option<ElementId>,
    ) -> Result<ElementId, StoreError> {
        let (element_kind, name) = match kind {
            NodeKind::Initial => (ElementKind::InitialNode, self.naming.initial_name()),
            NodeKind::Final => (ElementKind::FinalNode, self.naming.final_name()),
            NodeKind::StructuredContainer { .. } | NodeKind::BehaviorCall { .. } => {
                return Err(StoreError::Backend(format!(
                    "`{}` is not a control node kind",
                    kind.label()
                )));
            }
        };
        let id = store.add_element(ElementSpec::new(element_kind, name), owner)?;
        graph.add_node(Node::new(id, Id::new(name), kind, owner));
        if let Some(lane) = lane {
            assign(store, graph, lane, id)?;
        }
        Ok(id)
    }

    fn create_action<S: ModelStore + ?Sized>(
        &self,
        store: &mut S,
        graph: &mut ActivityGraph,
        owner: ElementId,
        row: &ActivityRow,
    ) -> Result<ElementId, StoreError> {
        let kind = self.selection.kind_for(row.name());
        let (element_kind, input_role, output_role) = match kind {
            ActionKind::StructuredContainer => (
                ElementKind::StructuredNode,
                PinRole::StructuredInput,
                PinRole::StructuredOutput,
            ),
            ActionKind::BehaviorCall => (
                ElementKind::CallBehaviorAction,
                PinRole::Argument,
                PinRole::Result,
            ),
        };

        let spec = ElementSpec::new(element_kind, row.name()).with_documentation(row.documentation());
        let id = store.add_element(spec, owner)?;
        let inputs = create_pins(store, id, row.inputs(), input_role)?;
        let outputs = create_pins(store, id, row.outputs(), output_role)?;

        let node_kind = match kind {
            ActionKind::StructuredContainer => NodeKind::StructuredContainer {
                structured_inputs: inputs,
                structured_outputs: outputs,
            },
            ActionKind::BehaviorCall => NodeKind::BehaviorCall {
                arguments: inputs,
                results: outputs,
            },
        };
        graph.add_node(Node::new(id, Id::new(row.name()), node_kind, owner));
        Ok(id)
    }
}

fn create_pins<S: ModelStore + ?Sized>(
    store: &mut S,
    node: ElementId,
    names: &[String],
    role: PinRole,
) -> Result<Vec<Pin>, StoreError> {
    let kind = if role.is_input() {
        ElementKind::InputPin(role)
    } else {
        ElementKind::OutputPin(role)
    };
    names
        .iter()
        .map(|name| {
            let id = store.add_element(ElementSpec::new(kind, name.as_str()), node)?;
            Ok(Pin::new(id, Id::new(name), role))
        })
        .collect()
}

/// Puts `node` in the lane `partition`, in the store and in the graph.
pub fn assign<S: ModelStore + ?Sized>(
    store: &mut S,
    graph: &mut ActivityGraph,
    partition: ElementId,
    node: ElementId,
) -> Result<(), StoreError> {
    store.assign_partition(partition, node)?;
    if !graph.assign(partition, node) {
        return Err(StoreError::UnknownElement(node));
    }
    Ok(())
}

/// Creates a control flow from `source` to `target` owned by `owner`.
pub fn connect<S: ModelStore + ?Sized>(
    store: &mut S,
    graph: &mut ActivityGraph,
    owner: ElementId,
    source: ElementId,
    target: ElementId,
) -> Result<ElementId, StoreError> {
    let name = match (graph.node(source), graph.node(target)) {
        (Some(source), Some(target)) => format!("{} -> {}", source.name(), target.name()),
        _ => String::new(),
    };
    let id = store.add_element(
        ElementSpec::new(ElementKind::ControlFlow { source, target }, name),
        owner,
    )?;
    graph.add_edge(Edge::new(id, source, target, owner));
    Ok(id)
}
