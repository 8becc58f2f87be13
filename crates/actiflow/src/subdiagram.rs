//! Nested diagrams for main nodes that own sub rows.
//!
//! Each such node gets its own diagram showing `Initial → child₁ → … →
//! childₙ → Final`, laid out over fresh lanes that follow the main diagram's
//! lane order. Control nodes and flows that already exist under the parent
//! node are reused, so the step is idempotent with respect to the model.

use log::{debug, info, warn};

use actiflow_core::{
    identifier::Id,
    row::ActivityRow,
    semantic::{ElementId, ElementKind, ElementSpec, NodeKind},
};

use crate::{
    config::AppConfig,
    diagram::{Placement, populate_nodes, populate_paths},
    error::ActiflowError,
    graph::ActivityGraph,
    layout::{DiagramLayout, LayoutEngine, apply},
    partition::{self, LaneSet},
    render::{DiagramId, DiagramRenderer, RenderSession},
    store::ModelStore,
    synthesis::{self, GraphSynthesizer, Synthesis},
};

/// A nested diagram produced for one parent node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedDiagram {
    parent: ElementId,
    name: String,
    element: ElementId,
    diagram: DiagramId,
    lanes: LaneSet,
    nodes: Vec<ElementId>,
    layout: DiagramLayout,
}

impl NestedDiagram {
    /// The main node owning the diagram.
    pub fn parent(&self) -> ElementId {
        self.parent
    }

    /// Diagram name, equal to the parent node's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The diagram's model element.
    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn diagram(&self) -> DiagramId {
        self.diagram
    }

    pub fn lanes(&self) -> &LaneSet {
        &self.lanes
    }

    /// Laid-out nodes: initial, children in sub row order, final.
    pub fn nodes(&self) -> &[ElementId] {
        &self.nodes
    }

    pub fn layout(&self) -> &DiagramLayout {
        &self.layout
    }
}

/// Builds the nested diagrams of one import.
pub struct SubdiagramOrchestrator<'a> {
    config: &'a AppConfig,
    synthesizer: GraphSynthesizer<'a>,
}

impl<'a> SubdiagramOrchestrator<'a> {
    pub fn new(config: &'a AppConfig, synthesizer: GraphSynthesizer<'a>) -> Self {
        Self {
            config,
            synthesizer,
        }
    }

    /// Builds one nested diagram per node that synthesis resolved as the
    /// parent of at least one sub row, in order of the parent's first sub
    /// row.
    ///
    /// Sub rows skipped during synthesis contribute nothing.
    #[allow(clippy::too_many_arguments)]
    pub fn build_all<S, R>(
        &self,
        store: &mut S,
        renderer: &mut RenderSession<'_, R>,
        graph: &mut ActivityGraph,
        root: ElementId,
        main_lanes: &LaneSet,
        rows: &[ActivityRow],
        synthesis: &Synthesis,
    ) -> Result<Vec<NestedDiagram>, ActiflowError>
    where
        S: ModelStore + ?Sized,
        R: DiagramRenderer + ?Sized,
    {
        let mut nested = Vec::new();
        for (parent, indices) in synthesis.sub_rows() {
            let sub_rows: Vec<&ActivityRow> = indices.iter().filter_map(|i| rows.get(*i)).collect();
            let Some(name) = graph.node(parent).map(|node| node.name().to_string()) else {
                warn!(parent:%; "Skipping nested diagram for unknown parent node");
                continue;
            };
            let diagram =
                self.build_one(store, renderer, graph, root, main_lanes, parent, &name, &sub_rows)?;
            nested.push(diagram);
        }

        info!(count = nested.len(); "Built nested diagrams");
        Ok(nested)
    }

    #[allow(clippy::too_many_arguments)]
    fn build_one<S, R>(
        &self,
        store: &mut S,
        renderer: &mut RenderSession<'_, R>,
        graph: &mut ActivityGraph,
        root: ElementId,
        main_lanes: &LaneSet,
        parent: ElementId,
        name: &str,
        sub_rows: &[&ActivityRow],
    ) -> Result<NestedDiagram, ActiflowError>
    where
        S: ModelStore + ?Sized,
        R: DiagramRenderer + ?Sized,
    {
        debug!(parent = name, rows = sub_rows.len(); "Building nested diagram");

        let actors = partition::nested_actors(main_lanes.names(), sub_rows.iter().copied());
        let lanes = partition::create_partitions(store, graph, root, &actors)?;

        let element = store.add_element(ElementSpec::new(ElementKind::Diagram, name), parent)?;
        let diagram = renderer.create_diagram(element, name)?;

        let initial = match graph.find_control(parent, true) {
            Some(existing) => existing,
            None => self
                .synthesizer
                .create_control(store, graph, parent, NodeKind::Initial, lanes.first())?,
        };

        let mut children: Vec<ElementId> = Vec::with_capacity(sub_rows.len());
        for row in sub_rows {
            match graph.find_child(parent, Id::new(row.name())) {
                Some(child) if child != initial && !children.contains(&child) => children.push(child),
                Some(_) => {}
                None => debug!(row = row.name(); "No node for sub row"),
            }
        }

        let final_node = match graph.find_control(parent, false) {
            Some(existing) => existing,
            None => self
                .synthesizer
                .create_control(store, graph, parent, NodeKind::Final, lanes.first())?,
        };

        let mut order = Vec::with_capacity(children.len() + 2);
        order.push(initial);
        order.extend(children.iter().copied().filter(|child| *child != final_node));
        order.push(final_node);

        let created = link_chain(store, graph, parent, &order)?;
        debug!(parent = name, created; "Linked nested chain");

        let lane_group = if lanes.is_empty() {
            None
        } else {
            Some(renderer.create_lane_group(diagram, &lanes.partitions())?)
        };
        populate_nodes(&mut **renderer, diagram, graph, &order, Placement::Diagram)?;

        let layout = LayoutEngine::new(self.config.layout()).lay_out(graph, &lanes, &order);
        apply(&mut **renderer, diagram, lane_group, &layout)?;
        populate_paths(&mut **renderer, diagram, graph, parent)?;

        Ok(NestedDiagram {
            parent,
            name: name.to_string(),
            element,
            diagram,
            lanes,
            nodes: order,
            layout,
        })
    }
}

/// Creates the flows of the chain `order[0] → order[1] → …` that are not
/// already owned by `owner`, comparing flows by endpoint names.
fn link_chain<S: ModelStore + ?Sized>(
    store: &mut S,
    graph: &mut ActivityGraph,
    owner: ElementId,
    order: &[ElementId],
) -> Result<usize, ActiflowError> {
    let mut existing = graph.flow_names(owner);
    let mut created = 0;
    for pair in order.windows(2) {
        let (source, target) = (pair[0], pair[1]);
        let key = match (graph.node(source), graph.node(target)) {
            (Some(source), Some(target)) => (source.name(), target.name()),
            _ => continue,
        };
        if existing.insert(key) {
            synthesis::connect(store, graph, owner, source, target)?;
            created += 1;
        }
    }
    Ok(created)
}
