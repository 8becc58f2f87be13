//! Diagram population: shapes for nodes and pins, paths for control flows.

use log::trace;

use actiflow_core::semantic::ElementId;

use crate::{
    error::RenderError,
    graph::ActivityGraph,
    render::{DiagramId, DiagramRenderer, ShapeId},
};

/// Where node shapes are created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Inside the lane shape of the node's partition, when the diagram has one.
    InLane,
    /// Directly on the diagram.
    Diagram,
}

/// Creates a shape for every node in `nodes` that has none yet, plus one
/// shape per pin inside its node's shape.
///
/// Returns the number of node shapes created.
pub fn populate_nodes<R: DiagramRenderer + ?Sized>(
    renderer: &mut R,
    diagram: DiagramId,
    graph: &ActivityGraph,
    nodes: &[ElementId],
    placement: Placement,
) -> Result<usize, RenderError> {
    let mut created = 0;
    for node in nodes.iter().filter_map(|id| graph.node(*id)) {
        if renderer.find_shape(diagram, node.id()).is_some() {
            continue;
        }
        let container: Option<ShapeId> = match placement {
            Placement::InLane => node
                .partition()
                .and_then(|partition| renderer.find_shape(diagram, partition)),
            Placement::Diagram => None,
        };
        let shape = renderer.create_shape(diagram, node.id(), container)?;
        for pin in node.input_pins().iter().chain(node.output_pins()) {
            renderer.create_shape(diagram, pin.id(), Some(shape))?;
        }
        created += 1;
    }
    Ok(created)
}

/// Creates a path for every control flow owned by `owner` whose endpoints
/// both have a shape in `diagram`; flows with a missing endpoint are skipped.
///
/// Returns the number of paths created.
pub fn populate_paths<R: DiagramRenderer + ?Sized>(
    renderer: &mut R,
    diagram: DiagramId,
    graph: &ActivityGraph,
    owner: ElementId,
) -> Result<usize, RenderError> {
    let mut created = 0;
    for edge in graph.edges_of(owner) {
        let source = renderer.find_shape(diagram, edge.source());
        let target = renderer.find_shape(diagram, edge.target());
        let (Some(source), Some(target)) = (source, target) else {
            trace!(edge:% = edge.id(); "Skipping flow without endpoint shapes");
            continue;
        };
        renderer.create_path(diagram, edge.id(), source, target)?;
        created += 1;
    }
    Ok(created)
}
