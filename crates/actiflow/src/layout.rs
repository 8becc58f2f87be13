//! Swimlane layout.
//!
//! [`LayoutEngine`] computes every rectangle of one diagram from scratch:
//! lanes side by side and centred on the diagram width, nodes stacked top to
//! bottom in traversal order and centred in their lane, pins stacked on the
//! left (inputs) and right (outputs) edges of their node. It reads the graph
//! and never changes it, so running it twice yields the same
//! [`DiagramLayout`].
//!
//! [`apply`] pushes a layout to a [`DiagramRenderer`].

use log::{debug, trace};

use actiflow_core::{
    geometry::Rect,
    identifier::Id,
    semantic::{ElementId, Node, NodeKind, Pin},
};

use crate::{
    config::LayoutConfig,
    error::RenderError,
    graph::ActivityGraph,
    partition::LaneSet,
    render::{DiagramId, DiagramRenderer, ShapeId},
};

/// Geometry of one lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneLayout {
    partition: ElementId,
    actor: Id,
    bounds: Rect,
}

impl LaneLayout {
    pub fn partition(&self) -> ElementId {
        self.partition
    }

    pub fn actor(&self) -> Id {
        self.actor
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }
}

/// Geometry of one pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinLayout {
    pin: ElementId,
    bounds: Rect,
}

impl PinLayout {
    pub fn pin(&self) -> ElementId {
        self.pin
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }
}

/// Geometry of one node and its pins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLayout {
    node: ElementId,
    lane: Option<usize>,
    initial: Rect,
    bounds: Rect,
    pins: Vec<PinLayout>,
}

impl NodeLayout {
    pub fn node(&self) -> ElementId {
        self.node
    }

    /// Index of the lane the node was placed in; `None` without lanes.
    pub fn lane(&self) -> Option<usize> {
        self.lane
    }

    /// Bounds before growing for extra pins.
    pub fn initial(&self) -> Rect {
        self.initial
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Returns `true` if the node grew to fit its pins.
    pub fn grew(&self) -> bool {
        self.initial != self.bounds
    }

    /// Pins in input order followed by output order.
    pub fn pins(&self) -> &[PinLayout] {
        &self.pins
    }
}

/// Complete geometry of one diagram.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagramLayout {
    lanes: Vec<LaneLayout>,
    lane_group: Option<Rect>,
    nodes: Vec<NodeLayout>,
}

impl DiagramLayout {
    pub fn lanes(&self) -> &[LaneLayout] {
        &self.lanes
    }

    /// Bounds of the lane group wrapper; `None` without lanes.
    pub fn lane_group(&self) -> Option<Rect> {
        self.lane_group
    }

    /// Nodes in traversal order.
    pub fn nodes(&self) -> &[NodeLayout] {
        &self.nodes
    }

    pub fn node(&self, node: ElementId) -> Option<&NodeLayout> {
        self.nodes.iter().find(|layout| layout.node == node)
    }

    pub fn pin(&self, pin: ElementId) -> Option<Rect> {
        self.nodes
            .iter()
            .flat_map(|node| &node.pins)
            .find(|layout| layout.pin == pin)
            .map(PinLayout::bounds)
    }
}

/// Computes swimlane geometry.
#[derive(Debug, Clone, Copy)]
pub struct LayoutEngine<'a> {
    config: &'a LayoutConfig,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(config: &'a LayoutConfig) -> Self {
        Self { config }
    }

    /// Lays out `order` (node ids, in traversal order) over `lanes`.
    ///
    /// Ids missing from `graph` are ignored. A node is placed in the lane
    /// named like its partition, or in the first lane when it has none. A
    /// final node is placed in the lane of the node before it.
    pub fn lay_out(&self, graph: &ActivityGraph, lanes: &LaneSet, order: &[ElementId]) -> DiagramLayout {
        let nodes: Vec<&Node> = order.iter().filter_map(|id| graph.node(*id)).collect();
        let placement = self.place_in_lanes(graph, lanes, &nodes);

        let busiest = busiest_lane(&nodes, &placement, lanes.len());
        let (lane_layouts, lane_group) = self.lanes(lanes, busiest);

        let mut y = self.config.start_y();
        let mut node_layouts = Vec::with_capacity(nodes.len());
        for (node, lane) in nodes.iter().zip(placement) {
            let layout = self.node(node, lane.and_then(|i| lane_layouts.get(i)), y);
            trace!(node = node.name().to_string(), bounds:% = layout.bounds; "Placed node");
            y = y
                .saturating_add(layout.bounds.height())
                .saturating_add(self.config.y_step());
            node_layouts.push(NodeLayout { lane, ..layout });
        }

        debug!(lanes = lane_layouts.len(), nodes = node_layouts.len(), busiest; "Computed layout");
        DiagramLayout {
            lanes: lane_layouts,
            lane_group,
            nodes: node_layouts,
        }
    }

    /// Resolves the lane index of every node.
    fn place_in_lanes(&self, graph: &ActivityGraph, lanes: &LaneSet, nodes: &[&Node]) -> Vec<Option<usize>> {
        if lanes.is_empty() {
            return vec![None; nodes.len()];
        }
        let mut last = 0;
        nodes
            .iter()
            .map(|node| {
                if !matches!(node.kind(), NodeKind::Final) {
                    last = graph
                        .partition_name_of(node.id())
                        .and_then(|actor| lanes.index_of(actor))
                        .unwrap_or(0);
                }
                Some(last)
            })
            .collect()
    }

    fn lanes(&self, lanes: &LaneSet, busiest: usize) -> (Vec<LaneLayout>, Option<Rect>) {
        let lane_width = self.config.lane_width();
        let count = i32::try_from(lanes.len()).unwrap_or(i32::MAX);
        let left = self
            .config
            .diagram_width()
            .saturating_sub(lane_width.saturating_mul(count))
            / 2;
        let rows = i32::try_from(busiest.max(1)).unwrap_or(i32::MAX);
        let height = rows.saturating_mul(3).saturating_mul(self.config.row_height());
        let top = self.config.lane_top();

        let layouts: Vec<LaneLayout> = lanes
            .iter()
            .enumerate()
            .map(|(i, (actor, partition))| {
                let offset = lane_width.saturating_mul(i32::try_from(i).unwrap_or(i32::MAX));
                let x = left.saturating_add(offset);
                LaneLayout {
                    partition,
                    actor,
                    bounds: Rect::new(x, top, lane_width, height),
                }
            })
            .collect();
        let group = layouts
            .iter()
            .map(LaneLayout::bounds)
            .reduce(Rect::union);
        (layouts, group)
    }

    fn node(&self, node: &Node, lane: Option<&LaneLayout>, y: i32) -> NodeLayout {
        let config = self.config;
        let control = node.kind().is_control();
        let (width, height) = if control {
            (config.control_size(), config.control_size())
        } else {
            (config.action_width(), config.action_height())
        };

        let x = match lane {
            Some(lane) => lane
                .bounds
                .x()
                .saturating_add(lane.bounds.width().saturating_sub(width) / 2),
            None => {
                let column = config.diagram_width().saturating_sub(config.action_width()) / 2;
                if control {
                    column.saturating_add(config.action_width().saturating_sub(width) / 2)
                } else {
                    column
                }
            }
        };

        let initial = Rect::new(x, y, width, height);
        let inputs = node.input_pins();
        let outputs = node.output_pins();
        let growth = self.growth(inputs.len().max(outputs.len()));
        let bounds = initial.with_height(height.saturating_add(growth));

        let mut pins = self.pin_stack(inputs, bounds, bounds.x());
        pins.extend(self.pin_stack(outputs, bounds, bounds.right()));

        NodeLayout {
            node: node.id(),
            lane: None,
            initial,
            bounds,
            pins,
        }
    }

    /// Extra height for a side holding `pins` pins.
    fn growth(&self, pins: usize) -> i32 {
        let extra = pins.saturating_sub(self.config.pin_threshold());
        i32::try_from(extra)
            .unwrap_or(i32::MAX)
            .saturating_mul(self.config.pin_growth())
    }

    /// Stacks `pins` vertically, centred on `node`, straddling `edge_x`.
    fn pin_stack(&self, pins: &[Pin], node: Rect, edge_x: i32) -> Vec<PinLayout> {
        let size = self.config.pin_size();
        let gap = self.config.pin_gap();
        let count = i32::try_from(pins.len()).unwrap_or(i32::MAX);
        let stack = count
            .saturating_mul(size)
            .saturating_add((count - 1).max(0).saturating_mul(gap));
        let top = node.y().saturating_add(node.height().saturating_sub(stack) / 2);
        let x = edge_x.saturating_sub(size / 2);
        let step = size.saturating_add(gap);

        pins.iter()
            .zip(0_i32..)
            .map(|(pin, i)| PinLayout {
                pin: pin.id(),
                bounds: Rect::new(x, top.saturating_add(i.saturating_mul(step)), size, size),
            })
            .collect()
    }
}

/// Number of action nodes in the fullest lane.
fn busiest_lane(nodes: &[&Node], placement: &[Option<usize>], lanes: usize) -> usize {
    let mut counts = vec![0usize; lanes];
    for (node, lane) in nodes.iter().zip(placement) {
        if node.kind().is_control() {
            continue;
        }
        if let Some(count) = lane.and_then(|i| counts.get_mut(i)) {
            *count += 1;
        }
    }
    counts.into_iter().max().unwrap_or(0)
}

/// Pushes `layout` to the renderer.
///
/// The lane group wrapper is reshaped when `lane_group` is given. Every node
/// is reshaped to its initial bounds, then again to its grown bounds when it
/// grew. Elements without a shape in `diagram` are skipped.
pub fn apply<R: DiagramRenderer + ?Sized>(
    renderer: &mut R,
    diagram: DiagramId,
    lane_group: Option<ShapeId>,
    layout: &DiagramLayout,
) -> Result<(), RenderError> {
    if let (Some(shape), Some(bounds)) = (lane_group, layout.lane_group()) {
        renderer.reshape(diagram, shape, bounds)?;
    }
    for lane in layout.lanes() {
        if let Some(shape) = renderer.find_shape(diagram, lane.partition) {
            renderer.reshape(diagram, shape, lane.bounds)?;
        }
    }
    for node in layout.nodes() {
        let Some(shape) = renderer.find_shape(diagram, node.node) else {
            trace!(node:% = node.node; "No shape for node");
            continue;
        };
        renderer.reshape(diagram, shape, node.initial)?;
        if node.grew() {
            renderer.reshape(diagram, shape, node.bounds)?;
        }
        for pin in node.pins() {
            if let Some(shape) = renderer.find_shape(diagram, pin.pin) {
                renderer.reshape(diagram, shape, pin.bounds)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use actiflow_core::semantic::{Partition, PinRole};

    use super::*;

    /// Builds a graph directly, without a model store.
    #[derive(Default)]
    struct GraphBuilder {
        graph: ActivityGraph,
        lanes: LaneSet,
        order: Vec<ElementId>,
        next: u32,
    }

    const OWNER: ElementId = ElementId::new(1);

    impl GraphBuilder {
        fn id(&mut self) -> ElementId {
            self.next += 1;
            ElementId::new(100 + self.next)
        }

        fn lane(mut self, actor: &str) -> Self {
            let id = self.id();
            self.graph.add_partition(Partition::new(id, Id::new(actor)));
            self.lanes.insert(Id::new(actor), id);
            self
        }

        fn pins(&mut self, count: usize, role: PinRole) -> Vec<Pin> {
            (0..count)
                .map(|i| Pin::new(self.id(), Id::new(&format!("p{i}")), role))
                .collect()
        }

        fn node(mut self, name: &str, kind: NodeKind, actor: Option<&str>) -> Self {
            let id = self.id();
            self.graph.add_node(Node::new(id, Id::new(name), kind, OWNER));
            if let Some(partition) = actor.and_then(|actor| self.lanes.get(Id::new(actor))) {
                self.graph.assign(partition, id);
            }
            self.order.push(id);
            self
        }

        fn action(mut self, name: &str, inputs: usize, outputs: usize, actor: Option<&str>) -> Self {
            let kind = NodeKind::StructuredContainer {
                structured_inputs: self.pins(inputs, PinRole::StructuredInput),
                structured_outputs: self.pins(outputs, PinRole::StructuredOutput),
            };
            self.node(name, kind, actor)
        }

        fn lay_out(&self) -> DiagramLayout {
            let config = LayoutConfig::default();
            LayoutEngine::new(&config).lay_out(&self.graph, &self.lanes, &self.order)
        }
    }

    fn bounds(layout: &DiagramLayout) -> Vec<Rect> {
        layout.nodes().iter().map(NodeLayout::bounds).collect()
    }

    #[test]
    fn test_scenario_main_diagram() {
        let builder = GraphBuilder::default()
            .lane("X")
            .lane("Y")
            .node("Start", NodeKind::Initial, Some("X"))
            .action("Action A", 1, 1, Some("X"))
            .action("Action B", 0, 0, Some("Y"))
            .node("End", NodeKind::Final, Some("X"));
        let layout = builder.lay_out();

        let lanes: Vec<Rect> = layout.lanes().iter().map(LaneLayout::bounds).collect();
        assert_eq!(
            lanes,
            [Rect::new(120, 50, 480, 675), Rect::new(600, 50, 480, 675)]
        );
        assert_eq!(layout.lane_group(), Some(Rect::new(120, 50, 960, 675)));

        assert_eq!(
            bounds(&layout),
            [
                Rect::new(350, 100, 20, 20),
                Rect::new(270, 180, 180, 80),
                Rect::new(750, 320, 180, 80),
                // the final node follows the lane of the node before it
                Rect::new(830, 460, 20, 20),
            ]
        );

        let a = &layout.nodes()[1];
        assert_eq!(a.pins()[0].bounds(), Rect::new(260, 210, 20, 20));
        assert_eq!(a.pins()[1].bounds(), Rect::new(440, 210, 20, 20));
    }

    #[test]
    fn test_without_lanes_centres_column() {
        let layout = GraphBuilder::default()
            .node("Start", NodeKind::Initial, None)
            .action("Action A", 0, 0, None)
            .node("End", NodeKind::Final, None)
            .lay_out();

        assert!(layout.lanes().is_empty());
        assert_eq!(layout.lane_group(), None);
        assert_eq!(
            bounds(&layout),
            [
                Rect::new(590, 100, 20, 20),
                Rect::new(510, 180, 180, 80),
                Rect::new(590, 320, 20, 20),
            ]
        );
        assert!(layout.nodes().iter().all(|node| node.lane().is_none()));
    }

    #[test]
    fn test_node_without_partition_uses_first_lane() {
        let layout = GraphBuilder::default()
            .lane("X")
            .lane("Y")
            .lane("Z")
            .action("Action A", 0, 0, Some("Z"))
            .action("Action B", 0, 0, None)
            .lay_out();

        assert_eq!(layout.lanes()[0].bounds().x(), -120);
        assert_eq!(layout.nodes()[0].lane(), Some(2));
        assert_eq!(layout.nodes()[1].lane(), Some(0));
        assert_eq!(layout.nodes()[1].bounds().x(), -120 + 150);
    }

    #[test]
    fn test_growth_for_extra_pins() {
        let layout = GraphBuilder::default()
            .lane("X")
            .action("Action A", 5, 2, Some("X"))
            .action("Action B", 0, 0, Some("X"))
            .lay_out();

        let a = &layout.nodes()[0];
        assert!(a.grew());
        assert_eq!(a.initial(), Rect::new(510, 100, 180, 80));
        assert_eq!(a.bounds(), Rect::new(510, 100, 180, 130));

        // 5 inputs: stack of 5 * 20 + 4 * 5 = 120, centred on 130
        let first = a.pins()[0].bounds();
        assert_eq!(first, Rect::new(500, 105, 20, 20));
        assert_eq!(a.pins()[4].bounds().y(), 105 + 4 * 25);
        // 2 outputs: stack of 45
        assert_eq!(a.pins()[5].bounds(), Rect::new(680, 142, 20, 20));

        assert_eq!(layout.nodes()[1].bounds().y(), 100 + 130 + 60);
    }

    #[test]
    fn test_lane_height_follows_busiest_lane() {
        let layout = GraphBuilder::default()
            .lane("X")
            .lane("Y")
            .node("Start", NodeKind::Initial, Some("X"))
            .action("A", 0, 0, Some("Y"))
            .action("B", 0, 0, Some("Y"))
            .action("C", 0, 0, Some("X"))
            .node("End", NodeKind::Final, Some("X"))
            .lay_out();

        assert!(layout.lanes().iter().all(|lane| lane.bounds().height() == 2 * 675));
        assert_eq!(layout.lane_group().unwrap().height(), 2 * 675);
    }

    #[test]
    fn test_final_node_first_uses_first_lane() {
        let layout = GraphBuilder::default()
            .lane("X")
            .lane("Y")
            .node("End", NodeKind::Final, Some("Y"))
            .lay_out();
        assert_eq!(layout.nodes()[0].lane(), Some(0));
    }

    #[test]
    fn test_unknown_ids_ignored() {
        let mut builder = GraphBuilder::default().action("A", 0, 0, None);
        builder.order.insert(0, ElementId::new(9999));
        let layout = builder.lay_out();
        assert_eq!(layout.nodes().len(), 1);
        assert_eq!(layout.nodes()[0].bounds().y(), 100);
    }
}
