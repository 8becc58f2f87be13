//! Diagram rendering seam and an in-memory canvas.
//!
//! The importer never draws anything itself. It asks a [`DiagramRenderer`] to
//! create diagrams, shapes (one per node, pin and lane) and paths (one per
//! control flow), then reshapes the shapes to the rectangles computed by the
//! layout engine.
//!
//! [`Canvas`] is the reference renderer: it records everything it is asked to
//! create so the result can be inspected or exported to SVG.

use std::{
    fmt,
    ops::{Deref, DerefMut},
};

use indexmap::IndexMap;
use log::{debug, error, trace};

use actiflow_core::{geometry::Rect, semantic::ElementId};

use crate::error::RenderError;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            pub fn new(raw: u32) -> Self {
                Self(raw)
            }

            pub fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

handle!(
    /// Handle to a diagram created by a [`DiagramRenderer`].
    DiagramId,
    "diagram-"
);
handle!(
    /// Handle to a shape within a diagram.
    ShapeId,
    "shape-"
);
handle!(
    /// Handle to a path within a diagram.
    PathId,
    "path-"
);

/// Rendering surface owned by the host application.
pub trait DiagramRenderer {
    /// Creates an empty diagram for the model element `element`.
    fn create_diagram(&mut self, element: ElementId, name: &str) -> Result<DiagramId, RenderError>;

    /// Shows the diagram to the user.
    fn open_diagram(&mut self, diagram: DiagramId) -> Result<(), RenderError>;

    /// Removes a diagram and everything drawn on it.
    fn discard_diagram(&mut self, diagram: DiagramId) -> Result<(), RenderError>;

    /// Creates a shape presenting `element`, nested in `container` or placed
    /// directly on the diagram when `container` is `None`.
    fn create_shape(
        &mut self,
        diagram: DiagramId,
        element: ElementId,
        container: Option<ShapeId>,
    ) -> Result<ShapeId, RenderError>;

    /// Creates a path presenting `edge` between two existing shapes.
    fn create_path(
        &mut self,
        diagram: DiagramId,
        edge: ElementId,
        source: ShapeId,
        target: ShapeId,
    ) -> Result<PathId, RenderError>;

    fn reshape(&mut self, diagram: DiagramId, shape: ShapeId, bounds: Rect)
    -> Result<(), RenderError>;

    /// Finds the first shape presenting `element`.
    fn find_shape(&self, diagram: DiagramId, element: ElementId) -> Option<ShapeId>;

    /// Creates a swimlane wrapper with one vertical lane per partition, in
    /// order, and returns the wrapper. Lane shapes are found afterwards with
    /// [`DiagramRenderer::find_shape`] on the partition element.
    fn create_lane_group(
        &mut self,
        diagram: DiagramId,
        partitions: &[ElementId],
    ) -> Result<ShapeId, RenderError>;
}

/// Tracks diagrams created during one import.
///
/// Diagrams created through the session are discarded when it is dropped
/// without [`RenderSession::finish`], so a failed import leaves no
/// half-drawn diagrams behind.
pub struct RenderSession<'r, R: DiagramRenderer + ?Sized> {
    renderer: &'r mut R,
    created: Vec<DiagramId>,
    finished: bool,
}

impl<'r, R: DiagramRenderer + ?Sized> RenderSession<'r, R> {
    pub fn new(renderer: &'r mut R) -> Self {
        Self {
            renderer,
            created: Vec::new(),
            finished: false,
        }
    }

    /// Creates a diagram owned by this session.
    pub fn create_diagram(
        &mut self,
        element: ElementId,
        name: &str,
    ) -> Result<DiagramId, RenderError> {
        let diagram = self.renderer.create_diagram(element, name)?;
        self.created.push(diagram);
        Ok(diagram)
    }

    /// Keeps every diagram created so far.
    pub fn finish(mut self) -> Vec<DiagramId> {
        self.finished = true;
        std::mem::take(&mut self.created)
    }
}

impl<R: DiagramRenderer + ?Sized> Deref for RenderSession<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.renderer
    }
}

impl<R: DiagramRenderer + ?Sized> DerefMut for RenderSession<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        self.renderer
    }
}

impl<R: DiagramRenderer + ?Sized> Drop for RenderSession<'_, R> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        for diagram in self.created.drain(..).rev() {
            match self.renderer.discard_diagram(diagram) {
                Ok(()) => debug!(diagram:%; "Discarded diagram"),
                Err(err) => error!(diagram:%, err:%; "Failed to discard diagram"),
            }
        }
    }
}

/// A shape recorded by [`Canvas`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasShape {
    element: Option<ElementId>,
    container: Option<ShapeId>,
    bounds: Rect,
}

impl CanvasShape {
    /// Returns the presented element; `None` for a lane group wrapper.
    pub fn element(&self) -> Option<ElementId> {
        self.element
    }

    pub fn container(&self) -> Option<ShapeId> {
        self.container
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }
}

/// A path recorded by [`Canvas`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasPath {
    edge: ElementId,
    source: ShapeId,
    target: ShapeId,
}

impl CanvasPath {
    pub fn edge(&self) -> ElementId {
        self.edge
    }

    pub fn source(&self) -> ShapeId {
        self.source
    }

    pub fn target(&self) -> ShapeId {
        self.target
    }
}

/// A diagram recorded by [`Canvas`].
#[derive(Debug, Clone)]
pub struct CanvasDiagram {
    element: ElementId,
    name: String,
    open: bool,
    shapes: IndexMap<ShapeId, CanvasShape>,
    paths: IndexMap<PathId, CanvasPath>,
    lane_group: Option<ShapeId>,
}

impl CanvasDiagram {
    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn shape(&self, shape: ShapeId) -> Option<&CanvasShape> {
        self.shapes.get(&shape)
    }

    /// Iterates shapes in creation order.
    pub fn shapes(&self) -> impl Iterator<Item = (ShapeId, &CanvasShape)> {
        self.shapes.iter().map(|(id, shape)| (*id, shape))
    }

    /// Iterates paths in creation order.
    pub fn paths(&self) -> impl Iterator<Item = (PathId, &CanvasPath)> {
        self.paths.iter().map(|(id, path)| (*id, path))
    }

    pub fn lane_group(&self) -> Option<ShapeId> {
        self.lane_group
    }

    /// Returns the bounds of the first shape presenting `element`.
    pub fn bounds_of(&self, element: ElementId) -> Option<Rect> {
        self.find(element)
            .and_then(|shape| self.shapes.get(&shape))
            .map(CanvasShape::bounds)
    }

    /// Returns the shapes whose container is `container`, in creation order.
    pub fn children_of(&self, container: ShapeId) -> impl Iterator<Item = ShapeId> + '_ {
        self.shapes
            .iter()
            .filter(move |(_, shape)| shape.container == Some(container))
            .map(|(id, _)| *id)
    }

    fn find(&self, element: ElementId) -> Option<ShapeId> {
        self.shapes
            .iter()
            .find(|(_, shape)| shape.element == Some(element))
            .map(|(id, _)| *id)
    }
}

/// In-memory [`DiagramRenderer`].
///
/// Shape, path and diagram handles are allocated from one counter, so a
/// handle is never reused even after its diagram is discarded.
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    diagrams: IndexMap<DiagramId, CanvasDiagram>,
    next_id: u32,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagram(&self, diagram: DiagramId) -> Option<&CanvasDiagram> {
        self.diagrams.get(&diagram)
    }

    /// Iterates diagrams in creation order.
    pub fn diagrams(&self) -> impl Iterator<Item = (DiagramId, &CanvasDiagram)> {
        self.diagrams.iter().map(|(id, diagram)| (*id, diagram))
    }

    /// Finds the diagram created for the model element `element`.
    pub fn diagram_for(&self, element: ElementId) -> Option<DiagramId> {
        self.diagrams
            .iter()
            .find(|(_, diagram)| diagram.element == element)
            .map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.diagrams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagrams.is_empty()
    }

    fn allocate(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn diagram_mut(&mut self, diagram: DiagramId) -> Result<&mut CanvasDiagram, RenderError> {
        self.diagrams
            .get_mut(&diagram)
            .ok_or(RenderError::UnknownDiagram(diagram))
    }

    fn add_shape(
        &mut self,
        diagram: DiagramId,
        element: Option<ElementId>,
        container: Option<ShapeId>,
    ) -> Result<ShapeId, RenderError> {
        let shape = ShapeId::new(self.allocate());
        let target = self.diagram_mut(diagram)?;
        if let Some(container) = container {
            if !target.shapes.contains_key(&container) {
                return Err(RenderError::UnknownShape {
                    diagram,
                    shape: container,
                });
            }
        }
        target.shapes.insert(
            shape,
            CanvasShape {
                element,
                container,
                bounds: Rect::default(),
            },
        );
        Ok(shape)
    }
}

impl DiagramRenderer for Canvas {
    fn create_diagram(&mut self, element: ElementId, name: &str) -> Result<DiagramId, RenderError> {
        let diagram = DiagramId::new(self.allocate());
        self.diagrams.insert(
            diagram,
            CanvasDiagram {
                element,
                name: name.to_string(),
                open: false,
                shapes: IndexMap::new(),
                paths: IndexMap::new(),
                lane_group: None,
            },
        );
        debug!(diagram:%, name; "Created diagram");
        Ok(diagram)
    }

    fn open_diagram(&mut self, diagram: DiagramId) -> Result<(), RenderError> {
        self.diagram_mut(diagram)?.open = true;
        Ok(())
    }

    fn discard_diagram(&mut self, diagram: DiagramId) -> Result<(), RenderError> {
        self.diagrams
            .shift_remove(&diagram)
            .map(|_| ())
            .ok_or(RenderError::UnknownDiagram(diagram))
    }

    fn create_shape(
        &mut self,
        diagram: DiagramId,
        element: ElementId,
        container: Option<ShapeId>,
    ) -> Result<ShapeId, RenderError> {
        self.add_shape(diagram, Some(element), container)
    }

    fn create_path(
        &mut self,
        diagram: DiagramId,
        edge: ElementId,
        source: ShapeId,
        target: ShapeId,
    ) -> Result<PathId, RenderError> {
        let path = PathId::new(self.allocate());
        let canvas = self.diagram_mut(diagram)?;
        for shape in [source, target] {
            if !canvas.shapes.contains_key(&shape) {
                return Err(RenderError::UnknownShape { diagram, shape });
            }
        }
        canvas.paths.insert(
            path,
            CanvasPath {
                edge,
                source,
                target,
            },
        );
        Ok(path)
    }

    fn reshape(&mut self, diagram: DiagramId, shape: ShapeId, bounds: Rect) -> Result<(), RenderError> {
        let canvas = self.diagram_mut(diagram)?;
        let record = canvas
            .shapes
            .get_mut(&shape)
            .ok_or(RenderError::UnknownShape { diagram, shape })?;
        trace!(shape:%, bounds:%; "Reshaped");
        record.bounds = bounds;
        Ok(())
    }

    fn find_shape(&self, diagram: DiagramId, element: ElementId) -> Option<ShapeId> {
        self.diagrams.get(&diagram)?.find(element)
    }

    fn create_lane_group(
        &mut self,
        diagram: DiagramId,
        partitions: &[ElementId],
    ) -> Result<ShapeId, RenderError> {
        let wrapper = self.add_shape(diagram, None, None)?;
        for partition in partitions {
            self.add_shape(diagram, Some(*partition), Some(wrapper))?;
        }
        self.diagram_mut(diagram)?.lane_group = Some(wrapper);
        Ok(wrapper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(raw: u32) -> ElementId {
        ElementId::new(raw)
    }

    #[test]
    fn test_lane_group_creates_lanes_in_order() {
        let mut canvas = Canvas::new();
        let diagram = canvas.create_diagram(element(1), "Main").unwrap();
        let wrapper = canvas
            .create_lane_group(diagram, &[element(10), element(11)])
            .unwrap();

        let lane_x = canvas.find_shape(diagram, element(10)).unwrap();
        let lane_y = canvas.find_shape(diagram, element(11)).unwrap();
        let recorded = canvas.diagram(diagram).unwrap();

        assert_eq!(recorded.lane_group(), Some(wrapper));
        assert_eq!(recorded.children_of(wrapper).collect::<Vec<_>>(), [lane_x, lane_y]);
        assert_eq!(recorded.shape(wrapper).unwrap().element(), None);
    }

    #[test]
    fn test_reshape_and_bounds() {
        let mut canvas = Canvas::new();
        let diagram = canvas.create_diagram(element(1), "Main").unwrap();
        let shape = canvas.create_shape(diagram, element(2), None).unwrap();
        canvas
            .reshape(diagram, shape, Rect::new(10, 20, 30, 40))
            .unwrap();

        let recorded = canvas.diagram(diagram).unwrap();
        assert_eq!(recorded.bounds_of(element(2)), Some(Rect::new(10, 20, 30, 40)));
        assert_eq!(recorded.bounds_of(element(3)), None);
    }

    #[test]
    fn test_unknown_handles_rejected() {
        let mut canvas = Canvas::new();
        let diagram = canvas.create_diagram(element(1), "Main").unwrap();
        let shape = canvas.create_shape(diagram, element(2), None).unwrap();

        let missing = ShapeId::new(99);
        assert!(matches!(
            canvas.create_path(diagram, element(5), shape, missing),
            Err(RenderError::UnknownShape { .. })
        ));
        assert!(matches!(
            canvas.create_shape(diagram, element(3), Some(missing)),
            Err(RenderError::UnknownShape { .. })
        ));
        assert!(matches!(
            canvas.open_diagram(DiagramId::new(42)),
            Err(RenderError::UnknownDiagram(_))
        ));
    }

    #[test]
    fn test_session_discards_unfinished_diagrams() {
        let mut canvas = Canvas::new();
        {
            let mut session = RenderSession::new(&mut canvas);
            session.create_diagram(element(1), "Dropped").unwrap();
            session.create_diagram(element(2), "Dropped too").unwrap();
        }
        assert!(canvas.is_empty());

        let mut session = RenderSession::new(&mut canvas);
        let kept = session.create_diagram(element(3), "Kept").unwrap();
        session.open_diagram(kept).unwrap();
        assert_eq!(session.finish(), [kept]);

        assert_eq!(canvas.len(), 1);
        assert!(canvas.diagram(kept).unwrap().is_open());
        assert_eq!(canvas.diagram_for(element(3)), Some(kept));
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(DiagramId::new(3).to_string(), "diagram-3");
        assert_eq!(ShapeId::new(4).to_string(), "shape-4");
        assert_eq!(PathId::new(5).to_string(), "path-5");
    }
}
