//! SVG rendering of [`Canvas`](crate::render::Canvas) diagrams.
//!
//! The exporter draws what the canvas recorded: lane shapes as columns with
//! the actor name on top, node shapes by the kind of the model element they
//! present, pins as small squares on the node border, and each path as a
//! straight arrow between the centers of its endpoint shapes.
//!
//! # Example
//!
//! ```
//! # use actiflow::{config::StyleConfig, export::svg::SvgExporter};
//! # use actiflow::render::{Canvas, DiagramRenderer};
//! # use actiflow::store::{MemoryModel, ModelStore};
//! let model = MemoryModel::new();
//! let mut canvas = Canvas::new();
//! let diagram = canvas.create_diagram(model.primary_model(), "Empty").unwrap();
//!
//! let exporter = SvgExporter::new(&StyleConfig::default()).unwrap();
//! let doc = exporter.render(canvas.diagram(diagram).unwrap(), &model);
//! assert!(doc.to_string().contains("viewBox"));
//! ```

mod layer;

use std::{fs::File, io::Write, path::Path};

use log::{debug, error, info, trace};
use svg::{Document, node::element as svg_element};

use actiflow_core::{geometry::Rect, semantic::ElementKind};

pub use layer::{LayeredOutput, RenderLayer, SvgNode};

use crate::{
    color::Color,
    config::StyleConfig,
    error::ActiflowError,
    render::{CanvasDiagram, CanvasShape},
    store::MemoryModel,
};

const MARGIN: i32 = 50;
const FONT_FAMILY: &str = "Arial, sans-serif";
const FONT_SIZE: i32 = 14;
const PIN_FONT_SIZE: i32 = 10;
const ARROW_MARKER_ID: &str = "flow-arrow";

/// Renders canvas diagrams to SVG documents.
#[derive(Debug, Clone)]
pub struct SvgExporter {
    background: Color,
    stroke: Color,
    lane_fill: Color,
}

impl SvgExporter {
    /// Creates an exporter with the colors of `style`, falling back to a
    /// white background, black strokes and light gray lanes.
    ///
    /// # Errors
    ///
    /// Returns [`ActiflowError::Export`] if a configured color is invalid.
    pub fn new(style: &StyleConfig) -> Result<Self, ActiflowError> {
        Ok(Self {
            background: pick_color(style.background_color(), "white")?,
            stroke: pick_color(style.stroke_color(), "black")?,
            lane_fill: pick_color(style.lane_color(), "#f4f4f4")?,
        })
    }

    /// Renders `diagram`, looking up element kinds and names in `model`.
    pub fn render(&self, diagram: &CanvasDiagram, model: &MemoryModel) -> Document {
        let content = content_bounds(diagram);
        let width = content.width() + 2 * MARGIN;
        let height = content.height() + 2 * MARGIN;
        debug!(diagram = diagram.name(), width, height; "Rendering SVG document");

        let doc = Document::new()
            .set("viewBox", format!("0 0 {width} {height}"))
            .set("width", width)
            .set("height", height)
            .add(
                svg_element::Rectangle::new()
                    .set("width", width)
                    .set("height", height)
                    .set("fill", &self.background),
            )
            .add(self.marker_definitions());

        let mut output = LayeredOutput::new();
        for (_, shape) in diagram.shapes() {
            output.merge(self.render_shape(shape, model));
        }
        for (_, path) in diagram.paths() {
            let (Some(source), Some(target)) =
                (diagram.shape(path.source()), diagram.shape(path.target()))
            else {
                continue;
            };
            output.add_to_layer(RenderLayer::Flow, self.render_flow(source, target));
        }

        let mut main_group = svg_element::Group::new().set(
            "transform",
            format!(
                "translate({}, {})",
                MARGIN - content.x(),
                MARGIN - content.y()
            ),
        );
        for node in output.render() {
            main_group = main_group.add(node);
        }

        doc.add(main_group)
    }

    /// Writes `doc` to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ActiflowError::Io`] if the file cannot be created or written.
    pub fn write_document(&self, doc: &Document, path: &Path) -> Result<(), ActiflowError> {
        let file_name = path.display();
        info!(file_name:%; "Creating SVG file");
        let mut file = match File::create(path) {
            Ok(file) => file,
            Err(err) => {
                error!(file_name:%, err:%; "Failed to create SVG file");
                return Err(err.into());
            }
        };

        if let Err(err) = write!(file, "{doc}") {
            error!(file_name:%, err:%; "Failed to write SVG content");
            return Err(err.into());
        }

        Ok(())
    }

    fn marker_definitions(&self) -> svg_element::Definitions {
        let marker = svg_element::Marker::new()
            .set("id", ARROW_MARKER_ID)
            .set("viewBox", "0 0 10 10")
            .set("refX", 9)
            .set("refY", 5)
            .set("markerWidth", 6)
            .set("markerHeight", 6)
            .set("orient", "auto")
            .add(
                svg_element::Path::new()
                    .set("d", "M 0 0 L 10 5 L 0 10 z")
                    .set("fill", &self.stroke),
            );
        svg_element::Definitions::new().add(marker)
    }

    fn render_shape(&self, shape: &CanvasShape, model: &MemoryModel) -> LayeredOutput {
        let mut output = LayeredOutput::new();
        let bounds = shape.bounds();

        // the lane group wrapper presents no element
        let Some(element) = shape.element() else {
            output.add_to_layer(
                RenderLayer::Lane,
                Box::new(
                    self.rect(bounds)
                        .set("fill", "none")
                        .set("stroke-width", 2),
                ),
            );
            return output;
        };
        let Some(stored) = model.element(element) else {
            trace!(element:%; "Skipping shape of unknown element");
            return output;
        };

        match stored.kind() {
            ElementKind::Partition => {
                output.add_to_layer(
                    RenderLayer::Lane,
                    Box::new(self.rect(bounds).set("fill", &self.lane_fill)),
                );
                output.add_to_layer(
                    RenderLayer::Text,
                    label(stored.name(), bounds.center().x(), bounds.y() + 20, FONT_SIZE),
                );
            }
            ElementKind::InitialNode => {
                output.add_to_layer(
                    RenderLayer::Node,
                    Box::new(self.circle(bounds, bounds.width() / 2).set("fill", &self.stroke)),
                );
            }
            ElementKind::FinalNode => {
                let radius = bounds.width() / 2;
                let bullseye = svg_element::Group::new()
                    .add(self.circle(bounds, radius).set("fill", &self.background))
                    .add(self.circle(bounds, radius / 2).set("fill", &self.stroke));
                output.add_to_layer(RenderLayer::Node, Box::new(bullseye));
            }
            ElementKind::StructuredNode | ElementKind::CallBehaviorAction => {
                let mut rect = self
                    .rect(bounds)
                    .set("rx", 10)
                    .set("ry", 10)
                    .set("fill", &self.background);
                if stored.kind() == ElementKind::StructuredNode {
                    rect = rect.set("stroke-dasharray", "6 3");
                }
                output.add_to_layer(RenderLayer::Node, Box::new(rect));
                let center = bounds.center();
                output.add_to_layer(
                    RenderLayer::Text,
                    label(stored.name(), center.x(), center.y(), FONT_SIZE),
                );
            }
            ElementKind::InputPin(_) | ElementKind::OutputPin(_) => {
                output.add_to_layer(
                    RenderLayer::Pin,
                    Box::new(self.rect(bounds).set("fill", &self.background)),
                );
                output.add_to_layer(
                    RenderLayer::Text,
                    label(
                        stored.name(),
                        bounds.center().x(),
                        bounds.y() - 4,
                        PIN_FONT_SIZE,
                    ),
                );
            }
            ElementKind::Package
            | ElementKind::Activity
            | ElementKind::ControlFlow { .. }
            | ElementKind::Diagram => {
                trace!(element:%; "Element kind has no shape rendering");
            }
        }
        output
    }

    fn render_flow(&self, source: &CanvasShape, target: &CanvasShape) -> SvgNode {
        let start = source.bounds().center();
        let end = target.bounds().center();
        Box::new(
            svg_element::Path::new()
                .set(
                    "d",
                    format!("M {} {} L {} {}", start.x(), start.y(), end.x(), end.y()),
                )
                .set("fill", "none")
                .set("stroke", &self.stroke)
                .set("stroke-width", 1.5)
                .set("marker-end", format!("url(#{ARROW_MARKER_ID})")),
        )
    }

    fn rect(&self, bounds: Rect) -> svg_element::Rectangle {
        svg_element::Rectangle::new()
            .set("x", bounds.x())
            .set("y", bounds.y())
            .set("width", bounds.width())
            .set("height", bounds.height())
            .set("stroke", &self.stroke)
    }

    fn circle(&self, bounds: Rect, radius: i32) -> svg_element::Circle {
        let center = bounds.center();
        svg_element::Circle::new()
            .set("cx", center.x())
            .set("cy", center.y())
            .set("r", radius)
            .set("stroke", &self.stroke)
    }
}

fn pick_color(configured: Result<Option<Color>, String>, fallback: &str) -> Result<Color, ActiflowError> {
    match configured.map_err(ActiflowError::Export)? {
        Some(color) => Ok(color),
        None => Color::new(fallback).map_err(ActiflowError::Export),
    }
}

fn label(text: &str, x: i32, y: i32, font_size: i32) -> SvgNode {
    Box::new(
        svg_element::Text::new(text)
            .set("x", x)
            .set("y", y)
            .set("text-anchor", "middle")
            .set("dominant-baseline", "middle")
            .set("font-family", FONT_FAMILY)
            .set("font-size", font_size),
    )
}

/// Union of every placed shape; shapes never reshaped are ignored.
fn content_bounds(diagram: &CanvasDiagram) -> Rect {
    diagram
        .shapes()
        .map(|(_, shape)| shape.bounds())
        .filter(|bounds| bounds.width() > 0 || bounds.height() > 0)
        .reduce(Rect::union)
        .unwrap_or_default()
}
