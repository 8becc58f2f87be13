//! Z-ordered collection of SVG nodes.
//!
//! Elements of a diagram are emitted in a fixed stacking order regardless of
//! the order in which the exporter visits them: lanes at the bottom, then
//! flows, nodes, pins and finally text labels.
//!
//! # Example
//!
//! ```
//! # use actiflow::export::svg::{LayeredOutput, RenderLayer};
//! # use svg::node::element::{Rectangle, Text};
//! let mut output = LayeredOutput::new();
//! output.add_to_layer(RenderLayer::Text, Box::new(Text::new("Action A")));
//! output.add_to_layer(RenderLayer::Lane, Box::new(Rectangle::new()));
//!
//! // one group per non-empty layer, lanes first
//! assert_eq!(output.render().len(), 2);
//! ```

use svg::node::element as svg_element;

/// Type alias for boxed SVG nodes.
pub type SvgNode = Box<dyn svg::Node>;

/// Rendering layers, bottom to top in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderLayer {
    Background,
    /// Lane group wrapper and lane columns.
    Lane,
    /// Control flow lines.
    Flow,
    /// Action and control node shapes.
    Node,
    Pin,
    Text,
}

impl RenderLayer {
    /// Value of the `data-layer` attribute on the layer's group.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Lane => "lane",
            Self::Flow => "flow",
            Self::Node => "node",
            Self::Pin => "pin",
            Self::Text => "text",
        }
    }
}

/// SVG nodes tagged with their layer.
#[derive(Debug, Default)]
pub struct LayeredOutput {
    items: Vec<(RenderLayer, SvgNode)>,
}

impl LayeredOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `node` to `layer`; nodes of one layer keep insertion order.
    pub fn add_to_layer(&mut self, layer: RenderLayer, node: SvgNode) {
        self.items.push((layer, node));
    }

    pub fn merge(&mut self, other: LayeredOutput) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Renders one `<g data-layer="...">` per non-empty layer, bottom first.
    pub fn render(mut self) -> Vec<SvgNode> {
        // stable, so each layer keeps insertion order
        self.items.sort_by_key(|(layer, _)| *layer);

        let mut groups: Vec<(RenderLayer, svg_element::Group)> = Vec::new();
        for (layer, node) in self.items {
            match groups.last_mut() {
                Some((current, group)) if *current == layer => {
                    let filled = std::mem::take(group).add(node);
                    *group = filled;
                }
                _ => groups.push((
                    layer,
                    svg_element::Group::new()
                        .set("data-layer", layer.name())
                        .add(node),
                )),
            }
        }

        groups
            .into_iter()
            .map(|(_, group)| Box::new(group) as SvgNode)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svg::node::element::Rectangle;

    #[test]
    fn test_empty_output_renders_nothing() {
        let output = LayeredOutput::new();
        assert!(output.is_empty());
        assert!(output.render().is_empty());
    }

    #[test]
    fn test_layers_sorted_bottom_first() {
        let mut output = LayeredOutput::new();
        output.add_to_layer(RenderLayer::Text, Box::new(Rectangle::new()));
        output.add_to_layer(RenderLayer::Lane, Box::new(Rectangle::new()));
        output.add_to_layer(RenderLayer::Node, Box::new(Rectangle::new()));

        let rendered: Vec<String> = output
            .render()
            .iter()
            .map(|node| node.to_string())
            .collect();
        assert_eq!(rendered.len(), 3);
        assert!(rendered[0].contains("data-layer=\"lane\""));
        assert!(rendered[1].contains("data-layer=\"node\""));
        assert!(rendered[2].contains("data-layer=\"text\""));
    }

    #[test]
    fn test_merge_same_layer() {
        let mut first = LayeredOutput::new();
        first.add_to_layer(RenderLayer::Pin, Box::new(Rectangle::new()));

        let mut second = LayeredOutput::new();
        second.add_to_layer(RenderLayer::Pin, Box::new(Rectangle::new()));

        first.merge(second);
        assert_eq!(first.render().len(), 1);
    }
}
