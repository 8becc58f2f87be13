//! Configuration types for activity diagram import and rendering.
//!
//! This module provides configuration structures that control how imported
//! diagrams are named, laid out and styled. All types implement
//! [`serde::Deserialize`] for loading from external sources; every field has
//! a default, so a partial file only overrides what it names.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`LayoutConfig`] - Swimlane, node and pin geometry constants.
//! - [`StyleConfig`] - Colors used by the SVG exporter.
//! - [`ImportConfig`] - Names given to the created root activity, main diagram and control nodes.
//!
//! # Example
//!
//! ```
//! # use actiflow::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.layout().lane_width(), 480);
//! assert_eq!(config.import().activity_name(), "Imported Activities");
//! assert!(config.style().background_color().is_ok());
//! ```

use serde::Deserialize;

use crate::color::Color;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,

    /// Import naming section.
    #[serde(default)]
    import: ImportConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(layout: LayoutConfig, style: StyleConfig, import: ImportConfig) -> Self {
        Self {
            layout,
            style,
            import,
        }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Returns the import configuration.
    pub fn import(&self) -> &ImportConfig {
        &self.import
    }
}

/// Swimlane layout constants, in diagram pixels.
///
/// The defaults reproduce the reference geometry exactly; changing them is
/// supported but breaks coordinate parity with diagrams produced by other
/// importers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    diagram_width: i32,
    lane_width: i32,
    /// Distance between the lane tops and the first node.
    lane_margin: i32,
    start_y: i32,
    y_step: i32,
    row_height: i32,
    action_width: i32,
    action_height: i32,
    control_size: i32,
    pin_size: i32,
    pin_gap: i32,
    /// Pin count per side above which an action grows taller.
    pin_threshold: usize,
    /// Height added per pin above the threshold.
    pin_growth: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            diagram_width: 1200,
            lane_width: 480,
            lane_margin: 50,
            start_y: 100,
            y_step: 60,
            row_height: 225,
            action_width: 180,
            action_height: 80,
            control_size: 20,
            pin_size: 20,
            pin_gap: 5,
            pin_threshold: 3,
            pin_growth: 25,
        }
    }
}

impl LayoutConfig {
    pub fn diagram_width(&self) -> i32 {
        self.diagram_width
    }

    pub fn lane_width(&self) -> i32 {
        self.lane_width
    }

    /// Returns the y coordinate shared by every lane.
    pub fn lane_top(&self) -> i32 {
        self.start_y.saturating_sub(self.lane_margin)
    }

    pub fn start_y(&self) -> i32 {
        self.start_y
    }

    pub fn y_step(&self) -> i32 {
        self.y_step
    }

    pub fn row_height(&self) -> i32 {
        self.row_height
    }

    pub fn action_width(&self) -> i32 {
        self.action_width
    }

    pub fn action_height(&self) -> i32 {
        self.action_height
    }

    pub fn control_size(&self) -> i32 {
        self.control_size
    }

    pub fn pin_size(&self) -> i32 {
        self.pin_size
    }

    pub fn pin_gap(&self) -> i32 {
        self.pin_gap
    }

    pub fn pin_threshold(&self) -> usize {
        self.pin_threshold
    }

    pub fn pin_growth(&self) -> i32 {
        self.pin_growth
    }

    pub fn with_lane_width(mut self, width: i32) -> Self {
        self.lane_width = width;
        self
    }

    pub fn with_row_height(mut self, height: i32) -> Self {
        self.row_height = height;
        self
    }

    pub fn with_pin_size(mut self, size: i32) -> Self {
        self.pin_size = size;
        self
    }
}

/// Visual styling configuration for exported diagrams.
///
/// Fields that are not set fall back to exporter defaults.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StyleConfig {
    /// Background [`Color`] for diagrams, as a color string.
    #[serde(default)]
    background_color: Option<String>,

    /// Stroke [`Color`] for shapes and flows, as a color string.
    #[serde(default)]
    stroke_color: Option<String>,

    /// Fill [`Color`] for lanes, as a color string.
    #[serde(default)]
    lane_color: Option<String>,
}

impl StyleConfig {
    /// Creates a [`StyleConfig`] from color strings; `None` keeps the exporter default.
    pub fn new(
        background_color: Option<String>,
        stroke_color: Option<String>,
        lane_color: Option<String>,
    ) -> Self {
        Self {
            background_color,
            stroke_color,
            lane_color,
        }
    }

    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed
    /// into a valid [`Color`].
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        parse_color(self.background_color.as_deref(), "background")
    }

    /// Returns the parsed stroke [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string is invalid.
    pub fn stroke_color(&self) -> Result<Option<Color>, String> {
        parse_color(self.stroke_color.as_deref(), "stroke")
    }

    /// Returns the parsed lane fill [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string is invalid.
    pub fn lane_color(&self) -> Result<Option<Color>, String> {
        parse_color(self.lane_color.as_deref(), "lane")
    }
}

fn parse_color(value: Option<&str>, what: &str) -> Result<Option<Color>, String> {
    value
        .map(Color::new)
        .transpose()
        .map_err(|err| format!("Invalid {what} color in config: {err}"))
}

/// Names given to the elements every import creates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    activity_name: String,
    diagram_name: String,
    initial_name: String,
    final_name: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            activity_name: "Imported Activities".to_string(),
            diagram_name: "Imported Activities".to_string(),
            initial_name: "Start".to_string(),
            final_name: "End".to_string(),
        }
    }
}

impl ImportConfig {
    /// Returns the name of the root activity.
    pub fn activity_name(&self) -> &str {
        &self.activity_name
    }

    /// Returns the name of the main diagram.
    pub fn diagram_name(&self) -> &str {
        &self.diagram_name
    }

    pub fn initial_name(&self) -> &str {
        &self.initial_name
    }

    pub fn final_name(&self) -> &str {
        &self.final_name
    }

    /// Overrides the root activity and main diagram names.
    pub fn with_activity_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.diagram_name = name.clone();
        self.activity_name = name;
        self
    }
}
