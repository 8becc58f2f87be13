//! CSS color values for exported diagrams.

use std::{fmt, str::FromStr};

use color::DynamicColor;

/// Wrapper around [`DynamicColor`] parsed from a CSS color string.
///
/// # Examples
///
/// ```
/// # use actiflow::color::Color;
/// assert!(Color::new("#ffcc00").is_ok());
/// assert!(Color::new("rgb(255, 0, 0)").is_ok());
/// assert!(Color::new("nope").is_err());
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Color {
    /// Parses CSS color strings such as `"#ff0000"`, `"rgb(255, 0, 0)"` or `"red"`.
    pub fn new(color_str: &str) -> Result<Self, String> {
        DynamicColor::from_str(color_str)
            .map(|color| Color { color })
            .map_err(|err| format!("Invalid color '{color_str}': {err}"))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.color)
    }
}

impl From<&Color> for svg::node::Value {
    fn from(color: &Color) -> Self {
        svg::node::Value::from(color.to_string())
    }
}
