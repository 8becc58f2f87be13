//! Activity rows and per-row action-type choices.
//!
//! An [`ActivityRow`] is one line of the imported activity table. Rows are
//! immutable once ingested and their order is meaningful: main rows are
//! chained in table order and a sub row belongs to the nearest preceding main
//! row carrying its parent name.

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

/// Lane name used for rows whose actor cell is blank.
pub const UNASSIGNED_ACTOR: &str = "<Unassigned>";

/// Normalizes a raw actor cell into a lane name.
///
/// Surrounding whitespace is trimmed; a blank actor maps to
/// [`UNASSIGNED_ACTOR`].
///
/// # Examples
///
/// ```
/// # use actiflow_core::row::{actor_name, UNASSIGNED_ACTOR};
/// assert_eq!(actor_name("  Operator "), "Operator");
/// assert_eq!(actor_name("   "), UNASSIGNED_ACTOR);
/// ```
pub fn actor_name(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        UNASSIGNED_ACTOR
    } else {
        trimmed
    }
}

/// A single imported activity.
///
/// # Examples
///
/// ```
/// # use actiflow_core::row::ActivityRow;
/// let main = ActivityRow::main("Action A")
///     .with_actor("X")
///     .with_inputs(["a"])
///     .with_outputs(["b"]);
/// let sub = ActivityRow::sub("1.1", "Action A").with_actor("X");
///
/// assert!(!main.is_sub_action());
/// assert_eq!(sub.parent_name(), Some("Action A"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRow {
    name: String,
    documentation: String,
    actor: String,
    inputs: Vec<String>,
    outputs: Vec<String>,
    sub_action: bool,
    parent_name: Option<String>,
}

impl ActivityRow {
    /// Creates a top-level row.
    pub fn main(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documentation: String::new(),
            actor: String::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            sub_action: false,
            parent_name: None,
        }
    }

    /// Creates a sub row nested under the main row named `parent`.
    pub fn sub(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            sub_action: true,
            parent_name: Some(parent.into()),
            ..Self::main(name)
        }
    }

    /// Creates a sub row whose parent could not be determined.
    ///
    /// Such rows are kept so callers can report them, but synthesis never
    /// resolves them to a parent node.
    pub fn orphan_sub(name: impl Into<String>) -> Self {
        Self {
            sub_action: true,
            ..Self::main(name)
        }
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = documentation.into();
        self
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    pub fn with_inputs<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs = inputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_outputs<I, S>(mut self, outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs = outputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn documentation(&self) -> &str {
        &self.documentation
    }

    /// Returns the raw actor cell.
    pub fn actor(&self) -> &str {
        &self.actor
    }

    /// Returns the lane this row belongs to, see [`actor_name`].
    pub fn actor_name(&self) -> &str {
        actor_name(&self.actor)
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub fn is_sub_action(&self) -> bool {
        self.sub_action
    }

    /// Returns the parent name; only ever set on sub rows.
    pub fn parent_name(&self) -> Option<&str> {
        self.parent_name.as_deref()
    }
}

/// The model element kind a row is realized as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    /// Structured activity node; pins are structured inputs and outputs.
    #[default]
    StructuredContainer,
    /// Call-behavior action; pins are arguments and results.
    BehaviorCall,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StructuredContainer => write!(f, "structured-container"),
            Self::BehaviorCall => write!(f, "behavior-call"),
        }
    }
}

/// Error returned when an [`ActionKind`] string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown action kind `{0}`, expected `structured` or `call-behavior`")]
pub struct ParseActionKindError(String);

impl FromStr for ActionKind {
    type Err = ParseActionKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structured" | "structured-container" | "structured-activity" => {
                Ok(Self::StructuredContainer)
            }
            "call-behavior" | "behavior-call" | "call" => Ok(Self::BehaviorCall),
            _ => Err(ParseActionKindError(s.to_string())),
        }
    }
}

/// Row name to [`ActionKind`] assignment for one import.
///
/// Names missing from the selection resolve to
/// [`ActionKind::StructuredContainer`].
///
/// # Examples
///
/// ```
/// # use actiflow_core::row::{ActionKind, ActionTypeSelection};
/// let mut selection = ActionTypeSelection::new();
/// selection.set("Action B", ActionKind::BehaviorCall);
///
/// assert_eq!(selection.kind_for("Action B"), ActionKind::BehaviorCall);
/// assert_eq!(selection.kind_for("Action A"), ActionKind::StructuredContainer);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionTypeSelection {
    kinds: IndexMap<String, ActionKind>,
}

impl ActionTypeSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `kind` to every row in `rows`.
    pub fn all(rows: &[ActivityRow], kind: ActionKind) -> Self {
        let kinds = rows
            .iter()
            .map(|row| (row.name().to_string(), kind))
            .collect();
        Self { kinds }
    }

    /// Sets the kind for `name`, replacing any previous choice.
    pub fn set(&mut self, name: impl Into<String>, kind: ActionKind) {
        self.kinds.insert(name.into(), kind);
    }

    pub fn kind_for(&self, name: &str) -> ActionKind {
        self.kinds.get(name).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ActionKind)> {
        self.kinds.iter().map(|(name, kind)| (name.as_str(), *kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_name_defaults() {
        assert_eq!(ActivityRow::main("A").actor_name(), UNASSIGNED_ACTOR);
        assert_eq!(
            ActivityRow::main("A").with_actor(" \t").actor_name(),
            UNASSIGNED_ACTOR
        );
        assert_eq!(ActivityRow::main("A").with_actor(" X ").actor_name(), "X");
    }

    #[test]
    fn test_sub_row_parent() {
        let sub = ActivityRow::sub("1.1", "Action A");
        assert!(sub.is_sub_action());
        assert_eq!(sub.parent_name(), Some("Action A"));

        let main = ActivityRow::main("Action A");
        assert_eq!(main.parent_name(), None);

        let orphan = ActivityRow::orphan_sub("0.1");
        assert!(orphan.is_sub_action());
        assert_eq!(orphan.parent_name(), None);
    }

    #[test]
    fn test_pins_preserve_order() {
        let row = ActivityRow::main("A")
            .with_inputs(["z", "a", "m"])
            .with_outputs(vec![String::from("out")]);
        assert_eq!(row.inputs(), ["z", "a", "m"]);
        assert_eq!(row.outputs(), ["out"]);
    }

    #[test]
    fn test_action_kind_from_str() {
        assert_eq!(
            "Structured".parse::<ActionKind>(),
            Ok(ActionKind::StructuredContainer)
        );
        assert_eq!(
            "call-behavior".parse::<ActionKind>(),
            Ok(ActionKind::BehaviorCall)
        );
        assert!("opaque".parse::<ActionKind>().is_err());
    }

    #[test]
    fn test_selection_all_and_override() {
        let rows = vec![ActivityRow::main("A"), ActivityRow::main("B")];
        let mut selection = ActionTypeSelection::all(&rows, ActionKind::BehaviorCall);
        selection.set("B", ActionKind::StructuredContainer);

        assert_eq!(selection.len(), 2);
        assert_eq!(selection.kind_for("A"), ActionKind::BehaviorCall);
        assert_eq!(selection.kind_for("B"), ActionKind::StructuredContainer);
        assert_eq!(selection.kind_for("C"), ActionKind::StructuredContainer);
    }
}
