//! Interactive choices the importer asks for before touching the model.
//!
//! Both choices may be declined. Implementations are plain synchronous
//! values: a closure, a fixed answer, or an adapter over whatever UI the
//! host provides.

use actiflow_core::{
    row::{ActionKind, ActionTypeSelection, ActivityRow},
    semantic::ElementId,
};

/// Outcome of an interactive choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice<T> {
    Selected(T),
    Cancelled,
}

impl<T> Choice<T> {
    /// Converts into an `Option`, dropping the cancellation.
    pub fn selected(self) -> Option<T> {
        match self {
            Self::Selected(value) => Some(value),
            Self::Cancelled => None,
        }
    }
}

/// Picks the node kind for every imported row.
pub trait ActionTypeResolver {
    fn resolve(&mut self, rows: &[ActivityRow]) -> Choice<ActionTypeSelection>;
}

impl<F> ActionTypeResolver for F
where
    F: FnMut(&[ActivityRow]) -> Choice<ActionTypeSelection>,
{
    fn resolve(&mut self, rows: &[ActivityRow]) -> Choice<ActionTypeSelection> {
        self(rows)
    }
}

/// Uses a prepared selection without asking.
impl ActionTypeResolver for ActionTypeSelection {
    fn resolve(&mut self, _rows: &[ActivityRow]) -> Choice<ActionTypeSelection> {
        Choice::Selected(self.clone())
    }
}

/// Resolves every row to [`ActionKind::StructuredContainer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultActionTypes;

impl ActionTypeResolver for DefaultActionTypes {
    fn resolve(&mut self, rows: &[ActivityRow]) -> Choice<ActionTypeSelection> {
        Choice::Selected(ActionTypeSelection::all(rows, ActionKind::StructuredContainer))
    }
}

/// Picks the element that will own the imported activity.
pub trait ContainmentChooser {
    fn choose(&mut self) -> Choice<ElementId>;
}

impl<F> ContainmentChooser for F
where
    F: FnMut() -> Choice<ElementId>,
{
    fn choose(&mut self) -> Choice<ElementId> {
        self()
    }
}

/// Always places the activity under this element.
impl ContainmentChooser for ElementId {
    fn choose(&mut self) -> Choice<ElementId> {
        Choice::Selected(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_resolver() {
        let rows = vec![ActivityRow::main("Action A")];
        let mut calls = 0;
        let mut resolver = |rows: &[ActivityRow]| {
            calls += 1;
            Choice::Selected(ActionTypeSelection::all(rows, ActionKind::BehaviorCall))
        };

        let selection = resolver.resolve(&rows).selected().unwrap();
        assert_eq!(selection.kind_for("Action A"), ActionKind::BehaviorCall);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_default_action_types() {
        let rows = vec![ActivityRow::main("A"), ActivityRow::sub("1.1", "A")];
        let selection = DefaultActionTypes.resolve(&rows).selected().unwrap();
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.kind_for("1.1"), ActionKind::StructuredContainer);
    }

    #[test]
    fn test_cancelled_chooser() {
        let mut chooser = || Choice::<ElementId>::Cancelled;
        assert_eq!(chooser.choose(), Choice::Cancelled);

        let mut fixed = ElementId::new(7);
        assert_eq!(fixed.choose(), Choice::Selected(ElementId::new(7)));
    }
}
