//! Row classification by name.
//!
//! A trimmed row name is a **sub** action when it starts with a dotted
//! number (`1.1`, `12.03 Weigh`), and otherwise a **main** action when it
//! starts with the word `Action` in any case or with a whole number that
//! ends at a word boundary (`3`, `4 Pack`, `5-Ship`). Anything else is not
//! an action row.

use winnow::{
    Parser as _,
    ascii::digit1,
    error::{ContextError, ErrMode},
};

const ACTION_PREFIX: &str = "action";

type IResult<O> = std::result::Result<O, ErrMode<ContextError>>;

/// What a row name says about the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RowClass {
    Main,
    Sub,
}

fn number<'src>(input: &mut &'src str) -> IResult<&'src str> {
    digit1.parse_next(input)
}

fn dotted_number<'src>(input: &mut &'src str) -> IResult<(&'src str, char, &'src str)> {
    (number, '.', number).parse_next(input)
}

/// `<digits>.<digits>` at the start of `name`.
fn has_dotted_prefix(name: &str) -> bool {
    let mut input = name;
    dotted_number(&mut input).is_ok()
}

/// `<digits>` at the start of `name`, followed by a non-word character or
/// the end of the name.
fn has_whole_number_prefix(name: &str) -> bool {
    let mut input = name;
    if number(&mut input).is_err() {
        return false;
    }
    !input
        .chars()
        .next()
        .is_some_and(|c| c.is_alphanumeric() || c == '_')
}

fn has_action_prefix(name: &str) -> bool {
    name.get(..ACTION_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(ACTION_PREFIX))
}

/// Classifies a trimmed row name; `None` for rows that are not actions.
pub(crate) fn classify(name: &str) -> Option<RowClass> {
    if name.is_empty() {
        None
    } else if has_dotted_prefix(name) {
        Some(RowClass::Sub)
    } else if has_action_prefix(name) || has_whole_number_prefix(name) {
        Some(RowClass::Main)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_rows() {
        assert_eq!(classify("1.1"), Some(RowClass::Sub));
        assert_eq!(classify("12.03 Weigh parcel"), Some(RowClass::Sub));
        assert_eq!(classify("1.2.3"), Some(RowClass::Sub));
    }

    #[test]
    fn test_main_rows() {
        assert_eq!(classify("Action A"), Some(RowClass::Main));
        assert_eq!(classify("ACTION"), Some(RowClass::Main));
        assert_eq!(classify("actionable"), Some(RowClass::Main));
        assert_eq!(classify("3"), Some(RowClass::Main));
        assert_eq!(classify("4 Pack"), Some(RowClass::Main));
        assert_eq!(classify("5-Ship"), Some(RowClass::Main));
        assert_eq!(classify("6."), Some(RowClass::Main));
    }

    #[test]
    fn test_ignored_rows() {
        assert_eq!(classify(""), None);
        assert_eq!(classify("Notes"), None);
        assert_eq!(classify("12abc"), None);
        assert_eq!(classify("7_draft"), None);
        assert_eq!(classify("Act"), None);
        assert_eq!(classify(".5"), None);
    }

    #[test]
    fn test_non_ascii_prefix_is_not_action() {
        assert_eq!(classify("Ação"), None);
        assert_eq!(classify("1é"), None);
    }
}
