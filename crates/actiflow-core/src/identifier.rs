//! Interned names for actors and activity elements.
//!
//! Rows carry owned strings; once a row is turned into graph elements its
//! actor and element names are interned into [`Id`] values so the synthesis
//! and layout indexes can key on a cheap `Copy` handle.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner shared by every [`Id`].
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock")
}

/// Interned element or actor name.
///
/// Two `Id`s are equal exactly when the strings they were created from are
/// equal, so name-keyed indexes behave like string-keyed maps.
///
/// # Examples
///
/// ```
/// use actiflow_core::identifier::Id;
///
/// let lane = Id::new("Operator");
/// assert_eq!(lane, "Operator");
/// assert_eq!(lane, Id::new("Operator"));
/// assert_ne!(lane, Id::new("Supervisor"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Interns `name` and returns its identifier.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Runs `f` against the interned string without allocating.
    ///
    /// # Examples
    ///
    /// ```
    /// use actiflow_core::identifier::Id;
    ///
    /// let id = Id::new("Action A");
    /// assert_eq!(id.with_str(str::len), 8);
    /// ```
    pub fn with_str<R>(self, f: impl FnOnce(&str) -> R) -> R {
        let interner = interner();
        let value = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        f(value)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_str(|value| f.write_str(value))
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<&String> for Id {
    fn from(name: &String) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        self.with_str(|value| value == other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
