use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Marker for an argument slot whose concrete value will be supplied later.
///
/// The optional name is purely descriptive: it shows up in diagnostics but has
/// no resolution semantics. Name-based resolution is the job of the
/// [`Registry`](crate::Registry), not of placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    name: Option<String>,
}

impl Placeholder {
    /// Creates an anonymous placeholder.
    pub fn new() -> Self {
        Self { name: None }
    }

    /// Creates a placeholder tagged with a diagnostic name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    /// Returns the diagnostic name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "<placeholder '{name}'>"),
            None => write!(f, "<placeholder>"),
        }
    }
}

/// A value assigned to an argument slot: either concrete or still unresolved.
///
/// Binding and merge logic pattern-matches on this variant instead of
/// comparing against a sentinel value, so a real argument can never be
/// mistaken for a placeholder by accident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Slot {
    /// A concrete value, ready for dispatch.
    Concrete(Value),
    /// An open slot awaiting completion.
    Unresolved(Placeholder),
}

impl Slot {
    /// Returns true if this slot is still awaiting a concrete value.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Unresolved(_))
    }

    /// Returns the concrete value, if this slot has one.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Concrete(value) => Some(value),
            Self::Unresolved(_) => None,
        }
    }

    /// Consumes the slot, returning the concrete value if present.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Concrete(value) => Some(value),
            Self::Unresolved(_) => None,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concrete(value) => write!(f, "{value}"),
            Self::Unresolved(placeholder) => write!(f, "{placeholder}"),
        }
    }
}

impl From<Value> for Slot {
    fn from(value: Value) -> Self {
        Self::Concrete(value)
    }
}

impl From<Placeholder> for Slot {
    fn from(placeholder: Placeholder) -> Self {
        Self::Unresolved(placeholder)
    }
}

impl From<bool> for Slot {
    fn from(b: bool) -> Self {
        Self::Concrete(Value::Bool(b))
    }
}

impl From<i64> for Slot {
    fn from(i: i64) -> Self {
        Self::Concrete(Value::Int(i))
    }
}

impl From<f64> for Slot {
    fn from(x: f64) -> Self {
        Self::Concrete(Value::Float(x))
    }
}

impl From<&str> for Slot {
    fn from(s: &str) -> Self {
        Self::Concrete(Value::Str(s.to_string()))
    }
}

impl From<String> for Slot {
    fn from(s: String) -> Self {
        Self::Concrete(Value::Str(s))
    }
}
