use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A concrete argument value as seen at the call boundary.
///
/// The binding and merging machinery treats values opaquely: it never inspects
/// a value beyond cloning and moving it into a slot. A concrete enum (rather
/// than a generic parameter) is what lets the active [`Registry`] live in
/// process-wide storage, which cannot be generic.
///
/// [`Registry`]: crate::Registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// The unit/none value.
    #[serde(alias = "none")]
    None,
    /// Boolean.
    #[serde(alias = "bool")]
    Bool(bool),
    /// 64-bit signed integer.
    #[serde(alias = "int")]
    Int(i64),
    /// 64-bit IEEE 754 float.
    #[serde(alias = "float")]
    Float(f64),
    /// UTF-8 string.
    #[serde(alias = "str")]
    Str(String),
    /// Ordered sequence.
    #[serde(alias = "list")]
    List(Vec<Self>),
    /// String-keyed mapping with stable insertion order.
    #[serde(alias = "dict")]
    Dict(IndexMap<String, Self>),
}

impl Value {
    /// Returns a short name for the value's type, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::List(_) => "list",
            Self::Dict(_) => "dict",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => {
                // Keep a trailing ".0" on integral floats so they stay
                // distinguishable from ints in diagnostics.
                if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 {
                    write!(f, "{x:.1}")
                } else {
                    write!(f, "{x}")
                }
            }
            Self::Str(s) => write!(f, "'{s}'"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Dict(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "'{key}': {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Vec<Self>> for Value {
    fn from(items: Vec<Self>) -> Self {
        Self::List(items)
    }
}

impl From<IndexMap<String, Self>> for Value {
    fn from(entries: IndexMap<String, Self>) -> Self {
        Self::Dict(entries)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn display_matches_python_repr() {
        assert_eq!(Value::None.to_string(), "None");
        assert_eq!(Value::Bool(true).to_string(), "True");
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(Value::Float(3.0).to_string(), "3.0");
        assert_eq!(Value::Float(0.5).to_string(), "0.5");
        assert_eq!(Value::Str("hi".into()).to_string(), "'hi'");
        assert_eq!(
            Value::List(vec![Value::Int(1), Value::Str("a".into())]).to_string(),
            "[1, 'a']"
        );
    }

    #[test]
    fn dict_display_preserves_insertion_order() {
        let mut entries = IndexMap::new();
        entries.insert("b".to_string(), Value::Int(2));
        entries.insert("a".to_string(), Value::Int(1));
        assert_eq!(Value::Dict(entries).to_string(), "{'b': 2, 'a': 1}");
    }
}
