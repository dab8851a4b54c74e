use serde::{Deserialize, Serialize};

use crate::slot::Slot;

/// Arguments for one call site: positional values in order, then keyword
/// values in the order they were written.
///
/// Either side may contain [`Placeholder`](crate::Placeholder)s via
/// [`Slot::Unresolved`]. Keywords are kept as a plain ordered list here;
/// duplicate keyword names are diagnosed during binding, where the governing
/// signature (and its callable's name) is available for the error message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallArgs {
    positional: Vec<Slot>,
    keyword: Vec<(String, Slot)>,
}

impl CallArgs {
    /// Creates an empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one positional argument.
    #[must_use]
    pub fn arg(mut self, value: impl Into<Slot>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Appends several positional arguments.
    #[must_use]
    pub fn args<I, T>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Slot>,
    {
        self.positional.extend(values.into_iter().map(Into::into));
        self
    }

    /// Appends one keyword argument.
    #[must_use]
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Slot>) -> Self {
        self.keyword.push((name.into(), value.into()));
        self
    }

    /// Total number of arguments, positional and keyword.
    pub fn len(&self) -> usize {
        self.positional.len() + self.keyword.len()
    }

    /// Returns true if no arguments were supplied.
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }

    /// Splits into positional and keyword components for binding.
    pub(crate) fn into_parts(self) -> (Vec<Slot>, Vec<(String, Slot)>) {
        (self.positional, self.keyword)
    }
}
