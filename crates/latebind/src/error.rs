use std::fmt;

use crate::signature::ParamKind;

/// Result type alias for operations that can produce a binding, completion,
/// or registry error.
pub type Result<T> = std::result::Result<T, Error>;

/// Every validation failure the crate can surface.
///
/// All variants are raised synchronously at the point of violation and carry
/// enough detail to name the offending parameter(s). None are retried
/// internally; a failed completion attempt leaves its deferred call usable
/// for a corrected retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // --- signature construction ---
    /// Two parameters in one signature share a name.
    SignatureDuplicateParam { param: String },
    /// A parameter appears after a later parameter kind (e.g. positional-only
    /// after keyword-only).
    SignatureKindOrder { param: String, kind: ParamKind },
    /// A second variadic parameter of the same flavor.
    SignatureMultipleVariadic { param: String, kind: ParamKind },
    /// A variadic parameter was given a default value.
    SignatureVariadicDefault { param: String },

    // --- binding ---
    /// More positional values than positional slots, with no `*args` slot.
    TooManyPositional { callable: String, max: usize, given: usize },
    /// A keyword name matches no parameter and there is no `**kwargs` slot.
    UnexpectedKeyword { callable: String, keyword: String },
    /// A positional-only parameter was addressed by keyword.
    PositionalOnly { callable: String, param: String },
    /// The same slot was supplied both positionally and by keyword.
    DuplicateArgument { callable: String, param: String },
    /// A non-defaulted slot was left unfilled in a strict bind.
    MissingRequired { callable: String, params: Vec<String> },

    // --- merge / completion ---
    /// The completion argument set itself contained placeholders.
    DeferredPlaceholder { callable: String },
    /// Completion supplied a value for a slot that is already concrete.
    DeferredOverwrite { callable: String, param: String },
    /// Completion supplied more variadic replacement values than there were
    /// placeholders left in the `*args` slot.
    DeferredExcessVariadic {
        callable: String,
        param: String,
        expected: usize,
        given: usize,
    },
    /// One or more slots remain unresolved after a merge.
    DeferredMissing { callable: String, params: Vec<String> },
    /// The deferred call was already dispatched by an earlier completion.
    DeferredResolved { callable: String },

    // --- registry ---
    /// A name was registered twice within one registry instance.
    ParamAlreadyRegistered { name: String },
    /// A registry was entered while another instance is active.
    RegistryActive,
    /// A lookup was attempted with no registry active at all.
    NoActiveRegistry { name: String },
    /// A lookup named a parameter the active registry never registered.
    ParamNotRegistered { name: String },
}

impl Error {
    pub(crate) fn too_many_positional(callable: &str, max: usize, given: usize) -> Self {
        Self::TooManyPositional {
            callable: callable.to_string(),
            max,
            given,
        }
    }

    pub(crate) fn unexpected_keyword(callable: &str, keyword: &str) -> Self {
        Self::UnexpectedKeyword {
            callable: callable.to_string(),
            keyword: keyword.to_string(),
        }
    }

    pub(crate) fn positional_only(callable: &str, param: &str) -> Self {
        Self::PositionalOnly {
            callable: callable.to_string(),
            param: param.to_string(),
        }
    }

    pub(crate) fn duplicate_argument(callable: &str, param: &str) -> Self {
        Self::DuplicateArgument {
            callable: callable.to_string(),
            param: param.to_string(),
        }
    }

    pub(crate) fn missing_required(callable: &str, params: Vec<String>) -> Self {
        Self::MissingRequired {
            callable: callable.to_string(),
            params,
        }
    }

    pub(crate) fn deferred_placeholder(callable: &str) -> Self {
        Self::DeferredPlaceholder {
            callable: callable.to_string(),
        }
    }

    pub(crate) fn deferred_overwrite(callable: &str, param: &str) -> Self {
        Self::DeferredOverwrite {
            callable: callable.to_string(),
            param: param.to_string(),
        }
    }

    pub(crate) fn deferred_excess_variadic(callable: &str, param: &str, expected: usize, given: usize) -> Self {
        Self::DeferredExcessVariadic {
            callable: callable.to_string(),
            param: param.to_string(),
            expected,
            given,
        }
    }

    pub(crate) fn deferred_missing(callable: &str, params: Vec<String>) -> Self {
        Self::DeferredMissing {
            callable: callable.to_string(),
            params,
        }
    }

    pub(crate) fn deferred_resolved(callable: &str) -> Self {
        Self::DeferredResolved {
            callable: callable.to_string(),
        }
    }

    pub(crate) fn param_already_registered(name: &str) -> Self {
        Self::ParamAlreadyRegistered { name: name.to_string() }
    }

    pub(crate) fn no_active_registry(name: &str) -> Self {
        Self::NoActiveRegistry { name: name.to_string() }
    }

    pub(crate) fn param_not_registered(name: &str) -> Self {
        Self::ParamNotRegistered { name: name.to_string() }
    }
}

/// Joins parameter names as `'a'`, `'a' and 'b'`, or `'a', 'b', and 'c'`.
fn join_quoted(names: &[String]) -> String {
    let mut quoted: Vec<String> = names.iter().map(|n| format!("'{n}'")).collect();
    match quoted.len() {
        0 => String::new(),
        1 => quoted.pop().unwrap_or_default(),
        2 => format!("{} and {}", quoted[0], quoted[1]),
        _ => {
            let last = quoted.pop().unwrap_or_default();
            format!("{}, and {last}", quoted.join(", "))
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SignatureDuplicateParam { param } => {
                write!(f, "invalid signature: duplicate parameter '{param}'")
            }
            Self::SignatureKindOrder { param, kind } => {
                write!(
                    f,
                    "invalid signature: {kind} parameter '{param}' appears after a later parameter kind"
                )
            }
            Self::SignatureMultipleVariadic { param, kind } => {
                write!(f, "invalid signature: second {kind} parameter '{param}'")
            }
            Self::SignatureVariadicDefault { param } => {
                write!(
                    f,
                    "invalid signature: variadic parameter '{param}' cannot have a default"
                )
            }
            Self::TooManyPositional { callable, max, given } => {
                write!(
                    f,
                    "{callable}() takes {max} positional argument{} but {given} {} given",
                    plural(*max),
                    if *given == 1 { "was" } else { "were" }
                )
            }
            Self::UnexpectedKeyword { callable, keyword } => {
                write!(f, "{callable}() got an unexpected keyword argument '{keyword}'")
            }
            Self::PositionalOnly { callable, param } => {
                write!(
                    f,
                    "{callable}() got a positional-only argument passed as a keyword argument: '{param}'"
                )
            }
            Self::DuplicateArgument { callable, param } => {
                write!(f, "{callable}() got multiple values for argument '{param}'")
            }
            Self::MissingRequired { callable, params } => {
                write!(
                    f,
                    "{callable}() missing {} required argument{}: {}",
                    params.len(),
                    plural(params.len()),
                    join_quoted(params)
                )
            }
            Self::DeferredPlaceholder { callable } => {
                write!(
                    f,
                    "deferred call to {callable}() requires concrete values, not further placeholders"
                )
            }
            Self::DeferredOverwrite { callable, param } => {
                write!(
                    f,
                    "too many arguments for deferred call to {callable}(): \
                     parameter '{param}' already has a concrete value"
                )
            }
            Self::DeferredExcessVariadic {
                callable,
                param,
                expected,
                given,
            } => {
                write!(
                    f,
                    "too many arguments for deferred call to {callable}(): \
                     '*{param}' has {expected} unresolved slot{} but {given} replacement value{} were supplied",
                    plural(*expected),
                    plural(*given)
                )
            }
            Self::DeferredMissing { callable, params } => {
                write!(
                    f,
                    "missing argument{} for deferred call to {callable}(): {}",
                    plural(params.len()),
                    join_quoted(params)
                )
            }
            Self::DeferredResolved { callable } => {
                write!(f, "deferred call to {callable}() has already been resolved")
            }
            Self::ParamAlreadyRegistered { name } => {
                write!(f, "parameter '{name}' already registered")
            }
            Self::RegistryActive => {
                write!(f, "cannot enter parameter registry: another registry is already active")
            }
            Self::NoActiveRegistry { name } => {
                write!(f, "cannot resolve '{name}' outside of an active registry scope")
            }
            Self::ParamNotRegistered { name } => {
                write!(f, "parameter '{name}' has not been set up, cannot resolve reference")
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_required_joins_names() {
        let err = Error::missing_required("f", vec!["a".into()]);
        assert_eq!(err.to_string(), "f() missing 1 required argument: 'a'");

        let err = Error::missing_required("f", vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(err.to_string(), "f() missing 3 required arguments: 'a', 'b', and 'c'");
    }

    #[test]
    fn scope_errors_stay_distinguishable() {
        let outside = Error::no_active_registry("b").to_string();
        let absent = Error::param_not_registered("b").to_string();
        assert_ne!(outside, absent);
        assert!(outside.contains("outside of an active registry scope"));
        assert!(absent.contains("has not been set up"));
    }

    #[test]
    fn too_many_positional_pluralizes() {
        let err = Error::too_many_positional("f", 1, 3);
        assert_eq!(err.to_string(), "f() takes 1 positional argument but 3 were given");
    }
}
