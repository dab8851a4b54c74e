//! Bound argument sets and the merge algorithm that resolves placeholders.
//!
//! A [`BoundArguments`] is the result of binding one call site against a
//! [`Signature`]: a slot per named parameter (in flat signature order) plus
//! the variadic overflow sequence and mapping. Merging combines a base set
//! (possibly holding placeholders) with a supplement of concrete values
//! without ever silently overwriting a concrete value.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    signature::Signature,
    slot::Slot,
    value::Value,
};

/// A call's arguments assigned to parameter slots.
///
/// Storage mirrors the governing signature's layout:
/// `[positional-only][positional-or-keyword][keyword-only]` as `named`, with
/// the `*args` sequence and `**kwargs` mapping held separately. `None` in a
/// named slot means "not assigned" - for defaulted parameters the default is
/// applied only when the set is turned into dispatchable values, so an
/// unassigned defaulted slot stays open to late assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundArguments {
    named: Vec<Option<Slot>>,
    var_args: Vec<Slot>,
    var_kwargs: IndexMap<String, Slot>,
}

impl BoundArguments {
    pub(crate) fn from_parts(named: Vec<Option<Slot>>, var_args: Vec<Slot>, var_kwargs: IndexMap<String, Slot>) -> Self {
        Self {
            named,
            var_args,
            var_kwargs,
        }
    }

    /// Looks up the slot assigned to a named parameter.
    ///
    /// Returns `None` when the parameter is unassigned or the name does not
    /// belong to the signature's named parameters.
    pub fn get(&self, signature: &Signature, name: &str) -> Option<&Slot> {
        let index = signature.named_params().position(|p| p.name() == name)?;
        self.named.get(index)?.as_ref()
    }

    /// The values collected into the `*args` slot, in order.
    pub fn var_args(&self) -> &[Slot] {
        &self.var_args
    }

    /// The values collected into the `**kwargs` slot, in insertion order.
    pub fn var_kwargs(&self) -> &IndexMap<String, Slot> {
        &self.var_kwargs
    }

    /// Reports whether any slot, including the variadic ones, still holds a
    /// placeholder.
    pub fn has_placeholder(&self) -> bool {
        self.named.iter().flatten().any(Slot::is_placeholder)
            || self.var_args.iter().any(Slot::is_placeholder)
            || self.var_kwargs.values().any(Slot::is_placeholder)
    }

    /// True iff every non-defaulted slot is assigned and nothing is a
    /// placeholder.
    pub fn is_complete(&self, signature: &Signature) -> bool {
        if self.has_placeholder() {
            return false;
        }
        signature
            .named_params()
            .enumerate()
            .all(|(i, param)| self.named.get(i).is_some_and(Option::is_some) || param.default().is_some())
    }

    /// Names every slot that still holds a placeholder.
    ///
    /// Variadic entries are reported with their position or key, e.g.
    /// `args[1]` or `kwargs[extra]`, so completion errors can name each open
    /// slot precisely.
    pub fn unresolved_names(&self, signature: &Signature) -> Vec<String> {
        let mut names = Vec::new();
        for (i, slot) in self.named.iter().enumerate() {
            if slot.as_ref().is_some_and(Slot::is_placeholder) {
                names.push(signature.named_param(i).name().to_string());
            }
        }
        if let Some(param) = signature.var_args() {
            for (i, slot) in self.var_args.iter().enumerate() {
                if slot.is_placeholder() {
                    names.push(format!("{}[{i}]", param.name()));
                }
            }
        }
        if let Some(param) = signature.var_kwargs() {
            for (key, slot) in &self.var_kwargs {
                if slot.is_placeholder() {
                    names.push(format!("{}[{key}]", param.name()));
                }
            }
        }
        names
    }

    /// Merges a supplement of newly supplied values into this bound set,
    /// producing a new set. `self` is never mutated. Both sets must have been
    /// bound against the given signature.
    ///
    /// Named slots: a supplement value may fill an unassigned slot or replace
    /// a placeholder; replacing a concrete value is an error. The `*args`
    /// sequence: supplement entries replace base placeholders left to right,
    /// and the counts must match exactly - a shortfall fails immediately as
    /// missing (no partial interior fill), a surplus fails as too many. The
    /// `**kwargs` mapping: supplement entries are merged by key; a key whose
    /// base value is concrete is a conflict, a key whose base value is a
    /// placeholder is resolved.
    pub fn merge(&self, signature: &Signature, callable: &str, supplement: &Self) -> Result<Self> {
        let mut merged = self.clone();

        // Named slots.
        for (index, supplied) in supplement.named.iter().enumerate() {
            let Some(supplied) = supplied else { continue };
            if matches!(merged.named[index], Some(Slot::Concrete(_))) {
                return Err(Error::deferred_overwrite(callable, signature.named_param(index).name()));
            }
            merged.named[index] = Some(supplied.clone());
        }

        // The *args slot: replace placeholders positionally, in order.
        if !supplement.var_args.is_empty() || merged.var_args.iter().any(Slot::is_placeholder) {
            let open = merged.var_args.iter().filter(|s| s.is_placeholder()).count();
            let supplied = supplement.var_args.len();
            let param = signature.var_args().map_or("args", |p| p.name());
            if supplied > open {
                return Err(Error::deferred_excess_variadic(callable, param, open, supplied));
            }
            if supplied < open && supplied > 0 {
                // Partial fill would leave an ambiguous set of open slots, so
                // report the shortfall immediately.
                let still_open: Vec<String> = merged
                    .var_args
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.is_placeholder())
                    .skip(supplied)
                    .map(|(i, _)| format!("{param}[{i}]"))
                    .collect();
                return Err(Error::deferred_missing(callable, still_open));
            }
            let mut replacements = supplement.var_args.iter().cloned();
            if supplied > 0 {
                for slot in &mut merged.var_args {
                    if slot.is_placeholder()
                        && let Some(replacement) = replacements.next()
                    {
                        *slot = replacement;
                    }
                }
            }
        }

        // The **kwargs slot: merge by key.
        for (key, supplied) in &supplement.var_kwargs {
            if matches!(merged.var_kwargs.get(key), Some(Slot::Concrete(_))) {
                let param = signature.var_kwargs().map_or("kwargs", |p| p.name());
                return Err(Error::deferred_overwrite(callable, &format!("{param}[{key}]")));
            }
            merged.var_kwargs.insert(key.clone(), supplied.clone());
        }

        Ok(merged)
    }

    /// Converts into the positional and keyword values for dispatch, applying
    /// defaults for unassigned defaulted slots.
    ///
    /// Fails if any slot is still a placeholder or a required slot is
    /// unassigned; callers are expected to have validated completeness, so
    /// this is a final guard rather than the primary check.
    pub fn into_call_parts(self, signature: &Signature, callable: &str) -> Result<(Vec<Value>, IndexMap<String, Value>)> {
        if self.has_placeholder() {
            return Err(Error::deferred_missing(callable, self.unresolved_names(signature)));
        }

        let mut named_iter = self.named.into_iter();
        let mut positional = Vec::new();
        for param in signature.positional_params() {
            let slot = named_iter.next().flatten();
            match slot {
                Some(Slot::Concrete(value)) => positional.push(value),
                _ => match param.default() {
                    Some(default) => positional.push(default.clone()),
                    None => {
                        return Err(Error::missing_required(callable, vec![param.name().to_string()]));
                    }
                },
            }
        }
        for slot in self.var_args {
            positional.push(slot.into_value().expect("placeholders checked above"));
        }

        let mut keyword = IndexMap::new();
        for (_, param) in signature.keyword_only_params() {
            let slot = named_iter.next().flatten();
            match slot {
                Some(Slot::Concrete(value)) => {
                    keyword.insert(param.name().to_string(), value);
                }
                _ => match param.default() {
                    Some(default) => {
                        keyword.insert(param.name().to_string(), default.clone());
                    }
                    None => {
                        return Err(Error::missing_required(callable, vec![param.name().to_string()]));
                    }
                },
            }
        }
        for (key, slot) in self.var_kwargs {
            keyword.insert(key, slot.into_value().expect("placeholders checked above"));
        }

        Ok((positional, keyword))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        args::CallArgs,
        signature::{BindMode, Param},
        slot::Placeholder,
    };

    fn demo_signature() -> Signature {
        // (x, *args, other=None)
        Signature::new(vec![
            Param::positional_or_keyword("x"),
            Param::var_args("args"),
            Param::keyword_only("other").with_default(Value::None),
        ])
        .unwrap()
    }

    fn bind(sig: &Signature, args: CallArgs, mode: BindMode) -> BoundArguments {
        sig.bind("demo", args, mode).unwrap()
    }

    #[test]
    fn placeholder_predicate_covers_variadic_slots() {
        let sig = demo_signature();
        let concrete = bind(&sig, CallArgs::new().arg(0).arg(1), BindMode::Strict);
        assert!(!concrete.has_placeholder());

        let in_var_args = bind(
            &sig,
            CallArgs::new().arg(0).arg(Placeholder::new()),
            BindMode::Strict,
        );
        assert!(in_var_args.has_placeholder());

        let sig_kw = Signature::new(vec![Param::var_kwargs("kwargs")]).unwrap();
        let in_var_kwargs = sig_kw
            .bind("f", CallArgs::new().kwarg("k", Placeholder::new()), BindMode::Strict)
            .unwrap();
        assert!(in_var_kwargs.has_placeholder());
    }

    #[test]
    fn merge_fills_placeholder_named_slot() {
        let sig = demo_signature();
        let base = bind(&sig, CallArgs::new().arg(Placeholder::new()), BindMode::Strict);
        let supplement = bind(&sig, CallArgs::new().arg(7), BindMode::Partial);
        let merged = base.merge(&sig, "demo", &supplement).unwrap();
        assert_eq!(merged.get(&sig, "x"), Some(&Slot::from(7)));
        // The base is untouched.
        assert!(base.has_placeholder());
    }

    #[test]
    fn merge_rejects_concrete_overwrite_even_with_equal_value() {
        let sig = Signature::new(vec![
            Param::positional_or_keyword("a"),
            Param::positional_or_keyword("b"),
        ])
        .unwrap();
        let base = sig
            .bind("f", CallArgs::new().arg(Placeholder::new()).arg(2), BindMode::Strict)
            .unwrap();
        let supplement = sig.bind("f", CallArgs::new().arg(1).arg(2), BindMode::Partial).unwrap();
        let err = base.merge(&sig, "f", &supplement).unwrap_err();
        assert_eq!(
            err,
            Error::DeferredOverwrite {
                callable: "f".into(),
                param: "b".into(),
            }
        );
    }

    #[test]
    fn merge_fills_unassigned_defaulted_slot() {
        let sig = demo_signature();
        let base = bind(&sig, CallArgs::new().arg(Placeholder::new()), BindMode::Strict);
        let supplement = bind(&sig, CallArgs::new().arg(1).kwarg("other", 9), BindMode::Partial);
        let merged = base.merge(&sig, "demo", &supplement).unwrap();
        assert_eq!(merged.get(&sig, "other"), Some(&Slot::from(9)));
    }

    #[test]
    fn merge_replaces_var_args_placeholders_in_order() {
        let sig = demo_signature();
        let base = bind(
            &sig,
            CallArgs::new()
                .arg(Placeholder::new())
                .arg(1)
                .arg(Placeholder::new())
                .arg(Placeholder::new()),
            BindMode::Strict,
        );
        let supplement = bind(&sig, CallArgs::new().arg(0).arg(5).arg(6), BindMode::Partial);
        let merged = base.merge(&sig, "demo", &supplement).unwrap();
        assert_eq!(merged.var_args(), &[Slot::from(1), Slot::from(5), Slot::from(6)]);
    }

    #[test]
    fn merge_rejects_var_args_surplus() {
        let sig = demo_signature();
        let base = bind(
            &sig,
            CallArgs::new().arg(Placeholder::new()).arg(Placeholder::new()),
            BindMode::Strict,
        );
        // One placeholder open in *args, two replacements supplied.
        let supplement = bind(&sig, CallArgs::new().arg(0).arg(5).arg(6), BindMode::Partial);
        let err = base.merge(&sig, "demo", &supplement).unwrap_err();
        assert_eq!(
            err,
            Error::DeferredExcessVariadic {
                callable: "demo".into(),
                param: "args".into(),
                expected: 1,
                given: 2,
            }
        );
    }

    #[test]
    fn merge_reports_var_args_shortfall_immediately() {
        let sig = demo_signature();
        let base = bind(
            &sig,
            CallArgs::new()
                .arg(Placeholder::new())
                .arg(Placeholder::new())
                .arg(Placeholder::new()),
            BindMode::Strict,
        );
        // Two placeholders open in *args, one replacement supplied.
        let supplement = bind(&sig, CallArgs::new().arg(0).arg(5), BindMode::Partial);
        let err = base.merge(&sig, "demo", &supplement).unwrap_err();
        assert_eq!(
            err,
            Error::DeferredMissing {
                callable: "demo".into(),
                params: vec!["args[1]".into()],
            }
        );
    }

    #[test]
    fn merge_var_kwargs_by_key() {
        let sig = Signature::new(vec![Param::var_kwargs("kwargs")]).unwrap();
        let base = sig
            .bind(
                "f",
                CallArgs::new().kwarg("open", Placeholder::new()).kwarg("done", 1),
                BindMode::Strict,
            )
            .unwrap();

        // Placeholder at a key is resolved; a new key is inserted.
        let supplement = sig
            .bind("f", CallArgs::new().kwarg("open", 2).kwarg("extra", 3), BindMode::Partial)
            .unwrap();
        let merged = base.merge(&sig, "f", &supplement).unwrap();
        assert_eq!(merged.var_kwargs().get("open"), Some(&Slot::from(2)));
        assert_eq!(merged.var_kwargs().get("extra"), Some(&Slot::from(3)));

        // A concrete key conflicts.
        let conflicting = sig
            .bind("f", CallArgs::new().kwarg("done", 1), BindMode::Partial)
            .unwrap();
        let err = base.merge(&sig, "f", &conflicting).unwrap_err();
        assert_eq!(
            err,
            Error::DeferredOverwrite {
                callable: "f".into(),
                param: "kwargs[done]".into(),
            }
        );
    }

    #[test]
    fn unresolved_names_cover_every_open_slot() {
        let sig = demo_signature();
        let bound = bind(
            &sig,
            CallArgs::new()
                .arg(Placeholder::new())
                .arg(1)
                .arg(Placeholder::new())
                .kwarg("other", Placeholder::new()),
            BindMode::Strict,
        );
        assert_eq!(
            bound.unresolved_names(&sig),
            vec!["x".to_string(), "other".to_string(), "args[1]".to_string()]
        );
    }

    #[test]
    fn into_call_parts_applies_defaults() {
        let sig = demo_signature();
        let bound = bind(&sig, CallArgs::new().arg(0).arg(1), BindMode::Strict);
        let (positional, keyword) = bound.into_call_parts(&sig, "demo").unwrap();
        assert_eq!(positional, vec![Value::Int(0), Value::Int(1)]);
        assert_eq!(keyword.get("other"), Some(&Value::None));
    }

    #[test]
    fn into_call_parts_rejects_open_slots() {
        let sig = demo_signature();
        let bound = bind(&sig, CallArgs::new().arg(Placeholder::new()), BindMode::Strict);
        let err = bound.into_call_parts(&sig, "demo").unwrap_err();
        assert_eq!(
            err,
            Error::DeferredMissing {
                callable: "demo".into(),
                params: vec!["x".into()],
            }
        );
    }

    #[test]
    fn completeness_requires_required_slots_and_no_placeholders() {
        let sig = demo_signature();
        let complete = bind(&sig, CallArgs::new().arg(0), BindMode::Strict);
        assert!(complete.is_complete(&sig));

        let open = bind(&sig, CallArgs::new().arg(Placeholder::new()), BindMode::Strict);
        assert!(!open.is_complete(&sig));

        let partial = sig.bind("demo", CallArgs::new(), BindMode::Partial).unwrap();
        assert!(!partial.is_complete(&sig));
    }
}
