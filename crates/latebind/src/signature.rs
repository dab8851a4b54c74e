//! Callable signature representation and argument binding.
//!
//! A [`Signature`] describes a callable's formal parameters across all five
//! kinds: positional-only, positional-or-keyword, variadic-positional
//! (`*args`), keyword-only, and variadic-keyword (`**kwargs`). [`Signature::bind`]
//! implements the binding algorithm that assigns a call site's arguments to
//! parameter slots, in either strict or partial mode.

use ahash::AHashSet;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

use crate::{
    args::CallArgs,
    bound::BoundArguments,
    error::{Error, Result},
    slot::Slot,
    value::Value,
};

/// The kind of one formal parameter.
///
/// Kinds appear in a signature in this fixed order, and at most one parameter
/// of each variadic kind may be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
pub enum ParamKind {
    /// Can only be passed by position.
    PositionalOnly,
    /// Can be passed by position or by keyword.
    PositionalOrKeyword,
    /// Collects excess positional arguments (`*args`).
    VariadicPositional,
    /// Can only be passed by keyword.
    KeywordOnly,
    /// Collects excess keyword arguments (`**kwargs`).
    VariadicKeyword,
}

impl ParamKind {
    /// Position of this kind in the fixed signature ordering.
    fn rank(self) -> u8 {
        match self {
            Self::PositionalOnly => 0,
            Self::PositionalOrKeyword => 1,
            Self::VariadicPositional => 2,
            Self::KeywordOnly => 3,
            Self::VariadicKeyword => 4,
        }
    }
}

/// One formal parameter: a name, a kind, and an optional default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    name: String,
    kind: ParamKind,
    default: Option<Value>,
}

impl Param {
    /// Creates a parameter of the given kind with no default.
    pub fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
        }
    }

    /// A positional-only parameter, e.g. `a` in `f(a, /)`.
    pub fn positional_only(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::PositionalOnly)
    }

    /// A positional-or-keyword parameter, the ordinary kind.
    pub fn positional_or_keyword(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::PositionalOrKeyword)
    }

    /// The variadic-positional parameter, e.g. `args` in `f(*args)`.
    pub fn var_args(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::VariadicPositional)
    }

    /// A keyword-only parameter, e.g. `c` in `f(*, c)`.
    pub fn keyword_only(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::KeywordOnly)
    }

    /// The variadic-keyword parameter, e.g. `kwargs` in `f(**kwargs)`.
    pub fn var_kwargs(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::VariadicKeyword)
    }

    /// Attaches a default value, making the parameter optional.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// The parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parameter kind.
    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    /// The default value, if the parameter has one.
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

/// Whether a bind must fill every non-defaulted slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindMode {
    /// Every slot without a default must end up filled (possibly by a
    /// placeholder). Used for the initial call to a wrapped callable.
    Strict,
    /// Slots may be left unfilled. Used for completion supplements.
    Partial,
}

/// A callable's formal signature, grouped by parameter kind.
///
/// Named parameters (everything except the variadic slots) occupy a flat
/// index space in declaration order:
/// `[positional-only][positional-or-keyword][keyword-only]`. The variadic
/// slots sit outside that space and collect overflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    /// Parameters before `/` - positional addressing only.
    pos_only: Vec<Param>,
    /// Ordinary parameters - positional or keyword addressing.
    pos_or_kw: Vec<Param>,
    /// The `*args` parameter, if declared.
    var_args: Option<Param>,
    /// Parameters after `*` or `*args` - keyword addressing only.
    kw_only: Vec<Param>,
    /// The `**kwargs` parameter, if declared.
    var_kwargs: Option<Param>,
}

impl Signature {
    /// Builds a signature from parameters in declaration order.
    ///
    /// # Errors
    /// - duplicate parameter name
    /// - parameter kind out of order (the fixed ordering is positional-only,
    ///   positional-or-keyword, `*args`, keyword-only, `**kwargs`)
    /// - more than one variadic parameter of the same flavor
    /// - a default on a variadic parameter
    pub fn new(params: Vec<Param>) -> Result<Self> {
        let mut sig = Self::default();
        let mut seen: AHashSet<String> = AHashSet::with_capacity(params.len());
        let mut last_rank = 0u8;

        for param in params {
            if !seen.insert(param.name.clone()) {
                return Err(Error::SignatureDuplicateParam { param: param.name });
            }
            let rank = param.kind.rank();
            if rank < last_rank {
                return Err(Error::SignatureKindOrder {
                    param: param.name,
                    kind: param.kind,
                });
            }
            last_rank = rank;

            match param.kind {
                ParamKind::PositionalOnly => sig.pos_only.push(param),
                ParamKind::PositionalOrKeyword => sig.pos_or_kw.push(param),
                ParamKind::KeywordOnly => sig.kw_only.push(param),
                ParamKind::VariadicPositional => {
                    Self::set_variadic(&mut sig.var_args, param)?;
                }
                ParamKind::VariadicKeyword => {
                    Self::set_variadic(&mut sig.var_kwargs, param)?;
                }
            }
        }

        Ok(sig)
    }

    fn set_variadic(slot: &mut Option<Param>, param: Param) -> Result<()> {
        if param.default.is_some() {
            return Err(Error::SignatureVariadicDefault { param: param.name });
        }
        if slot.is_some() {
            return Err(Error::SignatureMultipleVariadic {
                param: param.name,
                kind: param.kind,
            });
        }
        *slot = Some(param);
        Ok(())
    }

    /// Number of named parameter slots (excludes the variadic slots).
    pub fn named_count(&self) -> usize {
        self.pos_only.len() + self.pos_or_kw.len() + self.kw_only.len()
    }

    /// Iterates the named parameters in flat slot order.
    pub fn named_params(&self) -> impl Iterator<Item = &Param> {
        self.pos_only.iter().chain(&self.pos_or_kw).chain(&self.kw_only)
    }

    /// The named parameter at the given flat slot index.
    ///
    /// # Panics
    /// Panics if `index` is out of range; indices come from this signature's
    /// own bind results.
    pub(crate) fn named_param(&self, index: usize) -> &Param {
        self.named_params().nth(index).expect("slot index within signature")
    }

    /// The `*args` parameter, if declared.
    pub fn var_args(&self) -> Option<&Param> {
        self.var_args.as_ref()
    }

    /// The `**kwargs` parameter, if declared.
    pub fn var_kwargs(&self) -> Option<&Param> {
        self.var_kwargs.as_ref()
    }

    /// Iterates the parameters that can be filled positionally, in fill order.
    pub(crate) fn positional_params(&self) -> impl Iterator<Item = &Param> {
        self.pos_only.iter().chain(&self.pos_or_kw)
    }

    /// Iterates keyword-only parameters with their flat slot indices.
    pub(crate) fn keyword_only_params(&self) -> impl Iterator<Item = (usize, &Param)> {
        let offset = self.pos_only.len() + self.pos_or_kw.len();
        self.kw_only.iter().enumerate().map(move |(i, p)| (offset + i, p))
    }

    /// Maximum number of positionally-fillable named slots.
    fn max_positional(&self) -> usize {
        self.pos_only.len() + self.pos_or_kw.len()
    }

    /// Flat slot index of a keyword-addressable parameter, or None.
    ///
    /// Positional-only parameters are deliberately not found here.
    fn keyword_index(&self, name: &str) -> Option<usize> {
        let pos_offset = self.pos_only.len();
        if let Some(i) = self.pos_or_kw.iter().position(|p| p.name == name) {
            return Some(pos_offset + i);
        }
        let kw_offset = pos_offset + self.pos_or_kw.len();
        self.kw_only.iter().position(|p| p.name == name).map(|i| kw_offset + i)
    }

    fn is_positional_only_name(&self, name: &str) -> bool {
        self.pos_only.iter().any(|p| p.name == name)
    }

    /// Binds a call site's arguments to this signature's parameter slots.
    ///
    /// Positional values fill positional-only and positional-or-keyword slots
    /// left to right; excess positional values go to the `*args` slot if one
    /// exists. Keyword values fill by-name matches; unmatched keywords fall
    /// into the `**kwargs` slot if one exists. Defaults are not materialized
    /// here - they are applied when the bound arguments are turned into a
    /// dispatchable call.
    ///
    /// # Errors
    /// - too many positional arguments (no `*args` slot to absorb them)
    /// - unexpected keyword (no matching parameter, no `**kwargs` slot)
    /// - positional-only parameter addressed by keyword (no `**kwargs` slot)
    /// - duplicate assignment of one slot
    /// - missing required argument ([`BindMode::Strict`] only)
    pub fn bind(&self, callable: &str, args: CallArgs, mode: BindMode) -> Result<BoundArguments> {
        let (positional, keywords) = args.into_parts();

        let mut named: Vec<Option<Slot>> = vec![None; self.named_count()];
        let mut var_args_values: Vec<Slot> = Vec::new();
        let mut var_kwargs_values: IndexMap<String, Slot> = IndexMap::new();

        // 1. Positional values, left to right, then overflow into *args.
        let max_positional = self.max_positional();
        let given = positional.len();
        if given > max_positional && self.var_args.is_none() {
            return Err(Error::too_many_positional(callable, max_positional, given));
        }
        for (i, value) in positional.into_iter().enumerate() {
            if i < max_positional {
                named[i] = Some(value);
            } else {
                var_args_values.push(value);
            }
        }

        // 2. Keyword values: by-name matches first, then **kwargs overflow.
        for (key, value) in keywords {
            if let Some(index) = self.keyword_index(&key) {
                if named[index].is_some() {
                    return Err(Error::duplicate_argument(callable, &key));
                }
                named[index] = Some(value);
            } else if self.var_kwargs.is_some() {
                // Positional-only names also land here, matching CPython.
                if var_kwargs_values.insert(key.clone(), value).is_some() {
                    return Err(Error::duplicate_argument(callable, &key));
                }
            } else if self.is_positional_only_name(&key) {
                return Err(Error::positional_only(callable, &key));
            } else {
                return Err(Error::unexpected_keyword(callable, &key));
            }
        }

        // 3. Strict mode: every non-defaulted named slot must be filled.
        if mode == BindMode::Strict {
            let missing: Vec<String> = self
                .named_params()
                .enumerate()
                .filter(|(i, param)| named[*i].is_none() && param.default.is_none())
                .map(|(_, param)| param.name.clone())
                .collect();
            if !missing.is_empty() {
                return Err(Error::missing_required(callable, missing));
            }
        }

        Ok(BoundArguments::from_parts(named, var_args_values, var_kwargs_values))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::slot::Placeholder;

    fn demo_signature() -> Signature {
        // (x, *args, other=None)
        Signature::new(vec![
            Param::positional_or_keyword("x"),
            Param::var_args("args"),
            Param::keyword_only("other").with_default(Value::None),
        ])
        .unwrap()
    }

    #[test]
    fn kind_display_names() {
        assert_eq!(ParamKind::PositionalOnly.to_string(), "positional-only");
        assert_eq!(ParamKind::VariadicPositional.to_string(), "variadic-positional");
        assert_eq!(ParamKind::VariadicKeyword.to_string(), "variadic-keyword");
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = Signature::new(vec![
            Param::positional_or_keyword("a"),
            Param::positional_or_keyword("a"),
        ])
        .unwrap_err();
        assert_eq!(err, Error::SignatureDuplicateParam { param: "a".into() });
    }

    #[test]
    fn rejects_out_of_order_kinds() {
        let err = Signature::new(vec![
            Param::keyword_only("c"),
            Param::positional_or_keyword("a"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            Error::SignatureKindOrder {
                param: "a".into(),
                kind: ParamKind::PositionalOrKeyword,
            }
        );
    }

    #[test]
    fn rejects_second_variadic() {
        let err = Signature::new(vec![Param::var_args("args"), Param::var_args("more")]).unwrap_err();
        assert_eq!(
            err,
            Error::SignatureMultipleVariadic {
                param: "more".into(),
                kind: ParamKind::VariadicPositional,
            }
        );
    }

    #[test]
    fn rejects_variadic_default() {
        let err = Signature::new(vec![Param::var_args("args").with_default(Value::None)]).unwrap_err();
        assert_eq!(err, Error::SignatureVariadicDefault { param: "args".into() });
    }

    #[test]
    fn strict_bind_fills_slots_in_order() {
        let sig = demo_signature();
        let bound = sig
            .bind(
                "demo",
                CallArgs::new().arg(0).arg(1).arg(2).kwarg("other", 3),
                BindMode::Strict,
            )
            .unwrap();
        assert_eq!(bound.get(&sig, "x"), Some(&Slot::from(0)));
        assert_eq!(bound.get(&sig, "other"), Some(&Slot::from(3)));
        assert_eq!(bound.var_args(), &[Slot::from(1), Slot::from(2)]);
    }

    #[test]
    fn strict_bind_reports_missing_by_name() {
        let sig = Signature::new(vec![
            Param::positional_or_keyword("a"),
            Param::positional_or_keyword("b"),
        ])
        .unwrap();
        let err = sig.bind("f", CallArgs::new(), BindMode::Strict).unwrap_err();
        assert_eq!(
            err,
            Error::MissingRequired {
                callable: "f".into(),
                params: vec!["a".into(), "b".into()],
            }
        );
    }

    #[test]
    fn partial_bind_skips_missing_check() {
        let sig = Signature::new(vec![
            Param::positional_or_keyword("a"),
            Param::positional_or_keyword("b"),
        ])
        .unwrap();
        let bound = sig.bind("f", CallArgs::new().arg(1), BindMode::Partial).unwrap();
        assert_eq!(bound.get(&sig, "a"), Some(&Slot::from(1)));
        assert_eq!(bound.get(&sig, "b"), None);
    }

    #[test]
    fn too_many_positional_without_var_args() {
        let sig = Signature::new(vec![Param::positional_or_keyword("a")]).unwrap();
        let err = sig
            .bind("f", CallArgs::new().arg(1).arg(2), BindMode::Strict)
            .unwrap_err();
        assert_eq!(
            err,
            Error::TooManyPositional {
                callable: "f".into(),
                max: 1,
                given: 2,
            }
        );
    }

    #[test]
    fn unexpected_keyword_without_var_kwargs() {
        let sig = Signature::new(vec![Param::positional_or_keyword("a")]).unwrap();
        let err = sig
            .bind("f", CallArgs::new().arg(1).kwarg("zz", 2), BindMode::Strict)
            .unwrap_err();
        assert_eq!(
            err,
            Error::UnexpectedKeyword {
                callable: "f".into(),
                keyword: "zz".into(),
            }
        );
    }

    #[test]
    fn unmatched_keyword_falls_into_var_kwargs() {
        let sig = Signature::new(vec![Param::positional_or_keyword("a"), Param::var_kwargs("kwargs")]).unwrap();
        let bound = sig
            .bind("f", CallArgs::new().arg(1).kwarg("zz", 2), BindMode::Strict)
            .unwrap();
        assert_eq!(bound.var_kwargs().get("zz"), Some(&Slot::from(2)));
    }

    #[test]
    fn positional_only_rejected_as_keyword() {
        let sig = Signature::new(vec![Param::positional_only("a")]).unwrap();
        let err = sig.bind("f", CallArgs::new().kwarg("a", 1), BindMode::Strict).unwrap_err();
        assert_eq!(
            err,
            Error::PositionalOnly {
                callable: "f".into(),
                param: "a".into(),
            }
        );
    }

    #[test]
    fn positional_only_name_absorbed_by_var_kwargs() {
        // Matches CPython: with **kwargs present, a keyword spelled like a
        // positional-only parameter is collected rather than rejected.
        let sig = Signature::new(vec![
            Param::positional_only("a"),
            Param::var_kwargs("kwargs"),
        ])
        .unwrap();
        let bound = sig
            .bind("f", CallArgs::new().arg(1).kwarg("a", 2), BindMode::Strict)
            .unwrap();
        assert_eq!(bound.get(&sig, "a"), Some(&Slot::from(1)));
        assert_eq!(bound.var_kwargs().get("a"), Some(&Slot::from(2)));
    }

    #[test]
    fn duplicate_positional_and_keyword() {
        let sig = Signature::new(vec![Param::positional_or_keyword("a")]).unwrap();
        let err = sig
            .bind("f", CallArgs::new().arg(1).kwarg("a", 2), BindMode::Strict)
            .unwrap_err();
        assert_eq!(
            err,
            Error::DuplicateArgument {
                callable: "f".into(),
                param: "a".into(),
            }
        );
    }

    #[test]
    fn repeated_keyword_is_duplicate() {
        let sig = Signature::new(vec![Param::positional_or_keyword("a")]).unwrap();
        let err = sig
            .bind("f", CallArgs::new().kwarg("a", 1).kwarg("a", 2), BindMode::Strict)
            .unwrap_err();
        assert_eq!(
            err,
            Error::DuplicateArgument {
                callable: "f".into(),
                param: "a".into(),
            }
        );
    }

    #[test]
    fn placeholders_satisfy_strict_bind() {
        let sig = demo_signature();
        let bound = sig
            .bind("demo", CallArgs::new().arg(Placeholder::new()), BindMode::Strict)
            .unwrap();
        assert!(bound.has_placeholder());
    }

    #[test]
    fn defaults_are_not_materialized_at_bind_time() {
        let sig = demo_signature();
        let bound = sig.bind("demo", CallArgs::new().arg(0), BindMode::Strict).unwrap();
        assert_eq!(bound.get(&sig, "other"), None);
    }

    #[test]
    fn signature_serde_round_trip() {
        let sig = demo_signature();
        let json = serde_json::to_string(&sig).unwrap();
        let back: Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sig);
    }
}
