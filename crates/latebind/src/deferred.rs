//! Deferred calls and the `parametrize` wrapping factory.
//!
//! Wrapping a callable does not change its call surface: calling it with only
//! concrete arguments binds and dispatches immediately, while any placeholder
//! argument suspends the invocation into a [`DeferredCall`] that can be
//! completed later with the missing concrete values.

use std::{fmt, rc::Rc};

use indexmap::IndexMap;

use crate::{
    args::CallArgs,
    bound::BoundArguments,
    error::{Error, Result},
    signature::{BindMode, Signature},
    value::Value,
};

/// Keyword arguments as delivered to the underlying callable.
pub type Kwargs = IndexMap<String, Value>;

/// The callable seam: final positional and keyword values in, a result out.
///
/// Shared between the wrapper and any deferred calls it spawns; the single
/// threaded execution model makes `Rc` the right sharing primitive.
type CallFn = Rc<dyn Fn(Vec<Value>, Kwargs) -> Result<Value>>;

/// Wraps a callable so that placeholder arguments defer the invocation.
///
/// This is the explicit factory form of the wrapping contract: the caller
/// supplies the signature rather than having it reflected off the callable,
/// which keeps signature construction an adapter concern at the boundary.
pub fn parametrize<F>(name: impl Into<String>, signature: Signature, call: F) -> Parametrized
where
    F: Fn(Vec<Value>, Kwargs) -> Result<Value> + 'static,
{
    Parametrized {
        name: name.into(),
        signature: Rc::new(signature),
        call: Rc::new(call),
    }
}

/// The result of calling a [`Parametrized`] callable.
#[derive(Debug)]
pub enum CallOutcome {
    /// All arguments were concrete; the callable ran and this is its result.
    Value(Value),
    /// At least one argument was a placeholder; the invocation is suspended.
    Deferred(DeferredCall),
}

impl CallOutcome {
    /// Unwraps an immediate value, if this outcome is one.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Deferred(_) => None,
        }
    }

    /// Unwraps a deferred call, if this outcome is one.
    pub fn into_deferred(self) -> Option<DeferredCall> {
        match self {
            Self::Value(_) => None,
            Self::Deferred(deferred) => Some(deferred),
        }
    }
}

/// A callable wrapped with deferred-binding behavior.
pub struct Parametrized {
    name: String,
    signature: Rc<Signature>,
    call: CallFn,
}

impl Parametrized {
    /// Invokes the wrapped callable.
    ///
    /// Arguments are bound strictly against the signature. With zero
    /// placeholders the callable is dispatched immediately and its result
    /// (or error) passes through unchanged. With one or more placeholders a
    /// [`DeferredCall`] is returned and the callable is not invoked.
    pub fn call(&self, args: CallArgs) -> Result<CallOutcome> {
        let bound = self.signature.bind(&self.name, args, BindMode::Strict)?;
        if bound.has_placeholder() {
            return Ok(CallOutcome::Deferred(DeferredCall {
                name: self.name.clone(),
                signature: Rc::clone(&self.signature),
                bound,
                call: Rc::clone(&self.call),
                resolved: false,
            }));
        }
        let (positional, keyword) = bound.into_call_parts(&self.signature, &self.name)?;
        (self.call)(positional, keyword).map(CallOutcome::Value)
    }

    /// The callable's name, used in every error message.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The governing signature.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

impl fmt::Debug for Parametrized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parametrized")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// A suspended invocation awaiting completion of its unresolved slots.
///
/// Two externally visible states: pending (completable) and resolved
/// (dispatched, terminal). A failed completion attempt raises and leaves the
/// call pending with its stored arguments untouched, so a corrected retry is
/// always possible.
pub struct DeferredCall {
    name: String,
    signature: Rc<Signature>,
    bound: BoundArguments,
    call: CallFn,
    resolved: bool,
}

impl DeferredCall {
    /// Completes the call with additional arguments and dispatches if every
    /// slot resolves.
    ///
    /// The new arguments are bound partially against the same signature; the
    /// resulting supplement must itself be fully concrete (placeholders may
    /// not be nested across completion rounds). The supplement is merged into
    /// the stored arguments per the merge rules; if the merged set still has
    /// open slots the attempt fails naming each one. On success the callable
    /// runs with the final values and the call becomes resolved. Errors from
    /// the callable itself propagate unmodified and leave the call pending -
    /// only a fully successful completion consumes it.
    pub fn complete(&mut self, args: CallArgs) -> Result<Value> {
        if self.resolved {
            return Err(Error::deferred_resolved(&self.name));
        }
        let supplement = self.signature.bind(&self.name, args, BindMode::Partial)?;
        if supplement.has_placeholder() {
            return Err(Error::deferred_placeholder(&self.name));
        }
        let merged = self.bound.merge(&self.signature, &self.name, &supplement)?;
        if merged.has_placeholder() {
            return Err(Error::deferred_missing(
                &self.name,
                merged.unresolved_names(&self.signature),
            ));
        }
        let (positional, keyword) = merged.into_call_parts(&self.signature, &self.name)?;
        let result = (self.call)(positional, keyword)?;
        self.resolved = true;
        Ok(result)
    }

    /// The wrapped callable's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True once a completion has successfully dispatched the callable.
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Names of the slots still awaiting concrete values.
    pub fn missing(&self) -> Vec<String> {
        self.bound.unresolved_names(&self.signature)
    }

    /// The argument snapshot taken when the call was deferred.
    pub fn bound(&self) -> &BoundArguments {
        &self.bound
    }
}

impl fmt::Debug for DeferredCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredCall")
            .field("name", &self.name)
            .field("bound", &self.bound)
            .field("resolved", &self.resolved)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for DeferredCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "deferred_{}", self.name)
    }
}
