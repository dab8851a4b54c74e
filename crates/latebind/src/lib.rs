#![doc = include_str!("../../../README.md")]

mod args;
mod bound;
mod deferred;
mod error;
mod registry;
mod signature;
mod slot;
mod value;

pub use crate::{
    args::CallArgs,
    bound::BoundArguments,
    deferred::{CallOutcome, DeferredCall, Kwargs, Parametrized, parametrize},
    error::{Error, Result},
    registry::{Just, ParamRef, Registry, RegistryGuard, ValueSource},
    signature::{BindMode, Param, ParamKind, Signature},
    slot::{Placeholder, Slot},
    value::Value,
};
