//! The scope-bounded named-parameter registry and its reference handles.
//!
//! A [`Registry`] associates names with value sources for the duration of one
//! scope. At most one registry is active per thread at any time; entering a
//! second while one is active is an error, and the active slot is cleared
//! unconditionally when the scope guard drops (including on unwind). Lookups
//! are addressed to whichever instance is currently active, with distinct
//! errors for "no scope at all" versus "name never registered".

use std::{cell::RefCell, fmt, rc::Rc};

use indexmap::IndexMap;

use crate::{
    error::{Error, Result},
    value::Value,
};

/// A producer of concrete values: the seam to the external value-generation
/// engine.
///
/// The registry stores sources, not raw values, so that lookups have one
/// uniform resolution contract. Concrete values are wrapped in [`Just`] at
/// registration time.
pub trait ValueSource: fmt::Debug {
    /// Produces a concrete value.
    fn provide(&self) -> Value;
}

/// The trivial source: always produces the same value.
#[derive(Debug, Clone, PartialEq)]
pub struct Just(pub Value);

impl ValueSource for Just {
    fn provide(&self) -> Value {
        self.0.clone()
    }
}

type SourceMap = IndexMap<String, Rc<dyn ValueSource>>;

thread_local! {
    /// The currently active registry's sources, if a scope has been entered.
    static ACTIVE: RefCell<Option<Rc<SourceMap>>> = const { RefCell::new(None) };
}

/// A scope-bounded, single-active-instance mapping from name to value source.
///
/// Population happens once, at construction, from two mappings whose names
/// must be collectively unique. The execution model is single-threaded
/// cooperative, so the active-instance slot is thread-local: within a thread
/// the single-active discipline is exact, and threads never share a scope.
#[derive(Debug)]
pub struct Registry {
    sources: Rc<SourceMap>,
}

impl Registry {
    /// Builds a registry from concrete values and ready-made sources.
    ///
    /// Concrete values are wrapped into [`Just`] so every entry resolves the
    /// same way. A name appearing twice, in either mapping or across both,
    /// fails with [`Error::ParamAlreadyRegistered`].
    pub fn new(
        values: impl IntoIterator<Item = (String, Value)>,
        sources: impl IntoIterator<Item = (String, Rc<dyn ValueSource>)>,
    ) -> Result<Self> {
        let mut map = SourceMap::new();
        for (name, source) in sources {
            Self::register(&mut map, name, source)?;
        }
        for (name, value) in values {
            Self::register(&mut map, name, Rc::new(Just(value)))?;
        }
        Ok(Self { sources: Rc::new(map) })
    }

    fn register(map: &mut SourceMap, name: String, source: Rc<dyn ValueSource>) -> Result<()> {
        if map.contains_key(&name) {
            return Err(Error::param_already_registered(&name));
        }
        map.insert(name, source);
        Ok(())
    }

    /// Enters this registry's scope, installing it as the active instance.
    ///
    /// Fails with [`Error::RegistryActive`] if any registry (this one
    /// included) is already active. The returned guard clears the active slot
    /// when dropped, even if the enclosed scope panics.
    pub fn enter(&self) -> Result<RegistryGuard> {
        ACTIVE.with(|active| {
            let mut active = active.borrow_mut();
            if active.is_some() {
                return Err(Error::RegistryActive);
            }
            *active = Some(Rc::clone(&self.sources));
            Ok(())
        })?;
        Ok(RegistryGuard { _private: () })
    }

    /// Looks up a name against whichever registry is currently active.
    ///
    /// The two failure modes stay distinguishable: no active scope at all
    /// ([`Error::NoActiveRegistry`]) versus an active scope that never
    /// registered the name ([`Error::ParamNotRegistered`]).
    pub fn lookup(name: &str) -> Result<Rc<dyn ValueSource>> {
        ACTIVE.with(|active| match active.borrow().as_ref() {
            None => Err(Error::no_active_registry(name)),
            Some(sources) => sources
                .get(name)
                .map(Rc::clone)
                .ok_or_else(|| Error::param_not_registered(name)),
        })
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// True if nothing was registered.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Scope guard returned by [`Registry::enter`].
///
/// Dropping it clears the active-instance slot unconditionally; the scoped
/// acquisition/release pattern guarantees release even when the enclosed
/// scope unwinds.
#[must_use = "the registry stays active only while the guard is alive"]
#[derive(Debug)]
pub struct RegistryGuard {
    _private: (),
}

impl Drop for RegistryGuard {
    fn drop(&mut self) {
        ACTIVE.with(|active| {
            *active.borrow_mut() = None;
        });
    }
}

/// A lightweight, inert handle referencing a parameter by name.
///
/// Nothing happens at construction; resolution consults the registry active
/// at that moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamRef {
    name: String,
}

impl ParamRef {
    /// Creates a handle for the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The referenced name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolves to the value source registered under this name in the active
    /// registry.
    pub fn resolve(&self) -> Result<Rc<dyn ValueSource>> {
        Registry::lookup(&self.name)
    }

    /// Resolves and immediately produces a concrete value.
    pub fn resolve_value(&self) -> Result<Value> {
        Ok(self.resolve()?.provide())
    }
}

impl fmt::Display for ParamRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "param('{}')", self.name)
    }
}
