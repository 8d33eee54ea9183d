//! Memoized named properties
//!
//! [`LazyProps`] holds named properties whose values are computed on first
//! access and cached afterwards. Resolvers may read other properties of the
//! same set; a resolver that reaches back to itself fails with
//! `SelfReferential` instead of recursing forever.

use ahash::AHashMap;
use seqmap_core::{Key, Object, Result, SeqError, Value};
use std::cell::{Cell, OnceCell};
use std::fmt;
use std::rc::Rc;
use tracing::trace;

/// Property resolver; receives the property set it belongs to
pub type Resolver = Rc<dyn Fn(&LazyProps) -> Result<Value>>;

struct Prop {
    resolver: Resolver,
    cached: OnceCell<Value>,
    read_only: bool,
    resolving: Cell<bool>,
}

impl Prop {
    fn new(resolver: Resolver, read_only: bool) -> Self {
        Self {
            resolver,
            cached: OnceCell::new(),
            read_only,
            resolving: Cell::new(false),
        }
    }
}

/// Named, lazily resolved and memoized properties
#[derive(Default)]
pub struct LazyProps {
    type_name: String,
    props: AHashMap<String, Prop>,
    order: Vec<String>,
}

impl LazyProps {
    /// Empty property set reported under `type_name`
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    /// Define a writable property computed by `resolver`
    pub fn with(self, name: impl Into<String>, resolver: impl Fn(&LazyProps) -> Result<Value> + 'static) -> Self {
        self.define(name.into(), Rc::new(resolver), false)
    }

    /// Define a read-only property computed by `resolver`
    pub fn with_read_only(
        self,
        name: impl Into<String>,
        resolver: impl Fn(&LazyProps) -> Result<Value> + 'static,
    ) -> Self {
        self.define(name.into(), Rc::new(resolver), true)
    }

    fn define(mut self, name: String, resolver: Resolver, read_only: bool) -> Self {
        if !self.props.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.props.insert(name, Prop::new(resolver, read_only));
        self
    }

    /// Property names in definition order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Whether `name` is defined
    pub fn contains(&self, name: &str) -> bool {
        self.props.contains_key(name)
    }

    /// Whether `name` already holds a value
    pub fn is_resolved(&self, name: &str) -> bool {
        self.props
            .get(name)
            .is_some_and(|prop| prop.cached.get().is_some())
    }

    /// Value of `name`, resolving it on first access
    pub fn get(&self, name: &str) -> Result<Value> {
        let prop = self
            .props
            .get(name)
            .ok_or_else(|| SeqError::UndefinedKey(Key::from(name)))?;

        if let Some(value) = prop.cached.get() {
            return Ok(value.clone());
        }
        if prop.resolving.get() {
            return Err(SeqError::SelfReferential {
                type_name: format!("{}::{}", self.type_name, name),
            });
        }
        let resolver = Rc::clone(&prop.resolver);
        trace!(property = name, "resolving lazy property");
        prop.resolving.set(true);
        let resolved = resolver(self);
        prop.resolving.set(false);

        let value = resolved?;
        // a nested resolution may have filled the slot already; keep the first value
        Ok(prop.cached.get_or_init(|| value).clone())
    }

    /// Overwrite `name` with `value`
    ///
    /// Fails with `ReadOnlyViolation` for read-only properties and with
    /// `UndefinedKey` for names that were never defined.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let prop = self
            .props
            .get_mut(name)
            .ok_or_else(|| SeqError::UndefinedKey(Key::from(name)))?;
        if prop.read_only {
            return Err(SeqError::ReadOnlyViolation(format!("{}::{}", self.type_name, name)));
        }

        prop.cached = OnceCell::from(value.into());
        Ok(())
    }

    /// Drop the cached value of `name` so the next read resolves it again
    pub fn reset(&mut self, name: &str) -> Result<()> {
        let prop = self
            .props
            .get_mut(name)
            .ok_or_else(|| SeqError::UndefinedKey(Key::from(name)))?;
        prop.cached = OnceCell::new();
        Ok(())
    }
}

impl fmt::Debug for LazyProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for name in &self.order {
            match self.props.get(name).and_then(|prop| prop.cached.get()) {
                Some(value) => map.entry(name, value),
                None => map.entry(name, &format_args!("<unresolved>")),
            };
        }
        map.finish()
    }
}

impl Object for LazyProps {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn property(&self, name: &str) -> Option<Value> {
        self.get(name).ok()
    }
}
