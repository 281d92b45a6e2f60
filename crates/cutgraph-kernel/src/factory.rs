//! Explicit cut factory: type identifiers mapped to constructors.
//!
//! The host application builds one factory, registers the kinds it needs
//! (built-ins via [`CutFactory::with_builtins`], its own via
//! [`CutFactory::register`]), and hands it to a [`crate::Manager`].

use crate::combinator::{BinaryCut, BinaryRule, MultiCut, MultiRule, NOT_CUT, NotCut};
use crate::cut::Cut;
use crate::error::CutError;
use crate::leaf::{ACCEPT_CUT, AcceptCut, RANDOM_CUT, RandomCut, REJECT_CUT, RejectCut};
use std::collections::BTreeMap;
use std::fmt;

/// Builds a fresh, uninitialized cut.
pub type CutConstructor = Box<dyn Fn() -> Box<dyn Cut> + Send + Sync>;

/// Registry of cut kinds, keyed by type identifier.
#[derive(Default)]
pub struct CutFactory {
    constructors: BTreeMap<String, CutConstructor>,
}

impl CutFactory {
    /// An empty factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory preloaded with every built-in kind.
    pub fn with_builtins() -> Self {
        let mut factory = Self::new();
        // Fresh map, so no id can collide.
        let _ = factory.register_builtins();
        factory
    }

    /// Register every built-in kind listed by [`builtin_kinds`].
    pub fn register_builtins(&mut self) -> Result<(), CutError> {
        self.register_kind::<AcceptCut>(ACCEPT_CUT)?;
        self.register_kind::<RejectCut>(REJECT_CUT)?;
        self.register_kind::<RandomCut>(RANDOM_CUT)?;
        self.register_kind::<NotCut>(NOT_CUT)?;
        for rule in BinaryRule::ALL {
            self.register(rule.type_id(), move || Box::new(BinaryCut::new(rule)))?;
        }
        for rule in MultiRule::ALL {
            self.register(rule.type_id(), move || Box::new(MultiCut::new(rule)))?;
        }
        Ok(())
    }

    pub fn register<F>(
        &mut self,
        type_id: impl Into<String>,
        constructor: F,
    ) -> Result<(), CutError>
    where
        F: Fn() -> Box<dyn Cut> + Send + Sync + 'static,
    {
        let type_id = type_id.into();
        if self.constructors.contains_key(&type_id) {
            return Err(CutError::DuplicateTypeId(type_id));
        }
        tracing::debug!(type_id = %type_id, "cutgraph.factory.register");
        self.constructors.insert(type_id, Box::new(constructor));
        Ok(())
    }

    /// Register a default-constructible kind.
    pub fn register_kind<C>(&mut self, type_id: impl Into<String>) -> Result<(), CutError>
    where
        C: Cut + Default + 'static,
    {
        self.register(type_id, || Box::new(C::default()))
    }

    pub fn has(&self, type_id: &str) -> bool {
        self.constructors.contains_key(type_id)
    }

    /// Remove a kind. Returns whether it was registered.
    pub fn unregister(&mut self, type_id: &str) -> bool {
        self.constructors.remove(type_id).is_some()
    }

    pub fn create(&self, type_id: &str) -> Result<Box<dyn Cut>, CutError> {
        let constructor = self
            .constructors
            .get(type_id)
            .ok_or_else(|| CutError::UnknownTypeId {
                type_id: type_id.to_string(),
            })?;
        Ok(constructor())
    }

    /// Registered type identifiers, sorted.
    pub fn type_ids(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl fmt::Debug for CutFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CutFactory")
            .field("type_ids", &self.type_ids().collect::<Vec<_>>())
            .finish()
    }
}

/// Type identifiers of every built-in kind, in registration order.
pub fn builtin_kinds() -> Vec<&'static str> {
    let mut kinds = vec![ACCEPT_CUT, REJECT_CUT, RANDOM_CUT, NOT_CUT];
    kinds.extend(BinaryRule::ALL.iter().map(|rule| rule.type_id()));
    kinds.extend(MultiRule::ALL.iter().map(|rule| rule.type_id()));
    kinds
}
