//! In-memory configuration: ordered sections, one per cut.
//!
//! The kernel does not parse any text format. Loaders (see the
//! `cutgraph-config` crate) produce a [`CutConfig`].

use crate::params::{ParamValue, Params};
use serde::Serialize;

/// One cut to build: its name, the type id to create, and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CutSection {
    pub name: String,
    pub type_id: String,
    pub params: Params,
}

impl CutSection {
    pub fn new(name: impl Into<String>, type_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_id: type_id.into(),
            params: Params::new(),
        }
    }

    /// Builder-style parameter insert.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key, value);
        self
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }
}

/// Ordered list of sections. Order is significant: it is the order in
/// which cuts are inserted and initialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CutConfig {
    sections: Vec<CutSection>,
}

impl CutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style push.
    pub fn with(mut self, section: CutSection) -> Self {
        self.sections.push(section);
        self
    }

    pub fn push(&mut self, section: CutSection) {
        self.sections.push(section);
    }

    pub fn sections(&self) -> &[CutSection] {
        &self.sections
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CutSection> {
        self.sections.iter()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl Extend<CutSection> for CutConfig {
    fn extend<I: IntoIterator<Item = CutSection>>(&mut self, iter: I) {
        self.sections.extend(iter);
    }
}

impl FromIterator<CutSection> for CutConfig {
    fn from_iter<I: IntoIterator<Item = CutSection>>(iter: I) -> Self {
        Self {
            sections: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for CutConfig {
    type Item = CutSection;
    type IntoIter = std::vec::IntoIter<CutSection>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.into_iter()
    }
}

impl<'a> IntoIterator for &'a CutConfig {
    type Item = &'a CutSection;
    type IntoIter = std::slice::Iter<'a, CutSection>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}
