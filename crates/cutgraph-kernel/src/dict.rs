//! Cut dictionary: the arena that owns cuts.
//!
//! Entries are kept in insertion order. A [`CutHandle`] is an index into
//! the arena; combinators hold handles, never cuts. Each entry sits in its
//! own `RefCell`, so evaluating one cut can evaluate its children through
//! a shared `&CutDict`. Re-entering a cut that is already being evaluated
//! is reported as [`CutError::CyclicReference`].

use crate::cut::{Counters, Cut, UserData};
use crate::error::CutError;
use crate::params::Params;
use crate::services::ServiceRegistry;
use crate::status::SelectionStatus;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fmt::Write as _;

/// Non-owning reference to a cut held by a [`CutDict`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CutHandle(usize);

impl CutHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for CutHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct CutEntry {
    name: String,
    type_id: String,
    cut: RefCell<Box<dyn Cut>>,
}

/// Serializable snapshot of one cut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CutSummary {
    pub name: String,
    pub type_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub initialized: bool,
    pub counters: Counters,
    pub processed: u64,
    pub children: Vec<String>,
}

/// Ordered, name-indexed arena of cuts.
#[derive(Default)]
pub struct CutDict {
    entries: Vec<CutEntry>,
    index: BTreeMap<String, CutHandle>,
}

impl CutDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a cut under `name`, recording its own kind as type id.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        cut: Box<dyn Cut>,
    ) -> Result<CutHandle, CutError> {
        let type_id = cut.kind().to_string();
        self.insert_as(name, type_id, cut)
    }

    /// Insert a cut under `name`, recording the type id it was created from.
    pub fn insert_as(
        &mut self,
        name: impl Into<String>,
        type_id: impl Into<String>,
        cut: Box<dyn Cut>,
    ) -> Result<CutHandle, CutError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(CutError::DuplicateName(name));
        }
        let handle = CutHandle(self.entries.len());
        self.index.insert(name.clone(), handle);
        self.entries.push(CutEntry {
            name,
            type_id: type_id.into(),
            cut: RefCell::new(cut),
        });
        Ok(handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn handle(&self, name: &str) -> Option<CutHandle> {
        self.index.get(name).copied()
    }

    /// Resolve a sibling reference on behalf of `owner` (a cut label).
    pub fn resolve(&self, owner: &str, name: &str) -> Result<CutHandle, CutError> {
        self.handle(name).ok_or_else(|| CutError::MissingReference {
            cut: owner.to_string(),
            reference: name.to_string(),
        })
    }

    /// A borrowed view of the cut registered under `name`.
    pub fn get(&self, name: &str) -> Option<CutRef<'_>> {
        self.handle(name).map(|handle| CutRef { cuts: self, handle })
    }

    pub fn name_of(&self, handle: CutHandle) -> Option<&str> {
        self.entries.get(handle.0).map(|e| e.name.as_str())
    }

    pub fn type_id_of(&self, handle: CutHandle) -> Option<&str> {
        self.entries.get(handle.0).map(|e| e.type_id.as_str())
    }

    /// Names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Handles in insertion order.
    pub fn handles(&self) -> impl Iterator<Item = CutHandle> + use<> {
        (0..self.entries.len()).map(CutHandle)
    }

    fn entry(&self, handle: CutHandle) -> Result<&CutEntry, CutError> {
        self.entries
            .get(handle.0)
            .ok_or_else(|| CutError::UnboundHandle {
                cut: "cut dictionary".to_string(),
                slot: handle.to_string(),
            })
    }

    /// Run `f` against a shared borrow of the cut at `handle`.
    pub fn with_cut<R>(
        &self,
        handle: CutHandle,
        f: impl FnOnce(&dyn Cut) -> R,
    ) -> Result<R, CutError> {
        let entry = self.entry(handle)?;
        let cut = entry
            .cut
            .try_borrow()
            .map_err(|_| CutError::CyclicReference {
                path: vec![entry.name.clone()],
            })?;
        Ok(f(&**cut))
    }

    /// Run `f` against an exclusive borrow of the cut at `handle`.
    pub fn with_cut_mut<R>(
        &self,
        handle: CutHandle,
        f: impl FnOnce(&mut dyn Cut) -> R,
    ) -> Result<R, CutError> {
        let entry = self.entry(handle)?;
        let mut cut = entry
            .cut
            .try_borrow_mut()
            .map_err(|_| CutError::CyclicReference {
                path: vec![entry.name.clone()],
            })?;
        Ok(f(&mut **cut))
    }

    /// Initialize the cut at `handle` against this dictionary.
    pub fn initialize(
        &self,
        handle: CutHandle,
        params: &Params,
        services: &ServiceRegistry,
    ) -> Result<(), CutError> {
        self.with_cut_mut(handle, |cut| cut.initialize(params, services, self))?
    }

    /// Reset the cut at `handle`.
    pub fn reset(&self, handle: CutHandle) -> Result<(), CutError> {
        self.with_cut_mut(handle, |cut| cut.reset())?
    }

    /// Evaluate the cut at `handle`.
    pub fn process(&self, handle: CutHandle) -> Result<SelectionStatus, CutError> {
        self.with_cut_mut(handle, |cut| cut.process(self))?
    }

    pub fn children_of(&self, handle: CutHandle) -> Result<Vec<CutHandle>, CutError> {
        self.with_cut(handle, |cut| cut.children())
    }

    /// Attach `data` to the cut at `handle` and to every cut below it.
    pub fn set_user_data(&self, handle: CutHandle, data: UserData) -> Result<(), CutError> {
        self.visit_subtree(handle, |cut| cut.set_user_data(data.clone()))
    }

    /// Detach user data from the cut at `handle` and every cut below it.
    pub fn reset_user_data(&self, handle: CutHandle) -> Result<(), CutError> {
        self.visit_subtree(handle, |cut| cut.reset_user_data())
    }

    fn visit_subtree(
        &self,
        root: CutHandle,
        mut f: impl FnMut(&mut dyn Cut),
    ) -> Result<(), CutError> {
        let mut seen = BTreeSet::new();
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            if !seen.insert(handle) {
                continue;
            }
            let children = self.with_cut_mut(handle, |cut| {
                f(cut);
                cut.children()
            })?;
            stack.extend(children.into_iter().rev());
        }
        Ok(())
    }

    /// First reference cycle found, as a closed path of names.
    ///
    /// Depth-first over every entry in insertion order.
    pub fn find_cycle(&self) -> Result<Option<Vec<String>>, CutError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            OnPath,
            Done,
        }

        let mut marks = vec![Mark::Unvisited; self.entries.len()];
        for root in self.handles() {
            if marks[root.0] != Mark::Unvisited {
                continue;
            }
            // (node, its children, next child to visit)
            let mut path: Vec<(CutHandle, Vec<CutHandle>, usize)> =
                vec![(root, self.children_of(root)?, 0)];
            marks[root.0] = Mark::OnPath;

            while let Some((node, children, next)) = path.last_mut() {
                let Some(&child) = children.get(*next) else {
                    marks[node.0] = Mark::Done;
                    path.pop();
                    continue;
                };
                *next += 1;
                self.entry(child)?;
                match marks[child.0] {
                    Mark::Done => {}
                    Mark::OnPath => {
                        let start = path.iter().position(|(h, _, _)| *h == child).unwrap_or(0);
                        let mut cycle: Vec<String> = path[start..]
                            .iter()
                            .map(|(h, _, _)| self.entries[h.0].name.clone())
                            .collect();
                        cycle.push(self.entries[child.0].name.clone());
                        return Ok(Some(cycle));
                    }
                    Mark::Unvisited => {
                        marks[child.0] = Mark::OnPath;
                        let grandchildren = self.children_of(child)?;
                        path.push((child, grandchildren, 0));
                    }
                }
            }
        }
        Ok(None)
    }

    pub fn summary(&self, handle: CutHandle) -> Result<CutSummary, CutError> {
        let entry = self.entry(handle)?;
        self.with_cut(handle, |cut| {
            let base = cut.base();
            let counters = base.counters();
            CutSummary {
                name: entry.name.clone(),
                type_id: entry.type_id.clone(),
                description: base.description().map(str::to_string),
                version: base.version().map(str::to_string),
                initialized: base.is_initialized(),
                counters,
                processed: counters.processed(),
                children: cut
                    .children()
                    .into_iter()
                    .map(|h| self.name_of(h).unwrap_or("?").to_string())
                    .collect(),
            }
        })
    }

    /// Summaries of every cut, in insertion order.
    pub fn summaries(&self) -> Result<Vec<CutSummary>, CutError> {
        self.handles().map(|h| self.summary(h)).collect()
    }

    /// Indented, human-readable dump of every cut.
    pub fn tree_dump(&self) -> Result<String, CutError> {
        let mut out = String::new();
        for summary in self.summaries()? {
            let state = if summary.initialized {
                "initialized"
            } else {
                "uninitialized"
            };
            let _ = writeln!(
                out,
                "{} [{}] {state} processed={} accepted={} rejected={} inapplicable={}",
                summary.name,
                summary.type_id,
                summary.processed,
                summary.counters.accepted,
                summary.counters.rejected,
                summary.counters.inapplicable,
            );
            if let Some(description) = &summary.description {
                let _ = writeln!(out, "  description: {description}");
            }
            let last = summary.children.len().saturating_sub(1);
            for (i, child) in summary.children.iter().enumerate() {
                let tag = if i == last { "`-" } else { "|-" };
                let _ = writeln!(out, "  {tag} {child}");
            }
        }
        Ok(out)
    }

    /// Reset every initialized cut, then drop them all.
    pub fn clear(&mut self) {
        for entry in &mut self.entries {
            let cut = entry.cut.get_mut();
            if cut.is_initialized() {
                let _ = cut.reset();
            }
        }
        self.entries.clear();
        self.index.clear();
    }
}

impl fmt::Debug for CutDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CutDict")
            .field("cuts", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

/// A cut looked up by name, bundled with the dictionary it lives in.
#[derive(Clone, Copy)]
pub struct CutRef<'a> {
    cuts: &'a CutDict,
    handle: CutHandle,
}

impl<'a> CutRef<'a> {
    pub fn handle(&self) -> CutHandle {
        self.handle
    }

    pub fn name(&self) -> &'a str {
        self.cuts.name_of(self.handle).unwrap_or("?")
    }

    pub fn type_id(&self) -> &'a str {
        self.cuts.type_id_of(self.handle).unwrap_or("?")
    }

    pub fn process(&self) -> Result<SelectionStatus, CutError> {
        self.cuts.process(self.handle)
    }

    pub fn set_user_data(&self, data: UserData) -> Result<(), CutError> {
        self.cuts.set_user_data(self.handle, data)
    }

    pub fn reset_user_data(&self) -> Result<(), CutError> {
        self.cuts.reset_user_data(self.handle)
    }

    pub fn counters(&self) -> Result<Counters, CutError> {
        self.cuts.with_cut(self.handle, |cut| cut.counters())
    }

    pub fn summary(&self) -> Result<CutSummary, CutError> {
        self.cuts.summary(self.handle)
    }
}

impl fmt::Debug for CutRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CutRef")
            .field("name", &self.name())
            .field("handle", &self.handle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinator::{BinaryCut, BinaryRule, NotCut};
    use crate::leaf::{AcceptCut, RejectCut};
    use std::sync::Arc;

    fn leaves() -> CutDict {
        let mut cuts = CutDict::new();
        for (name, cut) in [
            ("yes", Box::new(AcceptCut::new()) as Box<dyn Cut>),
            ("no", Box::new(RejectCut::new())),
        ] {
            let handle = cuts.insert(name, cut).unwrap();
            cuts.initialize(handle, &Params::new(), &ServiceRegistry::new())
                .unwrap();
        }
        cuts
    }

    #[test]
    fn names_are_unique_and_ordered() {
        let mut cuts = leaves();
        let err = cuts.insert("yes", Box::new(AcceptCut::new())).unwrap_err();
        assert_eq!(err, CutError::DuplicateName("yes".into()));
        assert_eq!(cuts.names().collect::<Vec<_>>(), ["yes", "no"]);
        assert_eq!(
            cuts.type_id_of(cuts.handle("no").unwrap()),
            Some("cuts::reject_cut")
        );
    }

    #[test]
    fn resolve_reports_the_owner() {
        let cuts = leaves();
        assert_eq!(
            cuts.resolve("cut 'x'", "maybe"),
            Err(CutError::MissingReference {
                cut: "cut 'x'".into(),
                reference: "maybe".into(),
            })
        );
    }

    #[test]
    fn foreign_handles_are_unbound() {
        let cuts = leaves();
        let err = cuts.process(CutHandle(7)).unwrap_err();
        assert!(
            matches!(err, CutError::UnboundHandle { slot, .. } if slot == "#7")
        );
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let mut cuts = leaves();
        let handle = cuts
            .insert("loop", Box::new(NotCut::new()))
            .unwrap();
        cuts.initialize(
            handle,
            &Params::new().with("cut", "loop"),
            &ServiceRegistry::new(),
        )
        .unwrap();

        assert_eq!(
            cuts.find_cycle().unwrap(),
            Some(vec!["loop".to_string(), "loop".to_string()])
        );
        assert!(matches!(
            cuts.process(handle),
            Err(CutError::CyclicReference { .. })
        ));
    }

    #[test]
    fn user_data_reaches_descendants() {
        let mut cuts = leaves();
        let handle = cuts
            .insert("both", Box::new(BinaryCut::new(BinaryRule::And)))
            .unwrap();
        cuts.initialize(
            handle,
            &Params::new().with("cut_1", "yes").with("cut_2", "no"),
            &ServiceRegistry::new(),
        )
        .unwrap();

        cuts.set_user_data(handle, Arc::new("event")).unwrap();
        for name in ["both", "yes", "no"] {
            let has = cuts
                .with_cut(cuts.handle(name).unwrap(), |cut| cut.has_user_data())
                .unwrap();
            assert!(has, "{name} should carry the user data");
        }

        cuts.reset_user_data(handle).unwrap();
        let has = cuts
            .with_cut(cuts.handle("yes").unwrap(), |cut| cut.has_user_data())
            .unwrap();
        assert!(!has);
    }

    #[test]
    fn tree_dump_lists_counters_and_children() {
        let mut cuts = leaves();
        let handle = cuts
            .insert("both", Box::new(BinaryCut::new(BinaryRule::And)))
            .unwrap();
        cuts.initialize(
            handle,
            &Params::new()
                .with("cut_1", "yes")
                .with("cut_2", "no")
                .with("cut.description", "yes and no"),
            &ServiceRegistry::new(),
        )
        .unwrap();
        cuts.process(handle).unwrap();

        insta::assert_snapshot!(cuts.tree_dump().unwrap(), @r"
        yes [cuts::accept_cut] initialized processed=1 accepted=1 rejected=0 inapplicable=0
        no [cuts::reject_cut] initialized processed=1 accepted=0 rejected=1 inapplicable=0
        both [cuts::and_cut] initialized processed=1 accepted=0 rejected=1 inapplicable=0
          description: yes and no
          |- yes
          `- no
        ");
    }

    #[test]
    fn clear_resets_and_drops() {
        let mut cuts = leaves();
        cuts.clear();
        assert!(cuts.is_empty());
        assert!(!cuts.contains("yes"));
    }
}
