//! Boolean combinators over child cuts.
//!
//! Every combinator evaluates all of its children, left to right, before
//! combining. There is no short-circuiting: an `Inapplicable` child must be
//! observed even when an earlier child already decides the boolean outcome,
//! and any `Inapplicable` child makes the combinator `Inapplicable`.
//!
//! | Rule | Accepts when (children all decided) |
//! |------|--------------------------------------|
//! | AND | both accept |
//! | OR | at least one accepts |
//! | XOR | exactly one accepts |
//! | NAND | not both accept |
//! | NOR | neither accepts |
//! | XNOR | both agree |
//! | EXCLUDE | first accepts and second rejects |
//! | NOT | the child rejects |
//! | multi AND / OR / XOR | all accept / any accepts / odd count accepts |

use crate::cut::{Cut, CutBase};
use crate::dict::{CutDict, CutHandle};
use crate::error::CutError;
use crate::params::Params;
use crate::services::ServiceRegistry;
use crate::status::SelectionStatus;

pub const AND_CUT: &str = "cuts::and_cut";
pub const OR_CUT: &str = "cuts::or_cut";
pub const XOR_CUT: &str = "cuts::xor_cut";
pub const NAND_CUT: &str = "cuts::nand_cut";
pub const NOR_CUT: &str = "cuts::nor_cut";
pub const XNOR_CUT: &str = "cuts::xnor_cut";
pub const EXCLUDE_CUT: &str = "cuts::exclude_cut";
pub const NOT_CUT: &str = "cuts::not_cut";
pub const MULTI_AND_CUT: &str = "cuts::multi_and_cut";
pub const MULTI_OR_CUT: &str = "cuts::multi_or_cut";
pub const MULTI_XOR_CUT: &str = "cuts::multi_xor_cut";

pub const PARAM_CUT: &str = "cut";
pub const PARAM_CUT_1: &str = "cut_1";
pub const PARAM_CUT_2: &str = "cut_2";
pub const PARAM_CUTS: &str = "cuts";

/// Truth function of a two-child combinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryRule {
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Xnor,
    /// `a AND NOT b`.
    Exclude,
}

impl BinaryRule {
    pub const ALL: [Self; 7] = [
        Self::And,
        Self::Or,
        Self::Xor,
        Self::Nand,
        Self::Nor,
        Self::Xnor,
        Self::Exclude,
    ];

    pub fn type_id(self) -> &'static str {
        match self {
            Self::And => AND_CUT,
            Self::Or => OR_CUT,
            Self::Xor => XOR_CUT,
            Self::Nand => NAND_CUT,
            Self::Nor => NOR_CUT,
            Self::Xnor => XNOR_CUT,
            Self::Exclude => EXCLUDE_CUT,
        }
    }

    /// The rule over decided children.
    pub fn combine(self, a: bool, b: bool) -> bool {
        match self {
            Self::And => a && b,
            Self::Or => a || b,
            Self::Xor => a != b,
            Self::Nand => !(a && b),
            Self::Nor => !(a || b),
            Self::Xnor => a == b,
            Self::Exclude => a && !b,
        }
    }

    /// The rule over three-valued statuses: `Inapplicable` is infectious.
    pub fn evaluate(self, s1: SelectionStatus, s2: SelectionStatus) -> SelectionStatus {
        match (s1.as_bool(), s2.as_bool()) {
            (Some(a), Some(b)) => SelectionStatus::from_bool(self.combine(a, b)),
            _ => SelectionStatus::Inapplicable,
        }
    }
}

/// A cut combining exactly two children with a [`BinaryRule`].
///
/// Children come from the `cut_1` and `cut_2` parameters unless they were
/// bound beforehand with [`BinaryCut::bind`].
#[derive(Debug)]
pub struct BinaryCut {
    base: CutBase,
    rule: BinaryRule,
    handle_1: Option<CutHandle>,
    handle_2: Option<CutHandle>,
}

impl BinaryCut {
    pub fn new(rule: BinaryRule) -> Self {
        Self {
            base: CutBase::new(),
            rule,
            handle_1: None,
            handle_2: None,
        }
    }

    pub fn rule(&self) -> BinaryRule {
        self.rule
    }

    /// Bind both children directly, bypassing parameter lookup.
    pub fn bind(&mut self, handle_1: CutHandle, handle_2: CutHandle) -> Result<(), CutError> {
        if self.base.is_initialized() {
            return Err(CutError::AlreadyInitialized {
                subject: self.base.label(),
            });
        }
        self.handle_1 = Some(handle_1);
        self.handle_2 = Some(handle_2);
        Ok(())
    }

    pub fn handle_1(&self) -> Result<CutHandle, CutError> {
        self.handle_1.ok_or_else(|| unbound(&self.base, "1"))
    }

    pub fn handle_2(&self) -> Result<CutHandle, CutError> {
        self.handle_2.ok_or_else(|| unbound(&self.base, "2"))
    }
}

impl Cut for BinaryCut {
    fn kind(&self) -> &'static str {
        self.rule.type_id()
    }

    fn base(&self) -> &CutBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CutBase {
        &mut self.base
    }

    fn configure(
        &mut self,
        params: &Params,
        _services: &ServiceRegistry,
        cuts: &CutDict,
    ) -> Result<(), CutError> {
        let handle_1 = match self.handle_1 {
            Some(handle) => handle,
            None => resolve_param(&self.base, params, PARAM_CUT_1, cuts)?,
        };
        let handle_2 = match self.handle_2 {
            Some(handle) => handle,
            None => resolve_param(&self.base, params, PARAM_CUT_2, cuts)?,
        };
        self.handle_1 = Some(handle_1);
        self.handle_2 = Some(handle_2);
        Ok(())
    }

    fn accept(&mut self, cuts: &CutDict) -> Result<SelectionStatus, CutError> {
        let s1 = cuts.process(self.handle_1()?)?;
        let s2 = cuts.process(self.handle_2()?)?;
        Ok(self.rule.evaluate(s1, s2))
    }

    fn clear(&mut self) {
        self.handle_1 = None;
        self.handle_2 = None;
    }

    fn children(&self) -> Vec<CutHandle> {
        self.handle_1.into_iter().chain(self.handle_2).collect()
    }
}

/// Negation of a single child, read from the `cut` parameter.
#[derive(Debug, Default)]
pub struct NotCut {
    base: CutBase,
    handle: Option<CutHandle>,
}

impl NotCut {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, handle: CutHandle) -> Result<(), CutError> {
        if self.base.is_initialized() {
            return Err(CutError::AlreadyInitialized {
                subject: self.base.label(),
            });
        }
        self.handle = Some(handle);
        Ok(())
    }

    pub fn handle(&self) -> Result<CutHandle, CutError> {
        self.handle.ok_or_else(|| unbound(&self.base, "1"))
    }
}

impl Cut for NotCut {
    fn kind(&self) -> &'static str {
        NOT_CUT
    }

    fn base(&self) -> &CutBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CutBase {
        &mut self.base
    }

    fn configure(
        &mut self,
        params: &Params,
        _services: &ServiceRegistry,
        cuts: &CutDict,
    ) -> Result<(), CutError> {
        if self.handle.is_none() {
            self.handle = Some(resolve_param(&self.base, params, PARAM_CUT, cuts)?);
        }
        Ok(())
    }

    fn accept(&mut self, cuts: &CutDict) -> Result<SelectionStatus, CutError> {
        Ok(cuts.process(self.handle()?)?.negate())
    }

    fn clear(&mut self) {
        self.handle = None;
    }

    fn children(&self) -> Vec<CutHandle> {
        self.handle.into_iter().collect()
    }
}

/// Truth function of an N-child combinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MultiRule {
    And,
    Or,
    Xor,
}

impl MultiRule {
    pub const ALL: [Self; 3] = [Self::And, Self::Or, Self::Xor];

    pub fn type_id(self) -> &'static str {
        match self {
            Self::And => MULTI_AND_CUT,
            Self::Or => MULTI_OR_CUT,
            Self::Xor => MULTI_XOR_CUT,
        }
    }

    /// Combine child statuses. Any `Inapplicable` child wins.
    ///
    /// An empty slice yields the rule's identity (`Accepted` for AND,
    /// `Rejected` otherwise); configured multi-cuts never have zero children.
    pub fn evaluate(self, statuses: &[SelectionStatus]) -> SelectionStatus {
        if statuses.iter().any(|s| s.is_inapplicable()) {
            return SelectionStatus::Inapplicable;
        }
        let accepted = statuses.iter().filter(|s| s.is_accepted()).count();
        let decision = match self {
            Self::And => accepted == statuses.len(),
            Self::Or => accepted > 0,
            Self::Xor => accepted % 2 == 1,
        };
        SelectionStatus::from_bool(decision)
    }
}

/// A cut combining any number of children, named by the `cuts` parameter.
#[derive(Debug)]
pub struct MultiCut {
    base: CutBase,
    rule: MultiRule,
    handles: Vec<CutHandle>,
}

impl MultiCut {
    pub fn new(rule: MultiRule) -> Self {
        Self {
            base: CutBase::new(),
            rule,
            handles: Vec::new(),
        }
    }

    pub fn rule(&self) -> MultiRule {
        self.rule
    }

    /// Append a child directly, bypassing parameter lookup.
    pub fn add(&mut self, handle: CutHandle) -> Result<(), CutError> {
        if self.base.is_initialized() {
            return Err(CutError::AlreadyInitialized {
                subject: self.base.label(),
            });
        }
        self.handles.push(handle);
        Ok(())
    }

    pub fn handles(&self) -> &[CutHandle] {
        &self.handles
    }
}

impl Cut for MultiCut {
    fn kind(&self) -> &'static str {
        self.rule.type_id()
    }

    fn base(&self) -> &CutBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CutBase {
        &mut self.base
    }

    fn configure(
        &mut self,
        params: &Params,
        _services: &ServiceRegistry,
        cuts: &CutDict,
    ) -> Result<(), CutError> {
        if self.handles.is_empty() {
            let names = params
                .opt_strings(PARAM_CUTS)
                .map_err(|e| self.base.param_error(e))?
                .unwrap_or_default();
            let label = self.base.label();
            self.handles = names
                .iter()
                .map(|name| cuts.resolve(&label, name))
                .collect::<Result<_, _>>()?;
        }
        if self.handles.is_empty() {
            return Err(CutError::EmptyCutList {
                cut: self.base.label(),
            });
        }
        Ok(())
    }

    fn accept(&mut self, cuts: &CutDict) -> Result<SelectionStatus, CutError> {
        let statuses = self
            .handles
            .iter()
            .map(|&handle| cuts.process(handle))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.rule.evaluate(&statuses))
    }

    fn clear(&mut self) {
        self.handles.clear();
    }

    fn children(&self) -> Vec<CutHandle> {
        self.handles.clone()
    }
}

fn resolve_param(
    base: &CutBase,
    params: &Params,
    key: &str,
    cuts: &CutDict,
) -> Result<CutHandle, CutError> {
    let name = params.fetch_string(key).map_err(|e| base.param_error(e))?;
    cuts.resolve(&base.label(), name)
}

fn unbound(base: &CutBase, slot: &str) -> CutError {
    CutError::UnboundHandle {
        cut: base.label(),
        slot: slot.to_string(),
    }
}
