//! Test doubles shared by unit and integration tests.
//!
//! Enabled for this crate's own tests and, for dependents, through the
//! `test-utils` feature.

use crate::cut::{Cut, CutBase};
use crate::dict::{CutDict, CutHandle};
use crate::error::CutError;
use crate::factory::CutFactory;
use crate::params::Params;
use crate::services::ServiceRegistry;
use crate::status::SelectionStatus;

pub const FIXED_CUT: &str = "test::fixed_cut";
pub const ECHO_CUT: &str = "test::echo_cut";

/// A leaf that always returns the same status.
///
/// The status comes from the constructor or from the `status` parameter
/// (`accepted`, `rejected`, `inapplicable`).
#[derive(Debug)]
pub struct FixedCut {
    base: CutBase,
    status: SelectionStatus,
}

impl Default for FixedCut {
    fn default() -> Self {
        Self::new(SelectionStatus::Accepted)
    }
}

impl FixedCut {
    pub fn new(status: SelectionStatus) -> Self {
        Self {
            base: CutBase::new(),
            status,
        }
    }

    pub fn set_status(&mut self, status: SelectionStatus) {
        self.status = status;
    }
}

impl Cut for FixedCut {
    fn kind(&self) -> &'static str {
        FIXED_CUT
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
        _cuts: &CutDict,
    ) -> Result<(), CutError> {
        if let Some(label) = params
            .opt_string("status")
            .map_err(|e| self.base.param_error(e))?
        {
            self.status = label.parse().map_err(|msg: String| {
                CutError::invalid_parameter(self.base.label(), "status", msg)
            })?;
        }
        Ok(())
    }

    fn accept(&mut self, _cuts: &CutDict) -> Result<SelectionStatus, CutError> {
        Ok(self.status)
    }
}

/// A leaf that returns the [`SelectionStatus`] attached as user data,
/// or `Inapplicable` when no status is attached.
#[derive(Debug, Default)]
pub struct EchoCut {
    base: CutBase,
}

impl Cut for EchoCut {
    fn kind(&self) -> &'static str {
        ECHO_CUT
    }

    fn base(&self) -> &CutBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CutBase {
        &mut self.base
    }

    fn accept(&mut self, _cuts: &CutDict) -> Result<SelectionStatus, CutError> {
        Ok(self
            .base
            .user_data_as::<SelectionStatus>()
            .copied()
            .unwrap_or(SelectionStatus::Inapplicable))
    }
}

/// Built-ins plus the test doubles above.
pub fn test_factory() -> CutFactory {
    let mut factory = CutFactory::with_builtins();
    factory
        .register_kind::<FixedCut>(FIXED_CUT)
        .unwrap_or_else(|err| panic!("{err}"));
    factory
        .register_kind::<EchoCut>(ECHO_CUT)
        .unwrap_or_else(|err| panic!("{err}"));
    factory
}

/// A dictionary of initialized fixed leaves, one per `(name, status)`.
pub fn fixed_dict(leaves: &[(&str, SelectionStatus)]) -> CutDict {
    let mut cuts = CutDict::new();
    for &(name, status) in leaves {
        let handle = insert_fixed(&mut cuts, name, status);
        cuts.initialize(handle, &Params::new(), &ServiceRegistry::new())
            .unwrap_or_else(|err| panic!("initialize {name}: {err}"));
    }
    cuts
}

fn insert_fixed(cuts: &mut CutDict, name: &str, status: SelectionStatus) -> CutHandle {
    cuts.insert(name, Box::new(FixedCut::new(status)))
        .unwrap_or_else(|err| panic!("insert {name}: {err}"))
}
