//! Built-in leaf cuts that need no user data.

use crate::cut::{Cut, CutBase};
use crate::dict::CutDict;
use crate::error::CutError;
use crate::params::Params;
use crate::services::ServiceRegistry;
use crate::status::SelectionStatus;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const ACCEPT_CUT: &str = "cuts::accept_cut";
pub const REJECT_CUT: &str = "cuts::reject_cut";
pub const RANDOM_CUT: &str = "cuts::random_cut";

pub const PARAM_SEED: &str = "seed";
pub const PARAM_ACCEPT_PROBABILITY: &str = "accept_probability";

pub const DEFAULT_SEED: u64 = 0;
pub const DEFAULT_ACCEPT_PROBABILITY: f64 = 0.5;

/// Always accepts.
#[derive(Debug, Default)]
pub struct AcceptCut {
    base: CutBase,
}

impl AcceptCut {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Cut for AcceptCut {
    fn kind(&self) -> &'static str {
        ACCEPT_CUT
    }

    fn base(&self) -> &CutBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CutBase {
        &mut self.base
    }

    fn accept(&mut self, _cuts: &CutDict) -> Result<SelectionStatus, CutError> {
        Ok(SelectionStatus::Accepted)
    }
}

/// Always rejects.
#[derive(Debug, Default)]
pub struct RejectCut {
    base: CutBase,
}

impl RejectCut {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Cut for RejectCut {
    fn kind(&self) -> &'static str {
        REJECT_CUT
    }

    fn base(&self) -> &CutBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CutBase {
        &mut self.base
    }

    fn accept(&mut self, _cuts: &CutDict) -> Result<SelectionStatus, CutError> {
        Ok(SelectionStatus::Rejected)
    }
}

/// Accepts with a fixed probability, drawn from a seeded generator.
///
/// Parameters: `seed` (non-negative integer, default 0) and
/// `accept_probability` (real in `[0, 1]`, default 0.5). Two cuts built
/// with the same seed produce the same sequence of decisions.
#[derive(Debug)]
pub struct RandomCut {
    base: CutBase,
    seed: u64,
    accept_probability: f64,
    rng: Option<StdRng>,
}

impl Default for RandomCut {
    fn default() -> Self {
        Self {
            base: CutBase::new(),
            seed: DEFAULT_SEED,
            accept_probability: DEFAULT_ACCEPT_PROBABILITY,
            rng: None,
        }
    }
}

impl RandomCut {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn accept_probability(&self) -> f64 {
        self.accept_probability
    }
}

impl Cut for RandomCut {
    fn kind(&self) -> &'static str {
        RANDOM_CUT
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
        let seed = match params
            .opt_integer(PARAM_SEED)
            .map_err(|e| self.base.param_error(e))?
        {
            Some(seed) => u64::try_from(seed).map_err(|_| {
                CutError::invalid_parameter(
                    self.base.label(),
                    PARAM_SEED,
                    format!("seed must be non-negative, got {seed}"),
                )
            })?,
            None => DEFAULT_SEED,
        };
        let probability = params
            .opt_real(PARAM_ACCEPT_PROBABILITY)
            .map_err(|e| self.base.param_error(e))?
            .unwrap_or(DEFAULT_ACCEPT_PROBABILITY);
        if !(0.0..=1.0).contains(&probability) {
            return Err(CutError::invalid_parameter(
                self.base.label(),
                PARAM_ACCEPT_PROBABILITY,
                format!("probability must lie in [0, 1], got {probability}"),
            ));
        }

        self.seed = seed;
        self.accept_probability = probability;
        self.rng = Some(StdRng::seed_from_u64(seed));
        Ok(())
    }

    fn accept(&mut self, _cuts: &CutDict) -> Result<SelectionStatus, CutError> {
        let probability = self.accept_probability;
        let seed = self.seed;
        let rng = self.rng.get_or_insert_with(|| StdRng::seed_from_u64(seed));
        Ok(SelectionStatus::from_bool(rng.gen_bool(probability)))
    }

    fn clear(&mut self) {
        self.seed = DEFAULT_SEED;
        self.accept_probability = DEFAULT_ACCEPT_PROBABILITY;
        self.rng = None;
    }
}
