//! # cutgraph kernel
//!
//! Named, reusable selection criteria ("cuts") over opaque application
//! data, composed with boolean combinators and built from declarative
//! configuration.
//!
//! The kernel is **data-agnostic**: leaf predicates read whatever user
//! data the application attaches. It only prescribes how cuts compose and
//! how `Inapplicable` propagates.
//!
//! ## Architecture
//!
//! ```text
//! SelectionStatus       ← Accepted / Rejected / Inapplicable
//!     │
//! Cut (+ CutBase)       ← initialize → process* → reset
//!     │
//! BinaryCut / NotCut / MultiCut
//!     │                 ← children held as CutHandle, evaluated eagerly
//! CutDict               ← Arena owning cuts, indexed by name
//!     │
//! CutFactory            ← type id → constructor, filled explicitly
//!     │
//! Manager               ← CutConfig → CutDict, rejects cycles
//! ```

pub mod combinator;
pub mod config;
pub mod cut;
pub mod dict;
pub mod error;
pub mod factory;
pub mod leaf;
pub mod manager;
pub mod params;
pub mod services;
pub mod status;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use combinator::{BinaryCut, BinaryRule, MultiCut, MultiRule, NotCut};
pub use config::{CutConfig, CutSection};
pub use cut::{Counters, Cut, CutBase, LogPriority, UserData};
pub use dict::{CutDict, CutHandle, CutRef, CutSummary};
pub use error::CutError;
pub use factory::{CutConstructor, CutFactory, builtin_kinds};
pub use leaf::{AcceptCut, RandomCut, RejectCut};
pub use manager::Manager;
pub use params::{ParamError, ParamValue, Params};
pub use services::{Service, ServiceRegistry};
pub use status::SelectionStatus;
