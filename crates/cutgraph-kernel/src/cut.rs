//! The `Cut` trait: the unit of composition.
//!
//! A cut is a predicate over opaque application data that yields a
//! [`SelectionStatus`]. Concrete kinds implement [`Cut::accept`] (and
//! optionally [`Cut::configure`]); the provided methods drive the shared
//! lifecycle:
//!
//! ```text
//! UNINITIALIZED --initialize--> READY --process--> READY --reset--> UNINITIALIZED
//! ```
//!
//! State shared by every kind (name, initialization flag, logging priority,
//! user data, counters) lives in [`CutBase`].

use crate::dict::{CutDict, CutHandle};
use crate::error::CutError;
use crate::params::{ParamError, Params};
use crate::services::ServiceRegistry;
use crate::status::SelectionStatus;
use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Opaque application data read by leaf predicates. Shared, never owned.
pub type UserData = Arc<dyn Any + Send + Sync>;

/// Per-cut logging threshold.
///
/// A cut emits an event of priority `p` only if its own threshold allows
/// `p`. Events go through `tracing`, so the installed subscriber still has
/// the final word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogPriority {
    #[default]
    Fatal,
    Critical,
    Error,
    Warning,
    Notice,
    Information,
    Debug,
    Trace,
}

impl LogPriority {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_lowercase().as_str() {
            "fatal" => Some(Self::Fatal),
            "critical" => Some(Self::Critical),
            "error" => Some(Self::Error),
            "warning" => Some(Self::Warning),
            "notice" => Some(Self::Notice),
            "information" | "info" => Some(Self::Information),
            "debug" => Some(Self::Debug),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fatal => "fatal",
            Self::Critical => "critical",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Notice => "notice",
            Self::Information => "information",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// Whether a cut at this threshold emits events of priority `event`.
    pub fn allows(self, event: Self) -> bool {
        self >= event
    }
}

impl fmt::Display for LogPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Running tally of processed entries, per outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    pub accepted: u64,
    pub rejected: u64,
    pub inapplicable: u64,
}

impl Counters {
    pub fn record(&mut self, status: SelectionStatus) {
        match status {
            SelectionStatus::Accepted => self.accepted += 1,
            SelectionStatus::Rejected => self.rejected += 1,
            SelectionStatus::Inapplicable => self.inapplicable += 1,
        }
    }

    pub fn processed(&self) -> u64 {
        self.accepted + self.rejected + self.inapplicable
    }
}

pub const PARAM_LOGGING_PRIORITY: &str = "logging.priority";
pub const PARAM_NAME: &str = "cut.name";
pub const PARAM_DESCRIPTION: &str = "cut.description";
pub const PARAM_VERSION: &str = "cut.version";

/// State common to every cut kind.
#[derive(Default)]
pub struct CutBase {
    name: Option<String>,
    description: Option<String>,
    version: Option<String>,
    initialized: bool,
    logging: LogPriority,
    user_data: Option<UserData>,
    counters: Counters,
}

impl CutBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn has_name(&self) -> bool {
        self.name.is_some()
    }

    /// Rename the cut. Only allowed before initialization.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), CutError> {
        if self.initialized {
            return Err(CutError::AlreadyInitialized {
                subject: self.label(),
            });
        }
        self.name = Some(name.into());
        Ok(())
    }

    /// `cut 'name'`, or `anonymous cut`; used in diagnostics.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("cut '{name}'"),
            None => "anonymous cut".to_string(),
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = Some(version.into());
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub(crate) fn set_initialized(&mut self, initialized: bool) {
        self.initialized = initialized;
    }

    pub fn logging(&self) -> LogPriority {
        self.logging
    }

    pub fn set_logging(&mut self, priority: LogPriority) {
        self.logging = priority;
    }

    pub fn user_data(&self) -> Option<&UserData> {
        self.user_data.as_ref()
    }

    /// The attached user data, if any and if it is a `T`.
    pub fn user_data_as<T: Any>(&self) -> Option<&T> {
        self.user_data.as_ref()?.downcast_ref::<T>()
    }

    pub fn set_user_data(&mut self, data: UserData) {
        self.user_data = Some(data);
    }

    pub fn reset_user_data(&mut self) {
        self.user_data = None;
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn reset_counters(&mut self) {
        self.counters = Counters::default();
    }

    pub(crate) fn record(&mut self, status: SelectionStatus) {
        self.counters.record(status);
    }

    /// Attach this cut's label to a parameter lookup failure.
    pub fn param_error(&self, err: ParamError) -> CutError {
        CutError::parameter(self.label(), err)
    }

    /// Parameters understood by every cut kind.
    ///
    /// The logging priority is read afresh on every call and falls back to
    /// `fatal`. `cut.name`, `cut.description` and `cut.version` only fill
    /// attributes that are still unset.
    fn common_initialize(&mut self, params: &Params) -> Result<(), CutError> {
        self.logging = match params
            .opt_string(PARAM_LOGGING_PRIORITY)
            .map_err(|e| self.param_error(e))?
        {
            Some(label) => LogPriority::from_label(label).ok_or_else(|| {
                CutError::invalid_parameter(
                    self.label(),
                    PARAM_LOGGING_PRIORITY,
                    format!("unknown logging priority '{label}'"),
                )
            })?,
            None => LogPriority::default(),
        };
        if self.name.is_none()
            && let Some(name) = params.opt_string(PARAM_NAME).map_err(|e| self.param_error(e))?
        {
            self.name = Some(name.to_string());
        }
        if self.description.is_none()
            && let Some(description) = params
                .opt_string(PARAM_DESCRIPTION)
                .map_err(|e| self.param_error(e))?
        {
            self.description = Some(description.to_string());
        }
        if self.version.is_none()
            && let Some(version) = params
                .opt_string(PARAM_VERSION)
                .map_err(|e| self.param_error(e))?
        {
            self.version = Some(version.to_string());
        }
        Ok(())
    }

    fn attributes(&self) -> Attributes {
        Attributes {
            name: self.name.clone(),
            description: self.description.clone(),
            version: self.version.clone(),
            logging: self.logging,
        }
    }

    fn restore(&mut self, attributes: Attributes) {
        self.name = attributes.name;
        self.description = attributes.description;
        self.version = attributes.version;
        self.logging = attributes.logging;
    }

    /// Back to the pre-initialized state. The name is kept.
    fn clear(&mut self) {
        self.initialized = false;
        self.user_data = None;
        self.counters = Counters::default();
    }
}

/// Attributes written by `common_initialize`, kept to undo a failed
/// initialization.
struct Attributes {
    name: Option<String>,
    description: Option<String>,
    version: Option<String>,
    logging: LogPriority,
}

impl fmt::Debug for CutBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CutBase")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("version", &self.version)
            .field("initialized", &self.initialized)
            .field("logging", &self.logging)
            .field("user_data", &self.user_data.is_some())
            .field("counters", &self.counters)
            .finish()
    }
}

/// A predicate over opaque application data.
///
/// Implementors provide [`Cut::kind`], access to their [`CutBase`] and
/// [`Cut::accept`]. Combinators also override [`Cut::configure`],
/// [`Cut::clear`] and [`Cut::children`]. The remaining methods implement
/// the lifecycle and should not be overridden.
pub trait Cut: Send {
    /// Type identifier this kind is registered under by default.
    fn kind(&self) -> &'static str;

    fn base(&self) -> &CutBase;

    fn base_mut(&mut self) -> &mut CutBase;

    /// Kind-specific initialization: read parameters, bind child handles.
    ///
    /// On error the cut must be left as it was before the call.
    fn configure(
        &mut self,
        params: &Params,
        services: &ServiceRegistry,
        cuts: &CutDict,
    ) -> Result<(), CutError> {
        let _ = (params, services, cuts);
        Ok(())
    }

    /// Kind-specific evaluation. Children are evaluated through `cuts`.
    fn accept(&mut self, cuts: &CutDict) -> Result<SelectionStatus, CutError>;

    /// Drop kind-specific state bound by [`Cut::configure`].
    fn clear(&mut self) {}

    /// Handles of the cuts this cut evaluates. Empty for leaves.
    fn children(&self) -> Vec<CutHandle> {
        Vec::new()
    }

    fn name(&self) -> Option<&str> {
        self.base().name()
    }

    fn is_initialized(&self) -> bool {
        self.base().is_initialized()
    }

    fn initialize(
        &mut self,
        params: &Params,
        services: &ServiceRegistry,
        cuts: &CutDict,
    ) -> Result<(), CutError> {
        if self.base().is_initialized() {
            return Err(CutError::AlreadyInitialized {
                subject: self.base().label(),
            });
        }
        let saved = self.base().attributes();
        let configured = match self.base_mut().common_initialize(params) {
            Ok(()) => self.configure(params, services, cuts),
            Err(err) => Err(err),
        };
        if let Err(err) = configured {
            self.base_mut().restore(saved);
            return Err(err);
        }
        self.base_mut().set_initialized(true);
        if self.base().logging().allows(LogPriority::Debug) {
            tracing::debug!(
                cut = %self.base().label(),
                kind = self.kind(),
                "cutgraph.cut.initialize"
            );
        }
        Ok(())
    }

    /// Initialize without services or sibling cuts.
    fn initialize_standalone(&mut self, params: &Params) -> Result<(), CutError> {
        self.initialize(params, &ServiceRegistry::new(), &CutDict::new())
    }

    /// Initialize with no parameters at all.
    fn initialize_simple(&mut self) -> Result<(), CutError> {
        self.initialize_standalone(&Params::new())
    }

    fn reset(&mut self) -> Result<(), CutError> {
        if !self.base().is_initialized() {
            return Err(CutError::NotInitialized {
                subject: self.base().label(),
            });
        }
        self.clear();
        self.base_mut().clear();
        Ok(())
    }

    /// Evaluate the cut and update its counters.
    fn process(&mut self, cuts: &CutDict) -> Result<SelectionStatus, CutError> {
        if !self.base().is_initialized() {
            return Err(CutError::NotInitialized {
                subject: self.base().label(),
            });
        }
        let status = self.accept(cuts)?;
        self.base_mut().record(status);
        if self.base().logging().allows(LogPriority::Trace) {
            tracing::trace!(
                cut = %self.base().label(),
                status = %status,
                "cutgraph.cut.process"
            );
        }
        Ok(status)
    }

    fn set_user_data(&mut self, data: UserData) {
        self.base_mut().set_user_data(data);
    }

    fn reset_user_data(&mut self) {
        self.base_mut().reset_user_data();
    }

    fn has_user_data(&self) -> bool {
        self.base().user_data().is_some()
    }

    fn counters(&self) -> Counters {
        self.base().counters()
    }
}
