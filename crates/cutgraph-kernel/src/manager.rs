//! Manager: builds a named cut graph from configuration and owns it.
//!
//! Build phases, all-or-nothing:
//!
//! 1. create every cut through the factory and insert it under its
//!    section name, in configuration order;
//! 2. initialize every cut in the same order, so combinators resolve
//!    children against the full dictionary (forward references work);
//! 3. reject reference cycles.
//!
//! Any failure discards the partial dictionary and leaves the manager
//! uninitialized.

use crate::config::CutConfig;
use crate::cut::{LogPriority, UserData};
use crate::dict::{CutDict, CutRef};
use crate::error::CutError;
use crate::factory::CutFactory;
use crate::services::ServiceRegistry;
use crate::status::SelectionStatus;

const SUBJECT: &str = "cut manager";

/// Owns a dictionary of named cuts built from a [`CutConfig`].
#[derive(Debug)]
pub struct Manager {
    factory: CutFactory,
    services: ServiceRegistry,
    logging: LogPriority,
    cuts: CutDict,
    initialized: bool,
}

impl Manager {
    pub fn new(factory: CutFactory) -> Self {
        Self {
            factory,
            services: ServiceRegistry::new(),
            logging: LogPriority::default(),
            cuts: CutDict::new(),
            initialized: false,
        }
    }

    /// Services handed to every cut's `initialize`.
    pub fn with_services(mut self, services: ServiceRegistry) -> Self {
        self.services = services;
        self
    }

    pub fn with_logging(mut self, priority: LogPriority) -> Self {
        self.logging = priority;
        self
    }

    pub fn logging(&self) -> LogPriority {
        self.logging
    }

    pub fn set_logging(&mut self, priority: LogPriority) {
        self.logging = priority;
    }

    pub fn factory(&self) -> &CutFactory {
        &self.factory
    }

    /// Mutable access to the factory, e.g. to register kinds before
    /// [`Manager::initialize`].
    pub fn factory_mut(&mut self) -> &mut CutFactory {
        &mut self.factory
    }

    pub fn services(&self) -> &ServiceRegistry {
        &self.services
    }

    pub fn cuts(&self) -> &CutDict {
        &self.cuts
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn initialize(&mut self, config: &CutConfig) -> Result<(), CutError> {
        if self.initialized {
            return Err(CutError::AlreadyInitialized {
                subject: SUBJECT.to_string(),
            });
        }

        let mut cuts = CutDict::new();
        if let Err(err) = self.build(&mut cuts, config) {
            if self.logging.allows(LogPriority::Error) {
                tracing::error!(error = %err, "cutgraph.manager.initialize.failed");
            }
            cuts.clear();
            return Err(err);
        }

        self.cuts = cuts;
        self.initialized = true;
        if self.logging.allows(LogPriority::Information) {
            tracing::info!(cuts = self.cuts.len(), "cutgraph.manager.initialize");
        }
        Ok(())
    }

    fn build(&self, cuts: &mut CutDict, config: &CutConfig) -> Result<(), CutError> {
        let mut handles = Vec::with_capacity(config.len());
        for section in config {
            if cuts.contains(&section.name) {
                return Err(CutError::DuplicateName(section.name.clone()));
            }
            let mut cut = self.factory.create(&section.type_id)?;
            cut.base_mut().set_name(section.name.as_str())?;
            let handle = cuts.insert_as(section.name.as_str(), section.type_id.as_str(), cut)?;
            if self.logging.allows(LogPriority::Debug) {
                tracing::debug!(
                    cut = %section.name,
                    type_id = %section.type_id,
                    handle = %handle,
                    "cutgraph.manager.load"
                );
            }
            handles.push(handle);
        }

        for (section, handle) in config.iter().zip(handles) {
            cuts.initialize(handle, &section.params, &self.services)?;
        }

        if let Some(path) = cuts.find_cycle()? {
            return Err(CutError::CyclicReference { path });
        }
        Ok(())
    }

    pub fn has_cut(&self, name: &str) -> bool {
        self.cuts.contains(name)
    }

    pub fn get_cut(&self, name: &str) -> Result<CutRef<'_>, CutError> {
        self.cuts
            .get(name)
            .ok_or_else(|| CutError::UnknownCutName(name.to_string()))
    }

    /// Evaluate the named cut.
    pub fn process(&self, name: &str) -> Result<SelectionStatus, CutError> {
        self.get_cut(name)?.process()
    }

    /// Attach user data to the named cut and every cut below it.
    pub fn set_user_data(&self, name: &str, data: UserData) -> Result<(), CutError> {
        self.get_cut(name)?.set_user_data(data)
    }

    pub fn reset_user_data(&self, name: &str) -> Result<(), CutError> {
        self.get_cut(name)?.reset_user_data()
    }

    /// Cut names in configuration order.
    pub fn cut_names(&self) -> impl Iterator<Item = &str> {
        self.cuts.names()
    }

    /// Reset and release every cut. The factory and services are kept, so
    /// the manager can be initialized again.
    pub fn reset(&mut self) -> Result<(), CutError> {
        if !self.initialized {
            return Err(CutError::NotInitialized {
                subject: SUBJECT.to_string(),
            });
        }
        let released = self.cuts.len();
        self.cuts.clear();
        self.initialized = false;
        if self.logging.allows(LogPriority::Information) {
            tracing::info!(cuts = released, "cutgraph.manager.reset");
        }
        Ok(())
    }
}
