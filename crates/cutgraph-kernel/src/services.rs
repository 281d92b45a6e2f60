//! Named-service lookup passed through to `Cut::initialize`.
//!
//! The kernel never inspects the services it carries. Application cuts
//! downcast the entries they know about.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A shared, type-erased service instance.
pub type Service = Arc<dyn Any + Send + Sync>;

/// Registry of named services available to cuts during initialization.
#[derive(Clone, Default)]
pub struct ServiceRegistry {
    services: BTreeMap<String, Service>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with<T: Any + Send + Sync>(mut self, name: impl Into<String>, service: T) -> Self {
        self.insert(name, Arc::new(service));
        self
    }

    /// Insert or replace a service. Returns the previous one if present.
    pub fn insert(&mut self, name: impl Into<String>, service: Service) -> Option<Service> {
        self.services.insert(name.into(), service)
    }

    pub fn has(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Service> {
        self.services.get(name)
    }

    /// Look up a service and downcast it to `T`.
    pub fn get_as<T: Any>(&self, name: &str) -> Option<&T> {
        self.services.get(name)?.downcast_ref::<T>()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("services", &self.services.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Geometry {
        radius: f64,
    }

    #[test]
    fn downcast_by_name() {
        let services = ServiceRegistry::new().with("geometry", Geometry { radius: 2.5 });
        assert!(services.has("geometry"));
        assert_eq!(
            services.get_as::<Geometry>("geometry"),
            Some(&Geometry { radius: 2.5 })
        );
        assert_eq!(services.get_as::<String>("geometry"), None);
        assert_eq!(services.get_as::<Geometry>("absent"), None);
    }
}
