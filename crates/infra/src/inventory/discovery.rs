//! Client-side service discovery for the inventory service.
//!
//! A registry maps a logical service name to one or more instance base URLs;
//! each resolution picks the next instance (round-robin).

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Resolves a logical service name to an instance base URL.
pub trait ServiceRegistry: Send + Sync + core::fmt::Debug {
    fn resolve(&self, service_name: &str) -> Option<String>;
}

#[derive(Debug)]
struct Instances {
    urls: Vec<String>,
    next: AtomicUsize,
}

/// Registry backed by a fixed table (usually `SERVICE_REGISTRY`).
#[derive(Debug, Default)]
pub struct StaticServiceRegistry {
    services: HashMap<String, Instances>,
}

impl StaticServiceRegistry {
    pub fn new(table: BTreeMap<String, Vec<String>>) -> Self {
        let services = table
            .into_iter()
            .filter(|(_, urls)| !urls.is_empty())
            .map(|(name, urls)| {
                (
                    name,
                    Instances {
                        urls,
                        next: AtomicUsize::new(0),
                    },
                )
            })
            .collect();
        Self { services }
    }

    pub fn contains(&self, service_name: &str) -> bool {
        self.services.contains_key(service_name)
    }
}

impl ServiceRegistry for StaticServiceRegistry {
    fn resolve(&self, service_name: &str) -> Option<String> {
        let instances = self.services.get(service_name)?;
        let idx = instances.next.fetch_add(1, Ordering::Relaxed) % instances.urls.len();
        instances.urls.get(idx).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> StaticServiceRegistry {
        let mut table = BTreeMap::new();
        table.insert(
            "inventory-service".to_string(),
            vec!["http://a:1".to_string(), "http://b:2".to_string()],
        );
        table.insert("empty".to_string(), Vec::new());
        StaticServiceRegistry::new(table)
    }

    #[test]
    fn resolves_round_robin() {
        let reg = registry();
        assert_eq!(reg.resolve("inventory-service").as_deref(), Some("http://a:1"));
        assert_eq!(reg.resolve("inventory-service").as_deref(), Some("http://b:2"));
        assert_eq!(reg.resolve("inventory-service").as_deref(), Some("http://a:1"));
    }

    #[test]
    fn unknown_or_empty_services_do_not_resolve() {
        let reg = registry();
        assert_eq!(reg.resolve("billing"), None);
        assert_eq!(reg.resolve("empty"), None);
        assert!(!reg.contains("empty"));
        assert!(reg.contains("inventory-service"));
    }
}
