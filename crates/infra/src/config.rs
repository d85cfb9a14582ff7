//! Configuration loading and representation.
//!
//! Everything is read from environment variables once at startup. Parsing goes
//! through a lookup closure so tests can feed values without touching the
//! process environment.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8081";
pub const DEFAULT_INVENTORY_SERVICE: &str = "inventory-service";
pub const DEFAULT_NOTIFICATION_TOPIC: &str = "notificationTopic";
pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";
pub const DEFAULT_NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be set: {reason}")]
    Missing { var: &'static str, reason: &'static str },

    #[error("{var} is invalid: {message}")]
    Invalid { var: &'static str, message: String },
}

impl ConfigError {
    fn invalid(var: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            var,
            message: message.into(),
        }
    }
}

/// Where the inventory service lives.
///
/// Both are deployment choices; the placement workflow behaves the same either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryEndpoint {
    /// Fixed network address, e.g. `http://localhost:8082`.
    Fixed { base_url: String },
    /// Logical service name, resolved through the service registry on every call.
    Discovered { service_name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    pub inventory: InventoryEndpoint,
    /// Static registry: service name → instance base URLs.
    pub service_registry: BTreeMap<String, Vec<String>>,
    pub inventory_timeout: Option<Duration>,
    pub notifications_enabled: bool,
    pub notification_topic: String,
    /// Upper bound for one background notification delivery.
    pub notification_timeout: Duration,
    pub use_persistent_stores: bool,
    pub database_url: Option<String>,
    pub redis_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8081)),
            inventory: InventoryEndpoint::Discovered {
                service_name: DEFAULT_INVENTORY_SERVICE.to_string(),
            },
            service_registry: BTreeMap::new(),
            inventory_timeout: None,
            notifications_enabled: false,
            notification_topic: DEFAULT_NOTIFICATION_TOPIC.to_string(),
            notification_timeout: DEFAULT_NOTIFICATION_TIMEOUT,
            use_persistent_stores: false,
            database_url: None,
            redis_url: DEFAULT_REDIS_URL.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::invalid("BIND_ADDR", e.to_string()))?;

        let inventory = match get("INVENTORY_SERVICE_URL") {
            Some(url) => InventoryEndpoint::Fixed {
                base_url: validate_base_url("INVENTORY_SERVICE_URL", &url)?,
            },
            None => InventoryEndpoint::Discovered {
                service_name: get("INVENTORY_SERVICE_NAME")
                    .unwrap_or_else(|| DEFAULT_INVENTORY_SERVICE.to_string()),
            },
        };

        let service_registry = match get("SERVICE_REGISTRY") {
            Some(raw) => parse_registry(&raw)?,
            None => BTreeMap::new(),
        };

        let inventory_timeout = get("INVENTORY_TIMEOUT_MS")
            .map(|raw| parse_millis("INVENTORY_TIMEOUT_MS", &raw))
            .transpose()?;

        let notifications_enabled = parse_flag("NOTIFICATIONS_ENABLED", get("NOTIFICATIONS_ENABLED"))?;
        let notification_topic =
            get("NOTIFICATION_TOPIC").unwrap_or_else(|| DEFAULT_NOTIFICATION_TOPIC.to_string());
        let notification_timeout = get("NOTIFICATION_TIMEOUT_MS")
            .map(|raw| parse_millis("NOTIFICATION_TIMEOUT_MS", &raw))
            .transpose()?
            .unwrap_or(DEFAULT_NOTIFICATION_TIMEOUT);

        let use_persistent_stores = parse_flag("USE_PERSISTENT_STORES", get("USE_PERSISTENT_STORES"))?;
        let database_url = get("DATABASE_URL");
        if use_persistent_stores && database_url.is_none() {
            return Err(ConfigError::Missing {
                var: "DATABASE_URL",
                reason: "required when USE_PERSISTENT_STORES=true",
            });
        }

        Ok(Self {
            bind_addr,
            inventory,
            service_registry,
            inventory_timeout,
            notifications_enabled,
            notification_topic,
            notification_timeout,
            use_persistent_stores,
            database_url,
            redis_url: get("REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.to_string()),
        })
    }
}

fn parse_flag(var: &'static str, raw: Option<String>) -> Result<bool, ConfigError> {
    match raw.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None => Ok(false),
        Some("true" | "1" | "yes") => Ok(true),
        Some("false" | "0" | "no") => Ok(false),
        Some(other) => Err(ConfigError::invalid(var, format!("expected a boolean, got `{other}`"))),
    }
}

fn parse_millis(var: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    raw.parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| ConfigError::invalid(var, e.to_string()))
}

fn validate_base_url(var: &'static str, raw: &str) -> Result<String, ConfigError> {
    let url = reqwest::Url::parse(raw).map_err(|e| ConfigError::invalid(var, format!("{raw}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::invalid(var, format!("{raw}: scheme must be http or https")));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

/// Parse `name=url1,url2;other=url3`.
fn parse_registry(raw: &str) -> Result<BTreeMap<String, Vec<String>>, ConfigError> {
    let mut registry = BTreeMap::new();
    for entry in raw.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let (name, urls) = entry.split_once('=').ok_or_else(|| {
            ConfigError::invalid("SERVICE_REGISTRY", format!("entry `{entry}` is missing `=`"))
        })?;

        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigError::invalid("SERVICE_REGISTRY", format!("entry `{entry}` has no name")));
        }

        let instances = urls
            .split(',')
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(|u| validate_base_url("SERVICE_REGISTRY", u))
            .collect::<Result<Vec<_>, _>>()?;
        if instances.is_empty() {
            return Err(ConfigError::invalid(
                "SERVICE_REGISTRY",
                format!("service `{name}` has no instances"),
            ));
        }

        registry.insert(name.to_string(), instances);
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ServiceConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServiceConfig::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn defaults_use_discovery_and_no_notifications() {
        let cfg = config_from(&[]).unwrap();
        assert_eq!(cfg, ServiceConfig::default());
        assert_eq!(
            cfg.inventory,
            InventoryEndpoint::Discovered {
                service_name: "inventory-service".to_string()
            }
        );
        assert!(!cfg.notifications_enabled);
        assert_eq!(cfg.notification_topic, "notificationTopic");
        assert_eq!(cfg.inventory_timeout, None);
    }

    #[test]
    fn fixed_url_wins_over_service_name() {
        let cfg = config_from(&[
            ("INVENTORY_SERVICE_URL", "http://localhost:8082/"),
            ("INVENTORY_SERVICE_NAME", "ignored"),
        ])
        .unwrap();
        assert_eq!(
            cfg.inventory,
            InventoryEndpoint::Fixed {
                base_url: "http://localhost:8082".to_string()
            }
        );
    }

    #[test]
    fn registry_is_parsed() {
        let cfg = config_from(&[(
            "SERVICE_REGISTRY",
            "inventory-service=http://a:8082, http://b:8082 ; billing=https://billing",
        )])
        .unwrap();
        assert_eq!(
            cfg.service_registry.get("inventory-service").unwrap(),
            &vec!["http://a:8082".to_string(), "http://b:8082".to_string()]
        );
        assert_eq!(cfg.service_registry.len(), 2);
    }

    #[test]
    fn malformed_registry_entry_is_rejected() {
        let err = config_from(&[("SERVICE_REGISTRY", "inventory-service")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "SERVICE_REGISTRY", .. }));

        let err = config_from(&[("SERVICE_REGISTRY", "inventory-service=ftp://x")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "SERVICE_REGISTRY", .. }));
    }

    #[test]
    fn flags_and_timeout_are_parsed() {
        let cfg = config_from(&[
            ("NOTIFICATIONS_ENABLED", "TRUE"),
            ("NOTIFICATION_TOPIC", "orders"),
            ("INVENTORY_TIMEOUT_MS", "250"),
        ])
        .unwrap();
        assert!(cfg.notifications_enabled);
        assert_eq!(cfg.notification_topic, "orders");
        assert_eq!(cfg.inventory_timeout, Some(Duration::from_millis(250)));
        assert_eq!(cfg.notification_timeout, DEFAULT_NOTIFICATION_TIMEOUT);

        let err = config_from(&[("NOTIFICATIONS_ENABLED", "maybe")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "NOTIFICATIONS_ENABLED", .. }));
    }

    #[test]
    fn notification_timeout_is_configurable() {
        let cfg = config_from(&[("NOTIFICATION_TIMEOUT_MS", "500")]).unwrap();
        assert_eq!(cfg.notification_timeout, Duration::from_millis(500));

        let err = config_from(&[("NOTIFICATION_TIMEOUT_MS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "NOTIFICATION_TIMEOUT_MS", .. }));
    }

    #[test]
    fn persistent_stores_require_database_url() {
        let err = config_from(&[("USE_PERSISTENT_STORES", "true")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Missing {
                var: "DATABASE_URL",
                reason: "required when USE_PERSISTENT_STORES=true"
            }
        );

        let cfg = config_from(&[
            ("USE_PERSISTENT_STORES", "true"),
            ("DATABASE_URL", "postgres://localhost/orders"),
        ])
        .unwrap();
        assert!(cfg.use_persistent_stores);
    }

    #[test]
    fn bad_bind_addr_is_rejected() {
        let err = config_from(&[("BIND_ADDR", "nowhere")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "BIND_ADDR", .. }));
    }
}
