//! Cache driver names, `driver(service)` specs and per-slot bindings.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use sha2::{Digest, Sha256};

use super::OrmError;

/// Prefix of every cache binding's service name.
pub const SERVICE_PREFIX: &str = "dragon.orm.cache.";

/// Cache provider implementations a spec can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheDriver {
    Array,
    Apc,
    Apcu,
    Memcache,
    Memcached,
    Redis,
}

impl CacheDriver {
    pub fn name(self) -> &'static str {
        match self {
            CacheDriver::Array => "array",
            CacheDriver::Apc => "apc",
            CacheDriver::Apcu => "apcu",
            CacheDriver::Memcache => "memcache",
            CacheDriver::Memcached => "memcached",
            CacheDriver::Redis => "redis",
        }
    }
}

impl fmt::Display for CacheDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Maps the driver names accepted in configuration to providers.
///
/// The built-in table is what [`Default`] returns; applications can add
/// aliases with [`with_driver`](Self::with_driver).
#[derive(Debug, Clone)]
pub struct CacheRegistry {
    drivers: BTreeMap<String, CacheDriver>,
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::empty()
            .with_driver("default", CacheDriver::Array)
            .with_driver("apc", CacheDriver::Apc)
            .with_driver("apcu", CacheDriver::Apcu)
            .with_driver("array", CacheDriver::Array)
            .with_driver("memcache", CacheDriver::Memcache)
            .with_driver("memcached", CacheDriver::Memcached)
            .with_driver("redis", CacheDriver::Redis)
    }
}

impl CacheRegistry {
    /// A registry that knows no drivers.
    pub fn empty() -> Self {
        Self {
            drivers: BTreeMap::new(),
        }
    }

    /// Registers `name`, replacing any previous entry with the same name.
    #[must_use]
    pub fn with_driver(mut self, name: impl Into<String>, driver: CacheDriver) -> Self {
        self.drivers.insert(name.into(), driver);
        self
    }

    pub fn get(&self, name: &str) -> Option<CacheDriver> {
        self.drivers.get(name).copied()
    }

    /// Parses `raw` and resolves its driver into a binding for `slot`.
    ///
    /// When `project_root` is given, the namespace gets a short hash of it so
    /// two checkouts sharing one cache backend don't see each other's entries.
    pub fn bind(
        &self,
        slot: CacheSlot,
        raw: &str,
        project_root: Option<&Path>,
    ) -> Result<CacheBinding, OrmError> {
        let spec = CacheSpec::parse(raw)?;
        let driver = self
            .get(&spec.driver)
            .ok_or_else(|| OrmError::UnsupportedCacheDriver(spec.driver.clone()))?;

        Ok(CacheBinding {
            slot,
            driver,
            service: spec.service,
            namespace: namespace_for(slot, project_root),
        })
    }
}

/// A parsed cache setting: `driver` or `driver(service)`.
///
/// `service` names the backend connection handed to the provider, e.g. a
/// shared redis client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSpec {
    pub driver: String,
    pub service: Option<String>,
}

impl CacheSpec {
    pub fn parse(raw: &str) -> Result<Self, OrmError> {
        let malformed = || OrmError::MalformedCacheSpec(raw.to_string());

        let (driver, service) = match raw.split_once('(') {
            None => (raw, None),
            Some((driver, rest)) => {
                let service = rest.strip_suffix(')').ok_or_else(malformed)?;
                if service.is_empty() || service.contains(['(', ')']) {
                    return Err(malformed());
                }
                (driver, Some(service.to_string()))
            }
        };

        if driver.is_empty() || driver.contains(')') {
            return Err(malformed());
        }

        Ok(Self {
            driver: driver.to_string(),
            service,
        })
    }
}

impl FromStr for CacheSpec {
    type Err = OrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// The caches an entity manager uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheSlot {
    Annotations,
    Metadata,
    Query,
    OrmResult,
    Hydration,
}

impl CacheSlot {
    /// Every slot, in resolution order.
    pub const ALL: [CacheSlot; 5] = [
        CacheSlot::Annotations,
        CacheSlot::Metadata,
        CacheSlot::Query,
        CacheSlot::OrmResult,
        CacheSlot::Hydration,
    ];

    /// Configuration key holding the slot's spec.
    pub fn config_key(self) -> &'static str {
        match self {
            CacheSlot::Annotations => "annotation_cache",
            CacheSlot::Metadata => "metadata_cache",
            CacheSlot::Query => "query_cache",
            CacheSlot::OrmResult => "result_cache",
            CacheSlot::Hydration => "hydration_cache",
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            CacheSlot::Annotations => "annotations",
            CacheSlot::Metadata => "metadata",
            CacheSlot::Query => "query",
            CacheSlot::OrmResult => "orm_result",
            CacheSlot::Hydration => "hydration",
        }
    }

    pub fn service_name(self) -> String {
        format!("{SERVICE_PREFIX}{}", self.suffix())
    }
}

/// A resolved cache for one slot.
///
/// `namespace` is the slot's service name, suffixed with `_` and the first
/// 8 hex digits of the SHA-256 of the project root when one is configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheBinding {
    pub slot: CacheSlot,
    pub driver: CacheDriver,
    pub service: Option<String>,
    pub namespace: String,
}

fn namespace_for(slot: CacheSlot, project_root: Option<&Path>) -> String {
    let mut namespace = slot.service_name();
    if let Some(root) = project_root {
        let digest = hex::encode(Sha256::digest(root.to_string_lossy().as_bytes()));
        namespace.push('_');
        namespace.push_str(&digest[..8]);
    }
    namespace
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_driver() {
        let spec = CacheSpec::parse("redis").unwrap();
        assert_eq!(spec.driver, "redis");
        assert_eq!(spec.service, None);
    }

    #[test]
    fn test_parse_driver_with_service() {
        let spec: CacheSpec = "memcached(app.memcached)".parse().unwrap();
        assert_eq!(spec.driver, "memcached");
        assert_eq!(spec.service.as_deref(), Some("app.memcached"));
    }

    #[test]
    fn test_parse_rejects_malformed_specs() {
        for raw in ["", "redis(", "redis(app", "(app)", "redis()", "redis(a(b))", "redis)"] {
            assert!(
                matches!(CacheSpec::parse(raw), Err(OrmError::MalformedCacheSpec(_))),
                "accepted {raw:?}"
            );
        }
    }

    #[test]
    fn test_default_registry_table() {
        let registry = CacheRegistry::default();

        assert_eq!(registry.get("default"), Some(CacheDriver::Array));
        assert_eq!(registry.get("array"), Some(CacheDriver::Array));
        assert_eq!(registry.get("apcu"), Some(CacheDriver::Apcu));
        assert_eq!(registry.get("redis"), Some(CacheDriver::Redis));
        assert_eq!(registry.get("filesystem"), None);
    }

    #[test]
    fn test_custom_alias() {
        let registry = CacheRegistry::default().with_driver("shared", CacheDriver::Redis);
        let binding = registry.bind(CacheSlot::Query, "shared(app.redis)", None).unwrap();

        assert_eq!(binding.driver, CacheDriver::Redis);
        assert_eq!(binding.service.as_deref(), Some("app.redis"));
    }

    #[test]
    fn test_bind_unsupported_driver() {
        let result = CacheRegistry::default().bind(CacheSlot::Metadata, "filesystem", None);

        assert!(matches!(result, Err(OrmError::UnsupportedCacheDriver(name)) if name == "filesystem"));
    }

    #[test]
    fn test_namespace_without_root_is_service_name() {
        let binding = CacheRegistry::default()
            .bind(CacheSlot::OrmResult, "default", None)
            .unwrap();

        assert_eq!(binding.namespace, "dragon.orm.cache.orm_result");
    }

    #[test]
    fn test_namespace_hashes_project_root() {
        let registry = CacheRegistry::default();
        let a = registry
            .bind(CacheSlot::Query, "array", Some(Path::new("/srv/app-a")))
            .unwrap();
        let b = registry
            .bind(CacheSlot::Query, "array", Some(Path::new("/srv/app-b")))
            .unwrap();

        let suffix = a.namespace.strip_prefix("dragon.orm.cache.query_").unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a.namespace, b.namespace);
    }
}
