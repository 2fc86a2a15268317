use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::cache::{CacheBinding, CacheRegistry, CacheSlot};
use super::defaults::{combined_defaults, connection_defaults, manager_defaults};
use super::settings::{ConnectionOptions, ManagerSettings};
use super::OrmError;
use crate::merge::{merge_mappings, merge_reduced};
use crate::node::{ConfigNode, Mapping};
use crate::Error;

/// The resolved configuration of one entity manager.
///
/// Building it merges the user configuration over the default tables,
/// resolves every cache slot, and splits the result into manager settings
/// and connection options. Nothing is constructed here; the values are
/// meant for whatever wires up the actual ORM.
///
/// ## Example
///
/// ```
/// use dragon_orm::{ConfigNode, OrmExtension};
/// use dragon_orm::orm::{CacheDriver, CacheSlot};
///
/// let ext = OrmExtension::from_config(ConfigNode::mapping([
///     ("proxy_dir", "/tmp/proxies"),
///     ("query_cache", "redis(app.redis)"),
///     ("host", "db1"),
/// ]))?;
///
/// assert_eq!(ext.cache(CacheSlot::Query).driver, CacheDriver::Redis);
/// assert_eq!(ext.connection().host, "db1");
/// # Ok::<(), dragon_orm::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct OrmExtension {
    effective: ConfigNode,
    caches: Vec<CacheBinding>,
    manager: ManagerSettings,
    connection: ConnectionOptions,
    connection_node: ConfigNode,
}

impl OrmExtension {
    /// Creates a new builder for an `OrmExtension`.
    pub fn builder() -> OrmExtensionBuilder {
        OrmExtensionBuilder::default()
    }

    /// Resolves `config` with the default cache registry and no project root.
    pub fn from_config(config: impl Into<ConfigNode>) -> Result<Self, Error> {
        Self::builder().with_config(config).build()
    }

    /// The user configuration merged over [`combined_defaults`].
    pub fn effective(&self) -> &ConfigNode {
        &self.effective
    }

    /// Cache bindings in [`CacheSlot::ALL`] order.
    pub fn caches(&self) -> &[CacheBinding] {
        &self.caches
    }

    pub fn cache(&self, slot: CacheSlot) -> &CacheBinding {
        // `caches` holds exactly one binding per slot, in `CacheSlot::ALL` order
        &self.caches[slot as usize]
    }

    pub fn manager(&self) -> &ManagerSettings {
        &self.manager
    }

    pub fn connection(&self) -> &ConnectionOptions {
        &self.connection
    }

    /// Connection options as a tree, including keys the typed view ignores.
    pub fn connection_node(&self) -> &ConfigNode {
        &self.connection_node
    }
}

/// Builder for constructing an [`OrmExtension`].
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct OrmExtensionBuilder {
    config: Option<ConfigNode>,
    registry: CacheRegistry,
    project_root: Option<PathBuf>,
}

impl OrmExtensionBuilder {
    /// Sets the user configuration. It has to be a mapping.
    pub fn with_config(mut self, config: impl Into<ConfigNode>) -> Self {
        self.config = Some(config.into());
        self
    }

    /// Replaces the default cache driver table.
    pub fn with_registry(mut self, registry: CacheRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Scopes cache namespaces to this project.
    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    /// Resolves the configuration.
    ///
    /// Returns an error if no configuration was provided, if it isn't a
    /// mapping, if a cache is misconfigured, or if `proxy_dir` is unset.
    pub fn build(self) -> Result<OrmExtension, Error> {
        let provided = match self.config.ok_or(Error::MissingConfig)? {
            ConfigNode::Mapping(provided) => provided,
            other => return Err(OrmError::InvalidConfig(other.kind()).into()),
        };

        let effective = merge_mappings(&provided, &combined_defaults());
        let caches = resolve_caches(&effective, &self.registry, self.project_root.as_deref())?;

        if effective.get("proxy_dir").map_or(true, ConfigNode::is_null) {
            return Err(OrmError::MissingProxyDir.into());
        }

        let connection_node = ConfigNode::Mapping(merge_reduced(
            &effective,
            &connection_defaults(),
            &manager_defaults(),
        ));
        let effective = ConfigNode::Mapping(effective);

        let manager: ManagerSettings = effective
            .deserialize_as()
            .map_err(|source| OrmError::Settings {
                section: "manager",
                source,
            })?;
        let connection: ConnectionOptions = connection_node
            .deserialize_as()
            .map_err(|source| OrmError::Settings {
                section: "connection",
                source,
            })?;

        info!(
            driver = %connection.driver,
            host = %connection.host,
            proxy_dir = %manager.proxy_dir.display(),
            "resolved ORM configuration"
        );

        Ok(OrmExtension {
            effective,
            caches,
            manager,
            connection,
            connection_node,
        })
    }
}

fn resolve_caches(
    effective: &Mapping,
    registry: &CacheRegistry,
    project_root: Option<&Path>,
) -> Result<Vec<CacheBinding>, OrmError> {
    CacheSlot::ALL
        .iter()
        .map(|&slot| {
            let key = slot.config_key();
            let raw = match effective.get(key) {
                Some(ConfigNode::String(raw)) => raw,
                other => {
                    return Err(OrmError::CacheNotString {
                        key,
                        kind: other.map_or("nothing", ConfigNode::kind),
                    })
                }
            };

            let binding = registry.bind(slot, raw, project_root)?;
            debug!(
                slot = key,
                driver = %binding.driver,
                service = ?binding.service,
                namespace = %binding.namespace,
                "resolved cache"
            );
            Ok(binding)
        })
        .collect()
}
