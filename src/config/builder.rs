use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::debug;

use super::env::EnvSource;
use super::file::FileSource;
use super::source::{merge_at_path, ConfigSource, NodeSource};
use super::ConfigError;
use crate::node::{ConfigNode, Mapping};

/// Builder for layering configuration from defaults, TOML files and the
/// environment.
///
/// Sources are applied in registration order. Each one is merged over the
/// tree built so far with [`merge`](crate::merge()), so later sources win.
/// Nested mappings merge key by key, arrays append, and a null leaves the
/// collection underneath in place.
///
/// ## Example
///
/// ```no_run
/// use dragon_orm::Config;
/// use dragon_orm::orm::combined_defaults;
///
/// let config = Config::builder()
///     .with_defaults(combined_defaults())
///     .with_file("config/orm.toml", true)
///     .with_file("config/orm.local.toml", false)
///     .with_env("ORM", "__")
///     .build()?;
///
/// assert!(config.get("proxy_dir").is_some());
/// # Ok::<(), dragon_orm::ConfigError>(())
/// ```
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct Config {
    sources: Vec<Box<dyn ConfigSource>>,
}

impl Config {
    /// Creates a new configuration builder.
    pub fn builder() -> Self {
        Self::default()
    }

    /// Adds an arbitrary source.
    pub fn with_source(mut self, source: impl ConfigSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Adds an in-memory defaults tree. Register it first so every other
    /// source overrides it.
    pub fn with_defaults(self, defaults: impl Into<ConfigNode>) -> Self {
        self.with_source(NodeSource::new(defaults))
    }

    /// Adds an in-memory tree that overrides the sources registered before it.
    pub fn with_node(self, node: impl Into<ConfigNode>) -> Self {
        self.with_source(NodeSource::new(node))
    }

    /// Adds a TOML file to be loaded.
    ///
    /// If `required` is `true`, the build will fail if the file doesn't exist.
    /// Optional files that are missing are skipped.
    pub fn with_file(self, path: impl AsRef<Path>, required: bool) -> Self {
        self.with_source(FileSource::new(path, required))
    }

    /// Loads configuration from environment variables with the given prefix.
    ///
    /// `ORM__METADATA__APP=src/entity` with prefix `ORM` and separator `__`
    /// sets `metadata.app`. Values are coerced to the most specific type:
    /// boolean, integer, float, or string.
    pub fn with_env(self, prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        self.with_source(EnvSource::new(prefix, separator))
    }

    /// Loads and merges every source into one tree.
    pub fn build(self) -> Result<ConfigNode, ConfigError> {
        let mut merged = ConfigNode::Mapping(Mapping::new());

        for source in &self.sources {
            let entries = source.entries()?;
            debug!(?source, entries = entries.len(), "merging configuration source");
            for entry in entries {
                merged = merge_at_path(merged, &entry.path, &entry.value);
            }
        }

        Ok(merged)
    }

    /// Builds the tree and deserializes it into `T`.
    ///
    /// Null values are treated as missing keys.
    pub fn build_into<T: DeserializeOwned>(self) -> Result<T, ConfigError> {
        let tree = self.build()?;
        tree.deserialize_as().map_err(ConfigError::DeserializeError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn toml_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    #[test]
    fn test_later_sources_override_earlier() {
        let defaults = ConfigNode::mapping([
            ("host", ConfigNode::from("127.0.0.1")),
            ("port", ConfigNode::from(3306)),
        ]);
        let file = toml_file("host = \"db1\"\n");

        let config = Config::builder()
            .with_defaults(defaults)
            .with_file(file.path(), true)
            .build()
            .unwrap();

        assert_eq!(config["host"].as_str(), Some("db1"));
        assert_eq!(config["port"].as_integer(), Some(3306));
    }

    #[test]
    fn test_arrays_append_across_layers() {
        let base = toml_file("[metadata]\napp = [\"src/entity\"]\n");
        let local = toml_file("[metadata]\napp = [\"src/extra\"]\n");

        let config = Config::builder()
            .with_file(base.path(), true)
            .with_file(local.path(), true)
            .build()
            .unwrap();

        assert_eq!(
            config["metadata"]["app"],
            ConfigNode::sequence(["src/entity", "src/extra"])
        );
    }

    #[test]
    fn test_null_node_keeps_defaults() {
        let defaults = ConfigNode::mapping([("metadata", ConfigNode::mapping([("app", "src")]))]);
        let overrides = ConfigNode::mapping([("metadata", ConfigNode::Null)]);

        let config = Config::builder()
            .with_defaults(defaults.clone())
            .with_node(overrides)
            .build()
            .unwrap();

        assert_eq!(config, defaults);
    }

    #[test]
    fn test_env_overrides_file() {
        std::env::set_var("DRAGON_ORM_BUILDER_TEST__DB__PORT", "3307");
        let file = toml_file("[db]\nhost = \"db1\"\nport = 3306\n");

        let config = Config::builder()
            .with_file(file.path(), true)
            .with_env("DRAGON_ORM_BUILDER_TEST", "__")
            .build()
            .unwrap();

        assert_eq!(config["db"]["host"].as_str(), Some("db1"));
        assert_eq!(config["db"]["port"].as_integer(), Some(3307));
    }

    #[test]
    fn test_missing_required_file_fails() {
        let result = Config::builder()
            .with_file("/nonexistent/orm.toml", true)
            .build();

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_build_into_typed() {
        #[derive(Debug, Deserialize)]
        struct Db {
            host: String,
            port: Option<u16>,
        }

        let db: Db = Config::builder()
            .with_defaults(ConfigNode::mapping([
                ("host", ConfigNode::from("127.0.0.1")),
                ("port", ConfigNode::Null),
            ]))
            .build_into()
            .unwrap();

        assert_eq!(db.host, "127.0.0.1");
        assert_eq!(db.port, None);
    }

    #[test]
    fn test_build_into_reports_type_errors() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Db {
            port: u16,
        }

        let result = Config::builder()
            .with_node(ConfigNode::mapping([("port", "not a number")]))
            .build_into::<Db>();

        assert!(matches!(result, Err(ConfigError::DeserializeError(_))));
    }
}
