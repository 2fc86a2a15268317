//! File-based configuration source.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::node::ConfigNode;

use super::source::{ConfigEntry, ConfigSource};
use super::ConfigError;

/// A TOML file layer.
///
/// A missing required file fails the build. A missing optional file
/// contributes nothing, which lets deployments drop in `orm.local.toml`
/// style overrides only where they need them.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    required: bool,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>, required: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required,
        }
    }

    pub fn required(path: impl AsRef<Path>) -> Self {
        Self::new(path, true)
    }

    pub fn optional(path: impl AsRef<Path>) -> Self {
        Self::new(path, false)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file into a tree, or `None` when an optional file is absent.
    fn load(&self) -> Result<Option<ConfigNode>, ConfigError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !self.required => {
                warn!(path = %self.path.display(), "optional config file not found, skipping");
                return Ok(None);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::FileNotFound(self.path.clone()));
            }
            Err(source) => {
                return Err(ConfigError::ReadError {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let table: toml::Table =
            toml::from_str(&contents).map_err(|source| ConfigError::ParseError {
                path: self.path.clone(),
                source,
            })?;
        debug!(path = %self.path.display(), keys = table.len(), "loaded config file");
        Ok(Some(ConfigNode::from(table)))
    }
}

impl ConfigSource for FileSource {
    fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError> {
        Ok(self.load()?.map(ConfigEntry::root).into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_file_source_loads_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "proxy_dir = \"/tmp/proxies\"").unwrap();
        writeln!(file, "[metadata]").unwrap();
        writeln!(file, "app = [\"src/entity\"]").unwrap();

        let source = FileSource::new(file.path(), true);
        let entries = source.entries().unwrap();

        assert_eq!(entries.len(), 1);
        assert!(entries[0].path.is_empty());
        let node = &entries[0].value;
        assert_eq!(node["proxy_dir"].as_str(), Some("/tmp/proxies"));
        assert_eq!(node["metadata"]["app"].as_sequence().unwrap().len(), 1);
    }

    #[test]
    fn test_file_source_required_missing() {
        let source = FileSource::required("/nonexistent/path/orm.toml");
        let result = source.entries();

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_file_source_optional_missing() {
        let source = FileSource::optional("/nonexistent/path/orm.toml");
        let entries = source.entries().unwrap();

        assert!(entries.is_empty());
    }

    #[test]
    fn test_file_source_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "host = ").unwrap();

        let source = FileSource::new(file.path(), true);
        let result = source.entries();

        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }
}
