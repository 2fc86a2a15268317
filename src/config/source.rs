use crate::merge::merge;
use crate::node::{ConfigNode, Mapping};

use super::ConfigError;

/// A value contributed by a source, rooted at `path` within the tree.
#[derive(Debug, Clone)]
pub struct ConfigEntry {
    pub path: Vec<String>,
    pub value: ConfigNode,
}

impl ConfigEntry {
    pub fn root(value: impl Into<ConfigNode>) -> Self {
        Self {
            path: Vec::new(),
            value: value.into(),
        }
    }

    pub fn at_path(path: Vec<String>, value: ConfigNode) -> Self {
        Self { path, value }
    }
}

/// A layer of configuration fed to [`Config`](super::Config).
pub trait ConfigSource: Send + Sync + std::fmt::Debug {
    fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError>;
}

/// An in-memory tree, typically a defaults table or a programmatic override.
#[derive(Debug, Clone)]
pub struct NodeSource {
    node: ConfigNode,
}

impl NodeSource {
    pub fn new(node: impl Into<ConfigNode>) -> Self {
        Self { node: node.into() }
    }
}

impl ConfigSource for NodeSource {
    fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError> {
        Ok(vec![ConfigEntry::root(self.node.clone())])
    }
}

/// Merges `value` over the subtree of `tree` found at `path`.
///
/// Missing or non-mapping intermediate nodes are replaced by mappings.
pub fn merge_at_path(tree: ConfigNode, path: &[String], value: &ConfigNode) -> ConfigNode {
    let Some((first, rest)) = path.split_first() else {
        return merge(value, &tree);
    };

    let mut table = match tree {
        ConfigNode::Mapping(table) => table,
        _ => Mapping::new(),
    };
    let current = table.remove(first).unwrap_or_default();
    table.insert(first.clone(), merge_at_path(current, rest, value));
    ConfigNode::Mapping(table)
}
