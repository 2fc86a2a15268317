//! The configuration tree merged and resolved by this crate.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Keyed children of a [`ConfigNode::Mapping`], iterated in key order.
pub type Mapping = BTreeMap<String, ConfigNode>;

/// A configuration value.
///
/// Collections carry their kind explicitly: a [`Sequence`](Self::Sequence)
/// is list-like and appends when merged, a [`Mapping`](Self::Mapping) merges
/// key by key. The kind is fixed when the node is built and is never guessed
/// from key shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigNode {
    /// Absent value. Leaves defaults beneath it visible when merged.
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<ConfigNode>),
    Mapping(Mapping),
}

static NULL: ConfigNode = ConfigNode::Null;

impl ConfigNode {
    /// Builds a mapping node from key/value pairs.
    ///
    /// ```
    /// use dragon_orm::ConfigNode;
    ///
    /// let node = ConfigNode::mapping([("host", "db1"), ("charset", "UTF8")]);
    /// assert_eq!(node["host"].as_str(), Some("db1"));
    /// ```
    pub fn mapping<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ConfigNode>,
    {
        ConfigNode::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Builds a sequence node.
    pub fn sequence<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ConfigNode>,
    {
        ConfigNode::Sequence(items.into_iter().map(Into::into).collect())
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigNode::Null => "null",
            ConfigNode::Bool(_) => "boolean",
            ConfigNode::Integer(_) => "integer",
            ConfigNode::Float(_) => "float",
            ConfigNode::String(_) => "string",
            ConfigNode::Sequence(_) => "sequence",
            ConfigNode::Mapping(_) => "mapping",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConfigNode::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigNode::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigNode::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ConfigNode::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ConfigNode::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[ConfigNode]> {
        match self {
            ConfigNode::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            ConfigNode::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Looks up a key in a mapping node. Returns `None` for any other variant.
    pub fn get(&self, key: &str) -> Option<&ConfigNode> {
        self.as_mapping().and_then(|m| m.get(key))
    }

    /// Converts the tree into a TOML value.
    ///
    /// TOML has no null, so `Null` nodes are dropped from mappings and
    /// sequences, and a `Null` root yields `None`.
    pub fn to_toml(&self) -> Option<toml::Value> {
        match self {
            ConfigNode::Null => None,
            ConfigNode::Bool(b) => Some(toml::Value::Boolean(*b)),
            ConfigNode::Integer(i) => Some(toml::Value::Integer(*i)),
            ConfigNode::Float(f) => Some(toml::Value::Float(*f)),
            ConfigNode::String(s) => Some(toml::Value::String(s.clone())),
            ConfigNode::Sequence(items) => Some(toml::Value::Array(
                items.iter().filter_map(ConfigNode::to_toml).collect(),
            )),
            ConfigNode::Mapping(m) => Some(toml::Value::Table(
                m.iter()
                    .filter_map(|(k, v)| v.to_toml().map(|v| (k.clone(), v)))
                    .collect(),
            )),
        }
    }

    /// Deserializes the tree into a typed value.
    ///
    /// Null entries are treated as missing, so they map onto `Option` fields
    /// and `#[serde(default)]`.
    pub fn deserialize_as<T: DeserializeOwned>(&self) -> Result<T, toml::de::Error> {
        self.to_toml()
            .unwrap_or_else(|| toml::Value::Table(toml::Table::new()))
            .try_into()
    }
}

impl Index<&str> for ConfigNode {
    type Output = ConfigNode;

    /// Returns `Null` for missing keys and non-mapping nodes.
    fn index(&self, key: &str) -> &ConfigNode {
        self.get(key).unwrap_or(&NULL)
    }
}

impl fmt::Display for ConfigNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigNode::Null => f.write_str("null"),
            ConfigNode::Bool(b) => write!(f, "{b}"),
            ConfigNode::Integer(i) => write!(f, "{i}"),
            ConfigNode::Float(x) => write!(f, "{x}"),
            ConfigNode::String(s) => write!(f, "{s:?}"),
            ConfigNode::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            ConfigNode::Mapping(m) => {
                f.write_str("{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<toml::Value> for ConfigNode {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => ConfigNode::String(s),
            toml::Value::Integer(i) => ConfigNode::Integer(i),
            toml::Value::Float(f) => ConfigNode::Float(f),
            toml::Value::Boolean(b) => ConfigNode::Bool(b),
            toml::Value::Datetime(dt) => ConfigNode::String(dt.to_string()),
            toml::Value::Array(items) => {
                ConfigNode::Sequence(items.into_iter().map(ConfigNode::from).collect())
            }
            toml::Value::Table(table) => ConfigNode::from(table),
        }
    }
}

impl From<toml::Table> for ConfigNode {
    fn from(table: toml::Table) -> Self {
        ConfigNode::Mapping(
            table
                .into_iter()
                .map(|(k, v)| (k, ConfigNode::from(v)))
                .collect(),
        )
    }
}

impl From<&str> for ConfigNode {
    fn from(s: &str) -> Self {
        ConfigNode::String(s.to_string())
    }
}

impl From<String> for ConfigNode {
    fn from(s: String) -> Self {
        ConfigNode::String(s)
    }
}

impl From<bool> for ConfigNode {
    fn from(b: bool) -> Self {
        ConfigNode::Bool(b)
    }
}

impl From<i64> for ConfigNode {
    fn from(i: i64) -> Self {
        ConfigNode::Integer(i)
    }
}

impl From<i32> for ConfigNode {
    fn from(i: i32) -> Self {
        ConfigNode::Integer(i.into())
    }
}

impl From<u16> for ConfigNode {
    fn from(i: u16) -> Self {
        ConfigNode::Integer(i.into())
    }
}

impl From<f64> for ConfigNode {
    fn from(f: f64) -> Self {
        ConfigNode::Float(f)
    }
}

impl From<Mapping> for ConfigNode {
    fn from(m: Mapping) -> Self {
        ConfigNode::Mapping(m)
    }
}

impl<T: Into<ConfigNode>> From<Vec<T>> for ConfigNode {
    fn from(items: Vec<T>) -> Self {
        ConfigNode::sequence(items)
    }
}

impl<T: Into<ConfigNode>> From<Option<T>> for ConfigNode {
    fn from(value: Option<T>) -> Self {
        value.map_or(ConfigNode::Null, Into::into)
    }
}
