use crate::node::ConfigNode;

use super::source::{ConfigEntry, ConfigSource};
use super::ConfigError;

/// Reads `PREFIX<sep>SECTION<sep>KEY=value` variables into the tree.
///
/// Path segments are lowercased. Entries come out sorted by variable name so
/// the merged result doesn't depend on the process environment order.
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: String,
    separator: String,
}

impl EnvSource {
    pub fn new(prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        let separator = separator.into();
        assert!(!separator.is_empty(), "separator must not be empty");
        Self {
            prefix: prefix.into(),
            separator,
        }
    }

    fn collect<I>(&self, vars: I) -> Vec<ConfigEntry>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let prefix_with_sep = format!("{}{}", self.prefix, self.separator);
        let mut matching: Vec<(String, String)> = vars
            .into_iter()
            .filter(|(key, _)| key.len() > prefix_with_sep.len() && key.starts_with(&prefix_with_sep))
            .collect();
        matching.sort();

        matching
            .into_iter()
            .map(|(key, value)| {
                let path = key[prefix_with_sep.len()..]
                    .split(&self.separator)
                    .map(|s| s.to_lowercase())
                    .collect();
                ConfigEntry::at_path(path, coerce_value(&value))
            })
            .collect()
    }
}

impl ConfigSource for EnvSource {
    fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError> {
        Ok(self.collect(std::env::vars()))
    }
}

fn coerce_value(s: &str) -> ConfigNode {
    if s.eq_ignore_ascii_case("true") {
        return ConfigNode::Bool(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return ConfigNode::Bool(false);
    }

    // Only plain integers: optional minus, then digits
    if looks_like_integer(s) {
        if let Ok(i) = s.parse::<i64>() {
            return ConfigNode::Integer(i);
        }
    }

    if s.contains('.') {
        if let Ok(f) = s.parse::<f64>() {
            return ConfigNode::Float(f);
        }
    }

    ConfigNode::String(s.to_string())
}

fn looks_like_integer(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
