//! Recursive merge of configuration trees.
//!
//! The left tree holds explicit values and wins, the right tree holds
//! defaults. Mappings merge key by key, sequences append, and a null on the
//! left leaves the default collection beneath it in place.

use tracing::warn;

use crate::node::{ConfigNode, Mapping};

/// Merges `left` over `right`, returning a new tree.
///
/// - two mappings merge recursively, key by key
/// - a left sequence is appended after the right sequence, or inserted
///   under fresh integer keys when the right side is a mapping
/// - a left `Null` returns the right collection unchanged
/// - anything else returns `left` as is
///
/// Neither input is modified.
///
/// ```
/// use dragon_orm::{merge, ConfigNode};
///
/// let user = ConfigNode::mapping([("host", "db1")]);
/// let defaults = ConfigNode::mapping([
///     ("host", ConfigNode::from("127.0.0.1")),
///     ("port", ConfigNode::from(3306)),
/// ]);
///
/// let merged = merge(&user, &defaults);
/// assert_eq!(merged["host"].as_str(), Some("db1"));
/// assert_eq!(merged["port"].as_integer(), Some(3306));
/// ```
pub fn merge(left: &ConfigNode, right: &ConfigNode) -> ConfigNode {
    match (left, right) {
        (ConfigNode::Mapping(overrides), ConfigNode::Mapping(defaults)) => {
            ConfigNode::Mapping(merge_mappings(overrides, defaults))
        }
        (ConfigNode::Sequence(items), ConfigNode::Sequence(defaults)) => {
            let mut result = Vec::with_capacity(defaults.len() + items.len());
            result.extend(defaults.iter().cloned());
            result.extend(items.iter().cloned());
            ConfigNode::Sequence(result)
        }
        (ConfigNode::Sequence(items), ConfigNode::Mapping(defaults)) => {
            let mut result = defaults.clone();
            append_indexed(&mut result, items);
            ConfigNode::Mapping(result)
        }
        (ConfigNode::Null, ConfigNode::Mapping(_) | ConfigNode::Sequence(_)) => right.clone(),
        _ => left.clone(),
    }
}

/// Merges two mappings key by key. See [`merge`].
pub fn merge_mappings(overrides: &Mapping, defaults: &Mapping) -> Mapping {
    let mut result = defaults.clone();
    for (key, value) in overrides {
        let merged = match result.get(key) {
            Some(existing) => merge(value, existing),
            None => value.clone(),
        };
        result.insert(key.clone(), merged);
    }
    result
}

/// Merges `provided` over `defaults` after dropping the keys that only
/// `exclude` knows about.
///
/// A key is dropped when `exclude` has it and `defaults` does not. Keys
/// unknown to both are kept, so options outside either table pass through.
pub fn merge_reduced(provided: &Mapping, defaults: &Mapping, exclude: &Mapping) -> Mapping {
    let reduced: Mapping = provided
        .iter()
        .filter(|(key, _)| defaults.contains_key(*key) || !exclude.contains_key(*key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    merge_mappings(&reduced, defaults)
}

/// Inserts `items` into `target` under increasing integer keys, starting
/// after the largest integer key already present.
///
/// Only canonical decimal keys count as integer keys, so `"007"` and `"+5"`
/// stay plain strings. Entries that would need a key past `u64::MAX` are
/// dropped.
fn append_indexed(target: &mut Mapping, items: &[ConfigNode]) {
    let mut next = match target.keys().filter_map(|k| integer_key(k)).max() {
        Some(max) => max.checked_add(1),
        None => Some(0),
    };

    for (appended, item) in items.iter().enumerate() {
        let Some(index) = next else {
            warn!(
                dropped = items.len() - appended,
                "no integer key left to append sequence entries under"
            );
            return;
        };
        target.insert(index.to_string(), item.clone());
        next = index.checked_add(1);
    }
}

fn integer_key(key: &str) -> Option<u64> {
    key.parse::<u64>()
        .ok()
        .filter(|n| n.to_string() == key)
}
