//! Default tables the user configuration is merged over.

use crate::node::{ConfigNode, Mapping};

/// Connection defaults. Keys with a null default are optional.
pub fn connection_defaults() -> Mapping {
    [
        ("dbname", ConfigNode::Null),
        ("host", "127.0.0.1".into()),
        ("port", ConfigNode::Null),
        ("user", ConfigNode::Null),
        ("password", ConfigNode::Null),
        ("charset", "UTF8".into()),
        ("driver", "pdo_mysql".into()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

/// Entity manager defaults. `proxy_dir` has no default and must be set.
pub fn manager_defaults() -> Mapping {
    [
        ("annotation_cache", "default".into()),
        ("metadata_cache", "default".into()),
        ("query_cache", "default".into()),
        ("result_cache", "default".into()),
        ("hydration_cache", "default".into()),
        ("class_metadata_factory", "default".into()),
        ("default_repository_class", "EntityRepository".into()),
        ("repository_factory_class", "DefaultRepositoryFactory".into()),
        ("auto_generate_proxy_classes", false.into()),
        ("naming_strategy", "underscore".into()),
        ("quote_strategy", "default".into()),
        ("entity_listener_resolver", "default".into()),
        ("proxy_dir", ConfigNode::Null),
        ("proxy_namespace", "GeneratedProxy".into()),
        ("metadata", ConfigNode::Mapping(Mapping::new())),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

/// Manager defaults plus the connection keys the manager table lacks.
///
/// This is a plain union where the manager table wins on shared keys, not a
/// recursive merge.
pub fn combined_defaults() -> Mapping {
    let mut combined = manager_defaults();
    for (key, value) in connection_defaults() {
        combined.entry(key).or_insert(value);
    }
    combined
}
