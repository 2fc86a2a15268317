use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OrmError {
    #[error("ORM configuration has to be a mapping, got {0}")]
    InvalidConfig(&'static str),

    #[error("cache `{key}` has to be specified by a string, got {kind}")]
    CacheNotString {
        key: &'static str,
        kind: &'static str,
    },

    #[error("the `{0}` cache driver is not supported")]
    UnsupportedCacheDriver(String),

    #[error("malformed cache spec `{0}`, expected `driver` or `driver(service)`")]
    MalformedCacheSpec(String),

    #[error("proxy dir needs to be configured")]
    MissingProxyDir,

    #[error("invalid {section} settings: {source}")]
    Settings {
        section: &'static str,
        source: toml::de::Error,
    },
}
