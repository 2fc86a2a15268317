use crate::config::ConfigError;
use crate::orm::OrmError;
use thiserror::Error;

/// Top-level error type for the dragon-orm library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("ORM configuration error: {0}")]
    Orm(#[from] OrmError),

    #[error("ORM extension requires a configuration")]
    MissingConfig,
}
