//! Layered configuration loading.

mod builder;
mod env;
mod error;
mod file;
mod source;

pub use builder::Config;
pub use env::EnvSource;
pub use error::ConfigError;
pub use file::FileSource;
pub use source::{merge_at_path, ConfigEntry, ConfigSource, NodeSource};
