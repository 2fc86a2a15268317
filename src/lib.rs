pub mod config;
mod error;
pub mod merge;
pub mod node;
pub mod orm;

pub use config::{Config, ConfigError};
pub use error::Error;
pub use merge::merge;
pub use node::{ConfigNode, Mapping};
pub use orm::OrmExtension;
