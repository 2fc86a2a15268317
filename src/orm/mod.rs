//! Resolution and validation of the ORM integration's configuration.
//!
//! User configuration is merged over [`combined_defaults`], the cache entries
//! are resolved against a [`CacheRegistry`], and the result is split into
//! [`ManagerSettings`] and [`ConnectionOptions`].

mod cache;
mod defaults;
mod error;
mod extension;
mod settings;

pub use cache::{CacheBinding, CacheDriver, CacheRegistry, CacheSlot, CacheSpec, SERVICE_PREFIX};
pub use defaults::{combined_defaults, connection_defaults, manager_defaults};
pub use error::OrmError;
pub use extension::{OrmExtension, OrmExtensionBuilder};
pub use settings::{ConnectionOptions, ManagerSettings, NamingStrategy, QuoteStrategy};
