//! Redis backend integration for Gridstore.
//!
//! Plugs Redis into the `gridstore-datastore` provider contract:
//!
//! - [`descriptor`] - the typed connection target derived from a validated
//!   configuration, and its `redis://` / `rediss://` URL rendering
//! - [`client`] - the process-wide shared [`redis::Client`] registry, torn
//!   down through the shutdown coordinator
//! - [`provider`] - the [`provider::RedisConnectionFactory`] and the
//!   [`provider::RedisDatastoreProvider`] alias
//!
//! ```ignore
//! use gridstore_redis::RedisDatastoreProvider;
//!
//! let mut provider = RedisDatastoreProvider::new_redis();
//! provider.configure(&bag)?;
//! provider.start().await?;
//! let connection = provider.connection()?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod client;
pub mod descriptor;
pub mod provider;

pub use descriptor::ConnectionDescriptor;
pub use provider::{RedisConnectionFactory, RedisDatastoreProvider, RedisDatastoreProviderExt};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
