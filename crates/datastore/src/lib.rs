//! Gridstore datastore provider layer.
//!
//! This crate defines the contract a NoSQL backend integration must fulfil
//! so that the entity-mapping layer above it can store and retrieve records
//! against interchangeable backends (key-value stores, caches, document and
//! graph stores) without depending on any single backend's API.
//!
//! # Architecture
//!
//! - [`config`] - the Configuration Reader: untyped property bag in,
//!   validated [`config::BackendConfiguration`] out
//! - [`provider`] - the [`provider::DatastoreProvider`] lifecycle
//!   (`configure -> start -> stop`) and the [`provider::ConnectionFactory`]
//!   seam backend integrations implement
//! - [`dialect`] - backend kinds with their default operation dialect and
//!   transaction-emulation capability
//! - [`shutdown`] - exactly-once release of process-wide client resources
//!   at exit, with bounded quiet/force windows
//! - [`error`] - the error taxonomy
//!
//! Backend integrations live in sibling crates (for example
//! `gridstore-redis`) and plug in through [`provider::ConnectionFactory`].
//!
//! # Lifecycle
//!
//! ```text
//! Unconfigured --configure(bag)--> Configured --start()--> Started --stop()--> Stopped
//! ```
//!
//! `configure` is single-shot; a failed `start` leaves the provider
//! `Configured` so it can be retried; `stop` is idempotent. Exactly one
//! provider instance exists per logical backend registration and it is the
//! sole owner of its connection handle.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod dialect;
pub mod error;
pub mod provider;
pub mod shutdown;

// Re-export commonly used types at crate root
pub use config::{BackendConfiguration, ConnectionDefaults, HostAndPort, Hosts, PropertyBag};
pub use dialect::{BackendKind, DialectKind};
pub use error::{ConfigurationError, ProviderError, ProviderResult};
pub use provider::{ConnectionFactory, DatastoreProvider, ProviderState};
pub use shutdown::{ShutdownCoordinator, coordinator};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
