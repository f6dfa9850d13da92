//! The datastore provider lifecycle.
//!
//! A [`DatastoreProvider`] is a process-scoped service with an explicit
//! lifecycle (`configure -> start -> [use] -> stop`) that owns the live
//! connection to one backend. Backend integrations plug in through the
//! [`ConnectionFactory`] trait; the provider itself is backend-agnostic and
//! enforces the state machine and the error-wrapping policy.
//!
//! # Example
//!
//! ```ignore
//! use gridstore_datastore::provider::DatastoreProvider;
//!
//! let mut provider = DatastoreProvider::new(factory);
//! provider.configure(&bag)?;
//! provider.start().await?;
//!
//! let connection = provider.connection()?;
//! // ... hand the connection to the mapping layer ...
//!
//! provider.stop().await;
//! ```

use async_trait::async_trait;

use crate::config::PropertyBag;
use crate::dialect::{BackendKind, DialectKind};
use crate::error::{ConfigurationError, ProviderError, ProviderResult};

/// The seam a backend integration must fulfil.
///
/// A factory reads the provider's property bag into its own validated
/// configuration type and opens a single long-lived connection from it.
/// `ConnectError` must be the backend's native error type; the provider
/// preserves it as the error source so callers never observe a generic
/// wrapper kind.
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    /// Validated configuration produced from the property bag.
    type Config: Send + Sync + 'static;
    /// The live session handle this backend produces.
    type Connection: Send + Sync + 'static;
    /// The backend's native error type.
    type ConnectError: std::error::Error + Send + Sync + 'static;

    /// The kind of backend this factory connects to.
    fn backend_kind(&self) -> BackendKind;

    /// Parses and validates the property bag.
    fn read_config(&self, bag: &PropertyBag) -> Result<Self::Config, ConfigurationError>;

    /// Opens a live connection. Blocking here is bounded by the configured
    /// timeout; the factory does not retry internally.
    async fn connect(&self, config: &Self::Config)
    -> Result<Self::Connection, Self::ConnectError>;

    /// Releases a connection. The default drops the handle, which is the
    /// release operation for client libraries that close on drop.
    async fn release(&self, connection: Self::Connection) {
        drop(connection);
    }
}

/// Lifecycle state of a [`DatastoreProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderState {
    /// Constructed, not yet configured.
    Unconfigured,
    /// Configuration validated; no connection held.
    Configured,
    /// Connection held and available to callers.
    Started,
    /// Stopped; the connection (if any) has been released.
    Stopped,
}

impl std::fmt::Display for ProviderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderState::Unconfigured => write!(f, "unconfigured"),
            ProviderState::Configured => write!(f, "configured"),
            ProviderState::Started => write!(f, "started"),
            ProviderState::Stopped => write!(f, "stopped"),
        }
    }
}

/// A datastore provider: owns the configuration and the single live
/// connection for one backend service registration.
///
/// Lifecycle methods (`configure`, `start`, `stop`) are driven by one
/// lifecycle-managing thread and take `&mut self`; read accessors
/// (`connection`, `dialect_kind`, `supports_transaction_emulation`) only
/// touch published state and are safe for concurrent callers.
pub struct DatastoreProvider<F: ConnectionFactory> {
    factory: F,
    state: ProviderState,
    config: Option<F::Config>,
    connection: Option<F::Connection>,
}

impl<F: ConnectionFactory> DatastoreProvider<F> {
    /// Creates an unconfigured provider around a connection factory.
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            state: ProviderState::Unconfigured,
            config: None,
            connection: None,
        }
    }

    /// Validates the property bag and stores the resulting configuration.
    ///
    /// Single-shot: a second call fails with
    /// [`ProviderError::IllegalState`]. Reader failures are wrapped once as
    /// [`ProviderError::Configuration`] with the original cause attached;
    /// a failed configure moves the provider to `Stopped`, it cannot be
    /// reconfigured.
    pub fn configure(&mut self, bag: &PropertyBag) -> ProviderResult<()> {
        if self.state != ProviderState::Unconfigured {
            return Err(ProviderError::IllegalState {
                method: "configure",
                state: self.state,
                expected: ProviderState::Unconfigured,
            });
        }

        let config = match self.factory.read_config(bag) {
            Ok(config) => config,
            Err(source) => {
                self.state = ProviderState::Stopped;
                return Err(ProviderError::Configuration {
                    backend: self.factory.backend_kind(),
                    source,
                });
            }
        };

        self.config = Some(config);
        self.state = ProviderState::Configured;
        tracing::debug!(backend = %self.factory.backend_kind(), "datastore provider configured");
        Ok(())
    }

    /// Opens the connection and transitions to `Started`.
    ///
    /// On failure the underlying error is wrapped once as
    /// [`ProviderError::Initialization`] and the provider stays
    /// `Configured`, so the caller may retry.
    pub async fn start(&mut self) -> ProviderResult<()> {
        if self.state != ProviderState::Configured {
            return Err(ProviderError::IllegalState {
                method: "start",
                state: self.state,
                expected: ProviderState::Configured,
            });
        }
        let Some(config) = self.config.as_ref() else {
            return Err(ProviderError::IllegalState {
                method: "start",
                state: self.state,
                expected: ProviderState::Configured,
            });
        };

        let connection =
            self.factory
                .connect(config)
                .await
                .map_err(|source| ProviderError::Initialization {
                    backend: self.factory.backend_kind(),
                    source: Box::new(source),
                })?;

        self.connection = Some(connection);
        self.state = ProviderState::Started;
        tracing::info!(backend = %self.factory.backend_kind(), "datastore provider started");
        Ok(())
    }

    /// Releases the connection, if one is held, and transitions to
    /// `Stopped`. Idempotent; stopping a provider that was never started is
    /// a no-op.
    pub async fn stop(&mut self) {
        if let Some(connection) = self.connection.take() {
            tracing::info!(backend = %self.factory.backend_kind(), "releasing datastore connection");
            self.factory.release(connection).await;
        }
        self.state = ProviderState::Stopped;
    }

    /// Returns the live connection handle.
    ///
    /// Fails with [`ProviderError::NotStarted`] unless the provider is
    /// `Started`.
    pub fn connection(&self) -> ProviderResult<&F::Connection> {
        self.connection.as_ref().ok_or(ProviderError::NotStarted)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ProviderState {
        self.state
    }

    /// Whether the provider currently holds a connection.
    pub fn is_started(&self) -> bool {
        self.state == ProviderState::Started
    }

    /// The validated configuration, once configured.
    pub fn config(&self) -> Option<&F::Config> {
        self.config.as_ref()
    }

    /// The operation dialect callers should use against this backend when
    /// none is chosen explicitly. Pure function of the backend kind.
    pub fn dialect_kind(&self) -> DialectKind {
        self.factory.backend_kind().default_dialect()
    }

    /// Whether the mapping layer may emulate transactions against this
    /// backend. Pure function of the backend kind.
    pub fn supports_transaction_emulation(&self) -> bool {
        self.factory.backend_kind().supports_transaction_emulation()
    }
}

impl<F: ConnectionFactory> std::fmt::Debug for DatastoreProvider<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatastoreProvider")
            .field("backend", &self.factory.backend_kind())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
