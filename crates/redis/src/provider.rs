//! The Redis connection factory and provider type.

use std::time::Duration;

use async_trait::async_trait;

use gridstore_datastore::config::{BackendConfiguration, ConnectionDefaults, PropertyBag};
use gridstore_datastore::dialect::BackendKind;
use gridstore_datastore::error::ConfigurationError;
use gridstore_datastore::provider::{ConnectionFactory, DatastoreProvider};

use crate::client;
use crate::descriptor::ConnectionDescriptor;

/// Host used when `host-list` is absent.
pub const DEFAULT_HOST: &str = "localhost";

/// Port used for host entries without an explicit port.
pub const DEFAULT_PORT: u16 = 6379;

/// Connect timeout used when `timeout-millis` is absent.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Connection factory for Redis.
///
/// Reads the generic property bag with Redis defaults and opens a
/// multiplexed connection through the process-wide shared client for the
/// configured target. All failures carry [`redis::RedisError`], the client
/// library's native error type.
#[derive(Debug, Default, Clone, Copy)]
pub struct RedisConnectionFactory;

/// A datastore provider backed by Redis.
pub type RedisDatastoreProvider = DatastoreProvider<RedisConnectionFactory>;

/// Constructor extension for [`RedisDatastoreProvider`].
///
/// `RedisDatastoreProvider` is a type alias for a foreign generic, so its
/// Redis-specific constructor must live on a trait rather than an inherent
/// impl.
pub trait RedisDatastoreProviderExt {
    /// Creates an unconfigured Redis provider.
    fn new_redis() -> Self;
}

impl RedisDatastoreProviderExt for RedisDatastoreProvider {
    fn new_redis() -> Self {
        DatastoreProvider::new(RedisConnectionFactory)
    }
}

#[async_trait]
impl ConnectionFactory for RedisConnectionFactory {
    type Config = BackendConfiguration;
    type Connection = redis::aio::MultiplexedConnection;
    type ConnectError = redis::RedisError;

    fn backend_kind(&self) -> BackendKind {
        BackendKind::Redis
    }

    fn read_config(&self, bag: &PropertyBag) -> Result<Self::Config, ConfigurationError> {
        BackendConfiguration::read(
            bag,
            &ConnectionDefaults {
                host: DEFAULT_HOST,
                port: DEFAULT_PORT,
                timeout: DEFAULT_TIMEOUT,
            },
        )
    }

    async fn connect(&self, config: &Self::Config) -> Result<Self::Connection, Self::ConnectError> {
        let descriptor = ConnectionDescriptor::from_config(config);
        tracing::info!(
            target = %descriptor,
            timeout_ms = descriptor.timeout().as_millis() as u64,
            "connecting to redis"
        );

        let client = client::shared_client(&descriptor.to_url())?;
        match tokio::time::timeout(descriptor.timeout(), client.get_multiplexed_async_connection())
            .await
        {
            Ok(result) => result,
            Err(_) => Err(redis::RedisError::from((
                redis::ErrorKind::IoError,
                "connect timed out",
                format!(
                    "no connection to {descriptor} within {}ms",
                    descriptor.timeout().as_millis()
                ),
            ))),
        }
    }

    async fn release(&self, connection: Self::Connection) {
        tracing::info!("disconnecting from redis");
        drop(connection);
    }
}
