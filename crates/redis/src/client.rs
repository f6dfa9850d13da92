//! Process-wide shared Redis clients.
//!
//! A [`redis::Client`] is a connection configuration plus a handle pool, and
//! the recommended usage is one client per target for the life of the
//! process. Providers therefore do not own their client; they look it up
//! here by rendered URL. The registry hands the same client to every
//! provider pointed at the same target and registers a single release hook
//! with the shutdown coordinator when it is created.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use gridstore_datastore::shutdown::{self, ShutdownCoordinator};

/// A registry of shared clients keyed by rendered URL, torn down through
/// the coordinator it was created with.
pub(crate) struct SharedClients {
    clients: Arc<Mutex<HashMap<String, redis::Client>>>,
}

impl SharedClients {
    /// Creates an empty registry and registers its release hook.
    pub(crate) fn new(coordinator: &ShutdownCoordinator) -> Self {
        let clients = Arc::new(Mutex::new(HashMap::new()));
        let hook_clients = Arc::clone(&clients);
        coordinator.register("redis-shared-clients", move || {
            let mut clients = hook_clients.lock();
            let count = clients.len();
            clients.clear();
            tracing::debug!(count, "released shared redis clients");
        });
        Self { clients }
    }

    /// Returns the client for `url`, creating it on first use.
    ///
    /// Creation only validates the URL; no network traffic happens here. A
    /// malformed URL fails with the client library's own error kind.
    pub(crate) fn get(&self, url: &str) -> Result<redis::Client, redis::RedisError> {
        let mut clients = self.clients.lock();
        if let Some(client) = clients.get(url) {
            return Ok(client.clone());
        }
        let client = redis::Client::open(url)?;
        tracing::debug!(target_count = clients.len() + 1, "created shared redis client");
        clients.insert(url.to_string(), client.clone());
        Ok(client)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.clients.lock().len()
    }
}

static CLIENTS: OnceLock<SharedClients> = OnceLock::new();

/// Returns the process-wide client for `url` from the registry wired to the
/// global shutdown coordinator.
pub fn shared_client(url: &str) -> Result<redis::Client, redis::RedisError> {
    CLIENTS
        .get_or_init(|| SharedClients::new(shutdown::coordinator()))
        .get(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_url_yields_the_same_shared_client() {
        let a = shared_client("redis://client-test-host:6379/0").unwrap();
        let b = shared_client("redis://client-test-host:6379/0").unwrap();
        assert_eq!(
            a.get_connection_info().addr.to_string(),
            b.get_connection_info().addr.to_string()
        );
    }

    #[test]
    fn malformed_url_fails_with_a_native_error() {
        assert!(shared_client("not-a-redis-url").is_err());
    }

    #[test]
    fn shutdown_hook_clears_the_registry() {
        let coordinator = ShutdownCoordinator::new();
        let registry = SharedClients::new(&coordinator);

        registry.get("redis://hook-test-host:6379/0").unwrap();
        assert_eq!(registry.len(), 1);

        coordinator.shutdown_with_defaults();
        assert_eq!(registry.len(), 0);
    }
}
