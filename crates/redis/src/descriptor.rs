//! Connection descriptors for Redis.
//!
//! A [`ConnectionDescriptor`] is the typed, URI-equivalent form of a
//! validated configuration: the exact target, TLS flag, database index,
//! credential and timeout a connect attempt will use. The client library is
//! handed its rendered URL form.

use std::time::Duration;

use gridstore_datastore::config::BackendConfiguration;

/// The connection target and options derived from a [`BackendConfiguration`].
///
/// The first entry of the configured host list is the connection target;
/// the remainder of the list is not encoded in the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    host: String,
    port: u16,
    ssl: bool,
    database_index: i64,
    password: Option<String>,
    timeout: Duration,
}

impl ConnectionDescriptor {
    /// Builds a descriptor from a validated configuration.
    pub fn from_config(config: &BackendConfiguration) -> Self {
        let target = config.hosts().first();
        Self {
            host: target.host.clone(),
            port: target.port,
            ssl: config.ssl(),
            database_index: config.database_index(),
            password: config.password().map(str::to_string),
            timeout: config.timeout(),
        }
    }

    /// Renders the `redis://` / `rediss://` URL the client library accepts.
    ///
    /// The password, when present, is percent-encoded so reserved
    /// characters survive URL parsing.
    pub fn to_url(&self) -> String {
        let scheme = if self.ssl { "rediss" } else { "redis" };
        match &self.password {
            Some(password) => format!(
                "{scheme}://:{}@{}:{}/{}",
                encode_userinfo(password),
                self.host,
                self.port,
                self.database_index
            ),
            None => format!(
                "{scheme}://{}:{}/{}",
                self.host, self.port, self.database_index
            ),
        }
    }

    /// The connect timeout carried alongside the URL.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Target host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Target port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether the connection uses TLS.
    pub fn ssl(&self) -> bool {
        self.ssl
    }

    /// The database index selected after connecting.
    pub fn database_index(&self) -> i64 {
        self.database_index
    }
}

// Credential-free rendering for logs.
impl std::fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let scheme = if self.ssl { "rediss" } else { "redis" };
        write!(
            f,
            "{scheme}://{}:{}/{}",
            self.host, self.port, self.database_index
        )
    }
}

/// Percent-encodes everything outside the URL unreserved set.
fn encode_userinfo(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
