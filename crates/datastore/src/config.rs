//! Configuration Reader for datastore providers.
//!
//! Providers are configured from an untyped property bag handed down by the
//! hosting framework. The reader turns the bag into a validated
//! [`BackendConfiguration`]: absent keys fall back to backend-specific
//! defaults, while present-but-malformed values fail with a
//! [`ConfigurationError`] rather than being coerced.
//!
//! # Recognized keys
//!
//! | Key | Type | Default |
//! |-----|------|---------|
//! | `host-list` | `"host:port,host:port"` or array of strings | one default `host:port` pair |
//! | `ssl-enabled` | boolean or `"true"`/`"false"` | `false` |
//! | `database-index` | non-negative integer | `0` |
//! | `password` | string | none |
//! | `timeout-millis` | positive integer | backend-specific |

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigurationError;

/// The untyped key/value bag a provider is configured from.
pub type PropertyBag = HashMap<String, Value>;

/// Recognized configuration keys.
pub mod keys {
    /// Comma-separated `host:port` list, or a JSON array of such strings.
    pub const HOST_LIST: &str = "host-list";
    /// Whether to connect over TLS.
    pub const SSL_ENABLED: &str = "ssl-enabled";
    /// Database/namespace index to select after connecting.
    pub const DATABASE_INDEX: &str = "database-index";
    /// Optional connection credential.
    pub const PASSWORD: &str = "password";
    /// Connection timeout in milliseconds.
    pub const TIMEOUT_MILLIS: &str = "timeout-millis";
}

/// A single `host:port` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostAndPort {
    /// Host name or address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// An ordered, non-empty sequence of hosts.
///
/// The first entry is the connection target; the remainder are carried for
/// backends that accept seed lists. Non-emptiness holds on every
/// construction path, including deserialization, which rejects an empty
/// list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<HostAndPort>")]
pub struct Hosts(Vec<HostAndPort>);

impl TryFrom<Vec<HostAndPort>> for Hosts {
    type Error = ConfigurationError;

    fn try_from(hosts: Vec<HostAndPort>) -> Result<Self, Self::Error> {
        if hosts.is_empty() {
            return Err(ConfigurationError::MalformedValue {
                key: keys::HOST_LIST,
                value: "[]".to_string(),
                reason: "host list must not be empty".to_string(),
            });
        }
        Ok(Hosts(hosts))
    }
}

impl Hosts {
    /// Creates a list with a single entry.
    pub fn single(host: impl Into<String>, port: u16) -> Self {
        Hosts(vec![HostAndPort {
            host: host.into(),
            port,
        }])
    }

    /// Returns the connection target.
    pub fn first(&self) -> &HostAndPort {
        &self.0[0]
    }

    /// Iterates over all entries in order.
    pub fn iter(&self) -> impl Iterator<Item = &HostAndPort> {
        self.0.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; every constructor, deserialization included,
    /// rejects an empty sequence.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Hosts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, entry) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}:{}", entry.host, entry.port)?;
        }
        Ok(())
    }
}

/// Backend-specific fallback values used when a key is absent from the bag.
#[derive(Debug, Clone)]
pub struct ConnectionDefaults {
    /// Default host when `host-list` is absent.
    pub host: &'static str,
    /// Default port for the backend, also applied to host entries without
    /// an explicit port.
    pub port: u16,
    /// Default connection timeout.
    pub timeout: Duration,
}

/// Validated, immutable configuration for a backend connection.
///
/// Created once per provider configuration call; there are no setters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfiguration {
    hosts: Hosts,
    ssl: bool,
    database_index: i64,
    password: Option<String>,
    timeout_millis: u64,
}

impl BackendConfiguration {
    /// Reads and validates a configuration from the property bag.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use gridstore_datastore::config::{BackendConfiguration, ConnectionDefaults, PropertyBag};
    /// use serde_json::json;
    ///
    /// let defaults = ConnectionDefaults {
    ///     host: "localhost",
    ///     port: 6379,
    ///     timeout: Duration::from_millis(5000),
    /// };
    ///
    /// let mut bag = PropertyBag::new();
    /// bag.insert("host-list".to_string(), json!("db1:7000"));
    /// let config = BackendConfiguration::read(&bag, &defaults).unwrap();
    /// assert_eq!(config.hosts().first().port, 7000);
    /// ```
    pub fn read(
        bag: &PropertyBag,
        defaults: &ConnectionDefaults,
    ) -> Result<Self, ConfigurationError> {
        let hosts = match bag.get(keys::HOST_LIST) {
            None => Hosts::single(defaults.host, defaults.port),
            Some(value) => parse_host_list(value, defaults.port)?,
        };

        let ssl = match bag.get(keys::SSL_ENABLED) {
            None => false,
            Some(value) => parse_flag(keys::SSL_ENABLED, value)?,
        };

        let database_index = match bag.get(keys::DATABASE_INDEX) {
            None => 0,
            Some(value) => parse_index(keys::DATABASE_INDEX, value)?,
        };

        let password = match bag.get(keys::PASSWORD) {
            None => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                return Err(ConfigurationError::UnexpectedType {
                    key: keys::PASSWORD,
                    expected: "string",
                    value: other.to_string(),
                });
            }
        };

        let timeout_millis = match bag.get(keys::TIMEOUT_MILLIS) {
            None => defaults.timeout.as_millis() as u64,
            Some(value) => parse_timeout(keys::TIMEOUT_MILLIS, value)?,
        };

        Ok(Self {
            hosts,
            ssl,
            database_index,
            password,
            timeout_millis,
        })
    }

    /// The configured host list; the first entry is the connection target.
    pub fn hosts(&self) -> &Hosts {
        &self.hosts
    }

    /// Whether to connect over TLS.
    pub fn ssl(&self) -> bool {
        self.ssl
    }

    /// The database/namespace index to select.
    pub fn database_index(&self) -> i64 {
        self.database_index
    }

    /// The connection credential, if any.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// The connection timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_millis)
    }
}

fn parse_host_list(value: &Value, default_port: u16) -> Result<Hosts, ConfigurationError> {
    let entries: Vec<String> = match value {
        Value::String(s) => s.split(',').map(|e| e.trim().to_string()).collect(),
        Value::Array(values) => {
            let mut entries = Vec::with_capacity(values.len());
            for v in values {
                match v {
                    Value::String(s) => entries.push(s.trim().to_string()),
                    other => {
                        return Err(ConfigurationError::UnexpectedType {
                            key: keys::HOST_LIST,
                            expected: "array of strings",
                            value: other.to_string(),
                        });
                    }
                }
            }
            entries
        }
        other => {
            return Err(ConfigurationError::UnexpectedType {
                key: keys::HOST_LIST,
                expected: "string or array of strings",
                value: other.to_string(),
            });
        }
    };
    if entries.is_empty() {
        return Err(ConfigurationError::MalformedValue {
            key: keys::HOST_LIST,
            value: value.to_string(),
            reason: "host list must not be empty".to_string(),
        });
    }

    let mut hosts = Vec::with_capacity(entries.len());
    for entry in &entries {
        if entry.is_empty() {
            return Err(ConfigurationError::MalformedValue {
                key: keys::HOST_LIST,
                value: value.to_string(),
                reason: "host entry must not be empty".to_string(),
            });
        }
        let (host, port) = match entry.rsplit_once(':') {
            None => (entry.as_str(), default_port),
            Some((host, port_str)) => {
                let port = port_str.parse::<u16>().map_err(|_| {
                    ConfigurationError::MalformedValue {
                        key: keys::HOST_LIST,
                        value: entry.clone(),
                        reason: format!("'{port_str}' is not a valid port"),
                    }
                })?;
                (host, port)
            }
        };
        if host.is_empty() {
            return Err(ConfigurationError::MalformedValue {
                key: keys::HOST_LIST,
                value: entry.clone(),
                reason: "host must not be empty".to_string(),
            });
        }
        hosts.push(HostAndPort {
            host: host.to_string(),
            port,
        });
    }

    Ok(Hosts(hosts))
}

fn parse_flag(key: &'static str, value: &Value) -> Result<bool, ConfigurationError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(ConfigurationError::MalformedValue {
                key,
                value: value.to_string(),
                reason: "must be 'true' or 'false'".to_string(),
            }),
        },
        other => Err(ConfigurationError::UnexpectedType {
            key,
            expected: "boolean",
            value: other.to_string(),
        }),
    }
}

fn parse_index(key: &'static str, value: &Value) -> Result<i64, ConfigurationError> {
    let index = match value {
        Value::Number(n) => n.as_i64().ok_or_else(|| ConfigurationError::MalformedValue {
            key,
            value: value.to_string(),
            reason: "must be an integer".to_string(),
        })?,
        Value::String(s) => {
            s.trim()
                .parse::<i64>()
                .map_err(|_| ConfigurationError::MalformedValue {
                    key,
                    value: value.to_string(),
                    reason: "must be an integer".to_string(),
                })?
        }
        other => {
            return Err(ConfigurationError::UnexpectedType {
                key,
                expected: "integer",
                value: other.to_string(),
            });
        }
    };
    if index < 0 {
        return Err(ConfigurationError::MalformedValue {
            key,
            value: value.to_string(),
            reason: "must not be negative".to_string(),
        });
    }
    Ok(index)
}

fn parse_timeout(key: &'static str, value: &Value) -> Result<u64, ConfigurationError> {
    let millis = match value {
        Value::Number(n) => n.as_i64().ok_or_else(|| ConfigurationError::MalformedValue {
            key,
            value: value.to_string(),
            reason: "must be a positive integer".to_string(),
        })?,
        Value::String(s) => {
            s.trim()
                .parse::<i64>()
                .map_err(|_| ConfigurationError::MalformedValue {
                    key,
                    value: value.to_string(),
                    reason: "must be a positive integer".to_string(),
                })?
        }
        other => {
            return Err(ConfigurationError::UnexpectedType {
                key,
                expected: "integer",
                value: other.to_string(),
            });
        }
    };
    if millis <= 0 {
        return Err(ConfigurationError::MalformedValue {
            key,
            value: value.to_string(),
            reason: "must be a positive integer".to_string(),
        });
    }
    Ok(millis as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn defaults() -> ConnectionDefaults {
        ConnectionDefaults {
            host: "localhost",
            port: 6379,
            timeout: Duration::from_millis(5000),
        }
    }

    #[test]
    fn empty_bag_resolves_to_defaults() {
        let config = BackendConfiguration::read(&PropertyBag::new(), &defaults()).unwrap();
        assert_eq!(config.hosts().len(), 1);
        assert_eq!(config.hosts().first().host, "localhost");
        assert_eq!(config.hosts().first().port, 6379);
        assert!(!config.ssl());
        assert_eq!(config.database_index(), 0);
        assert_eq!(config.password(), None);
        assert_eq!(config.timeout(), Duration::from_millis(5000));
    }

    #[test]
    fn full_bag_is_parsed_exactly() {
        let mut bag = PropertyBag::new();
        bag.insert(keys::HOST_LIST.to_string(), json!("db1:7000"));
        bag.insert(keys::SSL_ENABLED.to_string(), json!(true));
        bag.insert(keys::DATABASE_INDEX.to_string(), json!(2));
        bag.insert(keys::TIMEOUT_MILLIS.to_string(), json!(500));

        let config = BackendConfiguration::read(&bag, &defaults()).unwrap();
        assert_eq!(config.hosts().len(), 1);
        assert_eq!(config.hosts().first().host, "db1");
        assert_eq!(config.hosts().first().port, 7000);
        assert!(config.ssl());
        assert_eq!(config.database_index(), 2);
        assert_eq!(config.timeout(), Duration::from_millis(500));
    }

    #[test]
    fn host_list_accepts_multiple_entries_in_order() {
        let mut bag = PropertyBag::new();
        bag.insert(keys::HOST_LIST.to_string(), json!("db1:7000, db2:7001,db3"));

        let config = BackendConfiguration::read(&bag, &defaults()).unwrap();
        let hosts: Vec<_> = config.hosts().iter().collect();
        assert_eq!(hosts.len(), 3);
        assert_eq!(hosts[0].host, "db1");
        assert_eq!(hosts[1].port, 7001);
        // Entry without a port falls back to the backend default.
        assert_eq!(hosts[2].host, "db3");
        assert_eq!(hosts[2].port, 6379);
    }

    #[test]
    fn host_list_accepts_array_form() {
        let mut bag = PropertyBag::new();
        bag.insert(keys::HOST_LIST.to_string(), json!(["db1:7000", "db2"]));

        let config = BackendConfiguration::read(&bag, &defaults()).unwrap();
        assert_eq!(config.hosts().len(), 2);
        assert_eq!(config.hosts().to_string(), "db1:7000,db2:6379");
    }

    #[test]
    fn malformed_port_is_rejected() {
        let mut bag = PropertyBag::new();
        bag.insert(keys::HOST_LIST.to_string(), json!("db1:not-a-port"));
        let err = BackendConfiguration::read(&bag, &defaults()).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::MalformedValue {
                key: keys::HOST_LIST,
                ..
            }
        ));
    }

    #[test]
    fn deserializing_an_empty_host_list_fails_instead_of_arming_a_panic() {
        // An embedded config with an empty list must fail at parse time;
        // otherwise the first `first()` call would index out of bounds.
        let err = serde_json::from_str::<Hosts>("[]").unwrap_err();
        assert!(err.to_string().contains("must not be empty"));

        let hosts: Hosts = serde_json::from_str(r#"[{"host":"db1","port":7000}]"#).unwrap();
        assert_eq!(hosts.first().host, "db1");
        assert_eq!(hosts.first().port, 7000);
    }

    #[test]
    fn empty_host_array_is_rejected() {
        let mut bag = PropertyBag::new();
        bag.insert(keys::HOST_LIST.to_string(), json!([]));
        assert!(BackendConfiguration::read(&bag, &defaults()).is_err());
    }

    #[test]
    fn empty_host_entry_is_rejected() {
        let mut bag = PropertyBag::new();
        bag.insert(keys::HOST_LIST.to_string(), json!("db1:7000,,db2:7001"));
        assert!(BackendConfiguration::read(&bag, &defaults()).is_err());
    }

    #[test]
    fn ssl_flag_accepts_bool_and_string_forms() {
        for value in [json!(true), json!("true"), json!("TRUE")] {
            let mut bag = PropertyBag::new();
            bag.insert(keys::SSL_ENABLED.to_string(), value);
            let config = BackendConfiguration::read(&bag, &defaults()).unwrap();
            assert!(config.ssl());
        }
    }

    #[test]
    fn ssl_flag_rejects_other_values() {
        let mut bag = PropertyBag::new();
        bag.insert(keys::SSL_ENABLED.to_string(), json!("yes"));
        assert!(BackendConfiguration::read(&bag, &defaults()).is_err());

        let mut bag = PropertyBag::new();
        bag.insert(keys::SSL_ENABLED.to_string(), json!(1));
        assert!(BackendConfiguration::read(&bag, &defaults()).is_err());
    }

    #[test]
    fn negative_database_index_is_rejected() {
        let mut bag = PropertyBag::new();
        bag.insert(keys::DATABASE_INDEX.to_string(), json!(-1));
        let err = BackendConfiguration::read(&bag, &defaults()).unwrap_err();
        assert!(err.to_string().contains("database-index"));
    }

    #[test]
    fn database_index_accepts_numeric_string() {
        let mut bag = PropertyBag::new();
        bag.insert(keys::DATABASE_INDEX.to_string(), json!("3"));
        let config = BackendConfiguration::read(&bag, &defaults()).unwrap();
        assert_eq!(config.database_index(), 3);
    }

    #[test]
    fn non_positive_timeout_is_rejected() {
        for value in [json!(0), json!(-100), json!("oops")] {
            let mut bag = PropertyBag::new();
            bag.insert(keys::TIMEOUT_MILLIS.to_string(), value);
            assert!(BackendConfiguration::read(&bag, &defaults()).is_err());
        }
    }

    #[test]
    fn non_string_password_is_rejected() {
        let mut bag = PropertyBag::new();
        bag.insert(keys::PASSWORD.to_string(), json!(12345));
        let err = BackendConfiguration::read(&bag, &defaults()).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::UnexpectedType {
                key: keys::PASSWORD,
                ..
            }
        ));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut bag = PropertyBag::new();
        bag.insert("some-extension-key".to_string(), json!({"a": 1}));
        assert!(BackendConfiguration::read(&bag, &defaults()).is_ok());
    }
}
