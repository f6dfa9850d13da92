//! Backend kinds and default operation dialects.
//!
//! Each backend kind maps to a compile-time constant dialect and
//! transaction-emulation flag. The mapping layer consults these to decide
//! which operation style to use against a provider when none is chosen
//! explicitly, and whether multi-step operations may be wrapped in an
//! emulated transaction.

/// Identifies the kind of datastore backend behind a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Redis (key-value store).
    Redis,
    /// Memcached (cache).
    Memcached,
    /// MongoDB (document store).
    MongoDb,
    /// Neo4j (graph database).
    Neo4j,
    /// In-process map, for tests and prototyping.
    Memory,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Redis => write!(f, "redis"),
            BackendKind::Memcached => write!(f, "memcached"),
            BackendKind::MongoDb => write!(f, "mongodb"),
            BackendKind::Neo4j => write!(f, "neo4j"),
            BackendKind::Memory => write!(f, "memory"),
        }
    }
}

/// The variant of data-access operations appropriate for a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialectKind {
    /// Key-value put/get operations.
    KeyValue,
    /// Cache-style operations with expiry semantics.
    Cache,
    /// Document-oriented operations.
    Document,
    /// Graph traversal operations.
    Graph,
}

impl std::fmt::Display for DialectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DialectKind::KeyValue => write!(f, "key-value"),
            DialectKind::Cache => write!(f, "cache"),
            DialectKind::Document => write!(f, "document"),
            DialectKind::Graph => write!(f, "graph"),
        }
    }
}

impl BackendKind {
    /// Returns the dialect a caller should use against this backend kind
    /// when none is chosen explicitly.
    pub const fn default_dialect(self) -> DialectKind {
        match self {
            BackendKind::Redis | BackendKind::Memory => DialectKind::KeyValue,
            BackendKind::Memcached => DialectKind::Cache,
            BackendKind::MongoDb => DialectKind::Document,
            BackendKind::Neo4j => DialectKind::Graph,
        }
    }

    /// Whether the mapping layer may wrap multi-step operations against this
    /// backend kind in an emulated transaction.
    ///
    /// Backends with native transaction support report `false`; the mapping
    /// layer uses the native mechanism instead.
    pub const fn supports_transaction_emulation(self) -> bool {
        match self {
            BackendKind::Redis | BackendKind::Memcached | BackendKind::Memory => true,
            BackendKind::MongoDb | BackendKind::Neo4j => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_kind_display() {
        assert_eq!(BackendKind::Redis.to_string(), "redis");
        assert_eq!(BackendKind::MongoDb.to_string(), "mongodb");
        assert_eq!(BackendKind::Memory.to_string(), "memory");
    }

    #[test]
    fn dialect_kind_display() {
        assert_eq!(DialectKind::KeyValue.to_string(), "key-value");
        assert_eq!(DialectKind::Graph.to_string(), "graph");
    }

    #[test]
    fn default_dialect_is_fixed_per_kind() {
        assert_eq!(BackendKind::Redis.default_dialect(), DialectKind::KeyValue);
        assert_eq!(BackendKind::Memcached.default_dialect(), DialectKind::Cache);
        assert_eq!(BackendKind::MongoDb.default_dialect(), DialectKind::Document);
        assert_eq!(BackendKind::Neo4j.default_dialect(), DialectKind::Graph);
    }

    #[test]
    fn transaction_emulation_is_fixed_per_kind() {
        assert!(BackendKind::Redis.supports_transaction_emulation());
        assert!(!BackendKind::Neo4j.supports_transaction_emulation());
    }
}
