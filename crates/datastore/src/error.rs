//! Error types for the datastore provider layer.
//!
//! The taxonomy separates configuration parsing failures from provider
//! lifecycle failures. Lifecycle errors wrap their underlying cause exactly
//! once and preserve it as a `source`, so the hosting framework can report
//! which provider instance failed without losing the original error.

use thiserror::Error;

use crate::dialect::BackendKind;
use crate::provider::ProviderState;

/// A value in the property bag was present but malformed.
///
/// The Configuration Reader never silently coerces invalid values; any value
/// that is present but cannot be interpreted produces one of these.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// The value could not be interpreted for its key.
    #[error("malformed value for '{key}': {reason} (got {value})")]
    MalformedValue {
        /// The recognized configuration key.
        key: &'static str,
        /// The offending value, rendered for diagnostics.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The value had a JSON type the key does not accept.
    #[error("unexpected type for '{key}': expected {expected} (got {value})")]
    UnexpectedType {
        /// The recognized configuration key.
        key: &'static str,
        /// The accepted type(s).
        expected: &'static str,
        /// The offending value, rendered for diagnostics.
        value: String,
    },
}

/// Errors raised by the provider lifecycle.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The configuration phase failed.
    ///
    /// Wraps the underlying [`ConfigurationError`] so the failure stays
    /// attributable to this provider instance rather than surfacing as a
    /// generic service failure from the hosting registry.
    #[error("failed to configure {backend} datastore provider")]
    Configuration {
        /// The backend kind of the failing provider.
        backend: BackendKind,
        /// The configuration failure.
        #[source]
        source: ConfigurationError,
    },

    /// The start phase failed.
    ///
    /// The source chain bottoms out at the backend's native error type,
    /// which callers may downcast. The provider stays `Configured` so
    /// `start()` can be retried.
    #[error("failed to initialize {backend} datastore provider")]
    Initialization {
        /// The backend kind of the failing provider.
        backend: BackendKind,
        /// The backend-native connect failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A lifecycle method was called out of order.
    #[error("{method}() called in state {state}, expected {expected}")]
    IllegalState {
        /// The lifecycle method that was called.
        method: &'static str,
        /// The state the provider was in.
        state: ProviderState,
        /// The state the method requires.
        expected: ProviderState,
    },

    /// The connection was requested before the provider was started.
    #[error("connection requested before the provider was started")]
    NotStarted,
}

/// Result type alias for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
