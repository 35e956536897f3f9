//! Error types for the DNS-01 challenge core
//!
//! This module defines all error types used throughout the crate.
//! Every failure is surfaced to the immediate caller; nothing here is retried.

use thiserror::Error;

/// Result type alias for DNS-01 operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DNS-01 system
#[derive(Error, Debug)]
pub enum Error {
    /// No public hosted zone is an ancestor of the requested domain
    #[error("No public hosted zone found for {domain}")]
    ZoneNotFound {
        /// The domain that could not be matched
        domain: String,
    },

    /// Listing hosted zones failed
    #[error("Failed to list hosted zones: {source}")]
    ZoneListing {
        /// Provider error detail
        #[source]
        source: Box<Error>,
    },

    /// The provider rejected a record change
    #[error("Change for {record_name} in zone {zone_id} rejected: {source}")]
    ChangeSubmission {
        /// Zone the change was submitted to
        zone_id: String,
        /// Record the change targeted
        record_name: String,
        /// Provider error detail
        #[source]
        source: Box<Error>,
    },

    /// A change did not reach INSYNC within the poll budget
    #[error("Change {change_id} not propagated after {attempts} status checks")]
    PropagationTimeout {
        /// The change being waited on
        change_id: String,
        /// Number of status reads performed
        attempts: u32,
    },

    /// Reading the status of a change failed
    #[error("Failed to read status of change {change_id}: {source}")]
    PropagationStatus {
        /// The change being waited on
        change_id: String,
        /// Provider error detail
        #[source]
        source: Box<Error>,
    },

    /// Waiting for a change was cancelled by the caller
    #[error("Wait for change {change_id} cancelled")]
    Cancelled {
        /// The change being waited on
        change_id: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors (from provider APIs)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a "zone not found" error
    pub fn zone_not_found(domain: impl Into<String>) -> Self {
        Self::ZoneNotFound {
            domain: domain.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether retrying the whole operation later could succeed
    ///
    /// Zone ownership gaps, credential failures and malformed input need an
    /// operator; throttling, transport failures and slow propagation do not.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::RateLimited(_)
            | Error::Http(_)
            | Error::PropagationTimeout { .. }
            | Error::PropagationStatus { .. } => true,
            Error::ZoneListing { source } | Error::ChangeSubmission { source, .. } => {
                source.is_transient()
            }
            _ => false,
        }
    }
}
