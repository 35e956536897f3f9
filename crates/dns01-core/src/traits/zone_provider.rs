// # Zone Provider Trait
//
// Defines the three capabilities the DNS-01 core needs from a DNS provider:
// listing hosted zones (paginated), submitting a record change, and reading
// the status of a submitted change.
//
// ## Implementations
//
// - Route 53: `dns01-provider-route53` crate
// - In-memory: [`crate::provider::MemoryZoneProvider`]
//
// ## Usage
//
// ```rust,ignore
// use dns01_core::traits::ZoneProvider;
//
// let provider: Arc<dyn ZoneProvider> = /* ZoneProvider implementation */;
//
// let page = provider.list_hosted_zones(None).await?;
// for zone in page.zones {
//     println!("{} {}", zone.id, zone.name);
// }
// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// TTL of every validation record, in seconds
///
/// The record is ephemeral and must not linger in resolver caches once the
/// challenge completes.
pub const VALIDATION_RECORD_TTL: u32 = 10;

/// One DNS zone owned by the account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedZone {
    /// Provider-assigned identifier
    pub id: String,
    /// Fully-qualified zone name, possibly with a trailing dot
    pub name: String,
    /// Private zones are never eligible for public validation
    pub is_private: bool,
}

impl HostedZone {
    /// Create a public zone
    pub fn public(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_private: false,
        }
    }

    /// Create a private zone
    pub fn private(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_private: true,
        }
    }
}

/// One page of a hosted zone listing
#[derive(Debug, Clone, Default)]
pub struct ZonePage {
    /// Zones on this page
    pub zones: Vec<HostedZone>,
    /// Marker for the next page, `None` when the listing is complete
    pub next_marker: Option<String>,
}

/// Record change action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeAction {
    /// Create the record set, or replace all of its values
    Upsert,
    /// Remove the record set; name, type, TTL and values must match
    Delete,
}

impl ChangeAction {
    /// Wire name of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Upsert => "UPSERT",
            ChangeAction::Delete => "DELETE",
        }
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The TXT record answering a DNS-01 challenge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRecord {
    /// Record name, e.g. `_acme-challenge.example.com`
    pub name: String,
    /// Raw validation token (unquoted)
    pub token: String,
    /// Time-to-live in seconds
    pub ttl: u32,
}

impl ValidationRecord {
    /// Create a validation record with the standard short TTL
    pub fn new(name: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            token: token.into(),
            ttl: VALIDATION_RECORD_TTL,
        }
    }

    /// Record type, always TXT
    pub fn record_type(&self) -> &'static str {
        "TXT"
    }

    /// The token as a TXT character-string, wrapped in literal double quotes
    pub fn quoted_value(&self) -> String {
        format!("\"{}\"", self.token)
    }
}

/// One mutation of exactly one validation record in one zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRequest {
    /// Upsert or delete
    pub action: ChangeAction,
    /// The record being changed
    pub record: ValidationRecord,
}

/// Propagation status reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeStatus {
    /// Submitted, not yet on all authoritative servers
    #[serde(rename = "PENDING")]
    Pending,
    /// Applied on all authoritative servers
    #[serde(rename = "INSYNC")]
    InSync,
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeStatus::Pending => f.write_str("PENDING"),
            ChangeStatus::InSync => f.write_str("INSYNC"),
        }
    }
}

/// A submitted change as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeInfo {
    /// Opaque change identifier
    pub id: String,
    /// Current status
    pub status: ChangeStatus,
    /// Submission time, when the provider reports it
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Trait for DNS provider implementations
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
/// A single provider handle is shared by concurrent challenge operations.
///
/// # Trust Level: Untrusted
///
/// Providers execute exactly one API call per method invocation. They do not
/// retry, back off, sleep, or cache zone listings between calls; the resolver
/// and watcher own those decisions and the caller owns retry policy.
#[async_trait]
pub trait ZoneProvider: Send + Sync {
    /// Fetch one page of hosted zones
    ///
    /// # Parameters
    ///
    /// - `marker`: `None` for the first page, otherwise the `next_marker`
    ///   of the previous page
    async fn list_hosted_zones(&self, marker: Option<&str>) -> Result<ZonePage, crate::Error>;

    /// Submit a single-record change to a zone
    ///
    /// # Returns
    ///
    /// - `Ok(ChangeInfo)`: The accepted change and its tracking id
    /// - `Err(Error)`: The provider rejected or failed the request
    async fn change_record_set(
        &self,
        zone_id: &str,
        change: &ChangeRequest,
    ) -> Result<ChangeInfo, crate::Error>;

    /// Read the status of a submitted change
    async fn get_change(&self, change_id: &str) -> Result<ChangeInfo, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing zone providers from configuration
pub trait ZoneProviderFactory: Send + Sync {
    /// Create a ZoneProvider instance from configuration
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn ZoneProvider>, crate::Error>;
}
