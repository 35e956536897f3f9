// # Memory Zone Provider
//
// In-memory implementation of ZoneProvider.
//
// ## Purpose
//
// Holds hosted zones and their TXT record sets in a HashMap, following the
// provider's change semantics closely enough to stand in for a real account:
//
// - Zone listings are paginated with a configurable page size
// - UPSERT replaces the whole value set of a record
// - DELETE must match name, type, TTL and values exactly, otherwise the
//   change is rejected
// - A change reports PENDING for a configurable number of status reads
//   before turning INSYNC
// - A change is forgotten once a status read has reported it INSYNC; later
//   reads fail with NoSuchChange
//
// ## When to Use
//
// - Tests and local development
// - Embedding the core without network access
//
// All state is lost when the provider is dropped.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::zone_provider::{
    ChangeAction, ChangeInfo, ChangeRequest, ChangeStatus, HostedZone, ZonePage, ZoneProvider,
};

const DEFAULT_PAGE_SIZE: usize = 100;

/// A stored TXT record set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecordSet {
    /// Time-to-live in seconds
    pub ttl: u32,
    /// Quoted TXT values
    pub values: Vec<String>,
}

#[derive(Debug, Default)]
struct Inner {
    zones: Vec<HostedZone>,
    // (zone id, lowercased record name without trailing dot)
    records: HashMap<(String, String), StoredRecordSet>,
    // change id -> status reads remaining before INSYNC; settled ids removed
    changes: HashMap<String, u32>,
    next_change: u64,
}

/// In-memory zone provider
///
/// # Example
///
/// ```rust,no_run
/// use dns01_core::provider::MemoryZoneProvider;
/// use dns01_core::traits::HostedZone;
///
/// let provider = MemoryZoneProvider::new(vec![
///     HostedZone::public("Z1", "example.com."),
/// ]);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryZoneProvider {
    inner: Arc<RwLock<Inner>>,
    page_size: usize,
    pending_reads: u32,
}

impl MemoryZoneProvider {
    /// Create a provider holding `zones`; changes are INSYNC immediately
    pub fn new(zones: Vec<HostedZone>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                zones,
                ..Inner::default()
            })),
            page_size: DEFAULT_PAGE_SIZE,
            pending_reads: 0,
        }
    }

    /// Set the number of zones returned per listing page
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Report each change PENDING for `reads` status reads before INSYNC
    pub fn with_pending_reads(mut self, reads: u32) -> Self {
        self.pending_reads = reads;
        self
    }

    /// Current TXT record set for `name` in `zone_id`, if any
    pub async fn record_set(&self, zone_id: &str, name: &str) -> Option<StoredRecordSet> {
        self.inner
            .read()
            .await
            .records
            .get(&(zone_id.to_string(), record_key(name)))
            .cloned()
    }

    /// Number of record sets across all zones
    pub async fn record_count(&self) -> usize {
        self.inner.read().await.records.len()
    }

    /// Number of changes not yet reported INSYNC by a status read
    pub async fn tracked_changes(&self) -> usize {
        self.inner.read().await.changes.len()
    }
}

fn record_key(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}

#[async_trait]
impl ZoneProvider for MemoryZoneProvider {
    async fn list_hosted_zones(&self, marker: Option<&str>) -> Result<ZonePage, Error> {
        let inner = self.inner.read().await;

        let start = match marker {
            None => 0,
            Some(marker) => inner
                .zones
                .iter()
                .position(|z| z.id == marker)
                .ok_or_else(|| Error::provider("memory", format!("Unknown marker {}", marker)))?,
        };

        let end = (start + self.page_size).min(inner.zones.len());
        let next_marker = inner.zones.get(end).map(|z| z.id.clone());

        Ok(ZonePage {
            zones: inner.zones[start..end].to_vec(),
            next_marker,
        })
    }

    async fn change_record_set(
        &self,
        zone_id: &str,
        change: &ChangeRequest,
    ) -> Result<ChangeInfo, Error> {
        let mut inner = self.inner.write().await;

        if !inner.zones.iter().any(|z| z.id == zone_id) {
            return Err(Error::provider(
                "memory",
                format!("NoSuchHostedZone: {}", zone_id),
            ));
        }

        let key = (zone_id.to_string(), record_key(&change.record.name));
        let value = change.record.quoted_value();

        match change.action {
            ChangeAction::Upsert => {
                inner.records.insert(
                    key,
                    StoredRecordSet {
                        ttl: change.record.ttl,
                        values: vec![value],
                    },
                );
            }
            ChangeAction::Delete => {
                let matches = inner
                    .records
                    .get(&key)
                    .is_some_and(|set| set.ttl == change.record.ttl && set.values == [value]);
                if !matches {
                    return Err(Error::provider(
                        "memory",
                        format!(
                            "InvalidChangeBatch: Tried to delete resource record set [name='{}', type='TXT'] but the values provided do not match the current values",
                            change.record.name
                        ),
                    ));
                }
                inner.records.remove(&key);
            }
        }

        inner.next_change += 1;
        let id = format!("C{:06}", inner.next_change);
        inner.changes.insert(id.clone(), self.pending_reads);

        Ok(ChangeInfo {
            id,
            status: if self.pending_reads == 0 {
                ChangeStatus::InSync
            } else {
                ChangeStatus::Pending
            },
            submitted_at: Some(Utc::now()),
        })
    }

    async fn get_change(&self, change_id: &str) -> Result<ChangeInfo, Error> {
        let mut inner = self.inner.write().await;

        let remaining = inner
            .changes
            .get_mut(change_id)
            .ok_or_else(|| Error::provider("memory", format!("NoSuchChange: {}", change_id)))?;

        let status = if *remaining == 0 {
            inner.changes.remove(change_id);
            ChangeStatus::InSync
        } else {
            *remaining -= 1;
            ChangeStatus::Pending
        };

        Ok(ChangeInfo {
            id: change_id.to_string(),
            status,
            submitted_at: None,
        })
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}
