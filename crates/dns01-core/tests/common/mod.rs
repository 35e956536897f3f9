//! Test doubles and common utilities for contract tests
//!
//! This module provides a scripted provider that counts calls and records
//! submitted changes without implementing real DNS behaviour.

#![allow(dead_code)]

use dns01_core::error::{Error, Result};
use dns01_core::traits::{
    ChangeInfo, ChangeRequest, ChangeStatus, HostedZone, ZonePage, ZoneProvider,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A provider whose answers are scripted by the test
pub struct ScriptedProvider {
    /// Zones served by list_hosted_zones()
    zones: Vec<HostedZone>,
    /// Zones per listing page
    page_size: usize,
    /// Statuses returned by successive get_change() calls; PENDING once empty
    statuses: Mutex<VecDeque<ChangeStatus>>,
    /// When set, get_change() fails with this message
    status_error: Option<String>,
    /// When set, change_record_set() fails with this message
    change_error: Option<String>,
    /// When set, list_hosted_zones() fails with this message
    list_error: Option<String>,
    /// Call counters
    list_calls: Arc<AtomicUsize>,
    change_calls: Arc<AtomicUsize>,
    status_calls: Arc<AtomicUsize>,
    /// Changes received, with their zone id
    submitted: Arc<Mutex<Vec<(String, ChangeRequest)>>>,
}

impl ScriptedProvider {
    pub fn new(zones: Vec<HostedZone>) -> Self {
        Self {
            zones,
            page_size: 100,
            statuses: Mutex::new(VecDeque::new()),
            status_error: None,
            change_error: None,
            list_error: None,
            list_calls: Arc::new(AtomicUsize::new(0)),
            change_calls: Arc::new(AtomicUsize::new(0)),
            status_calls: Arc::new(AtomicUsize::new(0)),
            submitted: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_statuses(self, statuses: impl IntoIterator<Item = ChangeStatus>) -> Self {
        *self.statuses.lock().unwrap() = statuses.into_iter().collect();
        self
    }

    pub fn with_status_error(mut self, message: &str) -> Self {
        self.status_error = Some(message.to_string());
        self
    }

    pub fn with_change_error(mut self, message: &str) -> Self {
        self.change_error = Some(message.to_string());
        self
    }

    pub fn with_list_error(mut self, message: &str) -> Self {
        self.list_error = Some(message.to_string());
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn change_calls(&self) -> usize {
        self.change_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<(String, ChangeRequest)> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ZoneProvider for ScriptedProvider {
    async fn list_hosted_zones(&self, marker: Option<&str>) -> Result<ZonePage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.list_error {
            return Err(Error::http(message.clone()));
        }

        let start: usize = marker.map(|m| m.parse().unwrap()).unwrap_or(0);
        let end = (start + self.page_size).min(self.zones.len());
        let next_marker = (end < self.zones.len()).then(|| end.to_string());

        Ok(ZonePage {
            zones: self.zones[start..end].to_vec(),
            next_marker,
        })
    }

    async fn change_record_set(&self, zone_id: &str, change: &ChangeRequest) -> Result<ChangeInfo> {
        let n = self.change_calls.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(message) = &self.change_error {
            return Err(Error::provider("scripted", message.clone()));
        }

        self.submitted
            .lock()
            .unwrap()
            .push((zone_id.to_string(), change.clone()));

        Ok(ChangeInfo {
            id: format!("change-{}", n),
            status: ChangeStatus::Pending,
            submitted_at: None,
        })
    }

    async fn get_change(&self, change_id: &str) -> Result<ChangeInfo> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.status_error {
            return Err(Error::http(message.clone()));
        }

        let status = self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ChangeStatus::Pending);

        Ok(ChangeInfo {
            id: change_id.to_string(),
            status,
            submitted_at: None,
        })
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

/// A provider that returns the same marker forever
pub struct LoopingProvider;

#[async_trait::async_trait]
impl ZoneProvider for LoopingProvider {
    async fn list_hosted_zones(&self, _marker: Option<&str>) -> Result<ZonePage> {
        Ok(ZonePage {
            zones: vec![HostedZone::public("Z1", "example.com.")],
            next_marker: Some("same".to_string()),
        })
    }

    async fn change_record_set(&self, _zone_id: &str, _change: &ChangeRequest) -> Result<ChangeInfo> {
        Err(Error::Other("unused".to_string()))
    }

    async fn get_change(&self, _change_id: &str) -> Result<ChangeInfo> {
        Err(Error::Other("unused".to_string()))
    }

    fn provider_name(&self) -> &'static str {
        "looping"
    }
}

/// A provider whose markers cycle: first page -> "A" -> "B" -> "A" ...
pub struct CyclingProvider {
    list_calls: AtomicUsize,
}

impl CyclingProvider {
    pub fn new() -> Self {
        Self {
            list_calls: AtomicUsize::new(0),
        }
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ZoneProvider for CyclingProvider {
    async fn list_hosted_zones(&self, marker: Option<&str>) -> Result<ZonePage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let next = match marker {
            Some("A") => "B",
            _ => "A",
        };
        Ok(ZonePage {
            zones: vec![HostedZone::public("Z1", "example.com.")],
            next_marker: Some(next.to_string()),
        })
    }

    async fn change_record_set(&self, _zone_id: &str, _change: &ChangeRequest) -> Result<ChangeInfo> {
        Err(Error::Other("unused".to_string()))
    }

    async fn get_change(&self, _change_id: &str) -> Result<ChangeInfo> {
        Err(Error::Other("unused".to_string()))
    }

    fn provider_name(&self) -> &'static str {
        "cycling"
    }
}

/// Zones `com`, `example.com` and `foo.example.com`, all public
pub fn nested_zones() -> Vec<HostedZone> {
    vec![
        HostedZone::public("z1", "com."),
        HostedZone::public("z2", "example.com."),
        HostedZone::public("z3", "foo.example.com."),
    ]
}
