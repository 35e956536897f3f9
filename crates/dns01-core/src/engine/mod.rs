//! DNS-01 challenge engine
//!
//! The Dns01Engine is the surface callers use to publish and withdraw
//! challenge records:
//! - [`Dns01Engine::upsert_challenge_record`] and
//!   [`Dns01Engine::delete_challenge_record`] submit a change and return its id
//! - [`Dns01Engine::await_propagation`] blocks until that change is INSYNC
//!
//! ## Architecture
//!
//! ```text
//!                  ┌──────────────┐
//!   caller ──────► │ Dns01Engine  │
//!                  └──────────────┘
//!                     │        │
//!          ┌──────────┘        └───────────┐
//!          ▼                               ▼
//! ┌────────────────────┐         ┌────────────────────┐
//! │ ChangeOrchestrator │         │ PropagationWatcher │
//! └────────────────────┘         └────────────────────┘
//!          │                               │
//!          ▼                               │
//! ┌────────────────────┐                   │
//! │   ZoneResolver     │                   │
//! └────────────────────┘                   │
//!          │                               │
//!          └──────────► ZoneProvider ◄─────┘
//! ```
//!
//! ## Concurrency
//!
//! The engine holds no mutable state and can be cloned freely; independent
//! challenges may run concurrently. Overlapping UPSERT/DELETE calls for the
//! same record name must be serialized by the caller, since the provider
//! applies them last-write-wins.

use crate::config::Dns01Config;
use crate::error::Result;
use crate::orchestrator::ChangeOrchestrator;
use crate::traits::ZoneProvider;
use crate::watcher::{PropagationPolicy, PropagationWatcher};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::info;

/// Core DNS-01 engine
#[derive(Clone)]
pub struct Dns01Engine {
    orchestrator: ChangeOrchestrator,
    watcher: PropagationWatcher,
}

impl Dns01Engine {
    /// Create a new engine
    ///
    /// # Parameters
    ///
    /// - `provider`: Zone provider implementation
    /// - `config`: Validated before use; only its propagation settings are
    ///   read here
    pub fn new(provider: Arc<dyn ZoneProvider>, config: &Dns01Config) -> Result<Self> {
        config.validate()?;
        let policy = PropagationPolicy::from(&config.propagation);
        Ok(Self::with_policy(provider, policy))
    }

    /// Create an engine with an explicit polling policy
    pub fn with_policy(provider: Arc<dyn ZoneProvider>, policy: PropagationPolicy) -> Self {
        Self {
            orchestrator: ChangeOrchestrator::new(Arc::clone(&provider)),
            watcher: PropagationWatcher::new(provider, policy),
        }
    }

    /// Publish `token` under `domain`, replacing any previous value
    pub async fn upsert_challenge_record(&self, domain: &str, token: &str) -> Result<String> {
        self.orchestrator.upsert(domain, token).await
    }

    /// Withdraw the record publishing `token` under `domain`
    pub async fn delete_challenge_record(&self, domain: &str, token: &str) -> Result<String> {
        self.orchestrator.delete(domain, token).await
    }

    /// Block until `change_id` has propagated to all authoritative servers
    pub async fn await_propagation(&self, change_id: &str) -> Result<()> {
        self.watcher.wait(change_id).await
    }

    /// Like [`await_propagation`](Self::await_propagation), abandoning the
    /// wait when `cancel` fires
    pub async fn await_propagation_with_cancel(
        &self,
        change_id: &str,
        cancel: oneshot::Receiver<()>,
    ) -> Result<()> {
        self.watcher.wait_with_cancel(change_id, cancel).await
    }

    /// Upsert the challenge record and wait for it to propagate
    pub async fn publish(&self, domain: &str, token: &str) -> Result<String> {
        let change_id = self.upsert_challenge_record(domain, token).await?;
        self.await_propagation(&change_id).await?;
        info!("Challenge record for {} published", domain);
        Ok(change_id)
    }

    /// Delete the challenge record and wait for the removal to propagate
    pub async fn cleanup(&self, domain: &str, token: &str) -> Result<String> {
        let change_id = self.delete_challenge_record(domain, token).await?;
        self.await_propagation(&change_id).await?;
        info!("Challenge record for {} removed", domain);
        Ok(change_id)
    }
}
