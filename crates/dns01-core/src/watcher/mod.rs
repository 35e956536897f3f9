//! Change propagation watcher
//!
//! Polls a submitted change until the provider reports it INSYNC, or until
//! the poll budget runs out.
//!
//! ## State Machine
//!
//! ```text
//!            status read
//! Pending ───────────────► InSync     (terminal, success)
//!    │ ▲
//!    │ │ PENDING, sleep poll_interval
//!    └─┘
//!    │
//!    └── max_attempts reads without INSYNC ──► TimedOut (terminal, failure)
//! ```
//!
//! A failed status read ends the wait with [`Error::PropagationStatus`]
//! rather than being counted as "still pending". The sleep between polls can
//! be interrupted through a cancel channel.

use crate::config::PropagationConfig;
use crate::error::{Error, Result};
use crate::traits::{ChangeStatus, ZoneProvider};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// Fixed-interval polling budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropagationPolicy {
    /// Delay between status reads
    pub poll_interval: Duration,
    /// Maximum number of status reads
    pub max_attempts: u32,
}

impl Default for PropagationPolicy {
    fn default() -> Self {
        Self::from(&PropagationConfig::default())
    }
}

impl From<&PropagationConfig> for PropagationPolicy {
    fn from(config: &PropagationConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            max_attempts: config.max_attempts,
        }
    }
}

/// Lifecycle of a submitted change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationState {
    /// Not yet confirmed on all authoritative servers
    Pending {
        /// Status reads performed so far
        attempts: u32,
    },
    /// Confirmed on all authoritative servers
    InSync,
    /// Poll budget exhausted
    TimedOut,
}

/// Waits for submitted changes to propagate
#[derive(Clone)]
pub struct PropagationWatcher {
    provider: Arc<dyn ZoneProvider>,
    policy: PropagationPolicy,
}

impl PropagationWatcher {
    /// Create a watcher with an explicit polling policy
    pub fn new(provider: Arc<dyn ZoneProvider>, policy: PropagationPolicy) -> Self {
        Self { provider, policy }
    }

    /// The polling policy in use
    pub fn policy(&self) -> PropagationPolicy {
        self.policy
    }

    /// Block until `change_id` is INSYNC
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The change reached INSYNC
    /// - `Err(Error::PropagationTimeout)`: Budget exhausted; the change may
    ///   still complete later
    /// - `Err(Error::PropagationStatus)`: A status read failed
    pub async fn wait(&self, change_id: &str) -> Result<()> {
        self.wait_internal(change_id, None).await
    }

    /// Like [`wait`](Self::wait), but returns [`Error::Cancelled`] as soon as
    /// `cancel` fires (or its sender is dropped) during a sleep between polls
    pub async fn wait_with_cancel(
        &self,
        change_id: &str,
        cancel: oneshot::Receiver<()>,
    ) -> Result<()> {
        self.wait_internal(change_id, Some(cancel)).await
    }

    async fn wait_internal(
        &self,
        change_id: &str,
        mut cancel: Option<oneshot::Receiver<()>>,
    ) -> Result<()> {
        let mut state = PropagationState::Pending { attempts: 0 };

        while let PropagationState::Pending { attempts } = state {
            if attempts >= self.policy.max_attempts {
                state = PropagationState::TimedOut;
                break;
            }

            let change = self
                .provider
                .get_change(change_id)
                .await
                .map_err(|e| Error::PropagationStatus {
                    change_id: change_id.to_string(),
                    source: Box::new(e),
                })?;
            let attempts = attempts + 1;

            if change.status == ChangeStatus::InSync {
                state = PropagationState::InSync;
                break;
            }

            debug!(
                "Change {} still {} after {}/{} check(s)",
                change_id, change.status, attempts, self.policy.max_attempts
            );
            state = PropagationState::Pending { attempts };

            if attempts < self.policy.max_attempts {
                self.sleep(change_id, cancel.as_mut()).await?;
            }
        }

        match state {
            PropagationState::InSync => {
                info!("Change {} is INSYNC", change_id);
                Ok(())
            }
            _ => {
                warn!(
                    "Change {} not INSYNC after {} check(s)",
                    change_id, self.policy.max_attempts
                );
                Err(Error::PropagationTimeout {
                    change_id: change_id.to_string(),
                    attempts: self.policy.max_attempts,
                })
            }
        }
    }

    /// Sleep one poll interval, waking early on cancellation
    async fn sleep(&self, change_id: &str, cancel: Option<&mut oneshot::Receiver<()>>) -> Result<()> {
        let Some(rx) = cancel else {
            tokio::time::sleep(self.policy.poll_interval).await;
            return Ok(());
        };

        tokio::select! {
            _ = tokio::time::sleep(self.policy.poll_interval) => Ok(()),
            _ = rx => {
                info!("Wait for change {} cancelled", change_id);
                Err(Error::Cancelled {
                    change_id: change_id.to_string(),
                })
            }
        }
    }
}
