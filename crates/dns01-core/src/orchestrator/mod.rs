//! Validation record changes
//!
//! The orchestrator resolves the target zone, builds exactly one change for
//! exactly one TXT record, and submits it. It never pre-reads existing record
//! sets and never retries: a DELETE whose value does not match what is
//! published is rejected by the provider, and that rejection is returned as
//! [`Error::ChangeSubmission`].

use crate::error::{Error, Result};
use crate::resolver::ZoneResolver;
use crate::traits::{ChangeAction, ChangeRequest, ValidationRecord, ZoneProvider};
use std::sync::Arc;
use tracing::{debug, info};

/// Submits single-record DNS changes and returns their tracking ids
#[derive(Clone)]
pub struct ChangeOrchestrator {
    provider: Arc<dyn ZoneProvider>,
    resolver: ZoneResolver,
}

impl ChangeOrchestrator {
    /// Create an orchestrator over a zone provider
    pub fn new(provider: Arc<dyn ZoneProvider>) -> Self {
        let resolver = ZoneResolver::new(Arc::clone(&provider));
        Self { provider, resolver }
    }

    /// Create or replace the TXT record for `validation_domain`
    ///
    /// Any existing values of the record set are replaced by the single new
    /// value, so re-issued challenges do not accumulate stale tokens.
    pub async fn upsert(&self, validation_domain: &str, validation_value: &str) -> Result<String> {
        self.submit(ChangeAction::Upsert, validation_domain, validation_value)
            .await
    }

    /// Delete the TXT record for `validation_domain` holding `validation_value`
    pub async fn delete(&self, validation_domain: &str, validation_value: &str) -> Result<String> {
        self.submit(ChangeAction::Delete, validation_domain, validation_value)
            .await
    }

    /// Submit one change and return the provider's change id
    ///
    /// # Parameters
    ///
    /// - `action`: Upsert or delete
    /// - `validation_domain`: Fully-qualified record name
    /// - `validation_value`: Raw (unquoted) validation token
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: Opaque change id for [`crate::watcher::PropagationWatcher`]
    /// - `Err(Error)`: Zone resolution failed, or the provider rejected the change
    pub async fn submit(
        &self,
        action: ChangeAction,
        validation_domain: &str,
        validation_value: &str,
    ) -> Result<String> {
        let change = build_change(action, validation_domain, validation_value)?;
        let zone_id = self.resolver.resolve(validation_domain).await?;

        debug!(
            "Submitting {} {} {} {} to zone {}",
            action,
            change.record.name,
            change.record.record_type(),
            change.record.quoted_value(),
            zone_id
        );

        let info = self
            .provider
            .change_record_set(&zone_id, &change)
            .await
            .map_err(|e| Error::ChangeSubmission {
                zone_id: zone_id.clone(),
                record_name: validation_domain.to_string(),
                source: Box::new(e),
            })?;

        info!(
            "{} of {} accepted by {} as change {} ({})",
            action,
            validation_domain,
            self.provider.provider_name(),
            info.id,
            info.status
        );
        Ok(info.id)
    }
}

/// Build the single change for a validation record
///
/// The token becomes a quoted TXT character-string, so it must not itself
/// contain quotes or backslashes.
pub fn build_change(
    action: ChangeAction,
    validation_domain: &str,
    validation_value: &str,
) -> Result<ChangeRequest> {
    if validation_value.is_empty() {
        return Err(Error::invalid_input("Validation value cannot be empty"));
    }
    if validation_value.contains(['"', '\\']) {
        return Err(Error::invalid_input(
            "Validation value cannot contain quotes or backslashes",
        ));
    }

    Ok(ChangeRequest {
        action,
        record: ValidationRecord::new(validation_domain, validation_value),
    })
}
