//! Hosted zone resolution
//!
//! Maps a validation domain to the single most specific public hosted zone
//! that is authoritative for it.
//!
//! ## Matching
//!
//! Names are compared as label sequences from the root down, so a zone is a
//! candidate only when its labels are a suffix of the domain's labels:
//!
//! ```text
//! domain:  bar . foo . example . com
//! zone:              example . com     match
//! zone:                 ple  . com     no match ("example" != "ple")
//! ```
//!
//! Among candidates the zone with the longest normalized name wins. Private
//! zones are never candidates.

use crate::error::{Error, Result};
use crate::traits::{HostedZone, ZoneProvider};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Strip trailing dots from a DNS name
pub fn normalize_name(name: &str) -> &str {
    name.trim_end_matches('.')
}

/// Split a DNS name into its labels, most specific first
///
/// Trailing dots are ignored, so `example.com.` and `example.com` give the
/// same labels.
pub fn labels(name: &str) -> Vec<&str> {
    normalize_name(name).split('.').collect()
}

/// Whether `zone` is a label-level suffix of `domain`
///
/// Labels compare ASCII case-insensitively.
pub fn is_label_suffix(domain: &[&str], zone: &[&str]) -> bool {
    let Some(start) = domain.len().checked_sub(zone.len()) else {
        return false;
    };

    domain[start..]
        .iter()
        .zip(zone)
        .all(|(d, z)| d.eq_ignore_ascii_case(z))
}

/// Pick the most specific public zone that is an ancestor of `domain`
///
/// Ties on name length keep the zone listed first.
pub fn select_zone<'a>(domain: &str, zones: &'a [HostedZone]) -> Option<&'a HostedZone> {
    let target = labels(domain);
    let mut best: Option<&HostedZone> = None;

    for zone in zones.iter().filter(|z| !z.is_private) {
        if !is_label_suffix(&target, &labels(&zone.name)) {
            continue;
        }

        let len = normalize_name(&zone.name).len();
        match best {
            Some(current) if len < normalize_name(&current.name).len() => {}
            Some(current) if len == normalize_name(&current.name).len() => {
                warn!(
                    "Zones {} and {} both named {}, using {}",
                    current.id, zone.id, zone.name, current.id
                );
            }
            _ => best = Some(zone),
        }
    }

    best
}

/// Validate a domain before matching
///
/// The domain must be non-empty after stripping trailing dots and must not
/// contain empty labels.
pub fn validate_domain(domain: &str) -> Result<()> {
    let normalized = normalize_name(domain);
    if normalized.is_empty() {
        return Err(Error::invalid_input("Domain name cannot be empty"));
    }
    if normalized.split('.').any(str::is_empty) {
        return Err(Error::invalid_input(format!(
            "Domain name has empty label: '{}'",
            domain
        )));
    }
    Ok(())
}

/// Resolves validation domains to hosted zone ids
///
/// Every call lists zones fresh from the provider; nothing is cached between
/// calls.
#[derive(Clone)]
pub struct ZoneResolver {
    provider: Arc<dyn ZoneProvider>,
}

impl ZoneResolver {
    /// Create a resolver over a zone provider
    pub fn new(provider: Arc<dyn ZoneProvider>) -> Self {
        Self { provider }
    }

    /// Resolve `domain` to the id of its authoritative public zone
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The zone id
    /// - `Err(Error::ZoneNotFound)`: No public zone is an ancestor of `domain`
    /// - `Err(Error::ZoneListing)`: The provider failed to list zones
    pub async fn resolve(&self, domain: &str) -> Result<String> {
        validate_domain(domain)?;

        let zones = self.list_all_zones().await?;
        debug!(
            "Resolving {} against {} zone(s) from {}",
            domain,
            zones.len(),
            self.provider.provider_name()
        );

        let zone = select_zone(domain, &zones).ok_or_else(|| Error::zone_not_found(domain))?;
        debug!("Resolved {} to zone {} ({})", domain, zone.id, zone.name);
        Ok(zone.id.clone())
    }

    /// Walk every page of the zone listing
    ///
    /// A marker seen earlier in the same walk means the listing cycles and
    /// ends it with `ZoneListing`.
    async fn list_all_zones(&self) -> Result<Vec<HostedZone>> {
        let mut zones = Vec::new();
        let mut marker: Option<String> = None;
        let mut seen: HashSet<String> = HashSet::new();

        loop {
            let page = self
                .provider
                .list_hosted_zones(marker.as_deref())
                .await
                .map_err(|e| Error::ZoneListing {
                    source: Box::new(e),
                })?;

            debug!("Fetched {} zone(s)", page.zones.len());
            zones.extend(page.zones);

            match page.next_marker {
                Some(next) if !seen.insert(next.clone()) => {
                    return Err(Error::ZoneListing {
                        source: Box::new(Error::provider(
                            self.provider.provider_name(),
                            format!("zone listing repeated marker {}", next),
                        )),
                    });
                }
                Some(next) => marker = Some(next),
                None => return Ok(zones),
            }
        }
    }
}
