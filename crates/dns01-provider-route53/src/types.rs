//! Route 53 REST API wire types (XML)
//!
//! Only the elements this crate reads are declared; everything else in a
//! response is ignored.

use chrono::{DateTime, Utc};
use dns01_core::traits::{ChangeInfo, ChangeRequest, ChangeStatus, HostedZone, ZonePage};
use dns01_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// XML namespace of the 2013-04-01 API
pub const XMLNS: &str = "https://route53.amazonaws.com/doc/2013-04-01/";

const HOSTED_ZONE_PREFIX: &str = "/hostedzone/";
const CHANGE_PREFIX: &str = "/change/";

/// Strip the `/hostedzone/` prefix Route 53 puts on zone ids
pub fn bare_zone_id(id: &str) -> &str {
    id.strip_prefix(HOSTED_ZONE_PREFIX).unwrap_or(id)
}

/// Strip the `/change/` prefix Route 53 puts on change ids
pub fn bare_change_id(id: &str) -> &str {
    id.strip_prefix(CHANGE_PREFIX).unwrap_or(id)
}

// ===== Responses =====

#[derive(Debug, Deserialize)]
pub struct ListHostedZonesResponse {
    #[serde(rename = "HostedZones", default)]
    pub hosted_zones: HostedZones,
    #[serde(rename = "IsTruncated", default)]
    pub is_truncated: bool,
    #[serde(rename = "NextMarker", default)]
    pub next_marker: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HostedZones {
    #[serde(rename = "HostedZone", default)]
    pub items: Vec<XmlHostedZone>,
}

#[derive(Debug, Deserialize)]
pub struct XmlHostedZone {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Config", default)]
    pub config: Option<HostedZoneConfig>,
}

#[derive(Debug, Deserialize)]
pub struct HostedZoneConfig {
    #[serde(rename = "PrivateZone", default)]
    pub private_zone: bool,
}

impl ListHostedZonesResponse {
    /// Convert to the provider-neutral page
    ///
    /// A truncated listing without a `NextMarker` cannot be continued and is
    /// reported as an error rather than silently ending the listing.
    pub fn into_page(self) -> Result<ZonePage> {
        let zones = self
            .hosted_zones
            .items
            .into_iter()
            .map(|z| HostedZone {
                id: bare_zone_id(&z.id).to_string(),
                name: z.name,
                is_private: z.config.map(|c| c.private_zone).unwrap_or(false),
            })
            .collect();

        let next_marker = match (self.is_truncated, self.next_marker) {
            (true, Some(marker)) => Some(marker),
            (true, None) => {
                return Err(Error::provider(
                    "route53",
                    "Truncated zone listing without NextMarker",
                ));
            }
            (false, _) => None,
        };

        Ok(ZonePage { zones, next_marker })
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangeInfoResponse {
    #[serde(rename = "ChangeInfo")]
    pub change_info: XmlChangeInfo,
}

#[derive(Debug, Deserialize)]
pub struct XmlChangeInfo {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "SubmittedAt", default)]
    pub submitted_at: Option<String>,
}

impl ChangeInfoResponse {
    /// Convert to the provider-neutral change info
    pub fn into_change_info(self) -> Result<ChangeInfo> {
        let info = self.change_info;

        let status = match info.status.as_str() {
            "PENDING" => ChangeStatus::Pending,
            "INSYNC" => ChangeStatus::InSync,
            other => {
                return Err(Error::provider(
                    "route53",
                    format!("Unknown change status: {}", other),
                ));
            }
        };

        // SubmittedAt is informational only
        let submitted_at = info.submitted_at.as_deref().and_then(|s| {
            DateTime::parse_from_rfc3339(s)
                .map(|t| t.with_timezone(&Utc))
                .ok()
        });

        Ok(ChangeInfo {
            id: bare_change_id(&info.id).to_string(),
            status,
            submitted_at,
        })
    }
}

/// `<ErrorResponse><Error>...</Error></ErrorResponse>`
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(rename = "Error")]
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "Code", default)]
    code: String,
    #[serde(rename = "Message", default)]
    message: String,
}

/// `<InvalidChangeBatch><Messages><Message>...</Message></Messages></InvalidChangeBatch>`
#[derive(Debug, Deserialize)]
struct InvalidChangeBatchResponse {
    #[serde(rename = "Messages")]
    messages: Messages,
}

#[derive(Debug, Deserialize)]
struct Messages {
    #[serde(rename = "Message", default)]
    items: Vec<String>,
}

/// Error code and message from an error body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// Parse an error body, if it has one of the known shapes
pub fn parse_error(body: &str) -> Option<ApiError> {
    if let Ok(resp) = quick_xml::de::from_str::<ErrorResponse>(body) {
        return Some(ApiError {
            code: resp.error.code,
            message: resp.error.message,
        });
    }

    if let Ok(resp) = quick_xml::de::from_str::<InvalidChangeBatchResponse>(body) {
        return Some(ApiError {
            code: "InvalidChangeBatch".to_string(),
            message: resp.messages.items.join("; "),
        });
    }

    None
}

// ===== Requests =====

#[derive(Debug, Serialize)]
struct ChangeResourceRecordSetsRequest {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(rename = "ChangeBatch")]
    change_batch: ChangeBatch,
}

#[derive(Debug, Serialize)]
struct ChangeBatch {
    #[serde(rename = "Changes")]
    changes: Changes,
}

#[derive(Debug, Serialize)]
struct Changes {
    #[serde(rename = "Change")]
    items: Vec<Change>,
}

#[derive(Debug, Serialize)]
struct Change {
    #[serde(rename = "Action")]
    action: &'static str,
    #[serde(rename = "ResourceRecordSet")]
    record_set: ResourceRecordSet,
}

#[derive(Debug, Serialize)]
struct ResourceRecordSet {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Type")]
    record_type: &'static str,
    #[serde(rename = "TTL")]
    ttl: u32,
    #[serde(rename = "ResourceRecords")]
    records: ResourceRecords,
}

#[derive(Debug, Serialize)]
struct ResourceRecords {
    #[serde(rename = "ResourceRecord")]
    items: Vec<ResourceRecord>,
}

#[derive(Debug, Serialize)]
struct ResourceRecord {
    #[serde(rename = "Value")]
    value: String,
}

/// Render the ChangeResourceRecordSets request body for one change
pub fn change_batch_xml(change: &ChangeRequest) -> Result<String> {
    let request = ChangeResourceRecordSetsRequest {
        xmlns: XMLNS,
        change_batch: ChangeBatch {
            changes: Changes {
                items: vec![Change {
                    action: change.action.as_str(),
                    record_set: ResourceRecordSet {
                        name: change.record.name.clone(),
                        record_type: change.record.record_type(),
                        ttl: change.record.ttl,
                        records: ResourceRecords {
                            items: vec![ResourceRecord {
                                value: change.record.quoted_value(),
                            }],
                        },
                    },
                }],
            },
        },
    };

    let body = quick_xml::se::to_string_with_root("ChangeResourceRecordSetsRequest", &request)
        .map_err(|e| Error::provider("route53", format!("Failed to encode change: {}", e)))?;

    Ok(format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>{}", body))
}

/// Decode an XML response body
pub fn from_xml<'de, T: Deserialize<'de>>(body: &'de str) -> Result<T> {
    quick_xml::de::from_str(body)
        .map_err(|e| Error::provider("route53", format!("Failed to parse response: {}", e)))
}
