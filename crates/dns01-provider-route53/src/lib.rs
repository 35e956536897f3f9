// # AWS Route 53 Zone Provider
//
// This crate provides the Route 53 implementation of `ZoneProvider` for the
// DNS-01 core.
//
// ## Behaviour
//
// - ✅ One HTTP request per trait call
// - ✅ Full error propagation (the caller owns retry policy)
// - ✅ HTTP timeout configured (30 seconds)
// - ✅ Specific error handling for HTTP status codes (400, 401/403, 404, 429, 5xx)
// - ✅ SigV4 request signing, including temporary session credentials
// - ✅ Endpoint override for testing against a local stub
// - ❌ NO retry or backoff logic
// - ❌ NO zone caching (the resolver lists zones fresh on every call)
// - ❌ NO background tasks
//
// ## Security Requirements
//
// - Secret access key and session token NEVER appear in logs
// - Provider MUST fail fast if credentials are empty
//
// ## API Reference
//
// - Route 53 API 2013-04-01: https://docs.aws.amazon.com/Route53/latest/APIReference/
// - List Hosted Zones: GET `/2013-04-01/hostedzone?marker=...&maxitems=...`
// - Change Record Sets: POST `/2013-04-01/hostedzone/:zone_id/rrset/`
// - Get Change: GET `/2013-04-01/change/:change_id`

pub mod sign;
pub mod types;

use async_trait::async_trait;
use chrono::Utc;
use dns01_core::config::ProviderConfig;
use dns01_core::traits::{ChangeInfo, ChangeRequest, ZonePage, ZoneProvider, ZoneProviderFactory};
use dns01_core::{Error, Result};
use reqwest::{Method, StatusCode, Url};
use std::time::Duration;

pub use sign::{Credentials, SigV4Signer};

/// Public Route 53 endpoint
pub const ROUTE53_ENDPOINT: &str = "https://route53.amazonaws.com";

/// Route 53 is a global service signed in us-east-1
const SIGNING_REGION: &str = "us-east-1";
const SIGNING_SERVICE: &str = "route53";

const API_VERSION: &str = "2013-04-01";

/// Zones requested per listing page (the API maximum)
const LIST_PAGE_SIZE: &str = "100";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Route 53 zone provider
///
/// # Trust Level: Untrusted
///
/// This provider is isolated, stateless, and single-shot. Zone selection,
/// propagation polling and retry decisions live in `dns01-core`.
///
/// # Security
///
/// The Debug implementation does NOT expose the secret key or session token.
pub struct Route53Provider {
    /// AWS credentials
    /// ⚠️ NEVER log the secret
    credentials: Credentials,

    /// API base URL, without trailing slash
    endpoint: String,

    /// Value of the `host` header, as signed
    host: String,

    /// Request signer
    signer: SigV4Signer,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the credentials
impl std::fmt::Debug for Route53Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route53Provider")
            .field("credentials", &self.credentials)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl Route53Provider {
    /// Create a new Route 53 provider
    ///
    /// # Parameters
    ///
    /// - `credentials`: AWS credentials with `route53:ListHostedZones`,
    ///   `route53:ChangeResourceRecordSets` and `route53:GetChange`
    /// - `endpoint`: Optional API base URL (defaults to [`ROUTE53_ENDPOINT`])
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if credentials are empty or the endpoint is
    /// not a valid http(s) URL.
    pub fn new(credentials: Credentials, endpoint: Option<String>) -> Result<Self> {
        if credentials.access_key_id.is_empty() {
            return Err(Error::config("Route 53 access key id cannot be empty"));
        }
        if credentials.secret_access_key.is_empty() {
            return Err(Error::config("Route 53 secret access key cannot be empty"));
        }

        let endpoint = endpoint
            .unwrap_or_else(|| ROUTE53_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();
        let host = host_header(&endpoint)?;

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            credentials,
            endpoint,
            host,
            signer: SigV4Signer::new(SIGNING_REGION, SIGNING_SERVICE),
            client,
        })
    }

    /// Send one signed request and return the response body
    ///
    /// `query` must be canonical (see [`sign::canonical_query`]).
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &str,
        body: Option<String>,
    ) -> Result<String> {
        let payload = body.unwrap_or_default();

        let headers = self.signer.sign(
            &self.credentials,
            method.as_str(),
            &self.host,
            path,
            query,
            payload.as_bytes(),
            Utc::now(),
        );

        let url = if query.is_empty() {
            format!("{}{}", self.endpoint, path)
        } else {
            format!("{}{}?{}", self.endpoint, path, query)
        };

        tracing::debug!("Route 53 request: {} {}", method, path);

        let mut request = self.client.request(method, &url);
        for (name, value) in headers {
            request = request.header(name, value);
        }
        if !payload.is_empty() {
            request = request
                .header("content-type", "text/xml")
                .body(payload);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::http(format!("Route 53 request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read Route 53 response: {}", e)))?;

        if !status.is_success() {
            return Err(map_status_error(status, &text));
        }

        Ok(text)
    }
}

#[async_trait]
impl ZoneProvider for Route53Provider {
    /// List one page of hosted zones
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /2013-04-01/hostedzone?marker=Z123&maxitems=100
    /// ```
    async fn list_hosted_zones(&self, marker: Option<&str>) -> Result<ZonePage> {
        let mut params = vec![("maxitems", LIST_PAGE_SIZE)];
        if let Some(marker) = marker {
            params.push(("marker", marker));
        }
        let query = sign::canonical_query(&params);

        let path = format!("/{}/hostedzone", API_VERSION);
        let body = self.send(Method::GET, &path, &query, None).await?;

        let page = types::from_xml::<types::ListHostedZonesResponse>(&body)?.into_page()?;
        tracing::debug!(
            "Listed {} hosted zones (more: {})",
            page.zones.len(),
            page.next_marker.is_some()
        );
        Ok(page)
    }

    /// Submit a single-record change
    ///
    /// # API Call
    ///
    /// ```http
    /// POST /2013-04-01/hostedzone/Z123/rrset/
    /// <ChangeResourceRecordSetsRequest>
    ///   <ChangeBatch><Changes><Change>
    ///     <Action>UPSERT</Action>
    ///     <ResourceRecordSet>
    ///       <Name>_acme-challenge.example.com</Name><Type>TXT</Type><TTL>10</TTL>
    ///       <ResourceRecords><ResourceRecord><Value>"token"</Value></ResourceRecord></ResourceRecords>
    ///     </ResourceRecordSet>
    ///   </Change></Changes></ChangeBatch>
    /// </ChangeResourceRecordSetsRequest>
    /// ```
    async fn change_record_set(&self, zone_id: &str, change: &ChangeRequest) -> Result<ChangeInfo> {
        let zone_id = types::bare_zone_id(zone_id);
        let path = format!("/{}/hostedzone/{}/rrset/", API_VERSION, zone_id);
        let request_body = types::change_batch_xml(change)?;

        tracing::info!(
            "Submitting Route 53 change: {} {} TXT in zone {}",
            change.action,
            change.record.name,
            zone_id
        );

        let body = self
            .send(Method::POST, &path, "", Some(request_body))
            .await?;

        types::from_xml::<types::ChangeInfoResponse>(&body)?.into_change_info()
    }

    /// Read the status of a change
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /2013-04-01/change/C123
    /// ```
    async fn get_change(&self, change_id: &str) -> Result<ChangeInfo> {
        let path = format!("/{}/change/{}", API_VERSION, types::bare_change_id(change_id));
        let body = self.send(Method::GET, &path, "", None).await?;

        types::from_xml::<types::ChangeInfoResponse>(&body)?.into_change_info()
    }

    fn provider_name(&self) -> &'static str {
        "route53"
    }
}

/// Map a non-success response to an error
///
/// The status class decides the variant; the parsed API error code refines
/// 400 responses, since Route 53 reports throttling as a 400 `Throttling`.
fn map_status_error(status: StatusCode, body: &str) -> Error {
    let api_error = types::parse_error(body);
    let detail = match &api_error {
        Some(e) => format!("{}: {}", e.code, e.message),
        None => format!("{} - {}", status, body.trim()),
    };

    match status.as_u16() {
        400 => match api_error.as_ref().map(|e| e.code.as_str()) {
            Some("Throttling") | Some("PriorRequestNotComplete") => Error::rate_limited(detail),
            _ => Error::provider("route53", detail),
        },
        401 | 403 => Error::auth(format!(
            "Invalid AWS credentials or insufficient permissions ({})",
            detail
        )),
        404 => Error::provider("route53", detail),
        429 => Error::rate_limited(detail),
        500..=599 => Error::http(format!("Route 53 server error (transient): {}", detail)),
        _ => Error::provider("route53", detail),
    }
}

/// `host[:port]` of an endpoint URL
fn host_header(endpoint: &str) -> Result<String> {
    let url = Url::parse(endpoint)
        .map_err(|e| Error::config(format!("Invalid Route 53 endpoint {}: {}", endpoint, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(Error::config(format!(
            "Route 53 endpoint must be http(s): {}",
            endpoint
        )));
    }

    let host = url
        .host_str()
        .ok_or_else(|| Error::config(format!("Route 53 endpoint has no host: {}", endpoint)))?;

    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// Factory for creating Route 53 providers
pub struct Route53Factory;

impl ZoneProviderFactory for Route53Factory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn ZoneProvider>> {
        match config {
            ProviderConfig::Route53 {
                access_key_id,
                secret_access_key,
                session_token,
                endpoint,
            } => {
                if endpoint.is_some() {
                    tracing::warn!("Route 53 endpoint overridden: {:?}", endpoint);
                }

                let credentials = Credentials {
                    access_key_id: access_key_id.clone(),
                    secret_access_key: secret_access_key.clone(),
                    session_token: session_token.clone(),
                };

                Ok(Box::new(Route53Provider::new(credentials, endpoint.clone())?))
            }
            _ => Err(Error::config("Invalid config for Route 53 provider")),
        }
    }
}
