//! Configuration types for the DNS-01 system
//!
//! This module defines all configuration structures used throughout the crate.

use crate::traits::HostedZone;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Main DNS-01 configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dns01Config {
    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// Propagation polling settings
    #[serde(default)]
    pub propagation: PropagationConfig,
}

impl Dns01Config {
    /// Create a new configuration with defaults
    pub fn new(provider: ProviderConfig) -> Self {
        Self {
            provider,
            propagation: PropagationConfig::default(),
        }
    }

    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, crate::Error> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.provider.validate()?;
        self.propagation.validate()?;
        Ok(())
    }
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// AWS Route 53
    Route53 {
        /// AWS access key id
        access_key_id: String,
        /// AWS secret access key
        secret_access_key: String,
        /// Session token for temporary credentials
        #[serde(default)]
        session_token: Option<String>,
        /// API endpoint override (defaults to the public Route 53 endpoint)
        #[serde(default)]
        endpoint: Option<String>,
    },

    /// In-memory provider (no network, state lost on exit)
    Memory {
        /// Zones the provider starts with
        #[serde(default)]
        zones: Vec<HostedZone>,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Route53 {
                access_key_id,
                secret_access_key,
                endpoint,
                ..
            } => {
                if access_key_id.is_empty() {
                    return Err(crate::Error::config("Route 53 access key id cannot be empty"));
                }
                if secret_access_key.is_empty() {
                    return Err(crate::Error::config(
                        "Route 53 secret access key cannot be empty",
                    ));
                }
                if let Some(endpoint) = endpoint
                    && !endpoint.starts_with("https://")
                    && !endpoint.starts_with("http://")
                {
                    return Err(crate::Error::config(format!(
                        "Route 53 endpoint must be an http(s) URL, got: {}",
                        endpoint
                    )));
                }
                Ok(())
            }
            ProviderConfig::Memory { zones } => {
                if zones.iter().any(|z| z.id.is_empty()) {
                    return Err(crate::Error::config("Memory provider zone id cannot be empty"));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Route53 { .. } => "route53",
            ProviderConfig::Memory { .. } => "memory",
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::Memory { zones: Vec::new() }
    }
}

// Credentials never appear in Debug output
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderConfig::Route53 {
                access_key_id,
                session_token,
                endpoint,
                ..
            } => f
                .debug_struct("Route53")
                .field("access_key_id", access_key_id)
                .field("secret_access_key", &"<REDACTED>")
                .field(
                    "session_token",
                    &session_token.as_ref().map(|_| "<REDACTED>"),
                )
                .field("endpoint", endpoint)
                .finish(),
            ProviderConfig::Memory { zones } => {
                f.debug_struct("Memory").field("zones", zones).finish()
            }
        }
    }
}

/// Propagation polling configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropagationConfig {
    /// Delay between change status reads (in seconds)
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Maximum number of status reads before giving up
    ///
    /// Together with `poll_interval_secs` this bounds the wait; the
    /// defaults give a ten minute ceiling.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl PropagationConfig {
    /// Validate the propagation configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.max_attempts == 0 {
            return Err(crate::Error::config("Propagation max_attempts must be > 0"));
        }
        Ok(())
    }

    /// Delay between status reads
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_max_attempts() -> u32 {
    120
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_json() {
        let config = Dns01Config::from_json(
            r#"{
                "provider": {
                    "type": "route53",
                    "access_key_id": "AKIDEXAMPLE",
                    "secret_access_key": "secret"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.provider.type_name(), "route53");
        assert_eq!(config.propagation.poll_interval_secs, 5);
        assert_eq!(config.propagation.max_attempts, 120);
        assert_eq!(config.propagation.poll_interval(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_memory_provider_config() {
        let config = Dns01Config::from_json(
            r#"{
                "provider": {
                    "type": "memory",
                    "zones": [{ "id": "Z1", "name": "example.com.", "is_private": false }]
                },
                "propagation": { "max_attempts": 3 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.provider.type_name(), "memory");
        let ProviderConfig::Memory { zones } = &config.provider else {
            panic!("expected memory provider");
        };
        assert_eq!(zones[0].id, "Z1");
        assert_eq!(config.propagation.max_attempts, 3);
        assert_eq!(config.propagation.poll_interval_secs, 5);
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let mut config = Dns01Config::new(ProviderConfig::default());
        config.propagation.max_attempts = 0;
        assert!(matches!(config.validate(), Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_empty_credentials_rejected() {
        let config = Dns01Config::new(ProviderConfig::Route53 {
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: String::new(),
            session_token: None,
            endpoint: None,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_endpoint_rejected() {
        let config = ProviderConfig::Route53 {
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "secret".to_string(),
            session_token: None,
            endpoint: Some("route53.amazonaws.com".to_string()),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_secrets_not_exposed_in_debug() {
        let config = ProviderConfig::Route53 {
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "super_secret_value".to_string(),
            session_token: Some("session_secret_value".to_string()),
            endpoint: None,
        };

        let debug_str = format!("{:?}", config);
        assert!(!debug_str.contains("super_secret_value"));
        assert!(!debug_str.contains("session_secret_value"));
        assert!(debug_str.contains("AKIDEXAMPLE"));
    }
}
