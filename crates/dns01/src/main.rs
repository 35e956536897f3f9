// # dns01 - DNS-01 challenge record tool
//
// This binary is a THIN integration layer:
// - DO NOT add zone matching, record or polling logic here
// - All DNS-01 logic lives in dns01-core
// - Configuration is via environment variables, optionally backed by a JSON file
//
// The binary is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Building the zone provider through its factory
// 4. Running one publish or cleanup and reporting the outcome as an exit code
//
// ## Configuration
//
// ### Action
// - `DNS01_ACTION`: `publish` (UPSERT) or `cleanup` (DELETE)
// - `DNS01_DOMAIN`: Validation domain, e.g. `_acme-challenge.example.com`
// - `DNS01_TOKEN`: Validation token (unquoted)
// - `DNS01_NO_WAIT`: When `true`, submit the change and exit without waiting
//
// ### Provider
// - `DNS01_PROVIDER_TYPE`: `route53` (default) or `memory`; `memory` needs
//   `DNS01_CONFIG_FILE` to supply its zones
// - `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`: Route 53 credentials
// - `AWS_SESSION_TOKEN`: Session token for temporary credentials (optional)
// - `DNS01_ROUTE53_ENDPOINT`: API endpoint override (optional)
//
// ### Propagation
// - `DNS01_POLL_INTERVAL_SECS`: Seconds between status reads (default 5)
// - `DNS01_MAX_POLL_ATTEMPTS`: Status reads before giving up (default 120)
//
// ### Other
// - `DNS01_CONFIG_FILE`: JSON `Dns01Config`. The file picks the provider type;
//   the Route 53 and propagation variables above override its values when set
// - `DNS01_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export AWS_ACCESS_KEY_ID=AKIA...
// export AWS_SECRET_ACCESS_KEY=...
// DNS01_ACTION=publish DNS01_DOMAIN=_acme-challenge.example.com DNS01_TOKEN=abc dns01
// ```

use anyhow::{Context, Result};
use dns01_core::{Dns01Config, Dns01Engine, ProviderConfig, ZoneProvider, ZoneProviderFactory};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dns01ExitCode {
    /// Change submitted (and propagated, unless waiting was skipped)
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error: provider failure, missing zone, cancellation
    RuntimeError = 2,
    /// The change did not reach INSYNC within the poll budget
    PropagationTimeout = 3,
}

impl From<Dns01ExitCode> for ExitCode {
    fn from(code: Dns01ExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// What to do with the validation record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Publish,
    Cleanup,
}

/// Application configuration
#[derive(Debug)]
struct Config {
    action: Action,
    domain: String,
    token: String,
    no_wait: bool,
    log_level: String,
    dns01: Dns01Config,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup
    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let action = match var("DNS01_ACTION").as_deref() {
            Some("publish") => Action::Publish,
            Some("cleanup") => Action::Cleanup,
            Some(other) => anyhow::bail!(
                "DNS01_ACTION '{}' is not valid. Valid actions: publish, cleanup",
                other
            ),
            None => anyhow::bail!("DNS01_ACTION is required (publish or cleanup)"),
        };

        let domain = var("DNS01_DOMAIN").context("DNS01_DOMAIN is required")?;
        let token = var("DNS01_TOKEN").context("DNS01_TOKEN is required")?;

        let mut dns01 = match var("DNS01_CONFIG_FILE") {
            Some(path) => {
                let json = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read DNS01_CONFIG_FILE {}", path))?;
                let mut file = Dns01Config::from_json(&json)
                    .with_context(|| format!("Failed to parse DNS01_CONFIG_FILE {}", path))?;
                overlay_provider_env(&mut file.provider, &var);
                file
            }
            None => Dns01Config::new(provider_from_lookup(&var)?),
        };

        if let Some(secs) = var("DNS01_POLL_INTERVAL_SECS") {
            dns01.propagation.poll_interval_secs = secs
                .parse()
                .with_context(|| format!("DNS01_POLL_INTERVAL_SECS is not a number: {}", secs))?;
        }
        if let Some(attempts) = var("DNS01_MAX_POLL_ATTEMPTS") {
            dns01.propagation.max_attempts = attempts.parse().with_context(|| {
                format!("DNS01_MAX_POLL_ATTEMPTS is not a number: {}", attempts)
            })?;
        }

        Ok(Self {
            action,
            domain,
            token,
            no_wait: var("DNS01_NO_WAIT")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            log_level: var("DNS01_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            dns01,
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.domain.trim_end_matches('.').is_empty() {
            anyhow::bail!("DNS01_DOMAIN cannot be empty");
        }

        if self.token.is_empty() {
            anyhow::bail!("DNS01_TOKEN cannot be empty");
        }

        if self.dns01.propagation.poll_interval_secs == 0 {
            warn_early("DNS01_POLL_INTERVAL_SECS is 0; status reads will not be spaced out");
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "DNS01_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        self.dns01.validate()?;
        Ok(())
    }
}

/// Provider section built from environment variables only
fn provider_from_lookup(var: &impl Fn(&str) -> Option<String>) -> Result<ProviderConfig> {
    let provider_type = var("DNS01_PROVIDER_TYPE").unwrap_or_else(|| "route53".to_string());

    match provider_type.as_str() {
        "route53" => Ok(ProviderConfig::Route53 {
            access_key_id: var("AWS_ACCESS_KEY_ID").context(
                "AWS_ACCESS_KEY_ID is required. Set it via: export AWS_ACCESS_KEY_ID=...",
            )?,
            secret_access_key: var("AWS_SECRET_ACCESS_KEY").context(
                "AWS_SECRET_ACCESS_KEY is required. Set it via: export AWS_SECRET_ACCESS_KEY=...",
            )?,
            session_token: var("AWS_SESSION_TOKEN").filter(|t| !t.is_empty()),
            endpoint: var("DNS01_ROUTE53_ENDPOINT").filter(|e| !e.is_empty()),
        }),
        // with no zones every lookup would end in ZoneNotFound
        "memory" => anyhow::bail!(
            "DNS01_PROVIDER_TYPE 'memory' needs DNS01_CONFIG_FILE to list its zones"
        ),
        other => anyhow::bail!(
            "DNS01_PROVIDER_TYPE '{}' is not supported. Supported providers: route53, memory",
            other
        ),
    }
}

/// Apply Route 53 variables on top of a provider read from a config file
fn overlay_provider_env(provider: &mut ProviderConfig, var: &impl Fn(&str) -> Option<String>) {
    let set = |key: &str| var(key).filter(|v| !v.is_empty());

    if let ProviderConfig::Route53 {
        access_key_id,
        secret_access_key,
        session_token,
        endpoint,
    } = provider
    {
        if let Some(v) = set("AWS_ACCESS_KEY_ID") {
            *access_key_id = v;
        }
        if let Some(v) = set("AWS_SECRET_ACCESS_KEY") {
            *secret_access_key = v;
        }
        if let Some(v) = set("AWS_SESSION_TOKEN") {
            *session_token = Some(v);
        }
        if let Some(v) = set("DNS01_ROUTE53_ENDPOINT") {
            *endpoint = Some(v);
        }
    }
}

/// Print a warning before the subscriber is installed
fn warn_early(message: &str) {
    eprintln!("WARNING: {}", message);
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return Dns01ExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return Dns01ExitCode::ConfigError.into();
    }

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&config.log_level))
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return Dns01ExitCode::ConfigError.into();
    }

    info!(
        "Starting dns01 {:?} for {} (provider: {})",
        config.action,
        config.domain,
        config.dns01.provider.type_name()
    );

    let provider = match build_provider(&config.dns01.provider) {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to create provider: {:#}", e);
            return Dns01ExitCode::ConfigError.into();
        }
    };

    // One change and one wait: a current-thread runtime is enough
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return Dns01ExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match run(config, provider).await {
            Ok(change_id) => {
                info!("Done (change {})", change_id);
                Dns01ExitCode::Success
            }
            Err(e) => {
                error!("{:#}", e);
                exit_code_for(&e)
            }
        }
    });

    code.into()
}

/// Build the configured provider
fn build_provider(config: &ProviderConfig) -> Result<Arc<dyn ZoneProvider>> {
    let provider: Box<dyn ZoneProvider> = match config {
        #[cfg(feature = "route53")]
        ProviderConfig::Route53 { .. } => {
            dns01_provider_route53::Route53Factory.create(config)?
        }
        #[cfg(not(feature = "route53"))]
        ProviderConfig::Route53 { .. } => {
            anyhow::bail!("Route 53 support was not compiled in (feature \"route53\")")
        }
        ProviderConfig::Memory { .. } => {
            warn!("Memory provider selected - no real DNS records will be changed");
            dns01_core::provider::MemoryFactory.create(config)?
        }
    };

    Ok(Arc::from(provider))
}

/// Submit the change, then wait for it unless told not to
async fn run(config: Config, provider: Arc<dyn ZoneProvider>) -> Result<String> {
    let engine = Dns01Engine::new(provider, &config.dns01)?;

    let change_id = match config.action {
        Action::Publish => {
            engine
                .upsert_challenge_record(&config.domain, &config.token)
                .await?
        }
        Action::Cleanup => {
            engine
                .delete_challenge_record(&config.domain, &config.token)
                .await?
        }
    };

    info!("Change {} submitted", change_id);

    if config.no_wait {
        info!("DNS01_NO_WAIT set, not waiting for propagation");
        return Ok(change_id);
    }

    // Ctrl-C cancels the wait
    let (cancel_tx, cancel_rx) = oneshot::channel();
    let signal_task = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Received SIGINT, cancelling wait");
                let _ = cancel_tx.send(());
            }
            Err(e) => {
                // dropping cancel_tx would cancel the wait
                warn!("Failed to listen for CTRL-C: {}", e);
                std::future::pending::<()>().await;
                drop(cancel_tx);
            }
        }
    });

    let result = engine
        .await_propagation_with_cancel(&change_id, cancel_rx)
        .await;
    signal_task.abort();

    result?;
    Ok(change_id)
}

/// Map a failure to the process exit code
fn exit_code_for(err: &anyhow::Error) -> Dns01ExitCode {
    match err.downcast_ref::<dns01_core::Error>() {
        Some(dns01_core::Error::PropagationTimeout { .. }) => Dns01ExitCode::PropagationTimeout,
        Some(dns01_core::Error::Config(_)) => Dns01ExitCode::ConfigError,
        _ => Dns01ExitCode::RuntimeError,
    }
}
