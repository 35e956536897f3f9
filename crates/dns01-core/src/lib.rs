// # dns01-core
//
// Core library for DNS-01 challenge fulfillment.
//
// Given a validation domain and a validation token, the core finds the one
// public hosted zone that should hold the TXT record, creates or removes that
// record, and waits until the change has reached every authoritative name
// server.
//
// ## Architecture Overview
//
// - **ZoneProvider**: Trait for the DNS provider API (list zones, change
//   records, read change status)
// - **ZoneResolver**: Picks the most specific public zone for a domain
// - **ChangeOrchestrator**: Submits one UPSERT or DELETE for one TXT record
// - **PropagationWatcher**: Polls a change until INSYNC or the budget runs out
// - **Dns01Engine**: Facade exposing the three caller-facing operations
//
// ## Design Principles
//
// 1. **Injected Provider**: No global client; tests substitute an in-memory one
// 2. **Pure Matching**: Zone selection is a pure function over label sequences
// 3. **No Hidden Retries**: Every failure reaches the caller, who owns retry policy
// 4. **Bounded Waiting**: Polling has an explicit, cancellable budget

pub mod traits;
pub mod resolver;
pub mod orchestrator;
pub mod watcher;
pub mod engine;
pub mod provider;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{ZoneProvider, ZoneProviderFactory};
pub use resolver::ZoneResolver;
pub use orchestrator::ChangeOrchestrator;
pub use watcher::{PropagationPolicy, PropagationState, PropagationWatcher};
pub use engine::Dns01Engine;
pub use provider::MemoryZoneProvider;
pub use config::{Dns01Config, PropagationConfig, ProviderConfig};
pub use error::{Error, Result};
