//! Built-in zone provider implementations

pub mod memory;

pub use memory::{MemoryZoneProvider, StoredRecordSet};

use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::traits::{ZoneProvider, ZoneProviderFactory};

/// Factory for creating in-memory providers
pub struct MemoryFactory;

impl ZoneProviderFactory for MemoryFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn ZoneProvider>> {
        match config {
            ProviderConfig::Memory { zones } => Ok(Box::new(MemoryZoneProvider::new(zones.clone()))),
            _ => Err(Error::config("Invalid config for memory provider")),
        }
    }
}
