//! Core traits for the DNS-01 system
//!
//! - [`ZoneProvider`]: List zones, submit record changes, read change status

pub mod zone_provider;

pub use zone_provider::{
    ChangeAction, ChangeInfo, ChangeRequest, ChangeStatus, HostedZone, VALIDATION_RECORD_TTL,
    ValidationRecord, ZonePage, ZoneProvider, ZoneProviderFactory,
};
