//! Contract Test: Zone Resolution
//!
//! Constraints verified:
//! - The most specific public ancestor zone is selected
//! - Private zones are never selected
//! - Matching is by label, not by character suffix
//! - Every page of the zone listing is consulted
//! - Listings are fetched fresh on every call
//! - A missing zone is a ZoneNotFound error, with no fallback
//! - A listing whose markers repeat or cycle ends with ZoneListing

mod common;

use common::*;
use dns01_core::Error;
use dns01_core::ZoneResolver;
use dns01_core::traits::HostedZone;
use std::sync::Arc;

#[tokio::test]
async fn longest_public_match_is_selected() {
    let provider = Arc::new(ScriptedProvider::new(nested_zones()));
    let resolver = ZoneResolver::new(provider);

    let zone_id = resolver.resolve("bar.foo.example.com").await.unwrap();
    assert_eq!(zone_id, "z3");
}

#[tokio::test]
async fn private_zone_is_skipped() {
    let zones = vec![
        HostedZone::public("z1", "com."),
        HostedZone::public("z2", "example.com."),
        HostedZone::private("z3", "foo.example.com."),
    ];
    let resolver = ZoneResolver::new(Arc::new(ScriptedProvider::new(zones)));

    let zone_id = resolver.resolve("bar.foo.example.com").await.unwrap();
    assert_eq!(zone_id, "z2");
}

#[tokio::test]
async fn trailing_dot_does_not_change_the_result() {
    let resolver = ZoneResolver::new(Arc::new(ScriptedProvider::new(nested_zones())));

    let with_dot = resolver.resolve("example.com.").await.unwrap();
    let without_dot = resolver.resolve("example.com").await.unwrap();
    assert_eq!(with_dot, without_dot);
}

#[tokio::test]
async fn character_suffix_zone_is_not_a_match() {
    let zones = vec![HostedZone::public("z1", "ple.com.")];
    let resolver = ZoneResolver::new(Arc::new(ScriptedProvider::new(zones)));

    let result = resolver.resolve("example.com").await;
    assert!(matches!(result, Err(Error::ZoneNotFound { .. })));
}

#[tokio::test]
async fn unrelated_zones_give_zone_not_found() {
    let zones = vec![HostedZone::public("z1", "other.org.")];
    let resolver = ZoneResolver::new(Arc::new(ScriptedProvider::new(zones)));

    match resolver.resolve("example.com").await {
        Err(Error::ZoneNotFound { domain }) => assert_eq!(domain, "example.com"),
        other => panic!("expected ZoneNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn best_zone_on_last_page_is_found() {
    let mut zones: Vec<HostedZone> = (0..7)
        .map(|i| HostedZone::public(format!("filler{}", i), format!("zone{}.org.", i)))
        .collect();
    zones.insert(0, HostedZone::public("z-short", "example.com."));
    zones.push(HostedZone::public("z-long", "api.example.com."));

    let provider = Arc::new(ScriptedProvider::new(zones).with_page_size(3));
    let resolver = ZoneResolver::new(provider.clone());

    let zone_id = resolver
        .resolve("_acme-challenge.api.example.com")
        .await
        .unwrap();
    assert_eq!(zone_id, "z-long");
    assert_eq!(provider.list_calls(), 3, "9 zones at 3 per page is 3 pages");
}

#[tokio::test]
async fn listing_is_not_cached_between_calls() {
    let provider = Arc::new(ScriptedProvider::new(nested_zones()));
    let resolver = ZoneResolver::new(provider.clone());

    resolver.resolve("example.com").await.unwrap();
    resolver.resolve("example.com").await.unwrap();

    assert_eq!(provider.list_calls(), 2);
}

#[tokio::test]
async fn listing_failure_is_wrapped() {
    let provider = Arc::new(ScriptedProvider::new(nested_zones()).with_list_error("timeout"));
    let resolver = ZoneResolver::new(provider);

    let result = resolver.resolve("example.com").await;
    assert!(matches!(result, Err(Error::ZoneListing { .. })));
}

#[tokio::test]
async fn repeated_marker_stops_the_listing() {
    let resolver = ZoneResolver::new(Arc::new(LoopingProvider));

    let result = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        resolver.resolve("example.com"),
    )
    .await
    .expect("resolution should not loop forever");

    assert!(matches!(result, Err(Error::ZoneListing { .. })));
}

#[tokio::test]
async fn cycling_markers_stop_the_listing() {
    let provider = Arc::new(CyclingProvider::new());
    let resolver = ZoneResolver::new(provider.clone());

    let result = resolver.resolve("example.com").await;

    assert!(matches!(result, Err(Error::ZoneListing { .. })));
    // first page, "A", "B", then "A" comes back
    assert_eq!(provider.list_calls(), 3);
}

#[tokio::test]
async fn empty_domain_is_rejected_without_listing() {
    let provider = Arc::new(ScriptedProvider::new(nested_zones()));
    let resolver = ZoneResolver::new(provider.clone());

    let result = resolver.resolve(".").await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));
    assert_eq!(provider.list_calls(), 0);
}
