//! Retention Tests
//!
//! TTL eviction through the hub and its effect on live links.

use crate::common::*;
use std::thread;
use std::time::{Duration, Instant};

use channelhub::SweepState;

fn short_lived(t: &TestHub, name: &str, ttl_millis: u64) {
    t.hub
        .create_channel(&ChannelOptions::new(name).with_ttl_millis(ttl_millis))
        .unwrap();
}

#[test]
fn expired_item_disappears_and_previous_link_follows() {
    let t = TestHub::new();
    short_lived(&t, "ttl", 1_000);
    let old = t.append("ttl", "old");
    t.advance(600);
    let young = t.append("ttl", "young");

    let before = t.hub.get_item_by_path("ttl", item_path(&young, "ttl")).unwrap();
    assert_eq!(before.links.previous.as_deref(), Some(old.as_str()));

    t.advance(500);
    let report = t.hub.sweep_expired().unwrap();
    assert_eq!(report.items_evicted, 1);

    assert!(t
        .hub
        .get_item_by_path("ttl", item_path(&old, "ttl"))
        .unwrap_err()
        .is_not_found());
    let after = t.hub.get_item_by_path("ttl", item_path(&young, "ttl")).unwrap();
    assert!(after.links.previous.is_none());
    assert!(after.link_header().is_none());
    assert_eq!(t.hub.get_earliest("ttl").unwrap().links.self_uri, young);
}

#[test]
fn default_ttl_keeps_recent_items() {
    let t = TestHub::new();
    t.channel("long");
    t.append("long", "x");
    t.advance(119 * 86_400_000);

    assert_eq!(t.hub.sweep_expired().unwrap().items_evicted, 0);
    assert!(t.hub.get_latest("long").is_ok());
}

#[test]
fn channels_have_independent_ttls() {
    let t = TestHub::new();
    short_lived(&t, "fast", 10);
    short_lived(&t, "slow", 10_000);
    t.append("fast", "f");
    t.append("slow", "s");
    t.advance(100);

    let report = t.hub.sweep_expired().unwrap();
    assert_eq!(report.channels_scanned, 2);
    assert_eq!(report.items_evicted, 1);
    assert!(t.hub.get_latest("fast").unwrap_err().is_not_found());
    assert!(t.hub.get_channel("fast").is_ok());
    assert!(t.hub.get_latest("slow").is_ok());
}

#[test]
fn failed_eviction_retried_next_cycle() {
    let t = TestHub::new();
    short_lived(&t, "flaky", 10);
    short_lived(&t, "steady", 10);
    t.append("flaky", "f");
    t.append("steady", "s");
    t.advance(100);

    t.store.fail_deletes_for("flaky");
    let report = t.hub.sweep_expired().unwrap();
    assert_eq!(report.failures, 1);
    assert!(t.hub.get_latest("flaky").is_ok());
    assert!(t.hub.get_latest("steady").unwrap_err().is_not_found());

    t.store.clear();
    let report = t.hub.sweep_expired().unwrap();
    assert_eq!(report.failures, 0);
    assert_eq!(report.items_evicted, 1);
    assert!(t.hub.get_latest("flaky").unwrap_err().is_not_found());
}

#[test]
fn ttl_update_applies_to_existing_items() {
    let t = TestHub::new();
    t.channel("shrink");
    t.append("shrink", "x");
    t.advance(5_000);

    let update = ChannelUpdate {
        ttl_millis: Some(1_000),
        ..ChannelUpdate::default()
    };
    t.hub.update_channel("shrink", &update).unwrap();
    assert_eq!(t.hub.sweep_expired().unwrap().items_evicted, 1);
}

#[test]
fn background_sweeper_evicts_and_shuts_down() {
    let mut config = test_config();
    config.retention.interval_ms = 20;
    let t = TestHub::with_config(config);
    short_lived(&t, "bg", 10);
    t.append("bg", "x");
    t.advance(100);

    let handle = t.hub.start_retention().unwrap();
    let deadline = Instant::now() + Duration::from_secs(5);
    while t.hub.get_latest("bg").is_ok() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    assert!(t.hub.get_latest("bg").unwrap_err().is_not_found());

    t.hub.retention().shutdown();
    handle.join().unwrap();
    assert_eq!(t.hub.retention().state(), SweepState::Idle);
}
