//! Channel Lifecycle Tests
//!
//! Update, delete and list after creation.

use crate::common::*;

#[test]
fn update_changes_metadata_only() {
    let t = TestHub::new();
    let created = t.hub.create_channel(&ChannelOptions::new("ops")).unwrap();
    t.advance(5_000);

    let update = ChannelUpdate {
        description: Some("operations feed".to_string()),
        channel_type: Some("application/json".to_string()),
        ttl_millis: Some(60_000),
        ..ChannelUpdate::default()
    };
    let updated = t.hub.update_channel("ops", &update).unwrap();

    assert_eq!(updated.name, created.name);
    assert_eq!(updated.creation_date, created.creation_date);
    assert_eq!(updated.description.as_deref(), Some("operations feed"));
    assert_eq!(updated.channel_type.as_deref(), Some("application/json"));
    assert_eq!(updated.ttl_millis, 60_000);
    assert_eq!(updated.ttl_days, None);
    assert_eq!(t.hub.get_channel("ops").unwrap(), updated);
}

#[test]
fn update_from_json_ignores_name() {
    let t = TestHub::new();
    t.channel("keep");
    let update: ChannelUpdate =
        serde_json::from_str(r#"{"name": "renamed", "ttlDays": 7}"#).unwrap();

    let updated = t.hub.update_channel("keep", &update).unwrap();
    assert_eq!(updated.name, "keep");
    assert_eq!(updated.ttl_days, Some(7));
    assert!(t.hub.get_channel("renamed").unwrap_err().is_not_found());
}

#[test]
fn update_rejects_zero_hints() {
    let t = TestHub::new();
    t.channel("hints");
    let update = ChannelUpdate {
        content_size_kb: Some(0),
        ..ChannelUpdate::default()
    };
    assert!(matches!(
        t.hub.update_channel("hints", &update),
        Err(Error::InvalidArgument(_))
    ));
    assert_eq!(t.hub.get_channel("hints").unwrap().content_size_kb, 1);
}

#[test]
fn update_missing_channel() {
    let t = TestHub::new();
    let err = t
        .hub
        .update_channel("ghost", &ChannelUpdate::default())
        .unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[test]
fn list_is_ordered_by_name() {
    let t = TestHub::new();
    for name in ["charlie", "alpha", "bravo"] {
        t.channel(name);
    }
    let names: Vec<String> = t
        .hub
        .list_channels()
        .unwrap()
        .into_iter()
        .map(|doc| doc.name)
        .collect();
    assert_eq!(names, vec!["alpha", "bravo", "charlie"]);
}

#[test]
fn delete_then_recreate_never_reuses_keys() {
    let t = TestHub::new();
    t.channel("cycle");
    let first = t.append("cycle", "one");

    assert_eq!(t.hub.delete_channel("cycle").unwrap(), 1);
    assert!(t.hub.get_latest("cycle").unwrap_err().is_not_found());
    assert!(t
        .hub
        .append_item("cycle", b"late".to_vec(), None)
        .unwrap_err()
        .is_not_found());

    t.channel("cycle");
    let second = t.append("cycle", "two");
    let first_key = SequenceKey::from_path(item_path(&first, "cycle")).unwrap();
    let second_key = SequenceKey::from_path(item_path(&second, "cycle")).unwrap();
    assert!(second_key > first_key);

    let latest = t.hub.get_latest("cycle").unwrap();
    assert!(latest.links.previous.is_none());
}

#[test]
fn earliest_and_latest() {
    let t = TestHub::new();
    t.channel("ends");
    assert!(t.hub.get_earliest("ends").unwrap_err().is_not_found());

    let first = t.append("ends", "a");
    t.advance(1);
    t.append("ends", "b");
    t.advance(1);
    let last = t.append("ends", "c");

    assert_eq!(t.hub.get_earliest("ends").unwrap().links.self_uri, first);
    assert_eq!(t.hub.get_latest("ends").unwrap().links.self_uri, last);
    assert_eq!(t.hub.get_latest("ends").unwrap().payload(), b"c");
}
