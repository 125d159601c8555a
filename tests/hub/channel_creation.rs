//! Channel Creation Tests
//!
//! Name validation, defaults and the shape of the channel document.

use crate::common::*;

#[test]
fn create_returns_document_with_location() {
    let t = TestHub::new();
    let doc = t.hub.create_channel(&ChannelOptions::new("flights")).unwrap();

    assert_eq!(doc.name, "flights");
    assert_eq!(doc.location(), "http://hub.test/channel/flights");
    assert_eq!(doc.links.latest.href, "http://hub.test/channel/flights/latest");
    assert_eq!(doc.links.earliest.href, "http://hub.test/channel/flights/earliest");
    assert_eq!(doc.links.ws.href, "ws://hub.test/channel/flights/ws");
    assert_eq!(doc.creation_date, "2013-06-25T18:03:54.123Z");
}

#[test]
fn default_document_has_nine_fields_and_four_links() {
    let t = TestHub::new();
    let doc = t.hub.create_channel(&ChannelOptions::new("plain")).unwrap();
    let json = serde_json::to_value(&doc).unwrap();

    assert_eq!(json.as_object().unwrap().len(), 9);
    assert_eq!(json["_links"].as_object().unwrap().len(), 4);
    assert_eq!(json["ttlMillis"], 10_368_000_000u64);
    assert_eq!(json["ttlDays"], 120);
}

#[test]
fn ttl_days_null_reports_no_days() {
    let t = TestHub::new();
    let doc = t
        .hub
        .create_channel_from_json(br#"{"name": "nulldays", "ttlDays": null}"#)
        .unwrap();
    let json = serde_json::to_value(&doc).unwrap();

    assert!(json.get("ttlDays").is_none());
    assert_eq!(json["ttlMillis"], 10_368_000_000u64);
}

#[test]
fn ttl_days_and_millis_resolve() {
    let t = TestHub::new();
    let days = t
        .hub
        .create_channel(&ChannelOptions::new("days").with_ttl_days(2))
        .unwrap();
    assert_eq!(days.ttl_millis, 2 * 86_400_000);
    assert_eq!(days.ttl_days, Some(2));

    let millis = t
        .hub
        .create_channel(&ChannelOptions::new("millis").with_ttl_millis(30_000))
        .unwrap();
    assert_eq!(millis.ttl_millis, 30_000);
    assert_eq!(millis.ttl_days, None);
}

#[test]
fn zero_ttl_rejected() {
    let t = TestHub::new();
    let err = t
        .hub
        .create_channel(&ChannelOptions::new("zero").with_ttl_millis(0))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn storage_round_trips() {
    let t = TestHub::new();
    let created = t
        .hub
        .create_channel_from_json(br#"{"name": "stored", "storage": "BOTH"}"#)
        .unwrap();
    let fetched = t.hub.get_channel("stored").unwrap();

    assert_eq!(fetched.name, created.name);
    assert_eq!(
        serde_json::to_value(&fetched).unwrap()["storage"],
        serde_json::json!("BOTH")
    );
}

#[test]
fn underscores_allowed() {
    let t = TestHub::new();
    assert!(t.hub.create_channel(&ChannelOptions::new("under_score_")).is_ok());
}

#[test]
fn blank_names_rejected() {
    let t = TestHub::new();
    for name in ["", "   ", "\t"] {
        let err = t.hub.create_channel(&ChannelOptions::new(name)).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)), "{:?}", name);
        assert_eq!(err.status_code(), 400);
    }
}

#[test]
fn slash_and_space_rejected() {
    let t = TestHub::new();
    for name in ["a/b", "/lead", "with space"] {
        let err = t.hub.create_channel(&ChannelOptions::new(name)).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)), "{:?}", name);
    }
}

#[test]
fn extended_characters_rejected() {
    let t = TestHub::new();
    for code in 161u32..=447 {
        let c = char::from_u32(code).unwrap();
        let name = format!("ab{}cd", c);
        assert!(
            matches!(
                t.hub.create_channel(&ChannelOptions::new(name.as_str())),
                Err(Error::InvalidArgument(_))
            ),
            "code point {} accepted",
            code
        );
    }
    assert!(t.hub.list_channels().unwrap().is_empty());
}

#[test]
fn names_are_trimmed_and_case_sensitive() {
    let t = TestHub::new();
    let doc = t.hub.create_channel(&ChannelOptions::new("  padded  ")).unwrap();
    assert_eq!(doc.name, "padded");

    assert!(matches!(
        t.hub.create_channel(&ChannelOptions::new("padded")),
        Err(Error::Conflict(_))
    ));
    assert!(t.hub.create_channel(&ChannelOptions::new("PADDED")).is_ok());
    assert!(t.hub.get_channel("padded").is_ok());
    assert!(t.hub.get_channel("Padded").unwrap_err().is_not_found());
}

#[test]
fn duplicate_is_conflict() {
    let t = TestHub::new();
    let name = random_channel_name();
    t.channel(&name);

    let err = t.hub.create_channel(&ChannelOptions::new(name.as_str())).unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    assert_eq!(err.status_code(), 409);
}

#[test]
fn empty_body_rejected() {
    let t = TestHub::new();
    for body in [&b""[..], &b"  \n"[..]] {
        assert!(matches!(
            t.hub.create_channel_from_json(body),
            Err(Error::InvalidArgument(_))
        ));
    }
}
