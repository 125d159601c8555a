//! Item Link Tests
//!
//! previous/next/latest resolution and the Link header.

use crate::common::*;

#[test]
fn inserted_item_document() {
    let t = TestHub::new();
    t.channel("docs");
    let doc = t
        .hub
        .append_item("docs", b"hello".to_vec(), Some("text/plain"))
        .unwrap();

    assert_eq!(doc.links.channel.href, "http://hub.test/channel/docs");
    assert_eq!(
        doc.location(),
        "http://hub.test/channel/docs/2013/06/25/18/03/54/123/000000"
    );
    assert_eq!(doc.timestamp, "2013-06-25T18:03:54.123Z");
}

#[test]
fn first_item_has_no_previous() {
    let t = TestHub::new();
    t.channel("first");
    let uri = t.append("first", "only");

    let item = t.hub.get_item_by_path("first", item_path(&uri, "first")).unwrap();
    assert!(item.links.previous.is_none());
    assert!(item.links.next.is_none());
    assert!(item.link_header().is_none());
    assert_eq!(item.links.latest, uri);
    assert_eq!(item.content_type(), "text/plain");
    assert_eq!(item.payload(), b"only");
}

#[test]
fn second_item_points_back_at_first() {
    let t = TestHub::new();
    t.channel("pair");
    let first = t.append("pair", "1");
    let second = t.append("pair", "2");

    let item = t.hub.get_item_by_path("pair", item_path(&second, "pair")).unwrap();
    assert_eq!(item.links.previous.as_deref(), Some(first.as_str()));
    assert_eq!(
        item.link_header().unwrap(),
        format!("<{}>;rel=\"previous\"", first)
    );
}

#[test]
fn next_appears_after_later_append() {
    let t = TestHub::new();
    t.channel("grow");
    let first = t.append("grow", "1");
    let path = item_path(&first, "grow").to_string();
    assert!(t.hub.get_item_by_path("grow", &path).unwrap().links.next.is_none());

    t.advance(3);
    let second = t.append("grow", "2");
    let item = t.hub.get_item_by_path("grow", &path).unwrap();
    assert_eq!(item.links.next.as_deref(), Some(second.as_str()));
    assert_eq!(item.links.latest, second);
}

#[test]
fn middle_item_has_both_links() {
    let t = TestHub::new();
    t.channel("mid");
    let a = t.append("mid", "a");
    let b = t.append("mid", "b");
    let c = t.append("mid", "c");

    let item = t.hub.get_item_by_path("mid", item_path(&b, "mid")).unwrap();
    assert_eq!(
        item.link_header().unwrap(),
        format!("<{}>;rel=\"previous\", <{}>;rel=\"next\"", a, c)
    );
}

#[test]
fn neighbours_stay_inside_channel() {
    let t = TestHub::new();
    t.channel("left");
    t.channel("left0");
    t.append("left", "l");
    let other = t.append("left0", "r");

    let item = t.hub.get_item_by_path("left0", item_path(&other, "left0")).unwrap();
    assert!(item.links.previous.is_none());
    let latest = t.hub.get_latest("left").unwrap();
    assert!(latest.links.next.is_none());
}

#[test]
fn missing_item_is_not_found() {
    let t = TestHub::new();
    t.channel("gaps");
    t.append("gaps", "x");

    let absent = SequenceKey::new(Timestamp::from_millis(START_MILLIS), 99);
    assert!(t.hub.get_item("gaps", &absent).unwrap_err().is_not_found());
    assert!(t.hub.get_item("nochannel", &absent).unwrap_err().is_not_found());
}

#[test]
fn empty_payload_rejected() {
    let t = TestHub::new();
    t.channel("empty");
    let err = t.hub.append_item("empty", Vec::new(), None).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert!(t.hub.get_latest("empty").unwrap_err().is_not_found());
}

#[test]
fn missing_content_type_defaults() {
    let t = TestHub::new();
    t.channel("octets");
    t.hub.append_item("octets", vec![1, 2, 3], None).unwrap();
    assert_eq!(
        t.hub.get_latest("octets").unwrap().content_type(),
        "application/octet-stream"
    );
}
