//! Item Page Tests
//!
//! Count pages (earliest/latest/next/previous) and time-bucket pages.

use crate::common::*;

fn key_of(channel: &str, uri: &str) -> SequenceKey {
    SequenceKey::from_path(item_path(uri, channel)).unwrap()
}

#[test]
fn following_next_pages_visits_every_item_once() {
    let t = TestHub::new();
    t.channel("paged");
    let mut appended = Vec::new();
    for i in 0..7 {
        appended.push(t.append("paged", &format!("item {}", i)));
        t.advance(3);
    }

    let mut page = t.hub.get_earliest_n("paged", 3).unwrap();
    let mut seen = Vec::new();
    while !page.is_empty() {
        seen.extend(page.uris().iter().cloned());
        let last = page.items.last().unwrap().key;
        page = t.hub.get_next_n("paged", &last, 3).unwrap();
    }

    assert_eq!(seen, appended);
}

#[test]
fn latest_page_walks_backwards() {
    let t = TestHub::new();
    t.channel("backwards");
    let appended: Vec<String> = (0..5).map(|i| t.append("backwards", &i.to_string())).collect();

    let newest = t.hub.get_latest_n("backwards", 2).unwrap();
    assert_eq!(newest.uris(), &appended[3..]);

    let expected_previous = format!("{}/previous/2", appended[3]);
    assert_eq!(newest.previous_uri(), Some(expected_previous.as_str()));

    let older = t
        .hub
        .get_previous_n("backwards", &key_of("backwards", &appended[3]), 2)
        .unwrap();
    assert_eq!(older.uris(), &appended[1..3]);
}

#[test]
fn pages_skip_evicted_items() {
    let t = TestHub::new();
    t.hub
        .create_channel(&ChannelOptions::new("short").with_ttl_millis(1_000))
        .unwrap();
    for i in 0..3 {
        t.append("short", &format!("old {}", i));
    }
    t.advance(2_000);
    let fresh: Vec<String> = (0..2).map(|i| t.append("short", &format!("new {}", i))).collect();

    let report = t.hub.sweep_expired().unwrap();
    assert_eq!(report.items_evicted, 3);

    let page = t.hub.get_earliest_n("short", 10).unwrap();
    assert_eq!(page.uris(), &fresh[..]);
}

#[test]
fn time_buckets_select_by_insertion_time() {
    let t = TestHub::new();
    t.channel("timed");
    let first = t.append("timed", "18:03:54");
    t.advance(60_000);
    let second = t.append("timed", "18:04:54");
    t.advance(3_600_000);
    t.append("timed", "19:04:54");

    let hour = t.hub.query_time("timed", "2013/06/25/18").unwrap();
    assert_eq!(hour.uris(), &[first.clone(), second][..]);
    assert_eq!(hour.next_uri(), Some("http://hub.test/channel/timed/2013/06/25/19"));

    let minute = t.hub.query_time("timed", "2013/06/25/18/03").unwrap();
    assert_eq!(minute.uris(), &[first.clone()][..]);

    let second_bucket = t.hub.query_time("timed", "/2013/06/25/18/03/54/").unwrap();
    assert_eq!(second_bucket.uris(), &[first][..]);

    let empty = t.hub.query_time("timed", "2013/06/24").unwrap();
    assert!(empty.is_empty());
    assert_eq!(
        empty.previous_uri(),
        Some("http://hub.test/channel/timed/2013/06/23")
    );
}

#[test]
fn page_queries_reject_bad_input() {
    let t = TestHub::new();
    t.channel("strict");

    assert!(matches!(
        t.hub.get_earliest_n("strict", 0),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        t.hub.query_time("strict", "2013/06/25/18/03/54/123"),
        Err(Error::InvalidArgument(_))
    ));
    assert!(t.hub.get_latest_n("absent", 1).unwrap_err().is_not_found());
    assert!(t
        .hub
        .query_time("absent", "2013/06/25")
        .unwrap_err()
        .is_not_found());

    let clamped = t.hub.get_earliest_n("strict", usize::MAX).unwrap();
    assert!(clamped
        .links
        .self_link
        .href
        .ends_with(&format!("/earliest/{}", MAX_PAGE_COUNT)));
}

#[test]
fn create_delete_cycles_leave_no_lanes() {
    let t = TestHub::new();
    for cycle in 0..50 {
        let name = format!("cycle{}", cycle);
        t.channel(&name);
        t.append(&name, "x");
        assert_eq!(t.hub.delete_channel(&name).unwrap(), 1);
    }
    assert_eq!(t.hub.sequencer().lane_count(), 0);
    assert!(t.hub.list_channels().unwrap().is_empty());
}
