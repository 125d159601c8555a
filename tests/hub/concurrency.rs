//! Concurrency Tests
//!
//! Name reservation races, per-channel append ordering, delete/append races.

use crate::common::*;
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn parallel_create_has_exactly_one_winner() {
    let t = Arc::new(TestHub::new());
    let name = random_channel_name();
    let threads = 16;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let t = Arc::clone(&t);
            let barrier = Arc::clone(&barrier);
            let name = name.clone();
            thread::spawn(move || {
                barrier.wait();
                t.hub.create_channel(&ChannelOptions::new(name.as_str()))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, Error::Conflict(_))));
    assert_eq!(t.hub.list_channels().unwrap().len(), 1);
}

#[test]
fn parallel_appends_form_one_chain() {
    let t = Arc::new(TestHub::new());
    t.channel("chain");
    let threads = 8;
    let per_thread = 25;

    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let t = Arc::clone(&t);
            thread::spawn(move || {
                for j in 0..per_thread {
                    t.append("chain", &format!("{}-{}", i, j));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    // Walk from the newest item back to the first via previous links.
    let mut seen = 0;
    let mut current = Some(t.hub.get_latest("chain").unwrap().links.self_uri);
    while let Some(uri) = current {
        let item = t.hub.get_item_by_path("chain", item_path(&uri, "chain")).unwrap();
        seen += 1;
        current = item.links.previous;
    }
    assert_eq!(seen, threads * per_thread);
}

#[test]
fn appends_to_different_channels_are_independent() {
    let t = Arc::new(TestHub::new());
    let names: Vec<String> = (0..6).map(|i| format!("lane{}", i)).collect();
    for name in &names {
        t.channel(name);
    }

    let handles: Vec<_> = names
        .iter()
        .cloned()
        .map(|name| {
            let t = Arc::clone(&t);
            thread::spawn(move || {
                for j in 0..40 {
                    t.append(&name, &j.to_string());
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    for name in &names {
        let first = t.hub.get_earliest(name).unwrap();
        assert!(first.links.previous.is_none());
        assert_eq!(first.payload(), b"0");
        assert_eq!(t.hub.get_latest(name).unwrap().payload(), b"39");
    }
}

#[test]
fn delete_racing_appends_leaves_no_orphans() {
    let t = Arc::new(TestHub::new());
    t.channel("doomed");
    let barrier = Arc::new(Barrier::new(5));

    let appenders: Vec<_> = (0..4)
        .map(|_| {
            let t = Arc::clone(&t);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..50 {
                    match t.hub.append_item("doomed", b"x".to_vec(), None) {
                        Ok(_) => {}
                        Err(e) => assert!(e.is_not_found(), "unexpected {}", e),
                    }
                }
            })
        })
        .collect();

    barrier.wait();
    t.hub.delete_channel("doomed").unwrap();
    for h in appenders {
        h.join().unwrap();
    }

    assert!(t.hub.get_channel("doomed").unwrap_err().is_not_found());
    assert!(t.hub.sequencer().latest("doomed").unwrap().is_none());
}
