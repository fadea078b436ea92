//! The round-robin sweep cursor and its reported accounting fields.

use std::time::{SystemTime, UNIX_EPOCH};

use libccache::ValueCache;

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

#[test]
fn sweep_visits_every_shard_exactly_once_per_cycle() {
    let shard_count = 6;
    let cache = ValueCache::new(shard_count).unwrap();

    let mut visited: Vec<usize> = (0..shard_count)
        .map(|_| cache.clean(false).shard_index)
        .collect();
    visited.sort_unstable();

    let expected: Vec<usize> = (0..shard_count).collect();
    assert_eq!(visited, expected);
}

#[test]
fn sweep_reports_zero_deletions_on_a_quiescent_cache() {
    let cache = ValueCache::new(4).unwrap();
    cache.set(b"alpha", b"v", now() + 60);

    for _ in 0..4 {
        let report = cache.clean(false);
        assert_eq!(report.deleted, 0);
    }
}

#[test]
fn clean_message_contains_the_expected_fields_when_requested() {
    let cache = ValueCache::new(2).unwrap();
    cache.set(b"alpha", b"v", now() - 1);

    let mut saw_delete_one = false;
    for _ in 0..2 {
        let report = cache.clean(true);
        let msg = report.message.unwrap();
        assert!(msg.starts_with("processcache: alloc:"));
        assert!(msg.contains("storage:"));
        assert!(msg.contains("count:"));
        assert!(msg.contains("bucket:"));
        assert!(msg.contains("memory:"));
        assert!(msg.contains("delete:"));
        if report.deleted == 1 {
            saw_delete_one = true;
        }
    }
    assert!(saw_delete_one);
}

#[test]
fn clean_without_message_skips_formatting() {
    let cache = ValueCache::new(2).unwrap();
    let report = cache.clean(false);
    assert!(report.message.is_none());
}
