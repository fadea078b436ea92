//! Integration coverage for `ValueCache`, covering the round-trip, TTL,
//! sharding, and defensive-copy properties plus the worked value-cache
//! scenario (construct, set, get, wait past expiry, sweep repeatedly).

use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use libccache::ValueCache;

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

#[test]
fn round_trip_returns_byte_exact_copy() {
    let cache = ValueCache::new(4).unwrap();
    cache.set(b"user:1", b"hello", now() + 60);
    assert_eq!(cache.get(b"user:1"), Some(b"hello".to_vec()));
}

#[test]
fn ttl_honored_after_expiry() {
    let cache = ValueCache::new(4).unwrap();
    cache.set(b"user:1", b"hello", now() + 1);
    thread::sleep(Duration::from_millis(1100));
    assert_eq!(cache.get(b"user:1"), None);
}

#[test]
fn idempotent_overwrite_leaves_latest_value_and_expiry() {
    let cache = ValueCache::new(4).unwrap();
    cache.set(b"user:1", b"first", now() + 60);
    cache.set(b"user:1", b"second-value", now() + 120);
    assert_eq!(cache.get(b"user:1"), Some(b"second-value".to_vec()));
}

#[test]
fn sharding_is_deterministic_across_set_and_get() {
    let cache = ValueCache::new(8).unwrap();
    let keys: Vec<&[u8]> = vec![b"alpha", b"beta", b"gamma", b"delta", b"user:1", b"user:2"];
    for k in &keys {
        cache.set(k, b"v", now() + 60);
    }
    for k in &keys {
        assert_eq!(cache.get(k), Some(b"v".to_vec()));
    }
}

#[test]
fn defensive_copy_does_not_alias_internal_storage() {
    let cache = ValueCache::new(4).unwrap();
    cache.set(b"user:1", b"hello", now() + 60);
    let mut copy = cache.get(b"user:1").unwrap();
    for b in copy.iter_mut() {
        *b = 0;
    }
    assert_eq!(cache.get(b"user:1"), Some(b"hello".to_vec()));
}

/// Scenario A from spec: set with a short TTL, observe the live value,
/// wait past expiry, then sweep the cache repeatedly and check that the
/// shard owning the key reports exactly one deletion, with subsequent
/// cycles reporting zero.
#[test]
fn scenario_a_value_cache_lifecycle() {
    let shard_count = 4;
    let cache = ValueCache::new(shard_count).unwrap();

    cache.set(b"user:1", b"hello", now() + 1);
    assert_eq!(cache.get(b"user:1"), Some(b"hello".to_vec()));

    thread::sleep(Duration::from_millis(1100));
    assert_eq!(cache.get(b"user:1"), None);

    let mut total_deleted_first_cycle = 0;
    for _ in 0..shard_count {
        let report = cache.clean(true);
        assert!(report.message.is_some());
        total_deleted_first_cycle += report.deleted;
    }
    assert_eq!(total_deleted_first_cycle, 1);

    let mut total_deleted_second_cycle = 0;
    for _ in 0..shard_count {
        let report = cache.clean(false);
        assert!(report.message.is_none());
        total_deleted_second_cycle += report.deleted;
    }
    assert_eq!(total_deleted_second_cycle, 0);
}

#[test]
fn zero_shard_count_is_an_error() {
    assert!(ValueCache::new(0).is_err());
}
