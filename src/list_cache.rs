//! Append-only list cache: `key -> [record, record, ...]`, records
//! separated by a single reserved byte, with per-entry expiry.
//!
//! ## Design Principles
//!
//! 1. **Prepend, not append** — `Push` places new data *before* the
//!    existing payload, so the most recently pushed record is always first.
//! 2. **Separator-delimited scan, not NUL-terminated strings** — `Rem`
//!    and `Trim` work over `val_len`-bounded byte slices and a linear scan
//!    for the record separator, rather than depending on a NUL terminator;
//!    the logical length is always known exactly, so there is nothing to
//!    search for past it.
//! 3. **First match wins** — `Rem` removes the first record equal to the
//!    given data, whether or not it happens to be the first record.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::clock::now_unix;
use crate::config::{CacheConfig, CacheError};
use crate::digest::{digest_key, shard_index, DigestHashBuilder};
use crate::entry::{Entry, RECORD_SEPARATOR};
use crate::shard::Shard;
use crate::slab::Slab;
use crate::sweep::{build_report, sweep_shard, CleanReport};

/// A sharded, TTL-keyed cache of append-only, separator-delimited record
/// lists.
pub struct ListCache {
    shards: Vec<Shard>,
    slab: Slab<Entry>,
    clean_cursor: AtomicUsize,
}

impl ListCache {
    pub fn new(shard_count: usize) -> Result<Self, CacheError> {
        Self::with_config(shard_count, CacheConfig::default())
    }

    pub fn with_config(shard_count: usize, config: CacheConfig) -> Result<Self, CacheError> {
        if shard_count == 0 {
            return Err(CacheError::InvalidShardCount);
        }

        tracing::debug!(
            shard_count,
            chunk_bytes = config.chunk_bytes,
            "creating list cache"
        );

        let hasher = DigestHashBuilder::new(config.hash_seed);
        let shards = (0..shard_count).map(|_| Shard::new(hasher.clone())).collect();

        Ok(Self {
            shards,
            slab: Slab::new(config.chunk_bytes),
            clean_cursor: AtomicUsize::new(0),
        })
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn locate(&self, key: &[u8]) -> ([u8; 16], &Shard) {
        let digest = digest_key(key);
        let idx = shard_index(key, self.shards.len());
        (digest, &self.shards[idx])
    }

    /// Prepends `data` as a new record ahead of any existing records, and
    /// sets `expire_unix_time` on the entry.
    ///
    /// The payload is only mutated when the entry already exists, data is
    /// non-empty, and `expire_unix_time > 0`; in every other case the call
    /// still updates the expiry (including setting it to a non-positive
    /// value, which marks the entry for collection on the next sweep).
    pub fn push(&self, key: &[u8], data: &[u8], expire_unix_time: i64) {
        let (digest, shard) = self.locate(key);
        let mut map = shard.map.write();

        if let Some(&ptr) = map.get(&digest) {
            let entry = unsafe { &mut *ptr.as_ptr() };
            if expire_unix_time > 0 && !data.is_empty() {
                let mut new_buf = Vec::with_capacity(data.len() + entry.val_len);
                new_buf.extend_from_slice(data);
                new_buf.extend_from_slice(entry.live_bytes());
                entry.val_len = new_buf.len();
                entry.val = Some(new_buf.into_boxed_slice());
            }
            entry.expire_time = expire_unix_time;
            return;
        }

        if expire_unix_time > 0 {
            let ptr = self.slab.alloc();
            let val = if data.is_empty() {
                None
            } else {
                Some(data.to_vec().into_boxed_slice())
            };
            unsafe {
                ptr.as_ptr().write(Entry {
                    key: digest,
                    val,
                    val_len: data.len(),
                    expire_time: expire_unix_time,
                });
            }
            map.insert(digest, ptr);
        }
    }

    /// Removes the first record equal to `data`, if any. A no-op for an
    /// empty `data`, a missing key, or an empty list.
    pub fn rem(&self, key: &[u8], data: &[u8]) {
        if data.is_empty() {
            return;
        }
        let (digest, shard) = self.locate(key);
        let mut map = shard.map.write();
        let Some(&ptr) = map.get(&digest) else {
            return;
        };
        let entry = unsafe { &mut *ptr.as_ptr() };
        if entry.val_len == 0 {
            return;
        }

        let match_start = {
            let live = entry.live_bytes();
            find_record(live, data)
        };

        if let Some(start) = match_start {
            let remove_len = data.len() + 1;
            let val_len = entry.val_len;
            let buf = entry.val.as_mut().unwrap();
            buf.copy_within(start + remove_len..val_len, start);
            entry.val_len = val_len - remove_len;
        }
    }

    /// Keeps only the first `count` records, dropping the rest. `count ==
    /// 0` empties the list outright (without freeing its buffer capacity).
    /// A negative `count` or a count at or beyond the current record count
    /// is a no-op.
    pub fn trim(&self, key: &[u8], count: i64) {
        if count < 0 {
            return;
        }
        let (digest, shard) = self.locate(key);
        let mut map = shard.map.write();
        let Some(&ptr) = map.get(&digest) else {
            return;
        };
        let entry = unsafe { &mut *ptr.as_ptr() };
        if entry.val_len == 0 {
            return;
        }

        if count == 0 {
            entry.val_len = 0;
            return;
        }

        let target = count as usize;
        let live = entry.live_bytes();
        let mut seen = 0usize;
        for (i, &b) in live.iter().enumerate() {
            if b == RECORD_SEPARATOR {
                seen += 1;
                if seen == target {
                    entry.val_len = i + 1;
                    return;
                }
            }
        }
        // Fewer than `count` separators present: every record is already
        // within the requested count, so the list is left untouched.
    }

    /// Returns an owned copy of the full, separator-delimited record list
    /// for `key`, if present and not expired.
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        let (digest, shard) = self.locate(key);
        let map = shard.map.read();
        let ptr = *map.get(&digest)?;
        let entry = unsafe { &*ptr.as_ptr() };
        if !entry.is_live(now_unix()) {
            return None;
        }
        Some(entry.live_bytes().to_vec())
    }

    /// Sweeps one shard per call, round-robin across shards. See
    /// `ValueCache::clean` for the accounting-line contract.
    pub fn clean(&self, with_message: bool) -> CleanReport {
        let index = self.clean_cursor.fetch_add(1, Ordering::Relaxed) % self.shards.len();
        let outcome = sweep_shard(&self.shards[index], &self.slab, now_unix());
        let slab_stats = self.slab.stats();
        build_report(
            index,
            outcome,
            self.shards.len(),
            slab_stats.chunk_count,
            slab_stats.chunk_bytes,
            with_message,
        )
    }
}

impl Drop for ListCache {
    fn drop(&mut self) {
        for shard in &self.shards {
            let map = shard.map.read();
            for (_, &ptr) in map.iter() {
                unsafe {
                    let _ = ptr.as_ptr().read();
                }
            }
        }
    }
}

/// Finds the start offset of the first record equal to `data` inside
/// `live`, where records are `RECORD_SEPARATOR`-delimited and the very
/// first record has no leading separator.
fn find_record(live: &[u8], data: &[u8]) -> Option<usize> {
    if live.len() >= data.len() + 1
        && &live[..data.len()] == data
        && live[data.len()] == RECORD_SEPARATOR
    {
        return Some(0);
    }

    let mut wrapped = Vec::with_capacity(data.len() + 2);
    wrapped.push(RECORD_SEPARATOR);
    wrapped.extend_from_slice(data);
    wrapped.push(RECORD_SEPARATOR);

    live.windows(wrapped.len())
        .position(|w| w == wrapped.as_slice())
        .map(|p| p + 1)
}
