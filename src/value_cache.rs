//! Opaque byte-value cache: `key -> bytes`, with per-entry expiry.
//!
//! ## Design Principles
//!
//! 1. **Sharded locks** — one `RwLock` per shard; `Get` takes a read lock,
//!    `Set`/`Clean` take a write lock, and no operation ever locks more than
//!    one shard at a time.
//! 2. **In-place reuse** — `Set` overwrites the existing payload buffer
//!    whenever the new data fits its capacity instead of reallocating.
//! 3. **Defensive copies** — `Get` always hands back an owned `Vec<u8>`;
//!    callers can never observe or mutate the cache's internal buffer.
//! 4. **Fatal OOM** — allocation failure inside the slab aborts the
//!    process; there is no recoverable error path for it.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::clock::now_unix;
use crate::config::{CacheConfig, CacheError};
use crate::digest::{digest_key, shard_index, DigestHashBuilder};
use crate::entry::{overwrite_value, Entry};
use crate::shard::Shard;
use crate::slab::Slab;
use crate::sweep::{build_report, sweep_shard, CleanReport};

/// A sharded, TTL-keyed cache of opaque byte values.
pub struct ValueCache {
    shards: Vec<Shard>,
    slab: Slab<Entry>,
    clean_cursor: AtomicUsize,
}

impl ValueCache {
    /// Creates a cache with `shard_count` shards and default configuration.
    pub fn new(shard_count: usize) -> Result<Self, CacheError> {
        Self::with_config(shard_count, CacheConfig::default())
    }

    /// Creates a cache with `shard_count` shards and explicit configuration.
    pub fn with_config(shard_count: usize, config: CacheConfig) -> Result<Self, CacheError> {
        if shard_count == 0 {
            return Err(CacheError::InvalidShardCount);
        }

        tracing::debug!(
            shard_count,
            chunk_bytes = config.chunk_bytes,
            "creating value cache"
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

    /// Inserts or overwrites `key`'s value with `data`, expiring at
    /// `expire_unix_time` (an absolute Unix timestamp in seconds).
    ///
    /// A non-positive `expire_unix_time` on a key that does not yet exist
    /// is a no-op: the entry is never created. On an existing key it still
    /// overwrites the expiry — the entry becomes immediately expired and is
    /// collected on the next sweep, rather than being deleted synchronously.
    pub fn set(&self, key: &[u8], data: &[u8], expire_unix_time: i64) {
        let (digest, shard) = self.locate(key);
        let mut map = shard.map.write();

        if let Some(&ptr) = map.get(&digest) {
            let entry = unsafe { &mut *ptr.as_ptr() };
            overwrite_value(entry, data);
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

    /// Returns an owned copy of `key`'s value if present and not expired.
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

    /// Sweeps one shard — the one the round-robin cursor currently points
    /// at — removing any entry whose expiry has passed. Pass
    /// `with_message = false` to skip formatting the human-readable summary
    /// line when the caller only cares about the counts.
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

impl Drop for ValueCache {
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
