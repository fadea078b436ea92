//! Construction-time configuration and error types.

use crate::digest::DEFAULT_HASH_SEED;
use crate::slab::DEFAULT_CHUNK_BYTES;

/// Optional overrides for cache construction. The only value spec'd as a
/// real runtime knob is the shard count, which both caches take directly;
/// everything here defaults to the constants a caller would otherwise get
/// for free, and exists mainly so tests can force multiple slab chunks or
/// probe hash behavior without allocating unreasonable amounts of data.
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    pub(crate) chunk_bytes: usize,
    pub(crate) hash_seed: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            chunk_bytes: DEFAULT_CHUNK_BYTES,
            hash_seed: DEFAULT_HASH_SEED,
        }
    }
}

impl CacheConfig {
    pub fn with_chunk_bytes(mut self, chunk_bytes: usize) -> Self {
        self.chunk_bytes = chunk_bytes.max(1);
        self
    }

    pub fn with_hash_seed(mut self, hash_seed: u32) -> Self {
        self.hash_seed = hash_seed;
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("shard count must be greater than zero")]
    InvalidShardCount,
}
