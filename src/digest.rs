//! Key normalization: an MD5 digest for in-shard identity, a CRC32 of the
//! raw key bytes for shard selection, and the seeded 32-bit hash the
//! per-shard table uses over that digest.
//!
//! The two hashes are deliberately independent. Shard placement uses CRC32
//! over the original key bytes; once inside a shard, lookups use a
//! from-scratch hash of the 16-byte MD5 digest, seeded with a fixed
//! constant rather than a per-process random seed, so that table placement
//! is fully deterministic and reproducible across runs.

use std::hash::{BuildHasher, Hasher};

use md5::{Digest, Md5};

/// Default in-shard hash seed.
pub const DEFAULT_HASH_SEED: u32 = 321;

/// MD5 digest of `key`, used as the per-entry identity inside a shard.
pub(crate) fn digest_key(key: &[u8]) -> [u8; 16] {
    let mut hasher = Md5::new();
    hasher.update(key);
    hasher.finalize().into()
}

/// Shard index for `key` among `shard_count` shards via CRC32.
pub(crate) fn shard_index(key: &[u8], shard_count: usize) -> usize {
    debug_assert!(shard_count > 0);
    (crc32fast::hash(key) as usize) % shard_count
}

/// A `BuildHasher` producing a seeded hash over a fixed-length digest.
///
/// Cloned once per shard so every shard's table hashes with the same seed;
/// the seed only needs to vary across test runs that probe collision
/// behavior deterministically.
#[derive(Clone)]
pub(crate) struct DigestHashBuilder {
    seed: u32,
}

impl DigestHashBuilder {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }
}

impl BuildHasher for DigestHashBuilder {
    type Hasher = DigestHasher;

    fn build_hasher(&self) -> DigestHasher {
        DigestHasher {
            state: self.seed as u64 ^ 0xcbf2_9ce4_8422_2325,
        }
    }
}

pub(crate) struct DigestHasher {
    state: u64,
}

impl Hasher for DigestHasher {
    fn write(&mut self, bytes: &[u8]) {
        let mut h = self.state;
        for &b in bytes {
            h ^= b as u64;
            h = h.wrapping_mul(0x0000_0100_0000_01b3);
        }
        self.state = h;
    }

    fn finish(&self) -> u64 {
        self.state
    }
}
