//! A single shard: a digest-keyed table behind an `RwLock`.
//!
//! Reads take the shared lock; inserts, mutations, and the sweeper all take
//! the exclusive lock. There is no lock shared across shards — two threads
//! touching different shards never block each other.

use std::ptr::NonNull;

use hashbrown::HashMap;
use parking_lot::RwLock;

use crate::digest::DigestHashBuilder;
use crate::entry::Entry;

pub(crate) type ShardMap = HashMap<[u8; 16], NonNull<Entry>, DigestHashBuilder>;

pub(crate) struct Shard {
    pub(crate) map: RwLock<ShardMap>,
}

// SAFETY: every `NonNull<Entry>` stored in `map` points at a block owned by
// the cache-level `Slab`, itself `Send + Sync`. All reads and writes to the
// pointee are mediated by `map`'s `RwLock`, so sharing a `Shard` across
// threads is sound despite the raw pointers inside it.
unsafe impl Send for Shard {}
unsafe impl Sync for Shard {}

impl Shard {
    pub fn new(hasher: DigestHashBuilder) -> Self {
        Self {
            map: RwLock::new(HashMap::with_hasher(hasher)),
        }
    }
}
