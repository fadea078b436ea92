//! A sharded, TTL-keyed, in-process cache with two storage modes.
//!
//! `ValueCache` stores an opaque byte string per key (`Set`/`Get`).
//! `ListCache` stores an ordered, append-only sequence of byte records per
//! key (`Push`/`Rem`/`Trim`/`Get`), each record separated by a reserved
//! byte.
//!
//! ## Structure Overview
//!
//! ```text
//! ValueCache / ListCache
//!   ├── shards: Vec<Shard>
//!   │     └── Shard
//!   │           └── map: RwLock<HashMap<[u8; 16], NonNull<Entry>>>
//!   ├── slab: Slab<Entry>        (chunked block allocator, freelist)
//!   └── clean_cursor: AtomicUsize (round-robin expiry sweep position)
//! ```
//!
//! Keys are normalized twice, independently: an MD5 digest of the raw key
//! bytes identifies an entry inside its shard, while a CRC32 of the same
//! raw bytes picks which shard the entry lives in. Neither cache ever
//! acquires more than one shard's lock at a time, and `Get` always hands
//! back an owned copy rather than a reference into shard-owned storage.

mod clock;
mod config;
mod digest;
mod entry;
mod list_cache;
mod shard;
mod slab;
mod sweep;
mod value_cache;

pub use config::{CacheConfig, CacheError};
pub use list_cache::ListCache;
pub use sweep::CleanReport;
pub use value_cache::ValueCache;
