//! The record allocated from a cache's shared slab for each live key.
//!
//! Both storage modes (opaque value, append-only list) share this single
//! shape: a digest, a payload buffer, a logical length, and an absolute
//! expiry. The only difference between the two modes is how `val` is
//! mutated on write (`overwrite_value` for the value cache, list-specific
//! prepend/remove/truncate logic in `list_cache`).

/// Byte separating individual records inside a list entry's payload.
pub(crate) const RECORD_SEPARATOR: u8 = 0x1E;

#[derive(Debug)]
pub(crate) struct Entry {
    pub key: [u8; 16],
    /// Backing allocation. Its length is the entry's *capacity*, which can
    /// exceed `val_len` after a shrink — the buffer is kept around so a
    /// later write that fits can reuse it without a fresh allocation.
    pub val: Option<Box<[u8]>>,
    pub val_len: usize,
    pub expire_time: i64,
}

impl Entry {
    #[inline]
    pub fn is_live(&self, now: i64) -> bool {
        self.expire_time >= now
    }

    #[inline]
    pub fn live_bytes(&self) -> &[u8] {
        match &self.val {
            Some(buf) => &buf[..self.val_len],
            None => &[],
        }
    }
}

/// Shared `Set`/`Push`-overwrite semantics: reuse the existing buffer when
/// the new data fits within its capacity, otherwise allocate fresh.
pub(crate) fn overwrite_value(entry: &mut Entry, data: &[u8]) {
    let capacity = entry.val.as_ref().map(|b| b.len()).unwrap_or(0);
    if data.len() <= capacity {
        if !data.is_empty() {
            entry.val.as_mut().unwrap()[..data.len()].copy_from_slice(data);
        }
        entry.val_len = data.len();
    } else {
        entry.val = Some(data.to_vec().into_boxed_slice());
        entry.val_len = data.len();
    }
}
