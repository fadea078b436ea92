//! Incremental, round-robin expiry sweeping and its accounting line.
//!
//! A call to `clean()` only ever touches one shard — the one the
//! process-wide cursor currently points at — so a busy cache never pays for
//! a full-table scan in one call. Over enough calls the cursor wraps
//! through every shard.

use crate::entry::Entry;
use crate::slab::Slab;
use crate::shard::Shard;

/// Outcome of sweeping a single shard, plus enough bookkeeping to render the
/// human-readable summary line.
pub struct CleanReport {
    /// Index of the shard this call swept.
    pub shard_index: usize,
    /// Entries removed because their expiry had passed.
    pub deleted: usize,
    /// Entries still live in the shard after the sweep.
    pub live_count: usize,
    /// Shard table's current bucket capacity.
    pub bucket_capacity: usize,
    /// Approximate KiB held across shard tables and slab chunks.
    pub alloc_kib: u64,
    /// Approximate KiB held by the swept shard's table and live entries.
    pub memory_kib: u64,
    /// Formatted summary line, present only when the caller asked for one.
    pub message: Option<String>,
}

pub(crate) struct SweepOutcome {
    pub deleted: usize,
    pub bucket_capacity: usize,
    pub live_count: usize,
}

/// Sweeps one shard: every entry whose `expire_time` has passed is removed
/// from the table, its payload dropped, and its header block returned to
/// the slab. `HashMap::retain` visits every occupied bucket and can delete
/// the current one mid-iteration without ever shrinking the table, which is
/// exactly the iteration-safety a concurrent-sweep design needs.
pub(crate) fn sweep_shard(shard: &Shard, slab: &Slab<Entry>, now: i64) -> SweepOutcome {
    let mut map = shard.map.write();
    let mut deleted = 0usize;

    map.retain(|_, &mut ptr| {
        let is_live = unsafe { (*ptr.as_ptr()).is_live(now) };
        if is_live {
            true
        } else {
            unsafe {
                let owned = ptr.as_ptr().read();
                drop(owned);
                slab.free(ptr);
            }
            deleted += 1;
            false
        }
    });

    SweepOutcome {
        deleted,
        bucket_capacity: map.capacity(),
        live_count: map.len(),
    }
}

/// Builds the final report, including memory accounting, for a swept shard.
pub(crate) fn build_report(
    shard_index: usize,
    outcome: SweepOutcome,
    shard_count: usize,
    chunk_count: usize,
    chunk_bytes: usize,
    with_message: bool,
) -> CleanReport {
    let pointer_size = std::mem::size_of::<usize>() as u64;
    let entry_size = std::mem::size_of::<Entry>() as u64;

    let memory_kib = (outcome.bucket_capacity as u64 * pointer_size
        + outcome.live_count as u64 * entry_size)
        / 1024;
    let alloc_kib = (outcome.bucket_capacity as u64 * pointer_size * shard_count as u64
        + chunk_count as u64 * chunk_bytes as u64)
        / 1024;

    let message = with_message.then(|| {
        format!(
            "processcache: alloc:{alloc_kib}K, storage:{shard_index}, count:{count}, bucket:{bucket}, memory:{memory_kib}K, delete:{deleted}",
            count = outcome.live_count,
            bucket = outcome.bucket_capacity,
            deleted = outcome.deleted,
        )
    });

    if let Some(msg) = &message {
        tracing::trace!(%msg, "cache sweep");
    }

    CleanReport {
        shard_index,
        deleted: outcome.deleted,
        live_count: outcome.live_count,
        bucket_capacity: outcome.bucket_capacity,
        alloc_kib,
        memory_kib,
        message,
    }
}
