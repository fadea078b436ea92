//! Fixed-block allocator backing every entry header.
//!
//! Blocks are handed out of chunk-owned arrays rather than from individual
//! heap allocations: each chunk is a single `Box<[MaybeUninit<T>]>` sized to
//! roughly 4 MiB, and freed blocks are threaded through an intrusive
//! freelist so churny insert/expire traffic doesn't keep going back to the
//! allocator. A chunk's backing storage never moves once created — only the
//! `Box` handle inside `Vec<Chunk<T>>` does — so pointers handed out by
//! `alloc` stay valid for the lifetime of the slab.
//!
//! Growth is one chunk at a time, append-only; chunks are never returned to
//! the system allocator before the whole `Slab` is dropped.

use std::mem::MaybeUninit;
use std::ptr::NonNull;

use parking_lot::Mutex;

/// Default chunk size: ~4 MiB of blocks per chunk.
pub const DEFAULT_CHUNK_BYTES: usize = 4 * 1024 * 1024;

struct FreeNode {
    next: Option<NonNull<FreeNode>>,
}

struct Chunk<T> {
    storage: Box<[MaybeUninit<T>]>,
}

struct SlabState<T> {
    chunks: Vec<Chunk<T>>,
    blocks_per_chunk: usize,
    /// Index into the last chunk's storage; equal to `blocks_per_chunk` once
    /// that chunk is exhausted and a new one is needed on the next bump.
    cursor: usize,
    free_head: Option<NonNull<FreeNode>>,
    chunk_bytes: usize,
}

/// A fixed-block arena for `T`, safe to share across threads behind a lock.
pub(crate) struct Slab<T> {
    state: Mutex<SlabState<T>>,
}

// SAFETY: the only pointers this type hands out (`NonNull<T>`) are always
// accompanied by exclusive ownership transferred to the caller (via
// `alloc`), and access back into slab-owned storage only happens through
// `state`'s mutex. `T: Send` is required because ownership of allocated
// blocks crosses thread boundaries along with the slab itself.
unsafe impl<T: Send> Send for Slab<T> {}
unsafe impl<T: Send> Sync for Slab<T> {}

#[derive(Debug, Clone, Copy)]
pub(crate) struct SlabStats {
    pub chunk_count: usize,
    pub chunk_bytes: usize,
}

impl<T> Slab<T> {
    pub fn new(chunk_bytes: usize) -> Self {
        let block_size = std::mem::size_of::<T>();
        debug_assert!(
            block_size >= std::mem::size_of::<FreeNode>(),
            "slab block type must be at least pointer-sized to host a freelist node"
        );
        let blocks_per_chunk = (chunk_bytes.max(block_size) / block_size).max(1);
        Self {
            state: Mutex::new(SlabState {
                chunks: Vec::new(),
                blocks_per_chunk,
                cursor: blocks_per_chunk,
                free_head: None,
                chunk_bytes: blocks_per_chunk * block_size,
            }),
        }
    }

    /// Hands out an uninitialized block. The caller must `ptr::write` a
    /// valid `T` into it before any other code can observe it through the
    /// owning shard's table.
    pub fn alloc(&self) -> NonNull<T> {
        let mut state = self.state.lock();

        if let Some(node) = state.free_head {
            state.free_head = unsafe { node.as_ref().next };
            return node.cast();
        }

        if state.cursor >= state.blocks_per_chunk {
            let blocks_per_chunk = state.blocks_per_chunk;
            let storage: Box<[MaybeUninit<T>]> =
                (0..blocks_per_chunk).map(|_| MaybeUninit::uninit()).collect();
            state.chunks.push(Chunk { storage });
            state.cursor = 0;
        }

        let idx = state.cursor;
        state.cursor += 1;
        let chunk = state.chunks.last_mut().expect("just pushed");
        let ptr = chunk.storage[idx].as_mut_ptr();
        unsafe { NonNull::new_unchecked(ptr) }
    }

    /// Returns a block to the freelist.
    ///
    /// # Safety
    /// `ptr` must have been returned by `alloc` on this same `Slab`, and the
    /// caller must have already read or dropped any live `T` it held —
    /// this call overwrites the block's bytes with freelist bookkeeping.
    pub unsafe fn free(&self, ptr: NonNull<T>) {
        let mut state = self.state.lock();
        let node_ptr = ptr.cast::<FreeNode>();
        node_ptr.as_ptr().write(FreeNode {
            next: state.free_head,
        });
        state.free_head = Some(node_ptr);
    }

    pub fn stats(&self) -> SlabStats {
        let state = self.state.lock();
        SlabStats {
            chunk_count: state.chunks.len(),
            chunk_bytes: state.chunk_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Block {
        _payload: [u8; 64],
    }

    #[test]
    fn alloc_returns_distinct_writable_blocks() {
        let slab: Slab<Block> = Slab::new(DEFAULT_CHUNK_BYTES);
        let a = slab.alloc();
        let b = slab.alloc();
        assert_ne!(a.as_ptr(), b.as_ptr());
        unsafe {
            a.as_ptr().write(Block { _payload: [1; 64] });
            b.as_ptr().write(Block { _payload: [2; 64] });
            assert_eq!((*a.as_ptr())._payload[0], 1);
            assert_eq!((*b.as_ptr())._payload[0], 2);
        }
    }

    #[test]
    fn freed_blocks_are_reused_before_growing() {
        let slab: Slab<Block> = Slab::new(4096);
        let stats0 = slab.stats();

        let mut allocated = Vec::new();
        for _ in 0..32 {
            let ptr = slab.alloc();
            unsafe { ptr.as_ptr().write(Block { _payload: [0; 64] }) };
            allocated.push(ptr);
        }
        let grown = slab.stats();
        assert!(grown.chunk_count >= stats0.chunk_count);

        for ptr in allocated.drain(..) {
            unsafe {
                let _ = ptr.as_ptr().read();
                slab.free(ptr);
            }
        }

        for _ in 0..32 {
            let ptr = slab.alloc();
            unsafe { ptr.as_ptr().write(Block { _payload: [0; 64] }) };
            allocated.push(ptr);
        }

        let after_reuse = slab.stats();
        assert_eq!(after_reuse.chunk_count, grown.chunk_count);

        for ptr in allocated.drain(..) {
            unsafe {
                let _ = ptr.as_ptr().read();
                slab.free(ptr);
            }
        }
    }

    #[test]
    fn chunk_size_is_derived_from_block_size() {
        let slab: Slab<Block> = Slab::new(DEFAULT_CHUNK_BYTES);
        let stats = slab.stats();
        assert!(stats.chunk_bytes <= DEFAULT_CHUNK_BYTES);
        assert!(stats.chunk_bytes > 0);
    }
}
