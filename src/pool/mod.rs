//! Fixed-block pools
//!
//! A pool hands out same-sized blocks in O(1) through an intrusive free
//! list. Two interchangeable variants sit behind the [`BlockPool`] seam:
//!
//! - [`FixedPool`]: one contiguous region committed at construction,
//!   free list fully chained up front, never grows
//! - [`DynamicPool`]: blocks carved from the host heap on first use, up to
//!   a fixed bound; the free list receives only recycled blocks
//!
//! Pools deal in *raw block bases*. Writing the header back-reference and
//! exposing the client region is the router's job, not the pool's.

pub mod dynamic;
pub mod fixed;
mod free_list;
mod stats;

use core::ptr::NonNull;

pub use dynamic::DynamicPool;
pub use fixed::FixedPool;
pub use stats::PoolStats;

pub(crate) use free_list::FreeList;

/// One size class worth of fixed-size blocks.
pub trait BlockPool {
    /// Hands out the base of a free block, or `None` when the pool is fully
    /// committed. O(1).
    fn allocate(&mut self) -> Option<NonNull<u8>>;

    /// Returns a block to the pool's free list.
    ///
    /// # Safety
    /// `base` must be the raw base of a block previously handed out by
    /// `allocate` on this very pool and currently in use. Foreign pointers
    /// and double frees are contract violations; no validation is attempted
    /// beyond debug assertions.
    unsafe fn deallocate(&mut self, base: NonNull<u8>);

    /// Size of each block, header included.
    fn block_size(&self) -> usize;

    /// Capacity of the pool, in blocks.
    fn total_blocks(&self) -> usize;

    /// Blocks currently handed out.
    fn num_allocations(&self) -> usize;

    /// Occupancy snapshot.
    fn stats(&self) -> PoolStats {
        PoolStats {
            block_size: self.block_size(),
            total_blocks: self.total_blocks(),
            used_blocks: self.num_allocations(),
        }
    }
}

/// Validates the dimensions shared by both pool variants.
pub(crate) fn check_dimensions(block_size: usize, total_blocks: usize) -> crate::MemoryResult<()> {
    use crate::block::HEADER_SIZE;
    use crate::core::error::MemoryError;

    if block_size < HEADER_SIZE {
        return Err(MemoryError::invalid_config(format!(
            "block size of {} cannot hold a {}-byte header",
            block_size, HEADER_SIZE
        )));
    }

    if total_blocks == 0 {
        return Err(MemoryError::invalid_config("a pool needs at least one block"));
    }

    Ok(())
}
