//! Dynamic-variant pool: blocks carved on demand up to a fixed bound

use core::mem;
use core::ptr::NonNull;
use std::alloc::{self, Layout};

use super::{check_dimensions, BlockPool, FreeList};
use crate::core::error::{MemoryError, MemoryResult};

/// One individually-owned block of backing storage.
struct RawBlock {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl RawBlock {
    fn carve(block_size: usize) -> MemoryResult<Self> {
        // block_size >= HEADER_SIZE >= 1, so the layout is never zero-sized.
        let layout = Layout::from_size_align(block_size, mem::align_of::<usize>())
            .map_err(|_| MemoryError::invalid_config("block size exceeds layout limits"))?;

        // SAFETY: layout has non-zero size.
        let raw = unsafe { alloc::alloc(layout) };
        let ptr = NonNull::new(raw).ok_or_else(|| MemoryError::out_of_memory(block_size))?;

        Ok(Self { ptr, layout })
    }
}

impl Drop for RawBlock {
    fn drop(&mut self) {
        // SAFETY: ptr came from alloc::alloc with this exact layout and is
        // released exactly once.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) };
    }
}

/// Pool that grows lazily towards its capacity.
///
/// Capacity is reserved at construction but blocks are only carved from the
/// host heap the first time they are needed; the carve cursor is the number
/// of blocks owned so far. The free list receives blocks only after they
/// have been handed out and returned. Dropping the pool releases every
/// carved block en-bloc, outstanding or not.
pub struct DynamicPool {
    blocks: Vec<RawBlock>,
    block_size: usize,
    total_blocks: usize,
    num_allocations: usize,
    free_list: FreeList,
}

impl DynamicPool {
    /// Creates an empty pool bounded at `total_blocks` blocks of
    /// `block_size` bytes each.
    pub fn new(block_size: usize, total_blocks: usize) -> MemoryResult<Self> {
        check_dimensions(block_size, total_blocks)?;

        Ok(Self {
            blocks: Vec::with_capacity(total_blocks),
            block_size,
            total_blocks,
            num_allocations: 0,
            free_list: FreeList::new(),
        })
    }

    /// Blocks carved so far (monotonic; recycled blocks stay carved).
    pub fn carved_blocks(&self) -> usize {
        self.blocks.len()
    }

    fn carve(&mut self) -> Option<NonNull<u8>> {
        if self.blocks.len() == self.total_blocks {
            return None;
        }
        let block = RawBlock::carve(self.block_size).ok()?;
        let base = block.ptr;
        self.blocks.push(block);
        Some(base)
    }
}

impl BlockPool for DynamicPool {
    fn allocate(&mut self) -> Option<NonNull<u8>> {
        let base = self.free_list.pop().or_else(|| self.carve())?;
        self.num_allocations += 1;
        Some(base)
    }

    unsafe fn deallocate(&mut self, base: NonNull<u8>) {
        debug_assert!(
            self.blocks.iter().any(|b| b.ptr == base),
            "block returned to a pool it did not come from"
        );
        debug_assert!(self.num_allocations > 0, "deallocate on a pool with nothing outstanding");

        // SAFETY: caller guarantees base is one of our in-use blocks, so it
        // is at least HEADER_SIZE bytes and absent from the chain.
        unsafe { self.free_list.push(base) };
        self.num_allocations -= 1;
    }

    fn block_size(&self) -> usize {
        self.block_size
    }

    fn total_blocks(&self) -> usize {
        self.total_blocks
    }

    fn num_allocations(&self) -> usize {
        self.num_allocations
    }
}

impl core::fmt::Debug for DynamicPool {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DynamicPool")
            .field("block_size", &self.block_size)
            .field("total_blocks", &self.total_blocks)
            .field("carved_blocks", &self.blocks.len())
            .field("num_allocations", &self.num_allocations)
            .finish()
    }
}
