//! Block layout: the header slot and raw/client address arithmetic
//!
//! A block is a passive byte region. Its first machine word is the header
//! slot: while the block is in use it stores the owning pool's registry
//! index; while the block is free the same word holds the free-list link.
//! The client-visible pointer starts exactly [`HEADER_SIZE`] bytes past the
//! raw base, and the two conversions are symmetric and reversible.
//!
//! Header and link accesses are unaligned: override size classes (300, 400,
//! 500) are not word multiples, so a block base may sit at any byte offset
//! inside its pool's storage.

use core::mem;
use core::ptr::{self, NonNull};

/// Width of the per-block header slot, in bytes.
///
/// Equals the machine word width; a client pointer `p` satisfies the layout
/// contract `raw_base == p - HEADER_SIZE`.
pub const HEADER_SIZE: usize = mem::size_of::<usize>();

/// Identifier of a pool inside the registry.
///
/// This is what an in-use block's header slot stores, routing `free` back to
/// the owning pool without a raw pool pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolIndex(usize);

impl PoolIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub(crate) fn as_usize(self) -> usize {
        self.0
    }
}

/// Moves from a raw block base to the client region.
///
/// # Safety
/// `base` must point to a block of at least `HEADER_SIZE` bytes.
#[inline]
pub(crate) unsafe fn client_ptr(base: NonNull<u8>) -> NonNull<u8> {
    // SAFETY: base + HEADER_SIZE stays inside the block (caller's contract),
    // and an in-bounds offset from a non-null pointer is non-null.
    unsafe { NonNull::new_unchecked(base.as_ptr().add(HEADER_SIZE)) }
}

/// Recovers the raw block base from a client pointer.
///
/// # Safety
/// `client` must have been produced by [`client_ptr`] on a live block.
#[inline]
pub(crate) unsafe fn raw_base(client: NonNull<u8>) -> NonNull<u8> {
    // SAFETY: client sits HEADER_SIZE bytes into its block, so stepping back
    // lands on the block base inside the same allocation.
    unsafe { NonNull::new_unchecked(client.as_ptr().sub(HEADER_SIZE)) }
}

/// Writes the owning-pool back-reference into the header slot.
///
/// # Safety
/// `base` must point to the base of an in-use block of at least
/// `HEADER_SIZE` bytes.
#[inline]
pub(crate) unsafe fn write_owner(base: NonNull<u8>, owner: PoolIndex) {
    // SAFETY: the header slot is pool-owned while the block is handed out;
    // unaligned write because the base may not be word aligned.
    unsafe { ptr::write_unaligned(base.as_ptr().cast::<usize>(), owner.as_usize()) }
}

/// Reads the owning-pool back-reference behind a client pointer.
///
/// # Safety
/// `client` must point into an in-use block whose header was set by
/// [`write_owner`].
#[inline]
pub(crate) unsafe fn read_owner(client: NonNull<u8>) -> PoolIndex {
    // SAFETY: raw_base recovers the header slot of the same block; the slot
    // holds the owner index for as long as the block is in use.
    let base = unsafe { raw_base(client) };
    PoolIndex(unsafe { ptr::read_unaligned(base.as_ptr().cast::<usize>()) })
}

/// Writes the free-list link into the first word of a free block.
///
/// # Safety
/// `base` must point to the base of a free block of at least `HEADER_SIZE`
/// bytes; the block must not be visible to any client.
#[inline]
pub(crate) unsafe fn write_link(base: NonNull<u8>, next: *mut u8) {
    // SAFETY: a free block's first word belongs to the free list.
    unsafe { ptr::write_unaligned(base.as_ptr().cast::<*mut u8>(), next) }
}

/// Reads the free-list link from the first word of a free block.
///
/// # Safety
/// `base` must be a chained free block whose link was set by [`write_link`].
#[inline]
pub(crate) unsafe fn read_link(base: NonNull<u8>) -> *mut u8 {
    // SAFETY: same slot the matching write_link used.
    unsafe { ptr::read_unaligned(base.as_ptr().cast::<*mut u8>()) }
}
