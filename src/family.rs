//! The pool family: request routing, the allocation surface, and the
//! process-wide lifecycle
//!
//! [`PoolFamily`] bundles the registry with the routing policy and exposes
//! the `alloc`/`free`/`realloc` surface plus the introspection queries. It
//! is an explicit handle: construct one with [`PoolFamily::new`] and pass it
//! around, or lean on [`acquire`] for the firmware-style process-wide
//! instance that is built on first reference and torn down when the last
//! reference drops.
//!
//! Single-threaded by design. There is no internal locking; interior
//! mutability is `RefCell`/`Cell`, which keeps the family `!Sync`, and the
//! pools' raw storage keeps it `!Send`. Callers needing concurrent use must
//! serialise access externally.

use core::cell::{Cell, RefCell};
use core::ops::Deref;
use core::ptr::{self, NonNull};
use std::rc::{Rc, Weak};

#[cfg(feature = "logging")]
use tracing::{debug, trace};

use crate::block::{self, PoolIndex, HEADER_SIZE};
use crate::core::config::{MemoryConfig, PoolMode};
use crate::core::error::{MemoryError, MemoryResult};
use crate::core::traits::MemoryUsage;
use crate::pool::PoolStats;
use crate::registry::{self, PoolRegistry};
use crate::size_class;

/// A family of fixed-block pools spanning the size-class schedule.
pub struct PoolFamily {
    config: MemoryConfig,
    registry: RefCell<PoolRegistry>,
    used_total: Cell<usize>,
    peak_used: Cell<usize>,
}

impl PoolFamily {
    /// Builds a family from a validated configuration.
    ///
    /// Fixed and dynamic modes populate every size class up front; on-demand
    /// mode starts with an empty registry.
    pub fn new(config: MemoryConfig) -> MemoryResult<Self> {
        config.validate()?;

        let mut registry = PoolRegistry::new(config.max_pools, config.pool_mode);
        if config.pool_mode != PoolMode::OnDemand {
            registry.populate(config.blocks_per_pool)?;
        }

        #[cfg(feature = "logging")]
        debug!(
            mode = %config.pool_mode,
            max_pools = config.max_pools,
            blocks_per_pool = config.blocks_per_pool,
            "pool family initialised"
        );

        Ok(Self {
            config,
            registry: RefCell::new(registry),
            used_total: Cell::new(0),
            peak_used: Cell::new(0),
        })
    }

    /// The configuration this family was built with.
    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Allocation surface
    // ------------------------------------------------------------------

    /// Allocates a client region of at least `size` bytes.
    ///
    /// Routes the request to the lowest-fit size class, escalating to larger
    /// classes while the preferred ones are exhausted (fixed/dynamic modes),
    /// or to the exact rounded class, created on first use (on-demand mode).
    /// Returns `None` when no pool can serve the request; the distinction
    /// between failure kinds is logged but not surfaced.
    pub fn alloc(&self, size: usize) -> Option<NonNull<u8>> {
        match self.try_alloc(size) {
            Ok(client) => Some(client),
            Err(_err) => {
                #[cfg(feature = "logging")]
                debug!(size, error = %_err, "allocation failed");
                None
            },
        }
    }

    /// Returns a client region to its owning pool.
    ///
    /// A null `ptr` is a no-op.
    ///
    /// # Safety
    /// `ptr` must be null or a pointer obtained from `alloc`/`realloc` on
    /// this family that has not been freed since. Anything else (including a
    /// double free) violates the block-header contract.
    pub unsafe fn free(&self, ptr: *mut u8) {
        let Some(client) = NonNull::new(ptr) else { return };

        // SAFETY: caller guarantees the pointer is live and ours, so the
        // word in front of it is the owner index written at allocation.
        let owner = unsafe { block::read_owner(client) };
        let base = unsafe { block::raw_base(client) };

        let mut registry = self.registry.borrow_mut();
        match registry.get_mut(owner) {
            Some(pool) => {
                let block_size = pool.block_size();
                // SAFETY: base is the raw block this pool handed out for ptr.
                unsafe { pool.deallocate(base) };
                self.note_free(block_size);
            },
            None => debug_assert!(false, "free of a pointer this family never produced"),
        }
    }

    /// Resizes a client region, preserving its prefix.
    ///
    /// A null `ptr` defers to `alloc(size)`; a zero `size` defers to
    /// `free(ptr)` and returns `None`. Otherwise a new region is allocated,
    /// `min(old usable, size)` bytes are copied over and the old region is
    /// freed. When the new allocation fails, the old region stays valid and
    /// untouched and `None` is returned.
    ///
    /// # Safety
    /// Same contract as [`free`](Self::free) for `ptr`. On success the old
    /// pointer is surrendered and must not be used again.
    pub unsafe fn realloc(&self, ptr: *mut u8, size: usize) -> Option<NonNull<u8>> {
        let Some(old_client) = NonNull::new(ptr) else { return self.alloc(size) };

        if size == 0 {
            // SAFETY: forwarded caller contract.
            unsafe { self.free(ptr) };
            return None;
        }

        let old_usable = {
            let registry = self.registry.borrow();
            // SAFETY: caller guarantees ptr is live and ours.
            let owner = unsafe { block::read_owner(old_client) };
            match registry.get(owner) {
                Some(pool) => pool.block_size() - HEADER_SIZE,
                None => {
                    debug_assert!(false, "realloc of a pointer this family never produced");
                    return None;
                },
            }
        };

        let new_client = self.alloc(size)?;

        let copy = old_usable.min(size);
        // SAFETY: the old region is valid for old_usable bytes, the new one
        // for size bytes, and the two are distinct blocks.
        unsafe { ptr::copy_nonoverlapping(old_client.as_ptr(), new_client.as_ptr(), copy) };

        // SAFETY: forwarded caller contract; the old region is surrendered.
        unsafe { self.free(ptr) };

        Some(new_client)
    }

    /// Fallible allocation keeping the failure kind.
    fn try_alloc(&self, size: usize) -> MemoryResult<NonNull<u8>> {
        let mut registry = self.registry.borrow_mut();

        let req = size
            .checked_add(HEADER_SIZE)
            .ok_or_else(|| MemoryError::size_overflow(size, registry.largest_block_size()))?;

        let (index, base) = match self.config.pool_mode {
            PoolMode::OnDemand => {
                let index = self.find_or_create_class(&mut registry, req)?;
                let base = registry
                    .get_mut(index)
                    .and_then(|pool| pool.allocate())
                    .ok_or_else(|| MemoryError::exhausted(size))?;
                (index, base)
            },
            PoolMode::Fixed | PoolMode::Dynamic => {
                let start = registry
                    .find_pool(req)
                    .ok_or_else(|| MemoryError::size_overflow(req, registry.largest_block_size()))?;
                allocate_with_escalation(&mut registry, start, size)?
            },
        };

        // SAFETY: base is an in-use block of at least HEADER_SIZE bytes.
        unsafe { block::write_owner(base, index) };

        // index came out of this registry, so the lookup cannot miss.
        if let Some(pool) = registry.get(index) {
            self.note_alloc(pool.block_size());
        }

        // SAFETY: the client region starts inside (or exactly at the end of)
        // the block, HEADER_SIZE bytes past the base.
        Ok(unsafe { block::client_ptr(base) })
    }

    /// Finds the exact class for a rounded on-demand request, building and
    /// registering the pool on first use.
    fn find_or_create_class(
        &self,
        registry: &mut PoolRegistry,
        req: usize,
    ) -> MemoryResult<PoolIndex> {
        let class = size_class::round_on_demand(req)
            .ok_or_else(|| MemoryError::size_overflow(req, registry.largest_block_size()))?;

        if let Some(index) = registry.find_pool(class) {
            return Ok(index);
        }

        #[cfg(feature = "logging")]
        trace!(block_size = class, "creating size class on demand");

        let pool = registry::build_pool(PoolMode::OnDemand, class, self.config.blocks_per_pool)?;
        registry.insert_pool(pool)
    }

    /// Bumps the running usage counter by one block and refreshes the high
    /// water mark. O(1), like the allocation path it sits on.
    fn note_alloc(&self, block_size: usize) {
        let used = self.used_total.get() + block_size;
        self.used_total.set(used);
        if used > self.peak_used.get() {
            self.peak_used.set(used);
        }
    }

    fn note_free(&self, block_size: usize) {
        self.used_total.set(self.used_total.get() - block_size);
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Bytes currently committed to clients, whole blocks counted.
    pub fn total_memory_used(&self) -> usize {
        self.registry
            .borrow()
            .pools()
            .map(|pool| pool.num_allocations() * pool.block_size())
            .sum()
    }

    /// Bytes the family spans at full capacity.
    pub fn total_memory_available(&self) -> usize {
        self.registry
            .borrow()
            .pools()
            .map(|pool| pool.total_blocks() * pool.block_size())
            .sum()
    }

    /// Whether a pool of exactly `block_size` exists.
    ///
    /// Exact equality, not lowest-fit: asking for 200 reports `false` even
    /// when a 256 class exists.
    pub fn is_size_available(&self, block_size: usize) -> bool {
        self.registry
            .borrow()
            .pools()
            .any(|pool| pool.block_size() == block_size)
    }

    /// Whether a pool of exactly `block_size` exists and still has a free
    /// block.
    pub fn is_memory_available_for(&self, block_size: usize) -> bool {
        self.registry
            .borrow()
            .pools()
            .any(|pool| pool.block_size() == block_size && pool.num_allocations() < pool.total_blocks())
    }

    /// Free blocks across pools of exactly `block_size`.
    pub fn free_blocks_for(&self, block_size: usize) -> usize {
        self.registry
            .borrow()
            .pools()
            .filter(|pool| pool.block_size() == block_size)
            .map(|pool| pool.total_blocks() - pool.num_allocations())
            .sum()
    }

    /// Configured capacity of each pool, in blocks.
    pub fn blocks_per_pool(&self) -> usize {
        self.config.blocks_per_pool
    }

    /// Configured number of size classes.
    pub fn max_pools(&self) -> usize {
        self.config.max_pools
    }

    /// Block size of the smallest schedule class.
    pub fn smallest_block_size(&self) -> usize {
        size_class::smallest_block_size()
    }

    /// High-water mark of `total_memory_used` since construction.
    pub fn peak_memory_used(&self) -> usize {
        self.peak_used.get()
    }

    /// Occupancy snapshot of every populated pool, ascending by block size
    /// in fixed/dynamic modes, insertion order in on-demand mode.
    pub fn stats(&self) -> Vec<PoolStats> {
        self.registry.borrow().pools().map(|pool| pool.stats()).collect()
    }
}

impl MemoryUsage for PoolFamily {
    fn used_memory(&self) -> usize {
        self.total_memory_used()
    }

    fn available_memory(&self) -> Option<usize> {
        Some(self.total_memory_available() - self.total_memory_used())
    }

    fn total_memory(&self) -> Option<usize> {
        Some(self.total_memory_available())
    }
}

impl Drop for PoolFamily {
    fn drop(&mut self) {
        // Pools drop in slot order, releasing outstanding blocks en-bloc.
        #[cfg(feature = "logging")]
        debug!(peak_used = self.peak_used.get(), "pool family torn down");
    }
}

impl core::fmt::Debug for PoolFamily {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PoolFamily")
            .field("config", &self.config)
            .field("populated", &self.registry.borrow().populated())
            .field("peak_used", &self.peak_used.get())
            .finish()
    }
}

/// Tries every populated class from `start` upward until one yields a block.
///
/// The scan is bounded by the populated prefix of the registry, so it
/// terminates even when every pool is exhausted.
fn allocate_with_escalation(
    registry: &mut PoolRegistry,
    start: PoolIndex,
    requested: usize,
) -> MemoryResult<(PoolIndex, NonNull<u8>)> {
    let populated = registry.populated();
    for raw in start.as_usize()..populated {
        let index = PoolIndex::new(raw);
        let Some(pool) = registry.get_mut(index) else { break };
        if let Some(base) = pool.allocate() {
            #[cfg(feature = "logging")]
            {
                if raw != start.as_usize() {
                    trace!(from = start.as_usize(), to = raw, "escalated to a larger size class");
                }
            }
            return Ok((index, base));
        }
    }

    Err(MemoryError::exhausted(requested))
}

// ----------------------------------------------------------------------
// Process-wide lifecycle
// ----------------------------------------------------------------------

thread_local! {
    static PROCESS_FAMILY: RefCell<Weak<PoolFamily>> = RefCell::new(Weak::new());
}

/// Shared handle to the process-wide pool family.
///
/// Handles are reference counted: the first [`acquire`] builds the family,
/// clones and further acquires share it, and dropping the last handle tears
/// it down, at which point every outstanding client pointer is dead.
#[derive(Clone)]
pub struct FamilyHandle {
    family: Rc<PoolFamily>,
}

impl Deref for FamilyHandle {
    type Target = PoolFamily;

    fn deref(&self) -> &PoolFamily {
        &self.family
    }
}

impl core::fmt::Debug for FamilyHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("FamilyHandle").field(&*self.family).finish()
    }
}

/// Acquires the process-wide family, building it with the default
/// configuration on first reference.
pub fn acquire() -> MemoryResult<FamilyHandle> {
    PROCESS_FAMILY.with(|slot| {
        let mut weak = slot.borrow_mut();
        if let Some(live) = weak.upgrade() {
            return Ok(FamilyHandle { family: live });
        }

        let family = Rc::new(PoolFamily::new(MemoryConfig::default())?);
        *weak = Rc::downgrade(&family);
        Ok(FamilyHandle { family })
    })
}

/// Acquires the process-wide family with an explicit configuration.
///
/// The configuration only takes effect when this call is the one that
/// builds the family; acquiring while a family with a different
/// configuration is live is a configuration error.
pub fn acquire_with(config: MemoryConfig) -> MemoryResult<FamilyHandle> {
    PROCESS_FAMILY.with(|slot| {
        let mut weak = slot.borrow_mut();
        if let Some(live) = weak.upgrade() {
            if live.config() != &config {
                return Err(MemoryError::invalid_config(
                    "pool family already live with a different configuration",
                ));
            }
            return Ok(FamilyHandle { family: live });
        }

        let family = Rc::new(PoolFamily::new(config)?);
        *weak = Rc::downgrade(&family);
        Ok(FamilyHandle { family })
    })
}
