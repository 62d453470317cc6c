//! # blockpool
//!
//! Fixed-block pool-family allocator for memory-constrained targets that
//! lack, or want to avoid, a general heap.
//!
//! Clients request byte regions of arbitrary size; the allocator serves
//! them out of a family of pre-sized block pools. Every block carries a
//! one-word header naming its owning pool, so `free` routes in O(1) without
//! any global lookup structure. Allocation granularity is one whole block:
//! there is no sub-allocation, no coalescing and no compaction.
//!
//! ## Quick Start
//!
//! ```rust
//! use blockpool::MemoryResult;
//!
//! fn main() -> MemoryResult<()> {
//!     // First acquire builds the process-wide family; the last handle
//!     // dropped tears it down.
//!     let memory = blockpool::acquire()?;
//!
//!     let ptr = memory.alloc(24).expect("family exhausted");
//!     // ... use the 24-byte region ...
//!
//!     // SAFETY: ptr came from this family's alloc and is live.
//!     unsafe { memory.free(ptr.as_ptr()) };
//!     Ok(())
//! }
//! ```
//!
//! An explicit [`PoolFamily`] handle works just as well and is the natural
//! seam for tests and for callers that would rather pass the allocator
//! around than touch process-wide state:
//!
//! ```rust
//! use blockpool::{MemoryConfig, PoolFamily, PoolMode};
//!
//! let family = PoolFamily::new(
//!     MemoryConfig::default()
//!         .with_max_pools(4)
//!         .with_blocks_per_pool(8)
//!         .with_pool_mode(PoolMode::Fixed),
//! )
//! .unwrap();
//!
//! let ptr = family.alloc(100).expect("family exhausted");
//! unsafe { family.free(ptr.as_ptr()) };
//! ```
//!
//! ## Architecture
//!
//! - [`pool`]: fixed-size block pools behind the [`BlockPool`](pool::BlockPool)
//!   seam: a fixed variant (committed up front) and a dynamic variant
//!   (carved lazily up to a bound)
//! - `registry`: the ordered set of pools spanning the size-class schedule
//! - [`family`]: request routing (lowest-fit with overflow escalation, or
//!   exact-match with on-demand classes), the `alloc`/`free`/`realloc`
//!   surface, introspection and the process-wide lifecycle
//! - [`block`]: the per-block header contract
//!
//! ## Features
//!
//! - `logging`: structured diagnostics via `tracing` on family
//!   init/teardown, escalation and allocation failure
//!
//! ## Concurrency
//!
//! Single-threaded cooperative by design: no internal locking, and the
//! family is neither `Send` nor `Sync`. Serialise externally if you must
//! share it.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod block;
pub mod core;
pub mod family;
pub mod pool;

mod registry;
mod size_class;

// Re-export the public surface at the crate root.
pub use crate::block::{PoolIndex, HEADER_SIZE};
pub use crate::core::config::{MemoryConfig, PoolMode};
pub use crate::core::error::{MemoryError, MemoryResult};
pub use crate::core::traits::{BasicMemoryUsage, MemoryUsage};
pub use crate::family::{acquire, acquire_with, FamilyHandle, PoolFamily};
pub use crate::pool::PoolStats;
pub use crate::size_class::smallest_block_size;

/// Convenient re-exports of commonly used types and traits.
pub mod prelude {
    pub use crate::core::config::{MemoryConfig, PoolMode};
    pub use crate::core::error::{MemoryError, MemoryResult};
    pub use crate::core::traits::MemoryUsage;
    pub use crate::family::{acquire, acquire_with, FamilyHandle, PoolFamily};
    pub use crate::pool::{BlockPool, DynamicPool, FixedPool, PoolStats};
}
