//! The ordered pool registry
//!
//! Holds up to `max_pools` pools, ascending by block size, behind
//! fixed slots. In fixed and dynamic modes the whole family is built at
//! initialisation over the size-class schedule; in on-demand mode slots fill
//! one by one as classes are first requested.
//!
//! Lookup is asymmetric on purpose: `find_pool` uses lowest-fit when a pool
//! variant is active but exact match in on-demand mode, and either way the
//! scan stops at the first empty slot. Insertion always fills the first
//! empty slot, which keeps the scan and the insert consistent.

use crate::block::PoolIndex;
use crate::core::config::PoolMode;
use crate::core::error::{MemoryError, MemoryResult};
use crate::pool::{BlockPool, DynamicPool, FixedPool};
use crate::size_class;

pub(crate) struct PoolRegistry {
    slots: Vec<Option<Box<dyn BlockPool>>>,
    mode: PoolMode,
}

impl PoolRegistry {
    pub(crate) fn new(max_pools: usize, mode: PoolMode) -> Self {
        let mut slots = Vec::with_capacity(max_pools);
        slots.resize_with(max_pools, || None);
        Self { slots, mode }
    }

    /// Builds one pool per schedule slot, ascending by block size.
    ///
    /// Fixed and dynamic modes only; on-demand registries start empty.
    pub(crate) fn populate(&mut self, blocks_per_pool: usize) -> MemoryResult<()> {
        for index in 0..self.slots.len() {
            let block_size = size_class::schedule(index);
            self.slots[index] = Some(build_pool(self.mode, block_size, blocks_per_pool)?);
        }
        Ok(())
    }

    /// Finds the pool that serves a rounded request of `size` bytes.
    ///
    /// Lowest-fit over the ascending schedule when a pool variant is active;
    /// exact block-size match in on-demand mode.
    pub(crate) fn find_pool(&self, size: usize) -> Option<PoolIndex> {
        let exact = self.mode == PoolMode::OnDemand;
        self.pools()
            .position(|pool| {
                if exact {
                    pool.block_size() == size
                } else {
                    pool.block_size() >= size
                }
            })
            .map(PoolIndex::new)
    }

    /// Places a pool into the first empty slot.
    pub(crate) fn insert_pool(&mut self, pool: Box<dyn BlockPool>) -> MemoryResult<PoolIndex> {
        let max_pools = self.slots.len();
        let index = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(MemoryError::registry_full(max_pools))?;
        self.slots[index] = Some(pool);
        Ok(PoolIndex::new(index))
    }

    pub(crate) fn get(&self, index: PoolIndex) -> Option<&dyn BlockPool> {
        self.slots.get(index.as_usize())?.as_deref()
    }

    pub(crate) fn get_mut(&mut self, index: PoolIndex) -> Option<&mut dyn BlockPool> {
        match self.slots.get_mut(index.as_usize())? {
            Some(pool) => Some(pool.as_mut()),
            None => None,
        }
    }

    /// Iterates the populated prefix of the registry.
    pub(crate) fn pools(&self) -> impl Iterator<Item = &dyn BlockPool> + '_ {
        self.slots.iter().map_while(|slot| slot.as_deref())
    }

    /// Number of populated slots.
    pub(crate) fn populated(&self) -> usize {
        self.pools().count()
    }

    /// Block size of the largest populated pool, or zero when empty.
    pub(crate) fn largest_block_size(&self) -> usize {
        self.pools().map(|pool| pool.block_size()).max().unwrap_or(0)
    }
}

/// Builds the pool variant the mode calls for.
///
/// On-demand classes are dynamic pools: nothing is committed until a block
/// is actually requested from them.
pub(crate) fn build_pool(
    mode: PoolMode,
    block_size: usize,
    blocks_per_pool: usize,
) -> MemoryResult<Box<dyn BlockPool>> {
    Ok(match mode {
        PoolMode::Fixed => Box::new(FixedPool::new(block_size, blocks_per_pool)?),
        PoolMode::Dynamic | PoolMode::OnDemand => {
            Box::new(DynamicPool::new(block_size, blocks_per_pool)?)
        },
    })
}
