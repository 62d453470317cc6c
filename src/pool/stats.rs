//! Pool occupancy statistics

/// Occupancy snapshot of a single pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Size of each block in this pool, header included
    pub block_size: usize,
    /// Total number of blocks the pool can hold
    pub total_blocks: usize,
    /// Blocks currently handed out
    pub used_blocks: usize,
}

impl PoolStats {
    /// Blocks still available in this pool
    pub fn free_blocks(&self) -> usize {
        self.total_blocks - self.used_blocks
    }

    /// Bytes currently committed to clients (whole blocks)
    pub fn used_bytes(&self) -> usize {
        self.used_blocks * self.block_size
    }

    /// Bytes this pool spans at full capacity
    pub fn capacity_bytes(&self) -> usize {
        self.total_blocks * self.block_size
    }
}
