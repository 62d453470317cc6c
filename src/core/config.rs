//! Configuration for the pool family
//!
//! Firmware builds typically fix these knobs once; they are a validated
//! structure handed to [`PoolFamily::new`] (or to [`acquire_with`]) before
//! any pool exists, and never change afterwards.
//!
//! [`PoolFamily::new`]: crate::family::PoolFamily::new
//! [`acquire_with`]: crate::family::acquire_with

use core::fmt;

use super::error::{MemoryError, MemoryResult};
use crate::size_class;

/// Default number of size classes in the registry.
pub const DEFAULT_MAX_POOLS: usize = 16;

/// Default capacity of each pool, in blocks.
pub const DEFAULT_BLOCKS_PER_POOL: usize = 16;

/// Which pool variant backs the family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolMode {
    /// Contiguous backing region per pool, committed at initialisation.
    Fixed,
    /// Blocks carved lazily per pool, up to the configured capacity.
    Dynamic,
    /// No pools at initialisation; classes are created on first request and
    /// looked up by exact size afterwards.
    OnDemand,
}

impl fmt::Display for PoolMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolMode::Fixed => write!(f, "fixed"),
            PoolMode::Dynamic => write!(f, "dynamic"),
            PoolMode::OnDemand => write!(f, "on-demand"),
        }
    }
}

/// Pool family configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryConfig {
    /// Number of size classes the registry can hold
    pub max_pools: usize,
    /// Capacity of each pool, uniform across classes
    pub blocks_per_pool: usize,
    /// Pool variant
    pub pool_mode: PoolMode,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_pools: DEFAULT_MAX_POOLS,
            blocks_per_pool: DEFAULT_BLOCKS_PER_POOL,
            pool_mode: PoolMode::Dynamic,
        }
    }
}

impl MemoryConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration backed by fixed pools, every block committed up front.
    ///
    /// The predictable-footprint choice: after initialisation the family
    /// never touches the host heap again.
    pub fn fixed() -> Self {
        Self { pool_mode: PoolMode::Fixed, ..Self::default() }
    }

    /// Configuration with no pre-built pools; size classes appear as they
    /// are first requested.
    pub fn on_demand() -> Self {
        Self { pool_mode: PoolMode::OnDemand, ..Self::default() }
    }

    /// Set the number of size classes
    pub fn with_max_pools(mut self, max_pools: usize) -> Self {
        self.max_pools = max_pools;
        self
    }

    /// Set the per-pool block capacity
    pub fn with_blocks_per_pool(mut self, blocks_per_pool: usize) -> Self {
        self.blocks_per_pool = blocks_per_pool;
        self
    }

    /// Set the pool variant
    pub fn with_pool_mode(mut self, pool_mode: PoolMode) -> Self {
        self.pool_mode = pool_mode;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> MemoryResult<()> {
        if self.max_pools == 0 {
            return Err(MemoryError::invalid_config("max_pools cannot be zero"));
        }

        if self.blocks_per_pool == 0 {
            return Err(MemoryError::invalid_config("blocks_per_pool cannot be zero"));
        }

        // The largest scheduled class is 2^(POW_START + max_pools - 1); it
        // must still fit in a usize.
        let largest_pow = size_class::pow_start() as usize + self.max_pools - 1;
        if largest_pow >= usize::BITS as usize {
            return Err(MemoryError::invalid_config(format!(
                "max_pools of {} pushes the size-class schedule past the address width",
                self.max_pools
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = MemoryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pool_mode, PoolMode::Dynamic);
    }

    #[test]
    fn test_zero_pools_rejected() {
        let config = MemoryConfig::default().with_max_pools(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_blocks_rejected() {
        let config = MemoryConfig::default().with_blocks_per_pool(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_schedule_rejected() {
        let config = MemoryConfig::default().with_max_pools(usize::BITS as usize);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_presets() {
        assert_eq!(MemoryConfig::fixed().pool_mode, PoolMode::Fixed);
        assert_eq!(MemoryConfig::on_demand().pool_mode, PoolMode::OnDemand);
        assert!(MemoryConfig::fixed().validate().is_ok());
    }
}
