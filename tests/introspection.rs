//! Integration tests for the introspection queries
//!
//! The queries surface block-size *equality*, not lowest-fit: a size with no
//! pool of its own reports as unavailable even when a larger class could
//! serve it. That asymmetry matches the allocator's routing contract.

use blockpool::{MemoryConfig, MemoryUsage, PoolFamily, HEADER_SIZE};

fn default_family() -> PoolFamily {
    PoolFamily::new(MemoryConfig::default()).expect("family creation failed")
}

#[test]
fn test_exact_size_queries() {
    let family = default_family();

    assert!(family.is_size_available(16));
    assert!(family.is_size_available(256));
    assert!(family.is_size_available(300));
    assert!(family.is_size_available(400));
    assert!(family.is_size_available(500));

    // 200 has no class of its own, even though 256 would fit it.
    assert!(!family.is_size_available(200));
    assert!(!family.is_size_available(512));
    assert!(!family.is_size_available(1024));
    assert!(!family.is_size_available(2048));
}

#[test]
fn test_memory_availability_tracks_occupancy() {
    let family = PoolFamily::new(
        MemoryConfig::default().with_max_pools(4).with_blocks_per_pool(1),
    )
    .expect("family creation failed");

    assert!(family.is_memory_available_for(16));
    assert_eq!(family.free_blocks_for(16), 1);

    let p = family.alloc(5).expect("allocation failed");
    assert!(!family.is_memory_available_for(16));
    assert_eq!(family.free_blocks_for(16), 0);
    // Other classes are untouched.
    assert!(family.is_memory_available_for(32));

    unsafe { family.free(p.as_ptr()) };
    assert!(family.is_memory_available_for(16));
}

#[test]
fn test_capacity_constants() {
    let family = PoolFamily::new(
        MemoryConfig::default().with_max_pools(6).with_blocks_per_pool(3),
    )
    .expect("family creation failed");

    assert_eq!(family.max_pools(), 6);
    assert_eq!(family.blocks_per_pool(), 3);
    assert_eq!(family.smallest_block_size(), blockpool::smallest_block_size());
    assert!(family.smallest_block_size() > HEADER_SIZE);
    assert!(family.smallest_block_size().is_power_of_two());
}

#[test]
fn test_totals_add_up() {
    let family = PoolFamily::new(
        MemoryConfig::default().with_max_pools(4).with_blocks_per_pool(2),
    )
    .expect("family creation failed");

    let expected_capacity = 2 * (16 + 32 + 64 + 128);
    assert_eq!(family.total_memory_available(), expected_capacity);

    let p = family.alloc(40).expect("allocation failed");
    assert_eq!(family.total_memory_used(), 64);

    let stats = family.stats();
    let by_stats: usize = stats.iter().map(|s| s.used_bytes()).sum();
    assert_eq!(by_stats, family.total_memory_used());

    unsafe { family.free(p.as_ptr()) };
}

#[test]
fn test_memory_usage_trait_view() {
    let family = PoolFamily::new(
        MemoryConfig::default().with_max_pools(4).with_blocks_per_pool(2),
    )
    .expect("family creation failed");

    let p = family.alloc(5).expect("allocation failed");

    assert_eq!(family.used_memory(), 16);
    assert_eq!(family.total_memory(), Some(family.total_memory_available()));
    assert_eq!(
        family.available_memory(),
        Some(family.total_memory_available() - 16)
    );

    let percent = family.memory_usage_percent().expect("total is known");
    assert!(percent > 0.0 && percent < 100.0);

    unsafe { family.free(p.as_ptr()) };
    assert_eq!(family.memory_usage_percent(), Some(0.0));
}

#[test]
fn test_peak_tracks_high_water_mark() {
    let family = PoolFamily::new(
        MemoryConfig::default().with_max_pools(4).with_blocks_per_pool(2),
    )
    .expect("family creation failed");

    let a = family.alloc(5).expect("allocation failed");
    let b = family.alloc(40).expect("allocation failed");
    let high = family.total_memory_used();

    unsafe {
        family.free(a.as_ptr());
        family.free(b.as_ptr());
    }

    assert_eq!(family.total_memory_used(), 0);
    assert_eq!(family.peak_memory_used(), high);
}
