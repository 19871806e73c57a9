//! Pool tests for kite-mem

use kite_mem::{Handle, Pool, PoolStats};

#[test]
fn test_pool_stats_creation() {
    let stats = PoolStats::new(10);
    assert_eq!(stats.total_blocks, 10);
    assert_eq!(stats.free_blocks, 10);
    assert_eq!(stats.used_blocks, 0);
    assert!(stats.is_empty());
}

#[test]
fn test_pool_stats_utilization() {
    let mut pool: Pool<u32, 10> = Pool::new();
    pool.alloc(1).unwrap();
    pool.alloc(2).unwrap();
    assert_eq!(pool.stats().utilization(), 20);
    assert_eq!(pool.stats().used_blocks, 2);
}

#[test]
fn test_pool_in_static_context() {
    const EMPTY: Pool<u64, 5> = Pool::new();
    let pool = EMPTY;
    assert_eq!(pool.capacity(), 5);
    assert!(pool.is_empty());
}

#[test]
fn test_iter_yields_live_handles() {
    let mut pool: Pool<char, 4> = Pool::new();
    let a = pool.alloc('a').unwrap();
    let b = pool.alloc('b').unwrap();
    let c = pool.alloc('c').unwrap();
    pool.free(b);

    let live: Vec<(Handle, char)> = pool.iter().map(|(h, v)| (h, *v)).collect();
    assert_eq!(live, vec![(a, 'a'), (c, 'c')]);
}

#[test]
fn test_freed_slot_reused_first() {
    let mut pool: Pool<u8, 3> = Pool::new();
    let a = pool.alloc(0).unwrap();
    let _b = pool.alloc(1).unwrap();
    pool.free(a);
    let c = pool.alloc(2).unwrap();
    assert_eq!(c.index(), a.index());
    assert_eq!(pool.len(), 2);
}
