/*!
 * Shared Allocator Tests
 * Concurrent use of memory lists drawing from one header pool
 */

use pretty_assertions::assert_eq;
use static_mem::memory::{Allocator, MemoryInfo};
use static_mem::{AllocatorConfig, SharedAllocator};
use std::thread;

#[test]
fn test_concurrent_alloc_free_on_one_list() {
    let shared = SharedAllocator::default();
    let list = shared.create_list(0x01, vec![0u8; 4096]).unwrap();

    let handles: Vec<_> = (0..4u8)
        .map(|worker| {
            let list = list.clone();
            thread::spawn(move || {
                for round in 0..50u8 {
                    let addr = list.allocate(16).expect("allocation failed");
                    let tag = worker.wrapping_mul(50).wrapping_add(round);
                    list.write(addr, &[tag; 16]).unwrap();
                    assert_eq!(list.read(addr).unwrap(), vec![tag; 16]);
                    list.deallocate(addr).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(list.num_alloc_blocks(), 0);
    assert_eq!(list.num_free_blocks(), 1);
    list.check_consistency().unwrap();
    assert_eq!(list.info(), (4096, 0, 4096));
}

#[test]
fn test_lists_on_separate_threads() {
    let shared = SharedAllocator::new(AllocatorConfig::default().with_pool_capacity(64));

    let handles: Vec<_> = (1..=3u8)
        .map(|module| {
            let list = shared.create_list(module, vec![0u8; 256]).unwrap();
            thread::spawn(move || {
                let addrs: Vec<usize> = (0..8).map(|_| list.malloc(32).unwrap()).collect();
                assert!(list.malloc(1).is_err());
                for addr in addrs {
                    list.free(addr).unwrap();
                }
                list.stats()
            })
        })
        .collect();

    for handle in handles {
        let stats = handle.join().unwrap();
        assert_eq!(stats.used_memory, 0);
        assert_eq!(stats.counters.alloc_calls, 8);
        assert_eq!(stats.counters.failed_allocs, 1);
    }
    // One seed header per list remains
    assert_eq!(shared.headers_in_use(), 3);
}

#[test]
fn test_snapshot_through_shared_handle() {
    let shared = SharedAllocator::default();
    let list = shared.create_list(0x07, vec![0u8; 64]).unwrap();
    let addr = list.malloc(10).unwrap();

    let snapshot = list.snapshot();
    assert_eq!(snapshot.module_id, 0x07);
    assert_eq!(snapshot.allocated.len(), 1);
    assert_eq!(snapshot.allocated[0].offset, addr);
    assert_eq!(shared.with(|alloc| alloc.pool().in_use()), 2);
}
