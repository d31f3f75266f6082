/*!
 * Address Recycling Test
 * Verifies that freed offsets are handed out again by first-fit
 */

use pretty_assertions::assert_eq;
use static_mem::{MemList, StaticAllocator};

fn setup(size: usize) -> (StaticAllocator, MemList) {
    let mut alloc = StaticAllocator::new();
    let mut list = MemList::new(0x01);
    alloc.init_mem_list(&mut list, vec![0u8; size]).unwrap();
    (alloc, list)
}

#[test]
fn test_address_recycling() {
    let (mut alloc, mut list) = setup(8192);

    let addr1 = alloc.malloc(&mut list, 1024).expect("Failed to allocate block 1");
    let addr2 = alloc.malloc(&mut list, 2048).expect("Failed to allocate block 2");
    let addr3 = alloc.malloc(&mut list, 512).expect("Failed to allocate block 3");

    assert!(addr2 > addr1, "Second address should be after first");
    assert!(addr3 > addr2, "Third address should be after second");

    alloc.free(&mut list, addr2).expect("Failed to free block 2");

    // First fit: the hole left by addr2 comes before the tail remainder
    let addr4 = alloc.malloc(&mut list, 1024).expect("Failed to allocate block 4");
    assert_eq!(addr4, addr2, "Address should be recycled from the freed block");

    // And the rest of that hole is split off for the next request
    let addr5 = alloc.malloc(&mut list, 512).expect("Failed to allocate block 5");
    assert_eq!(addr5, addr2 + 1024);

    let stats = alloc.stats(&list);
    assert_eq!(stats.used_memory, 1024 + 512 + 1024 + 512);
    assert_eq!(stats.allocated_blocks, 4);
    assert_eq!(stats.free_blocks, 2);
    assert_eq!(stats.fragmented_bytes(), 512);

    for addr in [addr1, addr3, addr4, addr5] {
        alloc.free(&mut list, addr).expect("Failed to free block");
    }
    assert_eq!(list.num_free_blocks(), 1);
}

#[test]
fn test_address_exhaustion_prevented() {
    let (mut alloc, mut list) = setup(10 * 1024);
    let block_size = 1024;

    let addresses: Vec<usize> = (0..10)
        .map(|i| {
            alloc
                .malloc(&mut list, block_size)
                .unwrap_or_else(|e| panic!("Failed allocation {i}: {e}"))
        })
        .collect();
    assert!(alloc.malloc(&mut list, 1).is_err(), "Arena should be full");

    for addr in &addresses {
        alloc.free(&mut list, *addr).expect("Failed deallocation");
    }

    let recycled: Vec<usize> = (0..10)
        .map(|_| alloc.malloc(&mut list, block_size).expect("Failed recycled allocation"))
        .collect();

    assert_eq!(recycled, addresses);
    alloc.check_consistency(&list).unwrap();
}

#[test]
fn test_coalescing_adjacent_blocks() {
    let (mut alloc, mut list) = setup(3000);

    let addr1 = alloc.malloc(&mut list, 1000).unwrap();
    let addr2 = alloc.malloc(&mut list, 1000).unwrap();
    let addr3 = alloc.malloc(&mut list, 1000).unwrap();

    alloc.free(&mut list, addr1).unwrap();
    alloc.free(&mut list, addr3).unwrap();
    assert_eq!(list.num_free_blocks(), 2);

    alloc.free(&mut list, addr2).unwrap();
    assert_eq!(list.num_free_blocks(), 1);

    // The merged block serves a request larger than any of the originals
    let big = alloc.malloc(&mut list, 2500).expect("Coalesced block should fit");
    assert_eq!(big, addr1);
}
