/*!
 * Property Tests
 * Invariants that must hold for arbitrary allocation and free sequences
 */

use proptest::prelude::*;
use static_mem::{AllocatorConfig, MemList, StaticAllocator};

#[derive(Debug, Clone)]
enum Op {
    Malloc(usize),
    /// Free the n-th live allocation (modulo the live count)
    Free(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1usize..96).prop_map(Op::Malloc),
        any::<usize>().prop_map(Op::Free),
    ]
}

fn run(
    alloc: &mut StaticAllocator,
    list: &mut MemList,
    ops: &[Op],
) -> Vec<(usize, usize, u8)> {
    let mut live: Vec<(usize, usize, u8)> = Vec::new();
    for (step, op) in ops.iter().enumerate() {
        match *op {
            Op::Malloc(size) => {
                if let Ok(addr) = alloc.malloc(list, size) {
                    let tag = (step % 251) as u8 + 1;
                    alloc.block_mut(list, addr).unwrap().fill(tag);
                    live.push((addr, size, tag));
                }
            }
            Op::Free(n) if !live.is_empty() => {
                let (addr, _, _) = live.swap_remove(n % live.len());
                alloc.free(list, addr).unwrap();
            }
            Op::Free(_) => {}
        }
    }
    live
}

proptest! {
    #[test]
    fn prop_conservation_and_no_aliasing(
        ops in prop::collection::vec(op_strategy(), 1..64),
        eager in any::<bool>(),
    ) {
        let mut config = AllocatorConfig::default().with_pool_capacity(32);
        config.eager_coalesce = eager;
        let mut alloc = StaticAllocator::with_config(config);
        let mut list = MemList::new(0x01);
        alloc.init_mem_list(&mut list, vec![0u8; 1024]).unwrap();

        let live = run(&mut alloc, &mut list, &ops);

        prop_assert!(alloc.check_consistency(&list).is_ok());
        prop_assert_eq!(
            alloc.list_bytes(list.free_list()) + alloc.list_bytes(list.alloc_list()),
            1024
        );
        prop_assert_eq!(list.num_alloc_blocks(), live.len());

        // Every live block still holds exactly what was written into it
        for (addr, size, tag) in live {
            let block = alloc.block(&list, addr).unwrap();
            prop_assert_eq!(block.len(), size);
            prop_assert!(block.iter().all(|&b| b == tag));
        }
    }

    #[test]
    fn prop_freeing_everything_coalesces_to_one_block(
        ops in prop::collection::vec(op_strategy(), 1..64),
    ) {
        let mut alloc = StaticAllocator::with_capacity(32);
        let mut list = MemList::new(0x01);
        alloc.init_mem_list(&mut list, vec![0u8; 512]).unwrap();

        let live = run(&mut alloc, &mut list, &ops);
        for (addr, _, _) in live {
            alloc.free(&mut list, addr).unwrap();
        }

        prop_assert_eq!(list.num_alloc_blocks(), 0);
        prop_assert_eq!(list.num_free_blocks(), 1);
        prop_assert_eq!(alloc.largest_block(list.free_list()), 512);
        prop_assert_eq!(alloc.pool().in_use(), 1);
        prop_assert!(list.arena().unwrap().as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn prop_free_list_sorted(
        sizes in prop::collection::vec(1usize..32, 1..16),
        free_mask in prop::collection::vec(any::<bool>(), 16),
    ) {
        let config = AllocatorConfig::default().with_lazy_coalesce();
        let mut alloc = StaticAllocator::with_config(config);
        let mut list = MemList::new(0x01);
        alloc.init_mem_list(&mut list, vec![0u8; 512]).unwrap();

        let addrs: Vec<usize> = sizes
            .iter()
            .map(|&s| alloc.malloc(&mut list, s).unwrap())
            .collect();
        for (addr, free) in addrs.iter().zip(&free_mask) {
            if *free {
                alloc.free(&mut list, *addr).unwrap();
            }
        }

        let offsets: Vec<usize> = alloc
            .blocks(list.free_list())
            .into_iter()
            .map(|b| b.offset)
            .collect();
        prop_assert!(offsets.windows(2).all(|w| w[0] < w[1]));
    }
}
