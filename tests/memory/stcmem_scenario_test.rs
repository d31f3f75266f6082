/*!
 * Scenario Tests
 * Fixed allocation sequences over a 512-byte arena with exact expected layouts
 */

use pretty_assertions::assert_eq;
use static_mem::{MemList, StaticAllocator};

const ARENA: usize = 512;

fn setup() -> (StaticAllocator, MemList) {
    let mut alloc = StaticAllocator::new();
    let mut list = MemList::new(0x01);
    alloc.init_mem_list(&mut list, vec![0u8; ARENA]).unwrap();
    (alloc, list)
}

/// (free blocks, allocated blocks)
fn counts(list: &MemList) -> (usize, usize) {
    (list.num_free_blocks(), list.num_alloc_blocks())
}

fn fill(alloc: &StaticAllocator, list: &mut MemList, address: usize, value: u8) {
    alloc.block_mut(list, address).unwrap().fill(value);
}

fn arena_bytes(list: &MemList, offset: usize, len: usize) -> &[u8] {
    &list.arena().unwrap().as_bytes()[offset..offset + len]
}

/// Two values of `width` bytes land back to back and free back into one block
fn scalar_pair(width: usize) {
    let (mut alloc, mut list) = setup();

    let first = alloc.malloc(&mut list, width).unwrap();
    fill(&alloc, &mut list, first, 0xAB);
    assert_eq!(first, 0);
    assert_eq!(counts(&list), (1, 1));

    let second = alloc.malloc(&mut list, width).unwrap();
    fill(&alloc, &mut list, second, 0xCD);
    assert_eq!(second, width);
    assert_eq!(counts(&list), (1, 2));
    assert_eq!(arena_bytes(&list, 0, width), vec![0xAB; width].as_slice());
    assert_eq!(arena_bytes(&list, width, width), vec![0xCD; width].as_slice());

    alloc.free(&mut list, first).unwrap();
    assert_eq!(counts(&list), (2, 1));

    alloc.free(&mut list, second).unwrap();
    assert_eq!(counts(&list), (1, 0));
    alloc.check_consistency(&list).unwrap();
}

#[test]
fn test_u8_values() {
    scalar_pair(std::mem::size_of::<u8>());
}

#[test]
fn test_u16_values() {
    scalar_pair(std::mem::size_of::<u16>());
}

#[test]
fn test_u32_values() {
    scalar_pair(std::mem::size_of::<u32>());
}

#[test]
fn test_split_and_merge_512() {
    let (mut alloc, mut list) = setup();

    let half_1 = alloc.malloc(&mut list, 256).unwrap();
    fill(&alloc, &mut list, half_1, 1);
    assert_eq!(half_1, 0);
    assert_eq!(counts(&list), (1, 1));

    let half_2 = alloc.malloc(&mut list, 256).unwrap();
    fill(&alloc, &mut list, half_2, 2);
    assert_eq!(half_2, 256);
    assert_eq!(counts(&list), (0, 2));
    assert_eq!(arena_bytes(&list, 256, 256), [2u8; 256].as_slice());

    alloc.free(&mut list, half_1).unwrap();
    assert_eq!(counts(&list), (1, 1));
    assert_eq!(arena_bytes(&list, 0, 256), [0u8; 256].as_slice());

    let quarter_1 = alloc.malloc(&mut list, 128).unwrap();
    assert_eq!(quarter_1, 0);
    assert_eq!(counts(&list), (1, 2));

    let quarter_2 = alloc.malloc(&mut list, 128).unwrap();
    assert_eq!(quarter_2, 128);
    assert_eq!(counts(&list), (0, 3));

    alloc.free(&mut list, quarter_2).unwrap();
    assert_eq!(counts(&list), (1, 2));

    let eighth_1 = alloc.malloc(&mut list, 64).unwrap();
    assert_eq!(eighth_1, 128);
    assert_eq!(counts(&list), (1, 3));

    let eighth_2 = alloc.malloc(&mut list, 64).unwrap();
    assert_eq!(eighth_2, 192);
    assert_eq!(counts(&list), (0, 4));

    alloc.free(&mut list, half_2).unwrap();
    assert_eq!(counts(&list), (1, 3));

    alloc.free(&mut list, quarter_1).unwrap();
    assert_eq!(counts(&list), (2, 2));

    alloc.free(&mut list, eighth_1).unwrap();
    assert_eq!(counts(&list), (2, 1));

    alloc.free(&mut list, eighth_2).unwrap();
    assert_eq!(counts(&list), (1, 0));
    assert_eq!(alloc.largest_block(list.free_list()), ARENA);
    assert!(list.arena().unwrap().as_bytes().iter().all(|&b| b == 0));
    alloc.check_consistency(&list).unwrap();
}

#[test]
fn test_split_and_merge_512_small_blocks_first() {
    let (mut alloc, mut list) = setup();

    let half_1 = alloc.malloc(&mut list, 256).unwrap();
    let half_2 = alloc.malloc(&mut list, 256).unwrap();
    alloc.free(&mut list, half_1).unwrap();
    let quarter_1 = alloc.malloc(&mut list, 128).unwrap();
    let quarter_2 = alloc.malloc(&mut list, 128).unwrap();
    alloc.free(&mut list, quarter_2).unwrap();
    let eighth_1 = alloc.malloc(&mut list, 64).unwrap();
    let eighth_2 = alloc.malloc(&mut list, 64).unwrap();
    assert_eq!(counts(&list), (0, 4));

    for address in [eighth_1, eighth_2, quarter_1, half_2] {
        alloc.free(&mut list, address).unwrap();
        alloc.check_consistency(&list).unwrap();
    }
    assert_eq!(counts(&list), (1, 0));
    assert_eq!(alloc.pool().in_use(), 1);
}
