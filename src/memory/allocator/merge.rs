/*!
 * Coalescing
 * Sorted free-list insertion and merging of adjacent free blocks
 */

use super::StaticAllocator;
use crate::core::limits::BLOCK_HEADER_OVERHEAD;
use crate::core::types::HeaderId;
use crate::memory::mem_list::{HeaderList, MemList};
use crate::memory::pool::HeaderPool;
use crate::memory::types::{MemoryError, MemoryResult};
use tracing::trace;

impl StaticAllocator {
    /// Merge every run of adjacent free blocks in `list`, returning how many
    /// headers were absorbed and handed back to the pool
    pub fn merge_pass(&mut self, list: &mut MemList) -> usize {
        let MemList {
            free_list,
            arena,
            counters,
            ..
        } = list;
        let Some(arena) = arena.as_mut() else {
            return 0;
        };

        let mut merged = 0;
        let mut current = free_list.head();
        while let Some(cur) = current {
            while let Some(next) = free_list.next_of(&self.pool, cur) {
                let absorbed = match (self.pool.get(cur), self.pool.get(next)) {
                    (Some(a), Some(b)) if a.is_adjacent_to(b) => b.size + BLOCK_HEADER_OVERHEAD,
                    _ => break,
                };

                free_list.remove_node(&mut self.pool, next);
                self.pool.release(next, arena);
                if let Some(header) = self.pool.get_mut(cur) {
                    header.size += absorbed;
                }
                merged += 1;
                trace!(header = %cur, absorbed = %next, "Merged adjacent free blocks");
            }
            current = free_list.next_of(&self.pool, cur);
        }

        counters.merges += merged as u64;
        merged
    }

    /// Insert `id` into `free_list` keeping offsets ascending.
    ///
    /// A header whose offset is already present means two headers describe the
    /// same range; that is reported instead of linked.
    pub(super) fn insert_sorted(
        &mut self,
        free_list: &mut HeaderList,
        id: HeaderId,
    ) -> MemoryResult<()> {
        let offset = self
            .pool
            .get(id)
            .map(|h| h.offset)
            .ok_or(MemoryError::HeaderNotFound(id))?;
        let offset_of = |pool: &HeaderPool, member: Option<HeaderId>| {
            member.and_then(|m| pool.get(m)).map(|h| h.offset)
        };

        let head = offset_of(&self.pool, free_list.head());
        let tail = offset_of(&self.pool, free_list.tail());

        let inserted = match (head, tail) {
            (None, _) => free_list.insert_head(&mut self.pool, id),
            (Some(h), _) if offset < h => free_list.insert_head(&mut self.pool, id),
            (_, Some(t)) if offset > t => free_list.insert_tail(&mut self.pool, id),
            _ => {
                let anchor = free_list
                    .iter(&self.pool)
                    .take_while(|&m| self.pool.get(m).is_some_and(|h| h.offset < offset))
                    .last();
                let Some(anchor) = anchor else {
                    return Err(MemoryError::CorruptionDetected(offset));
                };
                let successor = offset_of(&self.pool, free_list.next_of(&self.pool, anchor));
                if successor == Some(offset) {
                    return Err(MemoryError::CorruptionDetected(offset));
                }
                free_list.insert_after(&mut self.pool, anchor, id)
            }
        };

        if inserted {
            Ok(())
        } else {
            Err(MemoryError::HeaderNotFound(id))
        }
    }
}
