/*!
 * Block Reservation
 * First-fit search, splitting, and moving headers between lists
 */

use super::StaticAllocator;
use crate::core::limits::BLOCK_HEADER_OVERHEAD;
use crate::core::types::{HeaderId, Size};
use crate::memory::mem_list::{HeaderList, MemList};
use crate::memory::types::{MemoryError, MemoryResult};
use tracing::{debug, trace};

impl StaticAllocator {
    /// Carve a `size`-byte block out of the free list of `list`.
    ///
    /// The returned header stays in the free list; the caller decides where it
    /// goes next (the alloc list for `malloc`, a pending list for a mailbox).
    /// A header-pool failure during the split triggers one merge pass so later
    /// attempts can find larger blocks.
    pub fn reserve_block(&mut self, list: &mut MemList, size: Size) -> MemoryResult<HeaderId> {
        if size == 0 {
            return Err(MemoryError::InvalidArgument("reservation size must be non-zero"));
        }
        if !list.is_ready() {
            return Err(MemoryError::NotInitialized(list.module_id));
        }

        let Some(found) = self.first_fit(&list.free_list, size) else {
            return Err(MemoryError::OutOfMemory {
                requested: size,
                largest_free: self.largest_block(&list.free_list),
                available: self.list_bytes(&list.free_list),
                total: list.capacity(),
            });
        };

        let (offset, block_size) = self
            .pool
            .get(found)
            .map(|h| (h.offset, h.size))
            .ok_or(MemoryError::HeaderNotFound(found))?;

        let remainder = block_size - size;
        if remainder > BLOCK_HEADER_OVERHEAD {
            let rest_offset = offset + size + BLOCK_HEADER_OVERHEAD;
            let rest = match self.pool.acquire(rest_offset, remainder - BLOCK_HEADER_OVERHEAD) {
                Ok(id) => id,
                Err(e) => {
                    self.merge_pass(list);
                    return Err(e);
                }
            };

            if !list.free_list.insert_after(&mut self.pool, found, rest) {
                if let Some(arena) = list.arena.as_mut() {
                    self.pool.release(rest, arena);
                }
                return Err(MemoryError::CorruptionDetected(offset));
            }
            if let Some(header) = self.pool.get_mut(found) {
                header.size = size;
            }
            trace!(
                header = %found,
                offset,
                size,
                remainder_offset = rest_offset,
                "Split free block"
            );
        }

        debug!(
            module_id = list.module_id,
            header = %found,
            offset,
            size,
            "Reserved block"
        );
        Ok(found)
    }

    /// Unlink header `id` from `from` and append it to `to`
    pub fn move_header(
        &mut self,
        id: HeaderId,
        from: &mut HeaderList,
        to: &mut HeaderList,
    ) -> MemoryResult<()> {
        if !from.remove_node(&mut self.pool, id) {
            return Err(MemoryError::HeaderNotFound(id));
        }
        if !to.insert_tail(&mut self.pool, id) {
            return Err(MemoryError::HeaderNotFound(id));
        }
        Ok(())
    }

    /// First header in `list` whose payload can hold `size` bytes
    fn first_fit(&self, list: &HeaderList, size: Size) -> Option<HeaderId> {
        list.iter(&self.pool)
            .find(|&id| self.pool.get(id).is_some_and(|h| h.size >= size))
    }
}
