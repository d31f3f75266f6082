/*!
 * Static Allocator
 *
 * First-fit block allocator over fixed, client-supplied arenas.
 *
 * ## Layout
 *
 * - **Header pool**: one fixed-capacity pool per allocator, shared by every
 *   memory list initialised through it
 * - **Free list**: kept sorted by offset so adjacency is a neighbour test
 * - **Alloc list**: insertion order
 *
 * ## Behaviour
 *
 * - **Splitting**: a fitting block is cut to the requested size and the
 *   remainder is linked right after it in the free list
 * - **Coalescing**: eager on free (configurable), and always once more before
 *   an allocation gives up
 * - **Wiping**: payloads are zeroed on free and when a header returns to the pool
 * - **No aborts**: every failure is a `MemoryError`, including pool exhaustion
 */

mod merge;
mod reserve;

use super::arena::Arena;
use super::mem_list::{HeaderList, MemList};
use super::pool::HeaderPool;
use super::types::{
    AllocCounters, BlockHeader, MemoryError, MemoryPressure, MemoryResult, MemoryStats,
};
use crate::core::config::AllocatorConfig;
use crate::core::limits::BLOCK_HEADER_OVERHEAD;
use crate::core::types::{Address, HeaderId, Size};
use tracing::{debug, info, warn};

/// Static allocator
///
/// Owns the header pool. Memory lists are passed in by the caller, so one
/// allocator serves any number of independent arenas, and they all draw their
/// headers from the same pool.
#[derive(Debug)]
pub struct StaticAllocator {
    pub(super) pool: HeaderPool,
    config: AllocatorConfig,
}

impl StaticAllocator {
    pub fn new() -> Self {
        Self::with_config(AllocatorConfig::default())
    }

    /// Allocator with a custom header pool capacity (useful for testing)
    pub fn with_capacity(header_capacity: usize) -> Self {
        Self::with_config(AllocatorConfig::default().with_pool_capacity(header_capacity))
    }

    pub fn with_config(config: AllocatorConfig) -> Self {
        info!(
            header_pool_capacity = config.header_pool_capacity,
            eager_coalesce = config.eager_coalesce,
            "Static allocator initialized"
        );
        Self {
            pool: HeaderPool::new(config.header_pool_capacity),
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    #[inline]
    pub fn pool(&self) -> &HeaderPool {
        &self.pool
    }

    /// Bind `list` to `buffer` and seed its free list with one block spanning it.
    ///
    /// The buffer is zeroed. Re-initialising a bound list returns every header
    /// still in its free or alloc list to the pool before rebinding; headers a
    /// collaborator moved elsewhere stay with that collaborator.
    pub fn init_mem_list(
        &mut self,
        list: &mut MemList,
        buffer: impl Into<Box<[u8]>>,
    ) -> MemoryResult<()> {
        let mut arena = Arena::new(buffer);
        if arena.is_empty() {
            return Err(MemoryError::InvalidArgument("arena must not be empty"));
        }

        if list.arena.is_some() {
            warn!(
                module_id = list.module_id,
                "Re-initializing a bound memory list, previous blocks are discarded"
            );
            self.reclaim(list);
        }

        arena.wipe_all();
        let capacity = arena.len();
        list.arena = Some(arena);
        list.free_list.reset();
        list.alloc_list.reset();
        list.seeded = false;
        list.counters = AllocCounters::default();

        self.seed(list)?;
        info!(
            module_id = list.module_id,
            capacity, "Memory list initialized"
        );
        Ok(())
    }

    /// Detach the arena from `list`, returning its headers to the pool
    pub fn unbind(&mut self, list: &mut MemList) -> Option<Box<[u8]>> {
        list.arena.as_ref()?;
        self.reclaim(list);
        list.free_list.reset();
        list.alloc_list.reset();
        list.seeded = false;
        list.arena.take().map(Arena::into_inner)
    }

    /// Allocate `size` bytes from `list`, returning the payload offset
    pub fn malloc(&mut self, list: &mut MemList, size: Size) -> MemoryResult<Address> {
        if size == 0 {
            return Err(MemoryError::InvalidArgument("allocation size must be non-zero"));
        }
        if !list.is_ready() {
            return Err(MemoryError::NotInitialized(list.module_id));
        }

        let reserved = self.bootstrap(list).and_then(|_| {
            match self.reserve_block(list, size) {
                // Coalesce whatever is adjacent and retry once
                Err(MemoryError::OutOfMemory { .. }) => {
                    self.merge_pass(list);
                    self.reserve_block(list, size)
                }
                other => other,
            }
        });

        let id = match reserved {
            Ok(id) => id,
            Err(e) => {
                list.counters.failed_allocs += 1;
                warn!(module_id = list.module_id, size, error = %e, "Allocation failed");
                return Err(e);
            }
        };

        self.move_header(id, &mut list.free_list, &mut list.alloc_list)?;
        list.counters.alloc_calls += 1;

        let offset = self
            .pool
            .get(id)
            .map(|h| h.offset)
            .ok_or(MemoryError::HeaderNotFound(id))?;

        self.report_pressure(list, size, offset);
        Ok(offset)
    }

    /// Return the block at `address` to the free list of `list`
    pub fn free(&mut self, list: &mut MemList, address: Address) -> MemoryResult<()> {
        let capacity = list.capacity();
        if capacity == 0 {
            return Err(MemoryError::NotInitialized(list.module_id));
        }
        if address >= capacity {
            return Err(MemoryError::InvalidArgument("address lies outside the arena"));
        }

        let Some(id) = self.find_block(&list.alloc_list, address) else {
            warn!(
                module_id = list.module_id,
                address, "Attempted to free an unknown or already freed block"
            );
            return Err(MemoryError::BlockNotFound(address));
        };

        if !list.alloc_list.remove_node(&mut self.pool, id) {
            return Err(MemoryError::CorruptionDetected(address));
        }

        if let Err(e) = self.insert_sorted(&mut list.free_list, id) {
            // Keep the block tracked rather than leak its header
            list.alloc_list.insert_tail(&mut self.pool, id);
            return Err(e);
        }

        let size = self.pool.get(id).map_or(0, |h| h.size);
        if let Some(arena) = list.arena.as_mut() {
            arena.wipe(address, size);
        }
        list.counters.free_calls += 1;

        if self.config.eager_coalesce {
            self.merge_pass(list);
        }

        debug!(
            module_id = list.module_id,
            address,
            size,
            free_blocks = list.free_list.len(),
            alloc_blocks = list.alloc_list.len(),
            "Freed block"
        );
        Ok(())
    }

    /// Header currently stored in slot `id`
    #[inline]
    pub fn header(&self, id: HeaderId) -> Option<&BlockHeader> {
        self.pool.get(id)
    }

    /// Header in `list` whose payload starts at `address`
    pub fn find_block(&self, list: &HeaderList, address: Address) -> Option<HeaderId> {
        list.iter(&self.pool)
            .find(|&id| self.pool.get(id).is_some_and(|h| h.offset == address))
    }

    /// Size of the allocated block at `address`
    pub fn block_size(&self, list: &MemList, address: Address) -> Option<Size> {
        self.find_block(&list.alloc_list, address)
            .and_then(|id| self.pool.get(id))
            .map(|h| h.size)
    }

    /// Payload of the allocated block at `address`
    pub fn block<'l>(&self, list: &'l MemList, address: Address) -> Option<&'l [u8]> {
        let size = self.block_size(list, address)?;
        list.arena.as_ref()?.slice(address, size)
    }

    /// Writable payload of the allocated block at `address`
    pub fn block_mut<'l>(&self, list: &'l mut MemList, address: Address) -> Option<&'l mut [u8]> {
        let size = self.block_size(list, address)?;
        list.arena.as_mut()?.slice_mut(address, size)
    }

    /// Sum of payload sizes in `list`
    pub fn list_bytes(&self, list: &HeaderList) -> Size {
        list.iter(&self.pool)
            .filter_map(|id| self.pool.get(id))
            .map(|h| h.size)
            .sum()
    }

    /// Largest block in `list`
    pub fn largest_block(&self, list: &HeaderList) -> Size {
        list.iter(&self.pool)
            .filter_map(|id| self.pool.get(id))
            .map(|h| h.size)
            .max()
            .unwrap_or(0)
    }

    /// Usage statistics for `list`
    pub fn stats(&self, list: &MemList) -> MemoryStats {
        let total = list.capacity();
        let available = self.list_bytes(&list.free_list);
        let used = total.saturating_sub(available);
        let usage_percentage = if total == 0 {
            0.0
        } else {
            (used as f64 / total as f64) * 100.0
        };

        MemoryStats {
            module_id: list.module_id,
            total_memory: total,
            used_memory: used,
            available_memory: available,
            usage_percentage,
            allocated_blocks: list.alloc_list.len(),
            free_blocks: list.free_list.len(),
            largest_free_block: self.largest_block(&list.free_list),
            counters: list.counters,
            warning_threshold: self.config.warning_threshold,
            critical_threshold: self.config.critical_threshold,
        }
    }

    /// Verify the list invariants, see [`Self::check_consistency_with`]
    pub fn check_consistency(&self, list: &MemList) -> MemoryResult<()> {
        self.check_consistency_with(list, &[])
    }

    /// Verify the invariants of `list` plus any lists holding its headers elsewhere.
    ///
    /// Checks that every member resolves to a header in use, that the free list
    /// is strictly ascending, that no two blocks overlap or leave the arena, and
    /// that payloads plus header overhead account for the whole arena.
    pub fn check_consistency_with(
        &self,
        list: &MemList,
        others: &[&HeaderList],
    ) -> MemoryResult<()> {
        let capacity = list.capacity();
        let mut blocks: Vec<&BlockHeader> = Vec::new();

        let mut previous_free: Option<Address> = None;
        for id in list.free_list.iter(&self.pool) {
            let header = self
                .pool
                .get(id)
                .ok_or(MemoryError::HeaderNotFound(id))?;
            if previous_free.is_some_and(|p| p >= header.offset) {
                return Err(MemoryError::CorruptionDetected(header.offset));
            }
            previous_free = Some(header.offset);
            blocks.push(header);
        }

        let lists = std::iter::once(&list.alloc_list).chain(others.iter().copied());
        for other in lists {
            for id in other.iter(&self.pool) {
                blocks.push(
                    self.pool
                        .get(id)
                        .ok_or(MemoryError::HeaderNotFound(id))?,
                );
            }
        }

        let expected = list.free_list.len()
            + list.alloc_list.len()
            + others.iter().map(|l| l.len()).sum::<usize>();
        if blocks.len() != expected {
            return Err(MemoryError::CorruptionDetected(0));
        }

        blocks.sort_by_key(|h| h.offset);
        let mut cursor = 0;
        for header in &blocks {
            if header.size == 0 || header.offset < cursor + BLOCK_HEADER_OVERHEAD {
                return Err(MemoryError::CorruptionDetected(header.offset));
            }
            cursor = header.end();
            if cursor > capacity {
                return Err(MemoryError::CorruptionDetected(header.offset));
            }
        }

        let accounted: Size =
            blocks.iter().map(|h| h.size + BLOCK_HEADER_OVERHEAD).sum::<Size>();
        if list.seeded && accounted != capacity {
            return Err(MemoryError::CorruptionDetected(cursor));
        }

        Ok(())
    }

    /// Pressure level for `used` bytes out of `total`
    pub fn check_memory_pressure(&self, used: Size, total: Size) -> Option<MemoryPressure> {
        if total == 0 {
            return None;
        }
        let usage_ratio = used as f64 / total as f64;

        match MemoryPressure::from_usage(
            usage_ratio,
            self.config.warning_threshold,
            self.config.critical_threshold,
        ) {
            MemoryPressure::Low => None,
            level => Some(level),
        }
    }

    fn report_pressure(&self, list: &MemList, size: Size, offset: Address) {
        let total = list.capacity();
        let used = total.saturating_sub(self.list_bytes(&list.free_list));

        match self.check_memory_pressure(used, total) {
            Some(level) if level >= MemoryPressure::High => warn!(
                module_id = list.module_id,
                size,
                offset,
                used,
                total,
                "Memory pressure {}",
                level
            ),
            _ => debug!(
                module_id = list.module_id,
                size, offset, used, total, "Allocated block"
            ),
        }
    }

    /// Put one header spanning the whole arena into the free list
    fn seed(&mut self, list: &mut MemList) -> MemoryResult<()> {
        let capacity = list.capacity();
        if capacity <= BLOCK_HEADER_OVERHEAD {
            return Err(MemoryError::InvalidArgument("arena too small to hold a block"));
        }

        let id = self
            .pool
            .acquire(BLOCK_HEADER_OVERHEAD, capacity - BLOCK_HEADER_OVERHEAD)?;
        list.free_list.insert_head(&mut self.pool, id);
        list.seeded = true;
        Ok(())
    }

    /// Seed a list whose seeding failed at init time
    fn bootstrap(&mut self, list: &mut MemList) -> MemoryResult<()> {
        if list.seeded {
            return Ok(());
        }
        debug!(module_id = list.module_id, "Lazily seeding memory list");
        self.seed(list)
    }

    /// Give every header in the list's free and alloc lists back to the pool
    fn reclaim(&mut self, list: &mut MemList) {
        let ids: Vec<HeaderId> = list
            .free_list
            .iter(&self.pool)
            .chain(list.alloc_list.iter(&self.pool))
            .collect();

        if let Some(arena) = list.arena.as_mut() {
            for id in ids {
                self.pool.release(id, arena);
            }
        }
    }
}

impl Default for StaticAllocator {
    fn default() -> Self {
        Self::new()
    }
}
