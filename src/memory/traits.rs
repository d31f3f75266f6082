/*!
 * Memory Traits
 * Allocation abstractions over a bound memory list
 */

use super::types::*;
use crate::core::types::{Address, Size};

/// Memory allocator interface
pub trait Allocator: Send + Sync {
    /// Allocate `size` bytes, returning the payload offset
    fn allocate(&self, size: Size) -> MemoryResult<Address>;

    /// Deallocate the block at an address
    fn deallocate(&self, address: Address) -> MemoryResult<()>;

    /// Check if an address is the start of an allocated block
    fn is_valid(&self, address: Address) -> bool {
        self.block_size(address).is_some()
    }

    /// Get the size of an allocated block
    fn block_size(&self, address: Address) -> Option<Size>;
}

/// Memory statistics provider
pub trait MemoryInfo: Send + Sync {
    /// Get overall memory statistics
    fn stats(&self) -> MemoryStats;

    /// Get memory info as (total, used, available)
    fn info(&self) -> (Size, Size, Size) {
        let stats = self.stats();
        (
            stats.total_memory,
            stats.used_memory,
            stats.available_memory,
        )
    }

    /// Get memory pressure level
    fn pressure(&self) -> MemoryPressure {
        self.stats().memory_pressure()
    }
}
