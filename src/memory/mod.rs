/*!
 * Memory Module
 * Static block allocation over fixed arenas
 */

pub mod allocator;
pub mod arena;
pub mod diagnostics;
pub mod list;
pub mod mem_list;
pub mod pool;
pub mod shared;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use allocator::StaticAllocator;
pub use arena::Arena;
pub use diagnostics::{hexdump, BlockInfo, MemListSnapshot};
pub use list::{Link, LinkStore, List};
pub use mem_list::{HeaderList, MemList};
pub use pool::{HeaderPool, HeaderSlot};
pub use shared::{SharedAllocator, SharedMemList};
pub use traits::*;
pub use types::*;
