/*!
 * Memory List Handle
 * Free and allocated block lists bound to one arena and one owner
 */

use super::arena::Arena;
use super::list::List;
use super::types::AllocCounters;
use crate::core::types::{HeaderId, ModuleId, Size};

/// List of block headers drawn from a [`super::HeaderPool`]
pub type HeaderList = List<HeaderId>;

/// Per-owner memory handle.
///
/// Every header the handle owns sits in exactly one of its two lists (or in a
/// list a collaborator moved it into, such as a mailbox's pending list).
///
/// ```text
///   MemList (module 0x01)
///   +-----------+     +-------+    +-------+
///   | free_list | --> | 0..64 | -> | 96..  |      sorted by offset
///   +-----------+     +-------+    +-------+
///   | alloc_list| --> | 64..96|                   insertion order
///   +-----------+     +-------+
///   | arena     | --> [ 512 bytes ............................ ]
///   +-----------+
/// ```
#[derive(Debug)]
pub struct MemList {
    pub(crate) module_id: ModuleId,
    pub(crate) arena: Option<Arena>,
    pub(crate) free_list: HeaderList,
    pub(crate) alloc_list: HeaderList,
    pub(crate) seeded: bool,
    pub(crate) counters: AllocCounters,
}

impl MemList {
    /// Unbound handle; bind it with `StaticAllocator::init_mem_list`
    pub fn new(module_id: ModuleId) -> Self {
        Self {
            module_id,
            arena: None,
            free_list: HeaderList::new(),
            alloc_list: HeaderList::new(),
            seeded: false,
            counters: AllocCounters::default(),
        }
    }

    #[inline]
    pub fn module_id(&self) -> ModuleId {
        self.module_id
    }

    /// Whether the handle is bound to a non-empty arena
    pub fn is_ready(&self) -> bool {
        self.arena.as_ref().is_some_and(|a| !a.is_empty())
    }

    /// Arena size in bytes (0 when unbound)
    pub fn capacity(&self) -> Size {
        self.arena.as_ref().map_or(0, Arena::len)
    }

    #[inline]
    pub fn num_free_blocks(&self) -> usize {
        self.free_list.len()
    }

    #[inline]
    pub fn num_alloc_blocks(&self) -> usize {
        self.alloc_list.len()
    }

    #[inline]
    pub fn free_list(&self) -> &HeaderList {
        &self.free_list
    }

    #[inline]
    pub fn alloc_list(&self) -> &HeaderList {
        &self.alloc_list
    }

    /// Mutable free list, for collaborators that move reserved headers out
    #[inline]
    pub fn free_list_mut(&mut self) -> &mut HeaderList {
        &mut self.free_list
    }

    /// Mutable alloc list, for collaborators that commit headers into it
    #[inline]
    pub fn alloc_list_mut(&mut self) -> &mut HeaderList {
        &mut self.alloc_list
    }

    #[inline]
    pub fn arena(&self) -> Option<&Arena> {
        self.arena.as_ref()
    }

    #[inline]
    pub fn arena_mut(&mut self) -> Option<&mut Arena> {
        self.arena.as_mut()
    }

    #[inline]
    pub fn counters(&self) -> AllocCounters {
        self.counters
    }
}
