/*!
 * Block Header Pool
 * Fixed-capacity reservoir of block headers shared by memory lists
 */

use super::arena::Arena;
use super::list::{Link, LinkStore};
use super::types::{BlockHeader, MemoryError, MemoryResult};
use crate::core::types::{Address, HeaderId, Size};
use tracing::{debug, warn};

/// One pool slot
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HeaderSlot {
    #[default]
    Free,
    InUse(BlockHeader),
}

impl HeaderSlot {
    #[inline]
    pub fn is_free(&self) -> bool {
        matches!(self, HeaderSlot::Free)
    }
}

/// Header pool
///
/// The slot vector is sized once at construction and never grows, so header
/// lifetime is decoupled from block lifetime: a slot is reused for a new block
/// description only after it has been released.
#[derive(Debug)]
pub struct HeaderPool {
    slots: Vec<HeaderSlot>,
    in_use: usize,
}

impl HeaderPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![HeaderSlot::Free; capacity],
            in_use: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn in_use(&self) -> usize {
        self.in_use
    }

    #[inline]
    pub fn available(&self) -> usize {
        self.capacity() - self.in_use
    }

    /// Take the first free slot and describe `size` bytes at `offset` with it
    pub fn acquire(&mut self, offset: Address, size: Size) -> MemoryResult<HeaderId> {
        let Some(index) = self.slots.iter().position(HeaderSlot::is_free) else {
            warn!(
                capacity = self.capacity(),
                offset, size, "Header pool exhausted"
            );
            return Err(MemoryError::PoolExhausted {
                capacity: self.capacity(),
            });
        };

        self.slots[index] = HeaderSlot::InUse(BlockHeader::new(offset, size));
        self.in_use += 1;
        debug!(header = index, offset, size, "Acquired block header");
        Ok(HeaderId(index))
    }

    /// Return a header to the pool.
    ///
    /// The payload it describes is wiped before the slot is reset, so no data
    /// survives into whatever block reuses that range next.
    pub fn release(&mut self, id: HeaderId, arena: &mut Arena) -> Option<BlockHeader> {
        let slot = self.slots.get_mut(id.0)?;
        let HeaderSlot::InUse(header) = std::mem::take(slot) else {
            return None;
        };

        arena.wipe(header.offset, header.size);
        self.in_use -= 1;
        debug!(header = id.0, offset = header.offset, size = header.size, "Released block header");
        Some(header)
    }

    pub fn get(&self, id: HeaderId) -> Option<&BlockHeader> {
        match self.slots.get(id.0)? {
            HeaderSlot::InUse(header) => Some(header),
            HeaderSlot::Free => None,
        }
    }

    pub fn get_mut(&mut self, id: HeaderId) -> Option<&mut BlockHeader> {
        match self.slots.get_mut(id.0)? {
            HeaderSlot::InUse(header) => Some(header),
            HeaderSlot::Free => None,
        }
    }

    #[inline]
    pub fn is_in_use(&self, id: HeaderId) -> bool {
        self.get(id).is_some()
    }
}

impl LinkStore<HeaderId> for HeaderPool {
    fn link(&self, id: HeaderId) -> Option<&Link<HeaderId>> {
        self.get(id).map(|h| &h.link)
    }

    fn link_mut(&mut self, id: HeaderId) -> Option<&mut Link<HeaderId>> {
        self.get_mut(id).map(|h| &mut h.link)
    }
}
