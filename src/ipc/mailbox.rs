/*!
 * Mailbox
 * Zero-copy message passing over a static memory list
 *
 * Messages follow reserve-then-commit:
 *
 * ```text
 *   init_message     send_message       receive_message    release_message
 *  free ------> pending ------> alloc (queue) -----> reader -------> free
 *                   |
 *                   +-- discard_message --------------------------> free
 * ```
 *
 * The writer fills a reserved block in place, and the reader sees committed
 * messages oldest first.
 */

use super::types::{IpcError, IpcResult, MessageCallback};
use crate::core::types::{Address, HeaderId, ModuleId, Size};
use crate::memory::{HeaderList, MemList, MemoryError, MemoryResult, StaticAllocator};
use tracing::{debug, info};

/// Mailbox backed by one memory list
pub struct Mailbox {
    list: MemList,
    pending: HeaderList,
    callback: Option<MessageCallback>,
}

impl Mailbox {
    pub fn new(
        alloc: &mut StaticAllocator,
        module_id: ModuleId,
        buffer: impl Into<Box<[u8]>>,
    ) -> IpcResult<Self> {
        let mut list = MemList::new(module_id);
        alloc.init_mem_list(&mut list, buffer)?;
        info!(module_id, capacity = list.capacity(), "Mailbox created");

        Ok(Self {
            list,
            pending: HeaderList::new(),
            callback: None,
        })
    }

    /// Call `callback` every time a message is sent
    pub fn with_callback(mut self, callback: impl FnMut(Address) + Send + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    #[inline]
    pub fn module_id(&self) -> ModuleId {
        self.list.module_id()
    }

    #[inline]
    pub fn mem_list(&self) -> &MemList {
        &self.list
    }

    /// Messages reserved but not sent yet
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Messages sent and not released yet
    #[inline]
    pub fn message_count(&self) -> usize {
        self.list.num_alloc_blocks()
    }

    /// Reserve a `size`-byte message buffer, returning its offset
    pub fn init_message(&mut self, alloc: &mut StaticAllocator, size: Size) -> IpcResult<Address> {
        let id = alloc.reserve_block(&mut self.list, size)?;
        alloc.move_header(id, self.list.free_list_mut(), &mut self.pending)?;

        let address = alloc
            .header(id)
            .map(|h| h.offset)
            .ok_or(MemoryError::HeaderNotFound(id))?;
        debug!(module_id = self.module_id(), address, size, "Message reserved");
        Ok(address)
    }

    /// Writable view of a pending message
    pub fn message_mut(&mut self, alloc: &StaticAllocator, address: Address) -> Option<&mut [u8]> {
        let size = self
            .find_pending(alloc, address)
            .and_then(|id| alloc.header(id))?
            .size;
        self.list.arena_mut()?.slice_mut(address, size)
    }

    /// Commit a pending message to the queue and notify the reader
    pub fn send_message(&mut self, alloc: &mut StaticAllocator, address: Address) -> IpcResult<()> {
        let id = self
            .find_pending(alloc, address)
            .ok_or(IpcError::NotPending(address))?;
        alloc.move_header(id, &mut self.pending, self.list.alloc_list_mut())?;
        debug!(module_id = self.module_id(), address, "Message sent");

        if let Some(callback) = self.callback.as_mut() {
            callback(address);
        }
        Ok(())
    }

    /// Oldest committed message
    pub fn receive_message<'a>(&'a self, alloc: &StaticAllocator) -> Option<(Address, &'a [u8])> {
        let header = self.list.alloc_list().head().and_then(|id| alloc.header(id))?;
        let bytes = self.list.arena()?.slice(header.offset, header.size)?;
        Some((header.offset, bytes))
    }

    /// Free a received message
    pub fn release_message(&mut self, alloc: &mut StaticAllocator, address: Address) -> IpcResult<()> {
        alloc.free(&mut self.list, address)?;
        debug!(module_id = self.module_id(), address, "Message released");
        Ok(())
    }

    /// Drop a pending message without sending it
    pub fn discard_message(&mut self, alloc: &mut StaticAllocator, address: Address) -> IpcResult<()> {
        let id = self
            .find_pending(alloc, address)
            .ok_or(IpcError::NotPending(address))?;
        alloc.move_header(id, &mut self.pending, self.list.alloc_list_mut())?;
        alloc.free(&mut self.list, address)?;
        debug!(module_id = self.module_id(), address, "Pending message discarded");
        Ok(())
    }

    /// Consistency check that also accounts for pending messages
    pub fn check_consistency(&self, alloc: &StaticAllocator) -> MemoryResult<()> {
        alloc.check_consistency_with(&self.list, &[&self.pending])
    }

    fn find_pending(&self, alloc: &StaticAllocator, address: Address) -> Option<HeaderId> {
        alloc.find_block(&self.pending, address)
    }
}

impl std::fmt::Debug for Mailbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailbox")
            .field("module_id", &self.list.module_id())
            .field("pending", &self.pending.len())
            .field("messages", &self.list.num_alloc_blocks())
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}
