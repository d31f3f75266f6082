/*!
 * Shared Allocator
 * Thread-safe handles for hosts that allocate from several threads
 *
 * The core allocator is single-context and takes `&mut` everywhere. These
 * wrappers put the allocator (and with it the header pool) behind one mutex
 * and every memory list behind its own. Locks are always taken list first,
 * then allocator. Neither lock is reentrant.
 */

use super::allocator::StaticAllocator;
use super::diagnostics::MemListSnapshot;
use super::mem_list::MemList;
use super::traits::{Allocator, MemoryInfo};
use super::types::{MemoryError, MemoryResult, MemoryStats};
use crate::core::config::AllocatorConfig;
use crate::core::types::{Address, ModuleId, Size};
use parking_lot::Mutex;
use std::sync::Arc;

/// Allocator shared between memory lists and threads
#[derive(Debug, Clone)]
pub struct SharedAllocator {
    inner: Arc<Mutex<StaticAllocator>>,
}

impl SharedAllocator {
    pub fn new(config: AllocatorConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StaticAllocator::with_config(config))),
        }
    }

    /// Run `f` with exclusive access to the allocator.
    ///
    /// The allocator lock is held for the whole call. Calling any
    /// [`SharedMemList`] method or another `SharedAllocator` method from
    /// inside `f` deadlocks, since parking_lot mutexes are not reentrant.
    pub fn with<R>(&self, f: impl FnOnce(&mut StaticAllocator) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut *guard)
    }

    /// Headers currently handed out across every list
    pub fn headers_in_use(&self) -> usize {
        self.inner.lock().pool().in_use()
    }

    /// Bind a new memory list to `buffer`
    pub fn create_list(
        &self,
        module_id: ModuleId,
        buffer: impl Into<Box<[u8]>>,
    ) -> MemoryResult<SharedMemList> {
        let mut list = MemList::new(module_id);
        self.inner.lock().init_mem_list(&mut list, buffer)?;
        Ok(SharedMemList {
            list: Arc::new(Mutex::new(list)),
            allocator: self.clone(),
        })
    }
}

impl Default for SharedAllocator {
    fn default() -> Self {
        Self::new(AllocatorConfig::default())
    }
}

/// Memory list usable from several threads
#[derive(Debug, Clone)]
pub struct SharedMemList {
    list: Arc<Mutex<MemList>>,
    allocator: SharedAllocator,
}

impl SharedMemList {
    pub fn module_id(&self) -> ModuleId {
        self.list.lock().module_id()
    }

    pub fn malloc(&self, size: Size) -> MemoryResult<Address> {
        let mut list = self.list.lock();
        self.allocator.inner.lock().malloc(&mut list, size)
    }

    pub fn free(&self, address: Address) -> MemoryResult<()> {
        let mut list = self.list.lock();
        self.allocator.inner.lock().free(&mut list, address)
    }

    /// Copy `data` into the start of the block at `address`
    pub fn write(&self, address: Address, data: &[u8]) -> MemoryResult<()> {
        let mut list = self.list.lock();
        let alloc = self.allocator.inner.lock();
        let block = alloc
            .block_mut(&mut list, address)
            .ok_or(MemoryError::BlockNotFound(address))?;
        if data.len() > block.len() {
            return Err(MemoryError::InvalidArgument("data does not fit in the block"));
        }
        block[..data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Copy of the whole block at `address`
    pub fn read(&self, address: Address) -> MemoryResult<Vec<u8>> {
        let list = self.list.lock();
        let alloc = self.allocator.inner.lock();
        alloc
            .block(&list, address)
            .map(<[u8]>::to_vec)
            .ok_or(MemoryError::BlockNotFound(address))
    }

    pub fn num_free_blocks(&self) -> usize {
        self.list.lock().num_free_blocks()
    }

    pub fn num_alloc_blocks(&self) -> usize {
        self.list.lock().num_alloc_blocks()
    }

    pub fn snapshot(&self) -> MemListSnapshot {
        let list = self.list.lock();
        self.allocator.inner.lock().snapshot(&list)
    }

    pub fn check_consistency(&self) -> MemoryResult<()> {
        let list = self.list.lock();
        self.allocator.inner.lock().check_consistency(&list)
    }
}

impl Allocator for SharedMemList {
    fn allocate(&self, size: Size) -> MemoryResult<Address> {
        self.malloc(size)
    }

    fn deallocate(&self, address: Address) -> MemoryResult<()> {
        self.free(address)
    }

    fn block_size(&self, address: Address) -> Option<Size> {
        let list = self.list.lock();
        self.allocator.inner.lock().block_size(&list, address)
    }
}

impl MemoryInfo for SharedMemList {
    fn stats(&self) -> MemoryStats {
        let list = self.list.lock();
        self.allocator.inner.lock().stats(&list)
    }
}
