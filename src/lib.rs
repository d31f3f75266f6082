/*!
 * Static Memory Library
 * Block allocation over fixed, caller-supplied arenas
 */

pub mod core;
pub mod ipc;
pub mod memory;
pub mod monitoring;

// Re-exports
pub use crate::core::{Address, AllocatorConfig, ConfigError, HeaderId, ModuleId, Size};
pub use ipc::{IpcError, IpcResult, Mailbox};
pub use memory::{
    hexdump, Allocator, ErrorKind, HeaderList, MemList, MemListSnapshot, MemoryError,
    MemoryInfo, MemoryPressure, MemoryResult, MemoryStats, SharedAllocator, SharedMemList,
    StaticAllocator,
};
pub use monitoring::{init_tracing, span_operation};
