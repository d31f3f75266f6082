/*!
 * Memory Types
 * Common types for the static allocator
 */

use super::list::Link;
use crate::core::limits::{
    BLOCK_HEADER_OVERHEAD, DEFAULT_CRITICAL_THRESHOLD, DEFAULT_WARNING_THRESHOLD,
    MEDIUM_PRESSURE_THRESHOLD,
};
use crate::core::types::{Address, HeaderId, ModuleId, Size};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Memory operation result
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Memory errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum MemoryError {
    #[error("Invalid argument: {0}")]
    #[diagnostic(
        code(memory::invalid_argument),
        help("Sizes must be non-zero and offsets must lie inside the arena.")
    )]
    InvalidArgument(&'static str),

    #[error("Memory list of module 0x{0:02x} is not bound to an arena")]
    #[diagnostic(
        code(memory::not_initialized),
        help("Call init_mem_list with a non-empty buffer before allocating.")
    )]
    NotInitialized(ModuleId),

    #[error("Out of memory: requested {requested} bytes, largest free block {largest_free} bytes ({available} free / {total} total)")]
    #[diagnostic(
        code(memory::out_of_memory),
        help("Free unused blocks or bind a larger arena.")
    )]
    OutOfMemory {
        requested: Size,
        largest_free: Size,
        available: Size,
        total: Size,
    },

    #[error("Header pool exhausted: all {capacity} block headers are in use")]
    #[diagnostic(
        code(memory::pool_exhausted),
        help("Raise the header pool capacity or free blocks in another list sharing the pool.")
    )]
    PoolExhausted { capacity: usize },

    #[error("No allocated block at offset 0x{0:x}")]
    #[diagnostic(
        code(memory::block_not_found),
        help("The block may already have been freed or belong to another list.")
    )]
    BlockNotFound(Address),

    #[error("Block header {0} is not a member of the source list")]
    #[diagnostic(code(memory::header_not_found))]
    HeaderNotFound(HeaderId),

    #[error("Memory corruption detected at 0x{0:x}")]
    #[diagnostic(code(memory::corruption))]
    CorruptionDetected(Address),
}

/// Coarse failure classes callers can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidArgument,
    OutOfMemory,
    PoolExhausted,
    NotFound,
    Corruption,
}

impl MemoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MemoryError::InvalidArgument(_) | MemoryError::NotInitialized(_) => {
                ErrorKind::InvalidArgument
            }
            MemoryError::OutOfMemory { .. } => ErrorKind::OutOfMemory,
            MemoryError::PoolExhausted { .. } => ErrorKind::PoolExhausted,
            MemoryError::BlockNotFound(_) | MemoryError::HeaderNotFound(_) => ErrorKind::NotFound,
            MemoryError::CorruptionDetected(_) => ErrorKind::Corruption,
        }
    }
}

/// Metadata describing one contiguous range of an arena
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    /// Offset of the first payload byte
    pub offset: Address,
    /// Payload length in bytes
    pub size: Size,
    pub(crate) link: Link<HeaderId>,
}

impl BlockHeader {
    pub(crate) fn new(offset: Address, size: Size) -> Self {
        Self {
            offset,
            size,
            link: Link::default(),
        }
    }

    /// One past the last payload byte
    #[inline]
    pub fn end(&self) -> Address {
        self.offset + self.size
    }

    /// Whether `next` starts right after this block (and its header overhead)
    #[inline]
    pub fn is_adjacent_to(&self, next: &BlockHeader) -> bool {
        self.end() + BLOCK_HEADER_OVERHEAD == next.offset
    }
}

/// Per-list operation counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocCounters {
    pub alloc_calls: u64,
    pub free_calls: u64,
    pub failed_allocs: u64,
    pub merges: u64,
}

/// Memory statistics for one list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryStats {
    pub module_id: ModuleId,
    pub total_memory: Size,
    pub used_memory: Size,
    pub available_memory: Size,
    pub usage_percentage: f64,
    pub allocated_blocks: usize,
    pub free_blocks: usize,
    pub largest_free_block: Size,
    pub counters: AllocCounters,
    /// Usage ratio the owning allocator reports as high pressure
    pub warning_threshold: f64,
    /// Usage ratio the owning allocator reports as critical pressure
    pub critical_threshold: f64,
}

impl MemoryStats {
    /// Pressure level under the thresholds the stats were taken with
    pub fn memory_pressure(&self) -> MemoryPressure {
        MemoryPressure::from_usage(
            self.usage_percentage / 100.0,
            self.warning_threshold,
            self.critical_threshold,
        )
    }

    /// Free bytes that cannot be served as one block
    pub fn fragmented_bytes(&self) -> Size {
        self.available_memory.saturating_sub(self.largest_free_block)
    }
}

/// Memory pressure levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MemoryPressure {
    Low,
    Medium,
    High,
    Critical,
}

impl MemoryPressure {
    /// Classify a usage ratio; medium pressure starts at a fixed ratio below `warning`
    pub fn from_usage(usage_ratio: f64, warning: f64, critical: f64) -> Self {
        if usage_ratio >= critical {
            MemoryPressure::Critical
        } else if usage_ratio >= warning {
            MemoryPressure::High
        } else if usage_ratio >= MEDIUM_PRESSURE_THRESHOLD.min(warning) {
            MemoryPressure::Medium
        } else {
            MemoryPressure::Low
        }
    }
}

impl std::fmt::Display for MemoryPressure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            MemoryPressure::Low => write!(f, "LOW"),
            MemoryPressure::Medium => write!(f, "MEDIUM"),
            MemoryPressure::High => write!(f, "HIGH"),
            MemoryPressure::Critical => write!(f, "CRITICAL"),
        }
    }
}
