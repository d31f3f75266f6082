/*!
 * Memory Diagnostics
 * Hexdumps and list snapshots for debugging
 *
 * Nothing in here changes allocator state.
 */

use super::allocator::StaticAllocator;
use super::mem_list::{HeaderList, MemList};
use super::types::{AllocCounters, MemoryStats};
use crate::core::limits::HEXDUMP_BYTES_PER_LINE;
use crate::core::types::{Address, HeaderId, ModuleId, Size};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use tracing::debug;

/// Render `bytes` as offset, hex and ASCII columns, 16 bytes per line.
///
/// `base` is the offset printed for the first byte.
pub fn hexdump(bytes: &[u8], base: Address) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Address: 0x{:08x} - size: {}", base, bytes.len());
    out.push_str("          ");
    for column in 0..HEXDUMP_BYTES_PER_LINE {
        let _ = write!(out, "{:02X} ", column);
    }
    out.push('\n');

    for (line, chunk) in bytes.chunks(HEXDUMP_BYTES_PER_LINE).enumerate() {
        let _ = write!(out, "{:08x}  ", base + line * HEXDUMP_BYTES_PER_LINE);
        for byte in chunk {
            let _ = write!(out, "{:02x} ", byte);
        }
        for _ in chunk.len()..HEXDUMP_BYTES_PER_LINE {
            out.push_str("   ");
        }
        out.push_str("| ");
        // Only printable ASCII, everything else as '.'
        out.extend(chunk.iter().map(|&b| {
            if (33..=126).contains(&b) {
                b as char
            } else {
                '.'
            }
        }));
        out.push('\n');
    }
    out
}

/// One block as it appears in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    pub header: HeaderId,
    pub offset: Address,
    pub size: Size,
}

/// Point-in-time view of a memory list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemListSnapshot {
    pub module_id: ModuleId,
    pub capacity: Size,
    pub free: Vec<BlockInfo>,
    pub allocated: Vec<BlockInfo>,
    pub counters: AllocCounters,
    pub stats: MemoryStats,
}

impl MemListSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl StaticAllocator {
    /// Blocks of `list` in list order
    pub fn blocks(&self, list: &HeaderList) -> Vec<BlockInfo> {
        list.iter(self.pool())
            .filter_map(|id| {
                self.header(id).map(|h| BlockInfo {
                    header: id,
                    offset: h.offset,
                    size: h.size,
                })
            })
            .collect()
    }

    pub fn snapshot(&self, list: &MemList) -> MemListSnapshot {
        MemListSnapshot {
            module_id: list.module_id(),
            capacity: list.capacity(),
            free: self.blocks(list.free_list()),
            allocated: self.blocks(list.alloc_list()),
            counters: list.counters(),
            stats: self.stats(list),
        }
    }

    /// Emit both lists of `list` at debug level
    pub fn log_lists(&self, list: &MemList) {
        for (name, members) in [("free", list.free_list()), ("alloc", list.alloc_list())] {
            debug!(
                module_id = list.module_id(),
                list = name,
                blocks = members.len(),
                "Memory list"
            );
            for block in self.blocks(members) {
                debug!(
                    module_id = list.module_id(),
                    list = name,
                    header = %block.header,
                    offset = block.offset,
                    size = block.size,
                    "  block"
                );
            }
        }
    }

    /// Hexdump of the whole arena bound to `list`
    pub fn hexdump_arena(&self, list: &MemList) -> Option<String> {
        list.arena().map(|arena| hexdump(arena.as_bytes(), 0))
    }
}
