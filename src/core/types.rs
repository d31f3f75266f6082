/*!
 * Core Types
 * Common types used across the allocator
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte offset into an arena
pub type Address = usize;

/// Size type for memory operations
pub type Size = usize;

/// Identity of the module owning a memory list
pub type ModuleId = u8;

/// Index of a block header slot in the header pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderId(pub(crate) usize);

impl HeaderId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for HeaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
