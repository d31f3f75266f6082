/*!
 * Arena
 * Fixed-size byte buffer addressed by offsets
 */

use crate::core::types::{Address, Size};

/// Backing store for every block of one memory list.
///
/// The buffer is supplied by the owner and never grows; every access is
/// bounds-checked against its length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arena {
    bytes: Box<[u8]>,
}

impl Arena {
    pub fn new(bytes: impl Into<Box<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Arena of `size` zeroed bytes
    pub fn zeroed(size: Size) -> Self {
        Self::new(vec![0u8; size])
    }

    #[inline]
    pub fn len(&self) -> Size {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn contains(&self, offset: Address) -> bool {
        offset < self.bytes.len()
    }

    pub fn slice(&self, offset: Address, size: Size) -> Option<&[u8]> {
        let end = offset.checked_add(size)?;
        self.bytes.get(offset..end)
    }

    pub fn slice_mut(&mut self, offset: Address, size: Size) -> Option<&mut [u8]> {
        let end = offset.checked_add(size)?;
        self.bytes.get_mut(offset..end)
    }

    /// Zero `size` bytes from `offset`; out-of-range parts are ignored
    pub fn wipe(&mut self, offset: Address, size: Size) {
        let start = offset.min(self.bytes.len());
        let end = offset.saturating_add(size).min(self.bytes.len());
        self.bytes[start..end].fill(0);
    }

    pub fn wipe_all(&mut self) {
        self.bytes.fill(0);
    }

    /// Give the buffer back to its owner
    pub fn into_inner(self) -> Box<[u8]> {
        self.bytes
    }
}
