//! Page layer: raw page buffers and the leaf node layout.
//!
//! Every page starts with a common node header. Leaf pages follow it with a
//! cell count and a packed, key-ordered array of fixed-size cells:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ node_type │ is_root │ parent_ptr │ num_cells │
//! ├──────────────────────────────────────────────┤
//! │ [key0|row0][key1|row1] ...  →                │
//! │                                              │
//! │                 unused tail                  │
//! └──────────────────────────────────────────────┘
//! ```

pub mod layout;
mod leaf;

pub use leaf::{LeafNode, LeafNodeMut};

use crate::types::PAGE_SIZE;

/// A raw page buffer
#[derive(Clone)]
pub struct PageBuf {
    data: [u8; PAGE_SIZE],
}

impl PageBuf {
    /// Create a new zeroed page buffer
    pub fn new() -> Self {
        Self {
            data: [0u8; PAGE_SIZE],
        }
    }

    /// Allocate a zeroed page buffer on the heap
    pub fn boxed() -> Box<Self> {
        Box::new(Self::new())
    }

    /// Get a reference to the raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Get a mutable reference to the raw bytes
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl std::fmt::Debug for PageBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageBuf").field("len", &PAGE_SIZE).finish_non_exhaustive()
    }
}

impl Default for PageBuf {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for PageBuf {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl std::ops::DerefMut for PageBuf {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_omits_contents() {
        let mut page = PageBuf::new();
        page[0] = 0xAB;
        assert_eq!(format!("{:?}", page), "PageBuf { len: 4096, .. }");
    }
}
