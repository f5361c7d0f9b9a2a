//! Common types used throughout the storage engine.

mod page_id;
mod row;

pub use page_id::PageId;
pub use row::{
    Row, COLUMN_EMAIL_SIZE, COLUMN_USERNAME_SIZE, EMAIL_OFFSET, EMAIL_SIZE, ID_OFFSET, ID_SIZE,
    ROW_SIZE, USERNAME_OFFSET, USERNAME_SIZE,
};

use serde::Serialize;

/// Page size in bytes (4KB, matches the OS page size)
pub const PAGE_SIZE: usize = 4096;

/// Hard ceiling on the number of page slots the cache will hold
pub const TABLE_MAX_PAGES: usize = 100;

/// Node types, stored as the first byte of every page
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Interior node (keys + child pointers). Never constructed by this engine.
    Internal = 0,
    /// Leaf node (keys + rows)
    Leaf = 1,
}

impl NodeType {
    /// Check if this is a leaf node type
    pub fn is_leaf(self) -> bool {
        matches!(self, Self::Leaf)
    }

    /// Convert from byte value
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Self::Internal),
            1 => Some(Self::Leaf),
            _ => None,
        }
    }
}
