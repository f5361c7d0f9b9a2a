//! Page identifier type.

use serde::Serialize;
use std::fmt;

/// Zero-based page number within the database file.
///
/// Page `n` occupies bytes `[n * PAGE_SIZE, (n + 1) * PAGE_SIZE)`.
/// Page 0 is always the root of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct PageId(pub u32);

impl PageId {
    /// The root page
    pub const ROOT: PageId = PageId(0);

    /// Create a new page ID
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw page ID value
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Slot index in the page cache
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Calculate the byte offset of this page in the file
    pub const fn file_offset(self, page_size: usize) -> u64 {
        self.0 as u64 * page_size as u64
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for PageId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<PageId> for u32 {
    fn from(id: PageId) -> Self {
        id.0
    }
}
