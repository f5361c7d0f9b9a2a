//! Error types for the storage engine.

use thiserror::Error;
use crate::types::PageId;

/// Result type alias for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur in the storage engine
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O error from the underlying file system
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The database file is not a whole number of pages, or a page is unreadable
    #[error("Corrupt database file: {0}")]
    CorruptFile(String),

    /// Page number is beyond the page cache ceiling
    #[error("Page {page_id} out of range (max pages: {max})")]
    PageOutOfRange { page_id: PageId, max: usize },

    /// Cell index is beyond the leaf's capacity
    #[error("Cell index {index} out of range (max cells: {max})")]
    CellOutOfRange { index: usize, max: usize },

    /// Tried to flush a page slot that was never loaded
    #[error("Tried to flush page {0}, which is not loaded")]
    PageNotLoaded(PageId),

    /// The leaf cannot accept another cell
    #[error("Leaf page {page_id} is full ({max_cells} cells)")]
    NodeFull { page_id: PageId, max_cells: usize },

    /// A cell with this key already exists
    #[error("Duplicate key: {0}")]
    DuplicateKey(u32),

    /// The operation needs internal-node support
    #[error("Unimplemented: {0}")]
    Unimplemented(String),

    /// Cursor is past the last cell
    #[error("Cursor is at end of table")]
    EndOfTable,

    /// A record field exceeds its column width
    #[error("Field '{field}' too long: {len} bytes (max: {max})")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// The table has already been closed
    #[error("Table is closed")]
    TableClosed,
}

impl StorageError {
    /// Create a corrupt file error with a message
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::CorruptFile(msg.into())
    }

    /// Create an unimplemented error
    pub fn unimplemented(msg: impl Into<String>) -> Self {
        Self::Unimplemented(msg.into())
    }

    /// Whether the store can no longer be trusted after this error.
    ///
    /// Everything else is reported to the caller and leaves the table usable.
    /// Nothing is retryable.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::CorruptFile(_) | Self::PageNotLoaded(_) | Self::TableClosed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let io = StorageError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert!(io.is_fatal());
        assert!(StorageError::corrupt("partial page").is_fatal());
        assert!(StorageError::PageNotLoaded(PageId::new(3)).is_fatal());

        assert!(!StorageError::DuplicateKey(1).is_fatal());
        assert!(!StorageError::NodeFull {
            page_id: PageId::ROOT,
            max_cells: 13
        }
        .is_fatal());
        assert!(!StorageError::unimplemented("internal node search").is_fatal());
        assert!(!StorageError::EndOfTable.is_fatal());
    }

    #[test]
    fn test_messages() {
        let err = StorageError::PageOutOfRange {
            page_id: PageId::new(100),
            max: 100,
        };
        assert_eq!(err.to_string(), "Page 100 out of range (max pages: 100)");
        assert_eq!(StorageError::DuplicateKey(7).to_string(), "Duplicate key: 7");
    }
}
