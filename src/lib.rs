//! # leafdb
//!
//! A minimal single-table record store: rows keyed by an integer id, kept
//! in key order inside fixed-size pages of a single file.
//!
//! ## Architecture
//!
//! - **Storage Layer** (`storage`): page-granular file I/O
//! - **Buffer Layer** (`buffer`): fixed-capacity page cache, flushed on close
//! - **Page Layer** (`page`): node header and leaf cell layout
//! - **Table Layer** (`btree`): table lifecycle, cursor search/scan/insert
//! - **Statements** (`statement`): line-oriented commands for the REPL
//!
//! All rows live in one root leaf. Once it holds `LEAF_NODE_MAX_CELLS` rows,
//! further inserts fail with `StorageError::NodeFull`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use leafdb::{Row, Table};
//!
//! let mut table = Table::open("my_database.db")?;
//! table.insert(&Row::new(1, "alice", "alice@example.com")?)?;
//!
//! for row in table.scan()? {
//!     println!("{}", row?);
//! }
//!
//! table.close()?;
//! ```

pub mod btree;
pub mod buffer;
pub mod error;
pub mod page;
pub mod statement;
pub mod storage;
pub mod types;

pub use error::{Result, StorageError};
pub use types::{NodeType, PageId, Row, PAGE_SIZE, TABLE_MAX_PAGES};

// Re-export main public API
pub use btree::{Cursor, LeafSnapshot, Scan, Table, TableStats};
pub use buffer::Pager;
pub use page::layout::{LayoutConstants, LEAF_NODE_MAX_CELLS};
pub use storage::{DiskManager, FileDiskManager};

use std::path::PathBuf;

/// Table configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the database file
    pub path: PathBuf,
    /// Page cache ceiling in pages (default: `TABLE_MAX_PAGES`)
    pub max_pages: usize,
    /// Whether to fsync the file on close (default: true)
    pub sync_on_close: bool,
}

impl Config {
    /// Create a new configuration with default settings
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            max_pages: TABLE_MAX_PAGES,
            sync_on_close: true,
        }
    }

    /// Set the page cache ceiling, clamped to `1..=TABLE_MAX_PAGES`
    pub fn max_pages(mut self, pages: usize) -> Self {
        self.max_pages = pages.clamp(1, TABLE_MAX_PAGES);
        self
    }

    /// Enable or disable fsync on close
    pub fn sync_on_close(mut self, enabled: bool) -> Self {
        self.sync_on_close = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_defaults() {
        let config = Config::new("test.db");
        assert_eq!(config.max_pages, TABLE_MAX_PAGES);
        assert!(config.sync_on_close);

        let config = config.max_pages(0).sync_on_close(false);
        assert_eq!(config.max_pages, 1);
        assert!(!config.sync_on_close);
        assert_eq!(Config::new("x").max_pages(10_000).max_pages, TABLE_MAX_PAGES);
    }

    #[test]
    fn test_basic_operations() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        let config = Config::new(&path).sync_on_close(false);
        let mut table = Table::open_with(config)?;

        table.insert(&Row::new(1, "alice", "alice@example.com")?)?;
        assert_eq!(table.get(1)?.map(|r| r.email().into_owned()), Some("alice@example.com".to_string()));
        assert_eq!(table.get(2)?, None);

        let rows: Vec<Row> = table.scan()?.collect::<Result<_>>()?;
        assert_eq!(rows.len(), 1);

        table.close()
    }
}
