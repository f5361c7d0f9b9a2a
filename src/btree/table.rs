//! The table: a page cache plus the identity of the root page.
//!
//! The root is always page 0 and always a single leaf. Opening an empty file
//! formats page 0 as an empty root leaf; everything else is loaded lazily.
//! Closing flushes every loaded page. That is the only persistence point.

use crate::btree::{Cursor, Scan};
use crate::buffer::Pager;
use crate::error::{Result, StorageError};
use crate::page::layout::LEAF_NODE_MAX_CELLS;
use crate::page::{LeafNode, LeafNodeMut};
use crate::storage::{DiskManager, FileDiskManager};
use crate::types::{NodeType, PageId, Row};
use crate::Config;
use serde::Serialize;
use std::path::Path;

/// A single table stored in a single file
pub struct Table<D: DiskManager = FileDiskManager> {
    /// Page cache; sole owner of every page buffer
    pub(crate) pager: Pager<D>,
    root_page: PageId,
    closed: bool,
}

impl Table<FileDiskManager> {
    /// Open or create a table with default settings
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(Config::new(path.as_ref()))
    }

    /// Open or create a table
    pub fn open_with(config: Config) -> Result<Self> {
        let disk = FileDiskManager::open(&config.path, config.sync_on_close)?;
        Self::with_disk(disk, config.max_pages)
    }
}

impl<D: DiskManager> Table<D> {
    /// Build a table over an already opened disk manager
    pub fn with_disk(disk: D, max_pages: usize) -> Result<Self> {
        let mut table = Self {
            pager: Pager::new(disk, max_pages),
            root_page: PageId::ROOT,
            closed: false,
        };

        if table.pager.file_pages() == 0 {
            // New database file. Format page 0 as the root leaf.
            let page = table.pager.get_page(PageId::ROOT)?;
            let mut root = LeafNodeMut::new(page);
            root.initialize();
            root.set_root(true);
            tracing::info!("initialized empty root leaf");
        }

        Ok(table)
    }

    /// Get the root page ID
    pub fn root_page(&self) -> PageId {
        self.root_page
    }

    /// Cursor at the first row
    pub fn start(&mut self) -> Result<Cursor<'_, D>> {
        Cursor::table_start(self)
    }

    /// Cursor at `key`, or at the position where `key` would be inserted
    pub fn find(&mut self, key: u32) -> Result<Cursor<'_, D>> {
        Cursor::table_find(self, key)
    }

    /// Look up a row by id
    pub fn get(&mut self, key: u32) -> Result<Option<Row>> {
        let mut cursor = self.find(key)?;
        if cursor.is_end_of_table() || cursor.key()? != key {
            return Ok(None);
        }
        cursor.value().map(Some)
    }

    /// Insert a row keyed by its id.
    ///
    /// Fails with `DuplicateKey` if the id is already present and with
    /// `NodeFull` once the root leaf holds `LEAF_NODE_MAX_CELLS` rows. A
    /// failed insert leaves the table untouched.
    pub fn insert(&mut self, row: &Row) -> Result<()> {
        let key = row.id;
        let mut cursor = self.find(key)?;

        if !cursor.is_end_of_table() && cursor.key()? == key {
            tracing::warn!(key, "rejected duplicate key");
            return Err(StorageError::DuplicateKey(key));
        }

        cursor.insert(key, row).inspect_err(|e| {
            if matches!(e, StorageError::NodeFull { .. }) {
                tracing::warn!(key, "rejected insert into full leaf");
            }
        })
    }

    /// Iterate over all rows in ascending id order
    pub fn scan(&mut self) -> Result<Scan<'_, D>> {
        Ok(self.start()?.into_scan())
    }

    /// Number of cells in the root leaf
    pub fn leaf_cell_count(&mut self) -> Result<usize> {
        Ok(self.root_node()?.num_cells())
    }

    /// Keys of the root leaf, in stored order
    pub fn leaf_keys(&mut self) -> Result<Vec<u32>> {
        self.root_node()?.keys()
    }

    /// Structural snapshot of the root leaf
    pub fn leaf_snapshot(&mut self) -> Result<LeafSnapshot> {
        let page_id = self.root_page;
        let node = self.root_node()?;
        Ok(LeafSnapshot {
            page_id,
            node_type: node.node_type()?,
            is_root: node.is_root(),
            num_cells: node.num_cells(),
            max_cells: LEAF_NODE_MAX_CELLS,
            keys: node.keys()?,
        })
    }

    /// Page cache statistics
    pub fn stats(&self) -> TableStats {
        TableStats {
            page_count: self.pager.num_pages(),
            file_pages: self.pager.file_pages(),
            loaded_pages: self.pager.loaded_pages(),
            max_pages: self.pager.max_pages(),
        }
    }

    /// Flush every loaded page and close the file.
    ///
    /// Dropping an open table does the same, but can only log a failure.
    pub fn close(mut self) -> Result<()> {
        self.shutdown()
    }

    fn root_node(&mut self) -> Result<LeafNode<'_>> {
        let page = self.pager.get_page(self.root_page)?;
        Ok(LeafNode::new(page))
    }

    fn shutdown(&mut self) -> Result<()> {
        if self.closed {
            return Err(StorageError::TableClosed);
        }
        self.closed = true;
        self.pager.close()
    }
}

impl<D: DiskManager> Drop for Table<D> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.shutdown() {
            tracing::error!(error = %e, "failed to close table");
        }
    }
}

/// Structural snapshot of a leaf, for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafSnapshot {
    pub page_id: PageId,
    pub node_type: NodeType,
    pub is_root: bool,
    pub num_cells: usize,
    pub max_cells: usize,
    pub keys: Vec<u32>,
}

/// Page cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableStats {
    /// Pages on disk or touched in memory
    pub page_count: u32,
    /// Pages on disk at open time
    pub file_pages: u32,
    /// Pages currently resident
    pub loaded_pages: usize,
    /// Page cache ceiling
    pub max_pages: usize,
}
