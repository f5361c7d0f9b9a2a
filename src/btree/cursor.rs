//! Table cursor for search, scan and insert.
//!
//! A cursor is a `(page, cell)` position inside one table plus an
//! end-of-table flag. It borrows the table exclusively for as long as it
//! lives and reads the page through the page cache on every step, so it never
//! holds a page reference of its own.

use crate::btree::Table;
use crate::error::{Result, StorageError};
use crate::page::layout::LEAF_NODE_MAX_CELLS;
use crate::page::{LeafNode, LeafNodeMut};
use crate::storage::{DiskManager, FileDiskManager};
use crate::types::{NodeType, PageId, Row};

/// A position within a table
pub struct Cursor<'t, D: DiskManager = FileDiskManager> {
    table: &'t mut Table<D>,
    page_id: PageId,
    cell_num: usize,
    end_of_table: bool,
}

impl<'t, D: DiskManager> Cursor<'t, D> {
    /// Position at the first cell of the root leaf
    pub(crate) fn table_start(table: &'t mut Table<D>) -> Result<Self> {
        let page_id = table.root_page();
        let num_cells = {
            let node = leaf_node(table, page_id, "scanning an internal node")?;
            node.num_cells()
        };

        Ok(Self {
            table,
            page_id,
            cell_num: 0,
            end_of_table: num_cells == 0,
        })
    }

    /// Position at `key`, or where `key` would be inserted
    pub(crate) fn table_find(table: &'t mut Table<D>, key: u32) -> Result<Self> {
        let page_id = table.root_page();
        let (cell_num, num_cells) = {
            let node = leaf_node(table, page_id, "searching an internal node")?;
            (lower_bound(&node, key)?, node.num_cells())
        };

        Ok(Self {
            table,
            page_id,
            cell_num,
            end_of_table: cell_num >= num_cells,
        })
    }

    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    pub fn cell_num(&self) -> usize {
        self.cell_num
    }

    pub fn is_end_of_table(&self) -> bool {
        self.end_of_table
    }

    /// Key of the current cell
    pub fn key(&mut self) -> Result<u32> {
        if self.end_of_table {
            return Err(StorageError::EndOfTable);
        }
        let cell_num = self.cell_num;
        self.node()?.key(cell_num)
    }

    /// Row stored in the current cell
    pub fn value(&mut self) -> Result<Row> {
        if self.end_of_table {
            return Err(StorageError::EndOfTable);
        }
        let cell_num = self.cell_num;
        self.node()?.row(cell_num)
    }

    /// Step to the next cell in key order
    pub fn advance(&mut self) -> Result<()> {
        if self.end_of_table {
            return Ok(());
        }
        let num_cells = self.node()?.num_cells();
        self.cell_num += 1;
        if self.cell_num >= num_cells {
            self.end_of_table = true;
        }
        Ok(())
    }

    /// Insert `(key, row)` at the cursor's position.
    ///
    /// The cursor must come from [`Table::find`] for the same key; no
    /// duplicate check happens here. Consumes the cursor, since shifting
    /// cells invalidates every position in the leaf.
    pub fn insert(self, key: u32, row: &Row) -> Result<()> {
        let page_id = self.page_id;
        let cell_num = self.cell_num;

        let page = self.table.pager.get_page(page_id)?;
        let mut node = LeafNodeMut::new(page);
        if !node.as_leaf().node_type()?.is_leaf() {
            return Err(StorageError::unimplemented("inserting into an internal node"));
        }

        let num_cells = node.as_leaf().num_cells();
        if num_cells >= LEAF_NODE_MAX_CELLS {
            // TODO: split the leaf and promote a new root instead of refusing
            return Err(StorageError::NodeFull {
                page_id,
                max_cells: LEAF_NODE_MAX_CELLS,
            });
        }

        node.insert_cell(cell_num, key, row)?;
        tracing::debug!(key, %page_id, cell_num, "inserted cell");
        Ok(())
    }

    fn node(&mut self) -> Result<LeafNode<'_>> {
        let page = self.table.pager.get_page(self.page_id)?;
        Ok(LeafNode::new(page))
    }

    /// Turn the cursor into a forward-only row iterator
    pub fn into_scan(self) -> Scan<'t, D> {
        Scan {
            cursor: self,
            failed: false,
        }
    }
}

/// Load a page and make sure it is a leaf
fn leaf_node<'a, D: DiskManager>(
    table: &'a mut Table<D>,
    page_id: PageId,
    what: &str,
) -> Result<LeafNode<'a>> {
    let node = LeafNode::new(table.pager.get_page(page_id)?);
    match node.node_type()? {
        NodeType::Leaf => Ok(node),
        NodeType::Internal => Err(StorageError::unimplemented(what)),
    }
}

/// Binary search over the occupied cells of a leaf.
///
/// Returns the index of `key` if present, otherwise the index of the first
/// greater key, otherwise `num_cells`.
pub(crate) fn lower_bound(node: &LeafNode<'_>, key: u32) -> Result<usize> {
    let mut min_index = 0;
    let mut one_past_max_index = node.num_cells();

    while min_index != one_past_max_index {
        let index = min_index + (one_past_max_index - min_index) / 2;
        let key_at_index = node.key(index)?;
        if key == key_at_index {
            return Ok(index);
        }
        if key < key_at_index {
            one_past_max_index = index;
        } else {
            min_index = index + 1;
        }
    }

    Ok(min_index)
}

/// Lazy, forward-only iterator over the rows of a table in key order
pub struct Scan<'t, D: DiskManager = FileDiskManager> {
    cursor: Cursor<'t, D>,
    failed: bool,
}

impl<'t, D: DiskManager> Iterator for Scan<'t, D> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor.is_end_of_table() {
            return None;
        }

        let row = self
            .cursor
            .value()
            .and_then(|row| self.cursor.advance().map(|()| row));
        if row.is_err() {
            self.failed = true;
        }
        Some(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageBuf;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};
    use tempfile::tempdir;

    fn row(id: u32) -> Row {
        Row::new(id, &format!("user{id}"), &format!("user{id}@x")).unwrap()
    }

    fn leaf_with_keys(keys: &[u32]) -> PageBuf {
        let mut page = PageBuf::new();
        let mut node = LeafNodeMut::new(&mut page);
        node.initialize();
        for (i, &key) in keys.iter().enumerate() {
            node.insert_cell(i, key, &row(key)).unwrap();
        }
        page
    }

    #[test]
    fn test_lower_bound_empty() -> Result<()> {
        let page = leaf_with_keys(&[]);
        assert_eq!(lower_bound(&LeafNode::new(&page), 5)?, 0);
        Ok(())
    }

    #[test]
    fn test_lower_bound_positions() -> Result<()> {
        let page = leaf_with_keys(&[10, 20, 30, 40]);
        let node = LeafNode::new(&page);

        assert_eq!(lower_bound(&node, 5)?, 0);
        assert_eq!(lower_bound(&node, 10)?, 0);
        assert_eq!(lower_bound(&node, 25)?, 2);
        assert_eq!(lower_bound(&node, 40)?, 3);
        assert_eq!(lower_bound(&node, 41)?, 4);
        Ok(())
    }

    #[test]
    fn test_lower_bound_matches_linear_scan() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let len = rng.gen_range(0..=LEAF_NODE_MAX_CELLS);
            let mut keys: Vec<u32> = (0..len).map(|_| rng.gen_range(0..100)).collect();
            keys.sort_unstable();
            keys.dedup();

            let page = leaf_with_keys(&keys);
            let node = LeafNode::new(&page);
            for probe in 0..101 {
                let expected = keys.iter().position(|&k| k >= probe).unwrap_or(keys.len());
                assert_eq!(lower_bound(&node, probe)?, expected, "keys={keys:?} probe={probe}");
            }
        }
        Ok(())
    }

    #[test]
    fn test_start_of_empty_table() -> Result<()> {
        let dir = tempdir().unwrap();
        let mut table = Table::open(dir.path().join("test.db"))?;

        let mut cursor = table.start()?;
        assert!(cursor.is_end_of_table());
        assert!(matches!(cursor.value(), Err(StorageError::EndOfTable)));
        assert!(matches!(cursor.key(), Err(StorageError::EndOfTable)));
        Ok(())
    }

    #[test]
    fn test_advance_visits_cells_in_order() -> Result<()> {
        let dir = tempdir().unwrap();
        let mut table = Table::open(dir.path().join("test.db"))?;

        let mut ids: Vec<u32> = (1..=10).collect();
        ids.shuffle(&mut StdRng::seed_from_u64(11));
        for id in ids {
            table.insert(&row(id))?;
        }

        let mut cursor = table.start()?;
        let mut seen = Vec::new();
        while !cursor.is_end_of_table() {
            seen.push(cursor.key()?);
            cursor.advance()?;
        }
        assert_eq!(seen, (1..=10).collect::<Vec<_>>());
        assert_eq!(cursor.cell_num(), 10);

        // Advancing past the end stays put
        cursor.advance()?;
        assert_eq!(cursor.cell_num(), 10);
        Ok(())
    }

    #[test]
    fn test_find_sets_end_of_table_past_last_key() -> Result<()> {
        let dir = tempdir().unwrap();
        let mut table = Table::open(dir.path().join("test.db"))?;
        table.insert(&row(1))?;
        table.insert(&row(3))?;

        let mut cursor = table.find(2)?;
        assert_eq!(cursor.cell_num(), 1);
        assert!(!cursor.is_end_of_table());
        assert_eq!(cursor.key()?, 3);

        let cursor = table.find(9)?;
        assert_eq!(cursor.cell_num(), 2);
        assert!(cursor.is_end_of_table());
        assert_eq!(cursor.page_id(), PageId::ROOT);
        Ok(())
    }

    #[test]
    fn test_insert_at_cursor() -> Result<()> {
        let dir = tempdir().unwrap();
        let mut table = Table::open(dir.path().join("test.db"))?;
        table.insert(&row(10))?;
        table.insert(&row(30))?;

        let cursor = table.find(20)?;
        cursor.insert(20, &row(20))?;

        assert_eq!(table.leaf_keys()?, vec![10, 20, 30]);
        assert_eq!(table.get(20)?, Some(row(20)));
        Ok(())
    }

    #[test]
    fn test_scan_stops_after_first_error() -> Result<()> {
        let dir = tempdir().unwrap();
        let mut table = Table::open(dir.path().join("test.db"))?;
        for id in 1..=3 {
            table.insert(&row(id))?;
        }
        // Cell count claims more cells than a leaf can hold
        let page = table.pager.get_page(PageId::ROOT)?;
        LeafNodeMut::new(page).set_num_cells(LEAF_NODE_MAX_CELLS + 5);

        let mut scan = table.scan()?;
        for expected in 1..=3 {
            assert_eq!(scan.next().transpose()?.map(|r| r.id), Some(expected));
        }
        for _ in 3..LEAF_NODE_MAX_CELLS {
            assert!(matches!(scan.next(), Some(Ok(_))));
        }
        assert!(matches!(
            scan.next(),
            Some(Err(StorageError::CellOutOfRange { index: 13, .. }))
        ));
        assert!(scan.next().is_none());
        assert!(scan.next().is_none());
        Ok(())
    }
}
