//! Typed views over a raw leaf page.
//!
//! The views borrow a page buffer for the duration of one operation and
//! expose checked accessors; no offset arithmetic leaks past this module.

use crate::error::{Result, StorageError};
use crate::page::layout::*;
use crate::types::{NodeType, PageId, Row};

/// Read-only view of a leaf page
#[derive(Clone, Copy)]
pub struct LeafNode<'a> {
    data: &'a [u8],
}

impl<'a> LeafNode<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Decode the node type tag
    pub fn node_type(&self) -> Result<NodeType> {
        let tag = self.data[NODE_TYPE_OFFSET];
        NodeType::from_byte(tag)
            .ok_or_else(|| StorageError::corrupt(format!("unknown node type tag {tag:#04x}")))
    }

    pub fn is_root(&self) -> bool {
        self.data[IS_ROOT_OFFSET] != 0
    }

    pub fn parent_pointer(&self) -> PageId {
        PageId::new(read_u32(self.data, PARENT_POINTER_OFFSET))
    }

    /// Number of occupied cells
    pub fn num_cells(&self) -> usize {
        read_u32(self.data, LEAF_NODE_NUM_CELLS_OFFSET) as usize
    }

    /// Raw bytes of cell `index`, checked against the leaf's capacity
    pub fn cell(&self, index: usize) -> Result<&'a [u8]> {
        let start = cell_offset(index)?;
        Ok(&self.data[start..start + LEAF_NODE_CELL_SIZE])
    }

    pub fn key(&self, index: usize) -> Result<u32> {
        let cell = self.cell(index)?;
        Ok(read_u32(cell, LEAF_NODE_KEY_OFFSET))
    }

    /// Serialized row bytes of cell `index`
    pub fn value(&self, index: usize) -> Result<&'a [u8]> {
        let cell = self.cell(index)?;
        Ok(&cell[LEAF_NODE_VALUE_OFFSET..])
    }

    pub fn row(&self, index: usize) -> Result<Row> {
        Ok(Row::deserialize_from(self.value(index)?))
    }

    /// Keys of all occupied cells, in stored order
    pub fn keys(&self) -> Result<Vec<u32>> {
        (0..self.num_cells()).map(|i| self.key(i)).collect()
    }
}

/// Mutable view of a leaf page
pub struct LeafNodeMut<'a> {
    data: &'a mut [u8],
}

impl<'a> LeafNodeMut<'a> {
    pub fn new(data: &'a mut [u8]) -> Self {
        Self { data }
    }

    /// Reborrow as a read-only view
    pub fn as_leaf(&self) -> LeafNode<'_> {
        LeafNode::new(&*self.data)
    }

    /// Format the page as an empty, non-root leaf.
    ///
    /// Must run once on every new page before any other accessor is trusted.
    pub fn initialize(&mut self) {
        self.set_node_type(NodeType::Leaf);
        self.set_root(false);
        self.set_parent_pointer(PageId::ROOT);
        self.set_num_cells(0);
    }

    pub fn set_node_type(&mut self, node_type: NodeType) {
        self.data[NODE_TYPE_OFFSET] = node_type as u8;
    }

    pub fn set_root(&mut self, is_root: bool) {
        self.data[IS_ROOT_OFFSET] = is_root as u8;
    }

    pub fn set_parent_pointer(&mut self, parent: PageId) {
        write_u32(self.data, PARENT_POINTER_OFFSET, parent.value());
    }

    pub fn set_num_cells(&mut self, num_cells: usize) {
        write_u32(self.data, LEAF_NODE_NUM_CELLS_OFFSET, num_cells as u32);
    }

    pub fn cell_mut(&mut self, index: usize) -> Result<&mut [u8]> {
        let start = cell_offset(index)?;
        Ok(&mut self.data[start..start + LEAF_NODE_CELL_SIZE])
    }

    pub fn set_key(&mut self, index: usize, key: u32) -> Result<()> {
        let cell = self.cell_mut(index)?;
        write_u32(cell, LEAF_NODE_KEY_OFFSET, key);
        Ok(())
    }

    pub fn value_mut(&mut self, index: usize) -> Result<&mut [u8]> {
        let cell = self.cell_mut(index)?;
        Ok(&mut cell[LEAF_NODE_VALUE_OFFSET..])
    }

    /// Open a gap at `index` and write `(key, row)` into it.
    ///
    /// Cells at `index..num_cells` move one slot toward the tail. The caller
    /// guarantees there is room and that `key` sorts at `index`; no duplicate
    /// or ordering check happens here.
    pub fn insert_cell(&mut self, index: usize, key: u32, row: &Row) -> Result<()> {
        let num_cells = self.as_leaf().num_cells();
        if num_cells >= LEAF_NODE_MAX_CELLS {
            return Err(StorageError::CellOutOfRange {
                index: num_cells,
                max: LEAF_NODE_MAX_CELLS,
            });
        }
        if index > num_cells {
            return Err(StorageError::CellOutOfRange {
                index,
                max: num_cells,
            });
        }

        if index < num_cells {
            let start = LEAF_NODE_HEADER_SIZE + index * LEAF_NODE_CELL_SIZE;
            let end = LEAF_NODE_HEADER_SIZE + num_cells * LEAF_NODE_CELL_SIZE;
            // memmove: overlapping ranges are handled
            self.data.copy_within(start..end, start + LEAF_NODE_CELL_SIZE);
        }

        self.set_num_cells(num_cells + 1);
        self.set_key(index, key)?;
        row.serialize_into(self.value_mut(index)?);
        Ok(())
    }
}

fn cell_offset(index: usize) -> Result<usize> {
    if index >= LEAF_NODE_MAX_CELLS {
        return Err(StorageError::CellOutOfRange {
            index,
            max: LEAF_NODE_MAX_CELLS,
        });
    }
    Ok(LEAF_NODE_HEADER_SIZE + index * LEAF_NODE_CELL_SIZE)
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_ne_bytes(buf)
}

fn write_u32(bytes: &mut [u8], offset: usize, value: u32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_ne_bytes());
}
