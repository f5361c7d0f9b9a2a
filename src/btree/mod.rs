//! Table and cursor.
//!
//! The table is a single leaf page at the root. Supported operations:
//! - Point lookups (get)
//! - Ordered insertion with duplicate rejection (insert)
//! - Full forward scans (scan)
//!
//! Multi-level traversal and node splitting are not implemented; they fail
//! with `Unimplemented` or `NodeFull` rather than degrading silently.

mod cursor;
mod table;

pub use cursor::{Cursor, Scan};
pub use table::{LeafSnapshot, Table, TableStats};
