//! Storage layer: page-granular disk I/O.
//!
//! The backing file is a flat array of pages with no file header: page `n`
//! lives at byte offset `n * PAGE_SIZE`, and page 0 is the root.

mod disk_manager;

pub use disk_manager::{DiskManager, FileDiskManager};
