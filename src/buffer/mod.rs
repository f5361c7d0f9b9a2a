//! Buffer layer: the in-memory page cache.
//!
//! Pages are loaded lazily, kept resident for the life of the table and
//! written back on close.

mod pager;

pub use pager::Pager;
