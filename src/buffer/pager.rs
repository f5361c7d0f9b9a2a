//! Page cache implementation.
//!
//! The pager owns a fixed number of page slots. Each slot is loaded from disk
//! at most once, handed out by reference, and written back only on flush or
//! close. There is no eviction: asking for a page past the ceiling is an
//! error.

use crate::error::{Result, StorageError};
use crate::page::PageBuf;
use crate::storage::{DiskManager, FileDiskManager};
use crate::types::{PageId, TABLE_MAX_PAGES};

/// Fixed-capacity page cache over a disk manager
pub struct Pager<D: DiskManager = FileDiskManager> {
    /// The disk manager for I/O
    disk: D,
    /// One slot per page number; `None` means not yet loaded
    pages: Vec<Option<Box<PageBuf>>>,
    /// Highest page number ever touched, plus one
    num_pages: u32,
}

impl<D: DiskManager> Pager<D> {
    /// Create a pager with `max_pages` empty slots, clamped to
    /// `1..=TABLE_MAX_PAGES`
    pub fn new(disk: D, max_pages: usize) -> Self {
        let num_pages = disk.page_count();
        let max_pages = max_pages.clamp(1, TABLE_MAX_PAGES);
        Self {
            disk,
            pages: (0..max_pages).map(|_| None).collect(),
            num_pages,
        }
    }

    /// Fetch a page, loading it on first access.
    ///
    /// Pages within the file's extent are read from disk; pages past it start
    /// zeroed and are expected to be initialized by the caller.
    pub fn get_page(&mut self, page_id: PageId) -> Result<&mut PageBuf> {
        let index = page_id.index();
        if index >= self.pages.len() {
            return Err(StorageError::PageOutOfRange {
                page_id,
                max: self.pages.len(),
            });
        }

        if self.pages[index].is_none() {
            // Cache miss
            let page = self.load(page_id)?;
            self.pages[index] = Some(page);
            if page_id.value() >= self.num_pages {
                self.num_pages = page_id.value() + 1;
            }
        }

        self.pages[index]
            .as_deref_mut()
            .ok_or(StorageError::PageNotLoaded(page_id))
    }

    fn load(&mut self, page_id: PageId) -> Result<Box<PageBuf>> {
        let mut page = PageBuf::boxed();
        if page_id.value() < self.disk.page_count() {
            self.disk.read_page(page_id, &mut page)?;
            tracing::debug!(%page_id, "loaded page from disk");
        } else {
            tracing::debug!(%page_id, "allocated page past end of file");
        }
        Ok(page)
    }

    /// Write one loaded page back to disk
    pub fn flush(&mut self, page_id: PageId) -> Result<()> {
        let page = self
            .pages
            .get(page_id.index())
            .and_then(|slot| slot.as_deref())
            .ok_or(StorageError::PageNotLoaded(page_id))?;

        self.disk.write_page(page_id, page.as_bytes())?;
        tracing::debug!(%page_id, "flushed page");
        Ok(())
    }

    /// Flush and release every loaded page, then close the disk manager.
    ///
    /// A failed flush does not stop the others, and the disk manager is
    /// closed either way. The first error is returned; pages that failed to
    /// flush are dropped with it.
    pub fn close(&mut self) -> Result<()> {
        let mut first_err = None;
        for n in 0..self.num_pages {
            let page_id = PageId::new(n);
            if !self.is_loaded(page_id) {
                continue;
            }
            if let Err(e) = self.flush(page_id) {
                tracing::error!(%page_id, error = %e, "failed to flush page on close");
                first_err.get_or_insert(e);
            }
            self.pages[page_id.index()] = None;
        }

        let closed = self.disk.close();
        match first_err {
            Some(e) => Err(e),
            None => closed,
        }
    }

    /// Whether a page is resident
    pub fn is_loaded(&self, page_id: PageId) -> bool {
        matches!(self.pages.get(page_id.index()), Some(Some(_)))
    }

    /// Number of resident pages
    pub fn loaded_pages(&self) -> usize {
        self.pages.iter().filter(|slot| slot.is_some()).count()
    }

    /// Page count including pages touched in memory but not yet on disk
    pub fn num_pages(&self) -> u32 {
        self.num_pages
    }

    /// Pages present in the backing store when it was opened
    pub fn file_pages(&self) -> u32 {
        self.disk.page_count()
    }

    /// Page cache ceiling
    pub fn max_pages(&self) -> usize {
        self.pages.len()
    }

    /// Get the disk manager
    pub fn disk(&self) -> &D {
        &self.disk
    }
}
