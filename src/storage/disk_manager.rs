//! Disk manager implementation.
//!
//! The disk manager is responsible for reading and writing whole pages to the
//! database file. It sits behind a trait so the page cache can be tested
//! against an in-memory store.

use crate::error::{Result, StorageError};
use crate::page::PageBuf;
use crate::types::{PageId, PAGE_SIZE};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Trait for page-granular disk I/O
pub trait DiskManager {
    /// Number of whole pages present in the backing store at open time
    fn page_count(&self) -> u32;

    /// Read exactly one page into `buf`; a short read is an error
    fn read_page(&mut self, page_id: PageId, buf: &mut PageBuf) -> Result<()>;

    /// Write one full page
    fn write_page(&mut self, page_id: PageId, data: &[u8]) -> Result<()>;

    /// Make writes durable and release the backing store
    fn close(&mut self) -> Result<()>;
}

/// File-based disk manager implementation
pub struct FileDiskManager {
    path: PathBuf,
    /// `None` once closed
    file: Option<File>,
    /// Pages on disk when the file was opened
    page_count: u32,
    /// Whether to fsync on close
    sync_on_close: bool,
}

impl FileDiskManager {
    /// Open or create a database file.
    ///
    /// Files whose length is not a whole number of pages are refused.
    pub fn open(path: &Path, sync_on_close: bool) -> Result<Self> {
        let existed = path.exists();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let file_length = file.metadata()?.len();
        if file_length % PAGE_SIZE as u64 != 0 {
            return Err(StorageError::corrupt(format!(
                "{} is {} bytes, not a whole number of {}-byte pages",
                path.display(),
                file_length,
                PAGE_SIZE
            )));
        }

        let page_count = u32::try_from(file_length / PAGE_SIZE as u64).map_err(|_| {
            StorageError::corrupt(format!("{} has too many pages", path.display()))
        })?;

        if existed {
            tracing::info!(path = %path.display(), page_count, "opened database file");
        } else {
            tracing::info!(path = %path.display(), "created database file");
        }

        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
            page_count,
            sync_on_close,
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file(&mut self) -> Result<&mut File> {
        self.file.as_mut().ok_or(StorageError::TableClosed)
    }
}

impl DiskManager for FileDiskManager {
    fn page_count(&self) -> u32 {
        self.page_count
    }

    fn read_page(&mut self, page_id: PageId, buf: &mut PageBuf) -> Result<()> {
        let offset = page_id.file_offset(PAGE_SIZE);
        let file = self.file()?;
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf.as_bytes_mut())?;
        Ok(())
    }

    fn write_page(&mut self, page_id: PageId, data: &[u8]) -> Result<()> {
        if data.len() != PAGE_SIZE {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("page data must be {} bytes, got {}", PAGE_SIZE, data.len()),
            )));
        }

        let offset = page_id.file_offset(PAGE_SIZE);
        let file = self.file()?;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(data)?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let Some(mut file) = self.file.take() else {
            return Ok(());
        };
        file.flush()?;
        if self.sync_on_close {
            file.sync_all()?;
        }
        drop(file);
        tracing::info!(path = %self.path.display(), "closed database file");
        Ok(())
    }
}
