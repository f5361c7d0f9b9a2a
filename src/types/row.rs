//! Fixed-layout table record.
//!
//! Rows are stored verbatim in a leaf cell's value slot:
//!
//! ```text
//! Offset  Size  Description
//! 0       4     id (native byte order)
//! 4       33    username, NUL-padded
//! 37      256   email, NUL-padded
//! 293     3     padding to the 4-byte alignment of `id`
//! ```
//!
//! Because the id uses native byte order, files are only portable between
//! hosts with the same endianness.

use crate::error::{Result, StorageError};
use std::borrow::Cow;
use std::fmt;

/// Maximum username length in bytes
pub const COLUMN_USERNAME_SIZE: usize = 32;

/// Maximum email length in bytes
pub const COLUMN_EMAIL_SIZE: usize = 255;

pub const ID_SIZE: usize = std::mem::size_of::<u32>();
pub const USERNAME_SIZE: usize = COLUMN_USERNAME_SIZE + 1;
pub const EMAIL_SIZE: usize = COLUMN_EMAIL_SIZE + 1;

pub const ID_OFFSET: usize = 0;
pub const USERNAME_OFFSET: usize = ID_OFFSET + ID_SIZE;
pub const EMAIL_OFFSET: usize = USERNAME_OFFSET + USERNAME_SIZE;

const ROW_ALIGN: usize = std::mem::align_of::<u32>();

/// Serialized row size, rounded up to the alignment of the id
pub const ROW_SIZE: usize = (EMAIL_OFFSET + EMAIL_SIZE).div_ceil(ROW_ALIGN) * ROW_ALIGN;

/// A table record: an integer id plus two bounded text columns
#[derive(Clone, PartialEq, Eq)]
pub struct Row {
    /// Primary key
    pub id: u32,
    username: [u8; USERNAME_SIZE],
    email: [u8; EMAIL_SIZE],
}

impl Row {
    /// Build a row, rejecting text that does not fit its column
    pub fn new(id: u32, username: &str, email: &str) -> Result<Self> {
        let mut row = Self {
            id,
            username: [0u8; USERNAME_SIZE],
            email: [0u8; EMAIL_SIZE],
        };
        copy_field("username", username, &mut row.username, COLUMN_USERNAME_SIZE)?;
        copy_field("email", email, &mut row.email, COLUMN_EMAIL_SIZE)?;
        Ok(row)
    }

    /// Username text, up to the first NUL
    pub fn username(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(trim_nul(&self.username))
    }

    /// Email text, up to the first NUL
    pub fn email(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(trim_nul(&self.email))
    }

    /// Copy this row into a value slot of exactly `ROW_SIZE` bytes
    pub fn serialize_into(&self, dest: &mut [u8]) {
        debug_assert_eq!(dest.len(), ROW_SIZE);
        dest[ID_OFFSET..ID_OFFSET + ID_SIZE].copy_from_slice(&self.id.to_ne_bytes());
        dest[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE].copy_from_slice(&self.username);
        dest[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE].copy_from_slice(&self.email);
        dest[EMAIL_OFFSET + EMAIL_SIZE..ROW_SIZE].fill(0);
    }

    /// Read a row back out of a value slot of exactly `ROW_SIZE` bytes
    pub fn deserialize_from(src: &[u8]) -> Self {
        debug_assert_eq!(src.len(), ROW_SIZE);
        let mut id = [0u8; ID_SIZE];
        id.copy_from_slice(&src[ID_OFFSET..ID_OFFSET + ID_SIZE]);

        let mut username = [0u8; USERNAME_SIZE];
        username.copy_from_slice(&src[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE]);

        let mut email = [0u8; EMAIL_SIZE];
        email.copy_from_slice(&src[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE]);

        Self {
            id: u32::from_ne_bytes(id),
            username,
            email,
        }
    }
}

fn copy_field(field: &'static str, text: &str, dest: &mut [u8], max: usize) -> Result<()> {
    let bytes = text.as_bytes();
    if bytes.len() > max {
        return Err(StorageError::FieldTooLong {
            field,
            len: bytes.len(),
            max,
        });
    }
    dest[..bytes.len()].copy_from_slice(bytes);
    Ok(())
}

/// Stored text is not guaranteed to be NUL-terminated
fn trim_nul(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    &bytes[..end]
}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Row")
            .field("id", &self.id)
            .field("username", &self.username())
            .field("email", &self.email())
            .finish()
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.id, self.username(), self.email())
    }
}
