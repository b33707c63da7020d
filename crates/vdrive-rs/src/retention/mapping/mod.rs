//! Binding of one logical byte to one cell of one physical store.

use crate::error::{DriveError, DriveResult};
use crate::retention::array::Array;

/// A non-owning handle to one cell: the store id plus the offset within it.
///
/// Several mappings may name the same store; the [`Array`] owns the storage.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AddressMapping {
    disk: usize,
    offset: usize,
}

impl AddressMapping {
    /// Bind to `offset` on store `disk`, checking both against the array.
    ///
    /// # Errors
    /// Returns [`DriveError::UnknownDisk`] or [`DriveError::OutOfRange`].
    pub fn bind(array: &Array, disk: usize, offset: usize) -> DriveResult<Self> {
        let capacity = array.disk(disk)?.capacity();
        if offset >= capacity {
            return Err(DriveError::OutOfRange { offset, capacity });
        }
        Ok(Self { disk, offset })
    }

    #[must_use]
    pub const fn disk(&self) -> usize {
        self.disk
    }

    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// # Errors
    /// Propagates the underlying store's error.
    pub fn read(&self, array: &Array) -> DriveResult<Option<u8>> {
        array.read(self.disk, self.offset)
    }

    /// # Errors
    /// Propagates the underlying store's error.
    pub fn write(&self, array: &mut Array, byte: u8) -> DriveResult<()> {
        array.write(self.disk, self.offset, byte)
    }

    /// # Errors
    /// Propagates the underlying store's error.
    pub fn is_free(&self, array: &Array) -> DriveResult<bool> {
        array.is_free(self.disk, self.offset)
    }
}
