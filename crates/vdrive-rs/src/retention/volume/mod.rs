//! Virtual drives: a flat logical byte space over an [`Array`] of stores.

pub mod linear;
pub mod mapper;
pub mod striped;

use std::time::Instant;

use crate::error::{DriveError, DriveResult};
use crate::metrics::{self, IoOpType};
use crate::retention::array::Array;
use crate::retention::volume::striped::StripedVolume;

/// The capability set shared by every drive layout.
///
/// All mutation goes through `&mut self`, so a write, its allocation and its parity
/// update form one exclusive critical section.
pub trait VirtualDrive: Send {
    /// Short name of the layout, used in logs and metrics.
    fn layout_name(&self) -> &'static str;

    /// Size of the logical address space in bytes.
    fn size_in_bytes(&self) -> usize;

    /// Whether the cell behind `address` holds no byte.
    ///
    /// # Errors
    /// Returns [`DriveError::AddressOutOfRange`] for an address past the end.
    fn is_free(&self, address: usize) -> DriveResult<bool>;

    /// Write `byte` at `address`, or at the first free address when `None`.
    ///
    /// Returns the address written.
    ///
    /// # Errors
    /// Returns [`DriveError::AddressOutOfRange`], [`DriveError::DriveFull`] or a
    /// layout-specific error.
    fn write(&mut self, byte: u8, address: Option<usize>) -> DriveResult<usize>;

    /// Read each address in order; an unwritten cell reads as `None`.
    ///
    /// # Errors
    /// Returns [`DriveError::AddressOutOfRange`] if any address is past the end,
    /// before anything is read.
    fn read_many(&self, addresses: &[usize]) -> DriveResult<Vec<Option<u8>>>;

    fn array(&self) -> &Array;

    /// # Errors
    /// Returns [`DriveError::UnknownDisk`] for an id the array does not hold.
    fn fail_disk(&mut self, i: usize) -> DriveResult<()>;

    /// # Errors
    /// Returns [`DriveError::UnknownDisk`] for an id the array does not hold.
    fn replace_disk(&mut self, i: usize) -> DriveResult<()>;

    fn disk_status_string(&self) -> String {
        self.array().status_string()
    }

    fn as_striped(&self) -> Option<&StripedVolume> {
        None
    }

    fn as_striped_mut(&mut self) -> Option<&mut StripedVolume> {
        None
    }
}

pub(crate) fn check_address(address: usize, size: usize) -> DriveResult<usize> {
    if address < size {
        Ok(address)
    } else {
        Err(DriveError::AddressOutOfRange { address, size })
    }
}

pub(crate) fn check_addresses(addresses: &[usize], size: usize) -> DriveResult<()> {
    addresses
        .iter()
        .try_for_each(|&a| check_address(a, size).map(|_| ()))
}

pub(crate) fn record_drive_op<T>(
    layout: &'static str,
    op: IoOpType,
    bytes: usize,
    started: Instant,
    res: &DriveResult<T>,
) {
    metrics::record_drive(layout, op, bytes, started, res.is_err());
}
