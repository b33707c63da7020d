//! Linear concatenation of stores.

#[cfg(test)]
mod linear_tests;

use std::time::Instant;

use tracing::debug;

use crate::allocator::find_first_free;
use crate::error::{DriveError, DriveResult};
use crate::metrics::IoOpType;
use crate::retention::array::Array;
use crate::retention::mapping::AddressMapping;
use crate::retention::volume::mapper::{linear_size, linear_starts, locate_linear};
use crate::retention::volume::{VirtualDrive, check_address, check_addresses, record_drive_op};

/// Stores laid end to end: store 0's cells first, then store 1's, and so on.
///
/// There is no redundancy here, so store state is not consulted for I/O.
pub struct LinearVolume {
    array: Array,
    starts: Vec<usize>,
    capacities: Vec<usize>,
    size: usize,
}

impl LinearVolume {
    /// # Errors
    /// Returns [`DriveError::Configuration`] for an empty array or a zero-capacity store.
    pub fn new(array: Array) -> DriveResult<Self> {
        let capacities = array.capacities();
        let size = linear_size(&capacities)?;
        Ok(Self {
            starts: linear_starts(&capacities),
            size,
            capacities,
            array,
        })
    }

    /// # Errors
    /// See [`LinearVolume::new`].
    pub fn with_capacities(capacities: &[usize]) -> DriveResult<Self> {
        Self::new(Array::new(capacities))
    }

    fn mapping(&self, address: usize) -> DriveResult<AddressMapping> {
        let size = self.size;
        let (disk, offset) = locate_linear(address, &self.starts, &self.capacities)
            .ok_or(DriveError::AddressOutOfRange { address, size })?;
        AddressMapping::bind(&self.array, disk, offset)
    }

    fn write_byte(&mut self, byte: u8, address: Option<usize>) -> DriveResult<usize> {
        let address = match address {
            Some(a) => check_address(a, self.size)?,
            None => find_first_free(&*self)?,
        };
        let m = self.mapping(address)?;
        m.write(&mut self.array, byte)?;
        debug!(address, disk = m.disk(), offset = m.offset(), "linear write");
        Ok(address)
    }

    fn read_bytes(&self, addresses: &[usize]) -> DriveResult<Vec<Option<u8>>> {
        check_addresses(addresses, self.size)?;
        addresses
            .iter()
            .map(|&a| self.mapping(a)?.read(&self.array))
            .collect()
    }
}

impl VirtualDrive for LinearVolume {
    fn layout_name(&self) -> &'static str {
        "linear"
    }

    fn size_in_bytes(&self) -> usize {
        self.size
    }

    fn is_free(&self, address: usize) -> DriveResult<bool> {
        self.mapping(address)?.is_free(&self.array)
    }

    fn write(&mut self, byte: u8, address: Option<usize>) -> DriveResult<usize> {
        let started = Instant::now();
        let res = self.write_byte(byte, address);
        record_drive_op(self.layout_name(), IoOpType::Write, 1, started, &res);
        res
    }

    fn read_many(&self, addresses: &[usize]) -> DriveResult<Vec<Option<u8>>> {
        let started = Instant::now();
        let res = self.read_bytes(addresses);
        record_drive_op(
            self.layout_name(),
            IoOpType::Read,
            addresses.len(),
            started,
            &res,
        );
        res
    }

    fn array(&self) -> &Array {
        &self.array
    }

    fn fail_disk(&mut self, i: usize) -> DriveResult<()> {
        self.array.fail_disk(i)
    }

    /// The fresh store starts out empty and online; there is nothing to rebuild from.
    fn replace_disk(&mut self, i: usize) -> DriveResult<()> {
        self.array.replace_disk(i)?;
        self.array.mark_online(i)
    }
}
