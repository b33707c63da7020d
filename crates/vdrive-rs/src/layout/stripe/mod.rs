//! Stripe layout for the striped drive.


use crate::error::{DriveError, DriveResult};
use crate::layout::parity::{parity_disk, xor_bytes};
use crate::retention::array::Array;
use crate::retention::mapping::AddressMapping;

/// One offset of a stripe across every store: the data cells and their parity cell.
#[derive(Clone, Debug)]
pub struct StripeRow {
    /// Data cells in ascending store order, skipping the parity holder.
    pub data: Vec<AddressMapping>,
    pub parity: AddressMapping,
}

impl StripeRow {
    /// Every cell of the row, data first then parity.
    pub fn members(&self) -> impl Iterator<Item = &AddressMapping> {
        self.data.iter().chain(std::iter::once(&self.parity))
    }

    /// The row's cell on store `disk`, if any.
    #[must_use]
    pub fn member_on(&self, disk: usize) -> Option<&AddressMapping> {
        self.members().find(|m| m.disk() == disk)
    }

    /// `compute_parity` XORs the current data cells of the row.
    ///
    /// # Errors
    /// Propagates store read errors.
    pub fn compute_parity(&self, array: &Array) -> DriveResult<u8> {
        let cells = self
            .data
            .iter()
            .map(|m| m.read(array))
            .collect::<DriveResult<Vec<_>>>()?;
        Ok(xor_bytes(cells))
    }

    /// `reconstruct` recovers the cell held on `disk` by XORing every other cell of the row.
    ///
    /// Works for data and parity cells alike, since parity is the XOR of the data.
    ///
    /// # Errors
    /// Propagates store read errors.
    pub fn reconstruct(&self, array: &Array, disk: usize) -> DriveResult<u8> {
        let cells = self
            .members()
            .filter(|m| m.disk() != disk)
            .map(|m| m.read(array))
            .collect::<DriveResult<Vec<_>>>()?;
        Ok(xor_bytes(cells))
    }

    /// `write_parity` stores the XOR of the data cells in the parity cell.
    ///
    /// # Errors
    /// Propagates store read/write errors.
    pub fn write_parity(&self, array: &mut Array) -> DriveResult<u8> {
        let p = self.compute_parity(array)?;
        self.parity.write(array, p)?;
        Ok(p)
    }
}

/// A block-sized band of offsets, identical on every store, with one parity holder.
#[derive(Clone, Debug)]
pub struct Stripe {
    index: usize,
    parity_disk: usize,
    rows: Vec<StripeRow>,
}

impl Stripe {
    /// `build` binds the mappings of stripe `index` over offsets
    /// `index * block_size .. (index + 1) * block_size` on every store of `array`.
    ///
    /// # Errors
    /// Returns an error if the array has fewer than two stores or a mapping falls
    /// outside a store.
    pub fn build(index: usize, block_size: usize, array: &Array) -> DriveResult<Self> {
        let disks = array.len();
        if disks < 2 {
            return Err(DriveError::Configuration(format!(
                "a stripe needs at least 2 disks, got {disks}"
            )));
        }
        let parity_disk = parity_disk(index, disks);
        let start = index * block_size;

        let mut rows = Vec::with_capacity(block_size);
        for offset in start..start + block_size {
            let parity = AddressMapping::bind(array, parity_disk, offset)?;
            let data = (0..disks)
                .filter(|&d| d != parity_disk)
                .map(|d| AddressMapping::bind(array, d, offset))
                .collect::<DriveResult<Vec<_>>>()?;
            rows.push(StripeRow { data, parity });
        }

        Ok(Self {
            index,
            parity_disk,
            rows,
        })
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn parity_disk(&self) -> usize {
        self.parity_disk
    }

    #[must_use]
    pub fn rows(&self) -> &[StripeRow] {
        &self.rows
    }

    #[must_use]
    pub fn row(&self, r: usize) -> Option<&StripeRow> {
        self.rows.get(r)
    }
}
