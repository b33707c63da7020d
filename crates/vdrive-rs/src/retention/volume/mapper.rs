//! Geometry helpers for mapping logical addresses to stores and stripes.

use crate::error::{DriveError, DriveResult};

/// Geometry describes how a striped drive lays bytes over its stores.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Geometry {
    pub disks: usize,
    pub disk_capacity: usize,
    /// Offsets per stripe on each store.
    pub block_size: usize,
    /// Data cells per row: every store but the parity holder.
    pub data_per_row: usize,
}

impl Geometry {
    /// Logical capacity: data cells only, parity excluded.
    #[must_use]
    pub const fn size_in_bytes(&self) -> usize {
        self.data_per_row * self.disk_capacity
    }

    #[must_use]
    pub const fn stripes(&self) -> usize {
        self.disks
    }
}

/// Where a logical address lives in a striped drive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    pub stripe: usize,
    /// Row within the stripe.
    pub row: usize,
    /// Index into the row's data cells.
    pub slot: usize,
}

/// `striped_geometry` validates store capacities for a striped drive.
///
/// There are as many stripes as stores, so the block size is `capacity / disks`.
///
/// # Errors
/// Returns [`DriveError::Configuration`] for fewer than two stores, unequal or
/// zero capacities, or a capacity not divisible by the store count.
pub fn striped_geometry(capacities: &[usize]) -> DriveResult<Geometry> {
    let disks = capacities.len();
    if disks < 2 {
        return Err(DriveError::Configuration(format!(
            "striped layout needs at least 2 disks, got {disks}"
        )));
    }
    let capacity = capacities[0];
    if capacities.iter().any(|&c| c != capacity) {
        return Err(DriveError::Configuration(format!(
            "striped layout needs equal disk capacities, got {capacities:?}"
        )));
    }
    if capacity == 0 {
        return Err(DriveError::Configuration(
            "disk capacity must be positive".to_string(),
        ));
    }
    if capacity % disks != 0 {
        return Err(DriveError::Configuration(format!(
            "disk capacity {capacity} is not divisible by disk count {disks}"
        )));
    }
    Ok(Geometry {
        disks,
        disk_capacity: capacity,
        block_size: capacity / disks,
        data_per_row: disks - 1,
    })
}

/// `locate_striped` maps a logical address to its stripe, row and data slot.
///
/// Consecutive addresses fill a row across its data stores before moving to the
/// next row; rows fill a stripe before moving to the next stripe.
#[must_use]
pub const fn locate_striped(address: usize, geom: &Geometry) -> Location {
    let global_row = address / geom.data_per_row;
    Location {
        stripe: global_row / geom.block_size,
        row: global_row % geom.block_size,
        slot: address % geom.data_per_row,
    }
}

/// `striped_address` is the inverse of [`locate_striped`].
#[must_use]
pub const fn striped_address(loc: Location, geom: &Geometry) -> usize {
    (loc.stripe * geom.block_size + loc.row) * geom.data_per_row + loc.slot
}

/// `linear_size` validates store capacities for a concatenation and returns its size.
///
/// # Errors
/// Returns [`DriveError::Configuration`] for no stores or a zero-capacity store.
pub fn linear_size(capacities: &[usize]) -> DriveResult<usize> {
    if capacities.is_empty() {
        return Err(DriveError::Configuration(
            "linear layout needs at least one disk".to_string(),
        ));
    }
    if let Some(i) = capacities.iter().position(|&c| c == 0) {
        return Err(DriveError::Configuration(format!(
            "disk {i} has zero capacity"
        )));
    }
    Ok(capacities.iter().sum())
}

/// `linear_starts` returns the first logical address of each store in a concatenation.
#[must_use]
pub fn linear_starts(capacities: &[usize]) -> Vec<usize> {
    capacities
        .iter()
        .scan(0usize, |next, &c| {
            let start = *next;
            *next += c;
            Some(start)
        })
        .collect()
}

/// `locate_linear` maps a logical address to `(disk, offset)` in a concatenation.
///
/// # Returns
/// `None` if the address is past the last store.
#[must_use]
pub fn locate_linear(address: usize, starts: &[usize], capacities: &[usize]) -> Option<(usize, usize)> {
    let disk = starts.partition_point(|&s| s <= address).checked_sub(1)?;
    let offset = address - starts[disk];
    (offset < capacities[disk]).then_some((disk, offset))
}
