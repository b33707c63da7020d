#[cfg(test)]
mod array_tests;

use std::fmt::Write;

use tracing::info;

use crate::error::{DriveError, DriveResult};
use crate::metrics::{self, IoOpType};
use crate::retention::disk::Disk;

/// Owns every physical store of a drive. Stores are addressed by their index.
#[derive(Clone, Debug)]
pub struct Array(Vec<Disk>);

impl Array {
    #[must_use]
    pub fn new(capacities: &[usize]) -> Self {
        Self(capacities.iter().map(|&c| Disk::new(c)).collect())
    }

    #[must_use]
    pub fn uniform(disks: usize, capacity: usize) -> Self {
        Self((0..disks).map(|_| Disk::new(capacity)).collect())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn disks(&self) -> impl Iterator<Item = &Disk> {
        self.0.iter()
    }

    /// # Errors
    /// Returns [`DriveError::UnknownDisk`] for an id the array does not hold.
    pub fn disk(&self, id: usize) -> DriveResult<&Disk> {
        self.0.get(id).ok_or(DriveError::UnknownDisk(id))
    }

    fn disk_mut(&mut self, id: usize) -> DriveResult<&mut Disk> {
        self.0.get_mut(id).ok_or(DriveError::UnknownDisk(id))
    }

    #[must_use]
    pub fn capacities(&self) -> Vec<usize> {
        self.0.iter().map(Disk::capacity).collect()
    }

    #[must_use]
    pub fn total_capacity(&self) -> usize {
        self.0.iter().map(Disk::capacity).sum()
    }

    /// Ids of stores currently offline.
    #[must_use]
    pub fn offline_disks(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, d)| !d.is_online())
            .map(|(i, _)| i)
            .collect()
    }

    /// # Errors
    /// Returns an error for an unknown store or an offset beyond its capacity.
    pub fn read(&self, id: usize, off: usize) -> DriveResult<Option<u8>> {
        let res = self.disk(id)?.read_at(off);
        metrics::record_disk(id, IoOpType::Read, res.is_err());
        res
    }

    /// # Errors
    /// Returns an error for an unknown store or an offset beyond its capacity.
    pub fn write(&mut self, id: usize, off: usize, byte: u8) -> DriveResult<()> {
        let res = self.disk_mut(id)?.write_at(off, byte);
        metrics::record_disk(id, IoOpType::Write, res.is_err());
        res
    }

    /// # Errors
    /// Returns an error for an unknown store or an offset beyond its capacity.
    pub fn is_free(&self, id: usize, off: usize) -> DriveResult<bool> {
        self.disk(id)?.is_free(off)
    }

    /// Take a store offline (simulated failure).
    ///
    /// # Errors
    /// Returns [`DriveError::UnknownDisk`] for an id the array does not hold.
    pub fn fail_disk(&mut self, id: usize) -> DriveResult<()> {
        self.disk_mut(id)?.fail();
        info!(disk = id, "disk marked offline");
        Ok(())
    }

    /// Replace a store with a blank one (hot-swap). Contents must be rebuilt.
    ///
    /// # Errors
    /// Returns [`DriveError::UnknownDisk`] for an id the array does not hold.
    pub fn replace_disk(&mut self, id: usize) -> DriveResult<()> {
        self.disk_mut(id)?.replace();
        info!(disk = id, "disk replaced, awaiting rebuild");
        Ok(())
    }

    pub(crate) fn mark_online(&mut self, id: usize) -> DriveResult<()> {
        self.disk_mut(id)?.mark_online();
        info!(disk = id, "disk back online");
        Ok(())
    }

    #[must_use]
    pub fn status_string(&self) -> String {
        let mut out = String::new();
        for (i, d) in self.0.iter().enumerate() {
            let state = if d.needs_rebuild {
                "NEEDS_REBUILD"
            } else if d.is_online() {
                "ONLINE"
            } else {
                "OFFLINE"
            };
            let _ = writeln!(
                out,
                "disk {i}: {state} (capacity={}, occupied={})",
                d.capacity(),
                d.occupied()
            );
        }
        out
    }
}
