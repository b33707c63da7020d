
use crate::error::{DriveError, DriveResult};

/// Operational state of a physical store.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DiskState {
    Online,
    Offline,
}

/// A fixed-capacity array of optional bytes standing in for one physical disk.
///
/// The state is advisory: reads and writes go through regardless of it, and the
/// layers above decide whether an offline store may be trusted.
#[derive(Clone, Debug)]
pub struct Disk {
    cells: Vec<Option<u8>>,
    state: DiskState,
    /// If true, the store came back empty and must be rebuilt before it is trusted again.
    pub needs_rebuild: bool,
}

impl Disk {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            cells: vec![None; capacity],
            state: DiskState::Online,
            needs_rebuild: false,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub const fn state(&self) -> DiskState {
        self.state
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        self.state == DiskState::Online
    }

    /// Number of cells holding a byte.
    #[must_use]
    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// # Errors
    /// Returns [`DriveError::OutOfRange`] if `off` is not below the capacity.
    pub fn read_at(&self, off: usize) -> DriveResult<Option<u8>> {
        self.cells
            .get(off)
            .copied()
            .ok_or(DriveError::OutOfRange {
                offset: off,
                capacity: self.capacity(),
            })
    }

    /// # Errors
    /// Returns [`DriveError::OutOfRange`] if `off` is not below the capacity.
    pub fn write_at(&mut self, off: usize, byte: u8) -> DriveResult<()> {
        let capacity = self.capacity();
        let cell = self.cells.get_mut(off).ok_or(DriveError::OutOfRange {
            offset: off,
            capacity,
        })?;
        *cell = Some(byte);
        Ok(())
    }

    /// # Errors
    /// Returns [`DriveError::OutOfRange`] if `off` is not below the capacity.
    pub fn is_free(&self, off: usize) -> DriveResult<bool> {
        self.read_at(off).map(|b| b.is_none())
    }

    /// Mark this store as failed. Its cells are kept but no longer trusted.
    pub fn fail(&mut self) {
        self.state = DiskState::Offline;
    }

    /// Swap in a blank store of the same capacity. It stays offline until rebuilt.
    pub fn replace(&mut self) {
        self.cells.fill(None);
        self.state = DiskState::Offline;
        self.needs_rebuild = true;
    }

    pub(crate) fn mark_online(&mut self) {
        self.state = DiskState::Online;
        self.needs_rebuild = false;
    }
}
