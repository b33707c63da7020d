//! First-fit allocation over a drive's logical address space.

use tracing::debug;

use crate::error::{DriveError, DriveResult};
use crate::retention::volume::VirtualDrive;

/// `find_first_free` returns the lowest logical address whose cell is free.
///
/// This is a pure query; the caller performs the write.
///
/// # Errors
/// Returns [`DriveError::DriveFull`] if every address is taken.
pub fn find_first_free<V: VirtualDrive + ?Sized>(drive: &V) -> DriveResult<usize> {
    for address in 0..drive.size_in_bytes() {
        if drive.is_free(address)? {
            debug!(address, layout = drive.layout_name(), "allocated");
            return Ok(address);
        }
    }
    Err(DriveError::DriveFull)
}
