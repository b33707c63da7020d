//! Error types for physical store and virtual drive operations.

/// Errors raised by stores, mappings and virtual drives.
///
/// A failed operation never leaves a store or a stripe's parity half-updated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DriveError {
    /// An offset beyond a physical store's capacity.
    #[error("offset {offset} out of range for store of capacity {capacity}")]
    OutOfRange {
        /// Requested offset.
        offset: usize,
        /// Capacity of the store.
        capacity: usize,
    },

    /// A logical address beyond a virtual drive's size.
    #[error("address {address} out of range for drive of {size} bytes")]
    AddressOutOfRange {
        /// Requested logical address.
        address: usize,
        /// Size of the drive in bytes.
        size: usize,
    },

    /// No free logical address remains.
    #[error("drive is full")]
    DriveFull,

    /// Invalid store count / capacity combination.
    #[error("invalid drive configuration: {0}")]
    Configuration(String),

    /// A write targeted a data cell whose store is offline.
    #[error("write to address {address} rejected: disk {disk} is offline")]
    DegradedWriteRejected {
        /// Store holding the targeted cell.
        disk: usize,
        /// Logical address of the write.
        address: usize,
    },

    /// More than one store of a stripe is offline.
    #[error("stripe {stripe} has lost disks {offline:?}; data cannot be reconstructed")]
    UnrecoverableLoss {
        /// Index of the affected stripe.
        stripe: usize,
        /// Offline store ids within that stripe.
        offline: Vec<usize>,
    },

    /// A store id the array does not hold.
    #[error("disk index out of range: {0}")]
    UnknownDisk(usize),
}

pub type DriveResult<T> = Result<T, DriveError>;
