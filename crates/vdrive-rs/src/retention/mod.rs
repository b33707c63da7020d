//! Retention layer primitives for stores, store arrays, address mappings and virtual drives.

pub mod array;
pub mod disk;
pub mod mapping;
pub mod volume;
