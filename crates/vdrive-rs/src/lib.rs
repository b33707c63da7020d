//! Virtual drives over fixed-capacity physical stores.
//!
//! A [`retention::volume::VirtualDrive`] exposes a flat byte address space. Two layouts
//! are provided: [`retention::volume::linear::LinearVolume`] concatenates its stores and
//! [`retention::volume::striped::StripedVolume`] spreads data across them with rotating
//! XOR parity so any single store can be lost and rebuilt.
#![allow(clippy::cargo_common_metadata)]

pub mod allocator;
pub mod config;
pub mod error;
pub mod filesystem;
pub mod layout;
pub mod metrics;
pub mod retention;

pub use error::{DriveError, DriveResult};
