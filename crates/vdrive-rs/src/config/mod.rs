//! Construction parameters for virtual drives.


use crate::error::DriveResult;
use crate::retention::array::Array;
use crate::retention::volume::VirtualDrive;
use crate::retention::volume::linear::LinearVolume;
use crate::retention::volume::mapper::{linear_size, striped_geometry};
use crate::retention::volume::striped::StripedVolume;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Layout {
    /// Stores concatenated end to end.
    #[default]
    Linear,
    /// Rotating-parity striping across equal stores.
    Striped,
}

/// Store count and capacities for one drive, plus its layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DriveConfig {
    pub layout: Layout,
    pub capacities: Vec<usize>,
}

impl DriveConfig {
    #[must_use]
    pub fn uniform(layout: Layout, disks: usize, capacity: usize) -> Self {
        Self {
            layout,
            capacities: vec![capacity; disks],
        }
    }

    /// # Errors
    /// Returns [`crate::DriveError::Configuration`] when the stores cannot form the layout.
    pub fn validate(&self) -> DriveResult<()> {
        match self.layout {
            Layout::Linear => linear_size(&self.capacities).map(|_| ()),
            Layout::Striped => striped_geometry(&self.capacities).map(|_| ()),
        }
    }

    /// Logical size the configured drive would expose.
    ///
    /// # Errors
    /// See [`DriveConfig::validate`].
    pub fn size_in_bytes(&self) -> DriveResult<usize> {
        match self.layout {
            Layout::Linear => linear_size(&self.capacities),
            Layout::Striped => Ok(striped_geometry(&self.capacities)?.size_in_bytes()),
        }
    }

    /// # Errors
    /// See [`DriveConfig::validate`].
    pub fn build(&self) -> DriveResult<Box<dyn VirtualDrive>> {
        self.validate()?;
        let array = Array::new(&self.capacities);
        Ok(match self.layout {
            Layout::Linear => Box::new(LinearVolume::new(array)?),
            Layout::Striped => Box::new(StripedVolume::new(array)?),
        })
    }
}
