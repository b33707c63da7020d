//! Mount table: which virtual drive backs which path prefix.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Result, anyhow, bail};
use tracing::info;

use crate::filesystem::normalize_components;
use crate::retention::volume::VirtualDrive;

/// Registry of mounted drives, keyed by normalized mount point (`/`, `/home`, ...).
///
/// Owned by its caller; dropping the table drops every mounted drive.
#[derive(Default)]
pub struct MountTable {
    mounts: HashMap<String, Box<dyn VirtualDrive>>,
}

impl MountTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// Fails if the mount point is malformed or already taken.
    pub fn mount(&mut self, mount_point: &Path, drive: Box<dyn VirtualDrive>) -> Result<()> {
        let key = mount_key(&normalize_components(mount_point)?);
        if self.mounts.contains_key(&key) {
            bail!("{key} is already mounted");
        }
        info!(
            mount_point = %key,
            layout = drive.layout_name(),
            size = drive.size_in_bytes(),
            "mounted drive"
        );
        self.mounts.insert(key, drive);
        Ok(())
    }

    /// # Errors
    /// Fails if nothing is mounted there.
    pub fn unmount(&mut self, mount_point: &Path) -> Result<Box<dyn VirtualDrive>> {
        let key = mount_key(&normalize_components(mount_point)?);
        self.mounts
            .remove(&key)
            .ok_or_else(|| anyhow!("{key} is not mounted"))
    }

    /// Mount point serving `path`: the longest mounted prefix, falling back to `/`.
    ///
    /// # Errors
    /// Fails if no prefix of `path` is mounted.
    pub fn resolve(&self, path: &Path) -> Result<String> {
        let components = normalize_components(path)?;
        for len in (0..=components.len()).rev() {
            let key = mount_key(&components[..len]);
            if self.mounts.contains_key(&key) {
                return Ok(key);
            }
        }
        bail!("no drive mounted for {}", path.display())
    }

    #[must_use]
    pub fn drive(&self, mount_point: &str) -> Option<&(dyn VirtualDrive + 'static)> {
        self.mounts.get(mount_point).map(AsRef::as_ref)
    }

    pub fn drive_mut(&mut self, mount_point: &str) -> Option<&mut (dyn VirtualDrive + 'static)> {
        self.mounts.get_mut(mount_point).map(AsMut::as_mut)
    }

    /// Mounted points in sorted order.
    #[must_use]
    pub fn mount_points(&self) -> Vec<&str> {
        let mut points: Vec<&str> = self.mounts.keys().map(String::as_str).collect();
        points.sort_unstable();
        points
    }
}

pub(crate) fn mount_key(components: &[String]) -> String {
    format!("/{}", components.join("/"))
}
