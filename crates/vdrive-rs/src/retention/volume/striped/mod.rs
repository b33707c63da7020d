//! RAID-5 style striping with rotating XOR parity.


use std::time::Instant;

use tracing::{debug, info, warn};

use crate::allocator::find_first_free;
use crate::error::{DriveError, DriveResult};
use crate::layout::parity::xor_bytes;
use crate::layout::stripe::{Stripe, StripeRow};
use crate::metrics::IoOpType;
use crate::retention::array::Array;
use crate::retention::mapping::AddressMapping;
use crate::retention::volume::mapper::{
    Geometry, Location, locate_striped, striped_address, striped_geometry,
};
use crate::retention::volume::{VirtualDrive, check_address, check_addresses, record_drive_op};

/// N equal stores split into N stripes, each with one parity holder.
///
/// For every row of every stripe the parity cell holds the XOR of the row's data
/// cells (empty reads as zero). Parity cells have no logical address.
///
/// Occupancy is tracked per logical address, since a reconstructed byte cannot
/// tell an empty cell from a zero.
pub struct StripedVolume {
    array: Array,
    geom: Geometry,
    stripes: Vec<Stripe>,
    written: Vec<bool>,
}

impl StripedVolume {
    /// Lay stripes over `array` and compute parity for every row from its current contents.
    ///
    /// # Errors
    /// Returns [`DriveError::Configuration`] if the capacities do not form a valid
    /// striped geometry or a store is offline.
    pub fn new(mut array: Array) -> DriveResult<Self> {
        let geom = striped_geometry(&array.capacities())?;
        let offline = array.offline_disks();
        if !offline.is_empty() {
            return Err(DriveError::Configuration(format!(
                "cannot build a striped volume with offline disks {offline:?}"
            )));
        }

        let stripes = (0..geom.stripes())
            .map(|s| Stripe::build(s, geom.block_size, &array))
            .collect::<DriveResult<Vec<_>>>()?;
        for row in stripes.iter().flat_map(Stripe::rows) {
            row.write_parity(&mut array)?;
        }
        let written = (0..geom.size_in_bytes())
            .map(|a| {
                let (_, _, target) = locate_in(&stripes, &geom, a)?;
                Ok(target.read(&array)?.is_some())
            })
            .collect::<DriveResult<Vec<_>>>()?;

        debug!(
            disks = geom.disks,
            block_size = geom.block_size,
            size = geom.size_in_bytes(),
            "striped volume ready"
        );
        Ok(Self {
            array,
            geom,
            stripes,
            written,
        })
    }

    /// # Errors
    /// See [`StripedVolume::new`].
    pub fn with_capacity(disks: usize, capacity: usize) -> DriveResult<Self> {
        Self::new(Array::uniform(disks, capacity))
    }

    #[must_use]
    pub const fn geometry(&self) -> &Geometry {
        &self.geom
    }

    #[must_use]
    pub fn stripes(&self) -> &[Stripe] {
        &self.stripes
    }

    /// The data cell behind `address` and the parity cell guarding it.
    ///
    /// # Errors
    /// Returns [`DriveError::AddressOutOfRange`] for an address past the end.
    pub fn mappings_for(&self, address: usize) -> DriveResult<(AddressMapping, AddressMapping)> {
        let (_, row, target) = locate_in(&self.stripes, &self.geom, address)?;
        Ok((target, row.parity))
    }

    /// Reconstruct store `id` from its stripe peers and bring it back online.
    ///
    /// Every parity cell on the store is rewritten; a data cell only if its address
    /// was ever written, so free addresses stay free. Returns the number of cells
    /// written. A store that is online and trusted is left alone.
    ///
    /// # Errors
    /// Returns [`DriveError::UnknownDisk`], or [`DriveError::UnrecoverableLoss`] if
    /// another store is offline too. Nothing is written on error.
    pub fn rebuild_disk(&mut self, id: usize) -> DriveResult<usize> {
        let disk = self.array.disk(id)?;
        if disk.is_online() && !disk.needs_rebuild {
            return Ok(0);
        }

        if let Some((stripe, offline)) = self.first_lost_row()? {
            warn!(disk = id, stripe, ?offline, "rebuild impossible, more than one disk offline");
            return Err(DriveError::UnrecoverableLoss { stripe, offline });
        }

        let mut pending = Vec::with_capacity(self.geom.disk_capacity);
        for stripe in &self.stripes {
            for (r, row) in stripe.rows().iter().enumerate() {
                let target = if row.parity.disk() == id {
                    row.parity
                } else {
                    let Some(slot) = row.data.iter().position(|m| m.disk() == id) else {
                        continue;
                    };
                    let loc = Location {
                        stripe: stripe.index(),
                        row: r,
                        slot,
                    };
                    if !self.written[striped_address(loc, &self.geom)] {
                        continue;
                    }
                    row.data[slot]
                };
                pending.push((target, row.reconstruct(&self.array, id)?));
            }
        }
        for (m, byte) in &pending {
            m.write(&mut self.array, *byte)?;
        }
        self.array.mark_online(id)?;

        info!(disk = id, cells = pending.len(), "rebuild complete");
        Ok(pending.len())
    }

    /// Rebuild every offline store.
    ///
    /// # Errors
    /// See [`StripedVolume::rebuild_disk`].
    pub fn rebuild_all(&mut self) -> DriveResult<usize> {
        let mut total = 0;
        for id in self.array.offline_disks() {
            total += self.rebuild_disk(id)?;
        }
        Ok(total)
    }

    /// First stripe holding a row with more than one offline member.
    fn first_lost_row(&self) -> DriveResult<Option<(usize, Vec<usize>)>> {
        for stripe in &self.stripes {
            for row in stripe.rows() {
                let offline = offline_members(&self.array, row)?;
                if offline.len() > 1 {
                    return Ok(Some((stripe.index(), offline)));
                }
            }
        }
        Ok(None)
    }

    /// `(stripe, offset)` of every fully-online row whose parity disagrees with its data.
    ///
    /// # Errors
    /// Propagates store read errors.
    pub fn verify_parity(&self) -> DriveResult<Vec<(usize, usize)>> {
        let mut bad = Vec::new();
        for stripe in &self.stripes {
            for row in stripe.rows() {
                if !offline_members(&self.array, row)?.is_empty() {
                    continue;
                }
                let expected = row.compute_parity(&self.array)?;
                if row.parity.read(&self.array)? != Some(expected) {
                    bad.push((stripe.index(), row.parity.offset()));
                }
            }
        }
        Ok(bad)
    }

    /// Rewrite parity for every fully-online row where it disagrees with the data.
    ///
    /// Returns how many parity cells were fixed.
    ///
    /// # Errors
    /// Propagates store read/write errors.
    pub fn scrub(&mut self) -> DriveResult<usize> {
        let mut fixed = 0;
        for stripe in &self.stripes {
            for row in stripe.rows() {
                if !offline_members(&self.array, row)?.is_empty() {
                    continue;
                }
                let expected = row.compute_parity(&self.array)?;
                if row.parity.read(&self.array)? != Some(expected) {
                    row.parity.write(&mut self.array, expected)?;
                    warn!(
                        stripe = stripe.index(),
                        offset = row.parity.offset(),
                        "scrub rewrote stale parity"
                    );
                    fixed += 1;
                }
            }
        }
        Ok(fixed)
    }

    fn write_byte(&mut self, byte: u8, address: Option<usize>) -> DriveResult<usize> {
        let address = match address {
            Some(a) => a,
            None => find_first_free(&*self)?,
        };
        let (stripe, row, target) = locate_in(&self.stripes, &self.geom, address)?;

        if !is_online(&self.array, target.disk())? {
            warn!(address, disk = target.disk(), "write rejected, disk offline");
            return Err(DriveError::DegradedWriteRejected {
                disk: target.disk(),
                address,
            });
        }

        // Work out the new parity before touching any cell.
        let offline = offline_members(&self.array, row)?;
        let parity = match offline.len() {
            0 => {
                let cells = row
                    .data
                    .iter()
                    .map(|m| {
                        if *m == target {
                            Ok(Some(byte))
                        } else {
                            m.read(&self.array)
                        }
                    })
                    .collect::<DriveResult<Vec<_>>>()?;
                Some(xor_bytes(cells))
            }
            // Parity holder is down; it is recomputed from the data on rebuild.
            1 if offline[0] == row.parity.disk() => None,
            // A data peer is down, so fold the change into the old parity.
            1 => {
                let old_parity = row.parity.read(&self.array)?.unwrap_or(0);
                let old = target.read(&self.array)?.unwrap_or(0);
                Some(old_parity ^ old ^ byte)
            }
            _ => {
                warn!(address, stripe, ?offline, "write rejected, stripe lost");
                return Err(DriveError::UnrecoverableLoss { stripe, offline });
            }
        };

        target.write(&mut self.array, byte)?;
        if let Some(p) = parity {
            row.parity.write(&mut self.array, p)?;
        }
        self.written[address] = true;
        debug!(
            address,
            stripe,
            disk = target.disk(),
            offset = target.offset(),
            parity = ?parity,
            "striped write"
        );
        Ok(address)
    }

    fn read_byte(&self, address: usize) -> DriveResult<Option<u8>> {
        let (stripe, row, target) = locate_in(&self.stripes, &self.geom, address)?;
        if is_online(&self.array, target.disk())? {
            return target.read(&self.array);
        }

        let offline = offline_members(&self.array, row)?;
        if offline.len() > 1 {
            warn!(address, stripe, ?offline, "read failed, stripe lost");
            return Err(DriveError::UnrecoverableLoss { stripe, offline });
        }
        if !self.written[address] {
            return Ok(None);
        }
        let byte = row.reconstruct(&self.array, target.disk())?;
        debug!(address, disk = target.disk(), byte, "degraded read reconstructed");
        Ok(Some(byte))
    }
}

impl VirtualDrive for StripedVolume {
    fn layout_name(&self) -> &'static str {
        "striped"
    }

    fn size_in_bytes(&self) -> usize {
        self.geom.size_in_bytes()
    }

    /// A cell on an offline store is never reported free.
    fn is_free(&self, address: usize) -> DriveResult<bool> {
        let (_, _, target) = locate_in(&self.stripes, &self.geom, address)?;
        Ok(is_online(&self.array, target.disk())? && !self.written[address])
    }

    fn write(&mut self, byte: u8, address: Option<usize>) -> DriveResult<usize> {
        let started = Instant::now();
        let res = self.write_byte(byte, address);
        record_drive_op(self.layout_name(), IoOpType::Write, 1, started, &res);
        res
    }

    fn read_many(&self, addresses: &[usize]) -> DriveResult<Vec<Option<u8>>> {
        let started = Instant::now();
        let res: DriveResult<Vec<Option<u8>>> = check_addresses(addresses, self.size_in_bytes())
            .and_then(|()| addresses.iter().map(|&a| self.read_byte(a)).collect());
        record_drive_op(
            self.layout_name(),
            IoOpType::Read,
            addresses.len(),
            started,
            &res,
        );
        res
    }

    fn array(&self) -> &Array {
        &self.array
    }

    fn fail_disk(&mut self, i: usize) -> DriveResult<()> {
        self.array.fail_disk(i)
    }

    fn replace_disk(&mut self, i: usize) -> DriveResult<()> {
        self.array.replace_disk(i)
    }

    fn as_striped(&self) -> Option<&StripedVolume> {
        Some(self)
    }

    fn as_striped_mut(&mut self) -> Option<&mut StripedVolume> {
        Some(self)
    }
}

fn locate_in<'a>(
    stripes: &'a [Stripe],
    geom: &Geometry,
    address: usize,
) -> DriveResult<(usize, &'a StripeRow, AddressMapping)> {
    let size = geom.size_in_bytes();
    check_address(address, size)?;
    let loc = locate_striped(address, geom);
    let row = stripes
        .get(loc.stripe)
        .and_then(|s| s.row(loc.row))
        .ok_or(DriveError::AddressOutOfRange { address, size })?;
    let target = *row
        .data
        .get(loc.slot)
        .ok_or(DriveError::AddressOutOfRange { address, size })?;
    Ok((loc.stripe, row, target))
}

fn is_online(array: &Array, disk: usize) -> DriveResult<bool> {
    Ok(array.disk(disk)?.is_online())
}

fn offline_members(array: &Array, row: &StripeRow) -> DriveResult<Vec<usize>> {
    let mut offline = Vec::new();
    for m in row.members() {
        if !is_online(array, m.disk())? {
            offline.push(m.disk());
        }
    }
    Ok(offline)
}
