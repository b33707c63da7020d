//! XOR parity helpers and the rotating parity placement rule.


/// `parity_disk` returns the store holding parity for a stripe.
///
/// Parity walks backwards one store per stripe, starting on the last store, so with
/// `disk_count` stripes every store holds parity exactly once.
///
/// # Arguments
/// * `stripe_index` - Index of the stripe.
/// * `disk_count` - Number of stores in the array (non-zero).
#[inline]
#[must_use]
pub const fn parity_disk(stripe_index: usize, disk_count: usize) -> usize {
    (disk_count - 1) - (stripe_index % disk_count)
}

/// `xor_bytes` folds cells into their XOR, reading an empty cell as zero.
#[inline]
pub fn xor_bytes<I>(cells: I) -> u8
where
    I: IntoIterator<Item = Option<u8>>,
{
    cells.into_iter().fold(0, |acc, b| acc ^ b.unwrap_or(0))
}

/// `recover_lost` rebuilds `values[lost]` from the surviving values and their parity.
///
/// # Arguments
/// * `values` - Every member's value, including the lost one (ignored).
/// * `parity` - XOR of all of `values`.
/// * `lost` - Index of the member to recover.
#[must_use]
pub fn recover_lost(values: &[u8], parity: u8, lost: usize) -> u8 {
    values
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != lost)
        .fold(parity, |acc, (_, &v)| acc ^ v)
}
