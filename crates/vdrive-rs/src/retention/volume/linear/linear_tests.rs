use super::*;

#[test]
fn size_is_sum_of_capacities() {
    assert_eq!(
        LinearVolume::with_capacities(&[1024]).unwrap().size_in_bytes(),
        1024
    );
    assert_eq!(
        LinearVolume::with_capacities(&[4, 8, 2]).unwrap().size_in_bytes(),
        14
    );
}

#[test]
fn rejects_empty_and_zero_capacity_arrays() {
    assert!(matches!(
        LinearVolume::with_capacities(&[]),
        Err(DriveError::Configuration(_))
    ));
    assert!(matches!(
        LinearVolume::with_capacities(&[4, 0]),
        Err(DriveError::Configuration(_))
    ));
}

#[test]
fn sequential_allocation_yields_increasing_addresses() {
    let mut v = LinearVolume::with_capacities(&[4, 4]).unwrap();
    let addrs: Vec<usize> = (0..8u8).map(|b| v.write(b, None).unwrap()).collect();
    assert_eq!(addrs, (0..8).collect::<Vec<_>>());
    assert_eq!(v.write(9, None), Err(DriveError::DriveFull));

    let read = v.read_many(&addrs).unwrap();
    assert_eq!(read, (0..8u8).map(Some).collect::<Vec<_>>());
}

#[test]
fn allocation_spans_into_the_next_disk() {
    let mut v = LinearVolume::with_capacities(&[2, 3]).unwrap();
    for b in 0..3u8 {
        v.write(b, None).unwrap();
    }
    assert_eq!(v.array().read(0, 1).unwrap(), Some(1));
    assert_eq!(v.array().read(1, 0).unwrap(), Some(2));
}

#[test]
fn explicit_address_overwrites_in_place() {
    let mut v = LinearVolume::with_capacities(&[8]).unwrap();
    let a = v.write(b'a', None).unwrap();
    let b = v.write(b'b', None).unwrap();

    assert_eq!(v.write(b'z', Some(a)).unwrap(), a);
    assert_eq!(v.read_many(&[a, b]).unwrap(), vec![Some(b'z'), Some(b'b')]);
    assert_eq!(v.write(b'c', None).unwrap(), 2, "overwrite must not allocate");
}

#[test]
fn explicit_write_to_a_gap_is_reused_by_nothing_else() {
    let mut v = LinearVolume::with_capacities(&[4]).unwrap();
    v.write(1, Some(2)).unwrap();
    let addrs: Vec<usize> = (0..3u8).map(|b| v.write(b, None).unwrap()).collect();
    assert_eq!(addrs, vec![0, 1, 3]);
}

#[test]
fn out_of_range_addresses_are_rejected() {
    let mut v = LinearVolume::with_capacities(&[4]).unwrap();
    let err = DriveError::AddressOutOfRange {
        address: 4,
        size: 4,
    };
    assert_eq!(v.write(1, Some(4)), Err(err.clone()));
    assert_eq!(v.read_many(&[0, 4]), Err(err.clone()));
    assert_eq!(v.is_free(4), Err(err));
    assert!(v.is_free(0).unwrap(), "failed write must not touch any cell");
}

#[test]
fn unwritten_cells_read_as_empty() {
    let v = LinearVolume::with_capacities(&[4]).unwrap();
    assert_eq!(v.read_many(&[3, 0]).unwrap(), vec![None, None]);
    assert_eq!(v.read_many(&[]).unwrap(), Vec::<Option<u8>>::new());
}

#[test]
fn offline_disks_do_not_block_linear_io() {
    let mut v = LinearVolume::with_capacities(&[4]).unwrap();
    let a = v.write(7, None).unwrap();
    v.fail_disk(0).unwrap();
    assert_eq!(v.read_many(&[a]).unwrap(), vec![Some(7)]);
    assert!(v.as_striped().is_none());
    assert!(v.disk_status_string().contains("OFFLINE"));
}

#[test]
fn replaced_disk_comes_back_empty_and_online() {
    let mut v = LinearVolume::with_capacities(&[2, 2]).unwrap();
    for b in 0..4u8 {
        v.write(b, None).unwrap();
    }
    v.fail_disk(1).unwrap();
    v.replace_disk(1).unwrap();

    let disk = v.array().disk(1).unwrap();
    assert!(disk.is_online());
    assert!(!disk.needs_rebuild);
    assert!(v.disk_status_string().contains("disk 1: ONLINE"));
    assert_eq!(v.read_many(&[1, 2, 3]).unwrap(), vec![Some(1), None, None]);
    assert_eq!(v.write(9, None).unwrap(), 2);
}
