use crate::error::DriveError;
use crate::retention::array::Array;
use crate::retention::disk::DiskState;

#[test]
fn new_array_holds_one_disk_per_capacity() {
    let a = Array::new(&[16, 32, 8]);
    assert_eq!(a.len(), 3);
    assert!(!a.is_empty());
    assert_eq!(a.capacities(), vec![16, 32, 8]);
    assert_eq!(a.total_capacity(), 56);
    assert!(a.offline_disks().is_empty());
}

#[test]
fn uniform_array_shares_capacity() {
    let a = Array::uniform(4, 64);
    assert_eq!(a.capacities(), vec![64; 4]);
    assert_eq!(a.total_capacity(), 256);
}

#[test]
fn reads_and_writes_target_the_named_disk() {
    let mut a = Array::uniform(3, 8);
    a.write(1, 5, 0xAB).unwrap();

    assert_eq!(a.read(1, 5).unwrap(), Some(0xAB));
    assert_eq!(a.read(0, 5).unwrap(), None);
    assert_eq!(a.read(2, 5).unwrap(), None);
    assert!(!a.is_free(1, 5).unwrap());
    assert!(a.is_free(0, 5).unwrap());
}

#[test]
fn unknown_disk_ids_are_rejected() {
    let mut a = Array::uniform(2, 8);
    assert_eq!(a.read(2, 0), Err(DriveError::UnknownDisk(2)));
    assert_eq!(a.write(5, 0, 1), Err(DriveError::UnknownDisk(5)));
    assert_eq!(a.fail_disk(2), Err(DriveError::UnknownDisk(2)));
    assert_eq!(a.replace_disk(9), Err(DriveError::UnknownDisk(9)));
    assert!(a.disk(3).is_err());
}

#[test]
fn out_of_range_offsets_surface_from_the_disk() {
    let mut a = Array::uniform(2, 8);
    assert_eq!(
        a.write(0, 8, 1),
        Err(DriveError::OutOfRange {
            offset: 8,
            capacity: 8
        })
    );
}

#[test]
fn fail_and_replace_update_state_and_status() {
    let mut a = Array::uniform(3, 4);
    a.write(0, 0, 1).unwrap();
    a.write(2, 1, 2).unwrap();

    a.fail_disk(1).unwrap();
    assert_eq!(a.offline_disks(), vec![1]);
    assert_eq!(a.disk(1).unwrap().state(), DiskState::Offline);

    a.replace_disk(2).unwrap();
    assert_eq!(a.offline_disks(), vec![1, 2]);
    assert_eq!(a.disk(2).unwrap().occupied(), 0);

    let status = a.status_string();
    let lines: Vec<&str> = status.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "disk 0: ONLINE (capacity=4, occupied=1)");
    assert_eq!(lines[1], "disk 1: OFFLINE (capacity=4, occupied=0)");
    assert_eq!(lines[2], "disk 2: NEEDS_REBUILD (capacity=4, occupied=0)");

    a.mark_online(2).unwrap();
    assert_eq!(a.offline_disks(), vec![1]);
}
