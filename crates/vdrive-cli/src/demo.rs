use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};
use vdrive_rs::filesystem::{ByteFs, MountTable};
use vdrive_rs::retention::volume::VirtualDrive;

use crate::cli::DemoArgs;

pub fn run(args: &DemoArgs) -> Result<()> {
    let config = args.drive.to_config();
    let drive = config.build().context("building drive")?;
    info!(
        layout = drive.layout_name(),
        disks = config.capacities.len(),
        size = drive.size_in_bytes(),
        "drive built"
    );

    let mut mounts = MountTable::new();
    mounts.mount(Path::new("/"), drive)?;
    let mut fs = ByteFs::new(mounts);

    let path = Path::new(&args.path);
    fs.append_line(path, "James")?;
    fs.append_line(path, "Carson")?;
    print_lines(&fs, path)?;

    let drive = fs
        .mounts_mut()
        .drive_mut("/")
        .context("root drive vanished")?;
    if drive.as_striped().is_none() {
        warn!("linear layout has no redundancy, skipping failure drill");
        return Ok(());
    }

    drive.fail_disk(args.fail_disk)?;
    drive.replace_disk(args.fail_disk)?;
    print!("{}", drive.disk_status_string());
    info!(disk = args.fail_disk, "reading with disk missing");
    print_lines(&fs, path)?;

    let drive = fs
        .mounts_mut()
        .drive_mut("/")
        .context("root drive vanished")?;
    let Some(striped) = drive.as_striped_mut() else {
        bail!("drive is no longer striped");
    };
    let cells = striped.rebuild_disk(args.fail_disk)?;
    let stale = striped.verify_parity()?;
    info!(disk = args.fail_disk, cells, stale_rows = stale.len(), "rebuilt");
    print!("{}", striped.disk_status_string());

    if !fs.verify(path)? {
        bail!("{} failed checksum verification after rebuild", args.path);
    }
    print_lines(&fs, path)
}

fn print_lines(fs: &ByteFs, path: &Path) -> Result<()> {
    for line in fs.lines(path)? {
        println!("{line}");
    }
    Ok(())
}
