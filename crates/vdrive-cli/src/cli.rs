use clap::{Args, Parser, Subcommand, ValueEnum};
use vdrive_rs::config::{DriveConfig, Layout};

pub const DEFAULT_DISK_LEN: usize = 64;

#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Count store and drive I/O and log a summary on exit.
    #[arg(long, global = true, env = "VDRIVE_METRICS")]
    pub metrics: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write a file, lose a disk, read it back degraded and rebuild.
    Demo(DemoArgs),

    /// Repeatedly drop a random value and recover it from XOR parity.
    XorCheck(XorCheckArgs),
}

#[derive(Args, Debug, Clone)]
pub struct DriveArgs {
    #[arg(long, env = "VDRIVE_LAYOUT", value_enum, default_value_t = LayoutMode::Striped)]
    pub layout: LayoutMode,

    #[arg(long, env = "VDRIVE_DISKS", default_value_t = 4)]
    pub disks: usize,

    #[arg(long, env = "VDRIVE_DISK_SIZE", default_value_t = DEFAULT_DISK_LEN)]
    pub disk_size: usize,
}

impl DriveArgs {
    pub fn to_config(&self) -> DriveConfig {
        DriveConfig::uniform(self.layout.into(), self.disks, self.disk_size)
    }
}

#[derive(Args)]
pub struct DemoArgs {
    #[command(flatten)]
    pub drive: DriveArgs,

    #[arg(long, default_value = "/home/jcarson/foo.txt")]
    pub path: String,

    /// Disk to fail during the demo (striped layout only).
    #[arg(long, default_value_t = 0)]
    pub fail_disk: usize,
}

#[derive(Args)]
pub struct XorCheckArgs {
    #[arg(long, default_value_t = 10)]
    pub drives: usize,

    #[arg(long, default_value_t = 1000)]
    pub iterations: u64,

    /// Seed for a reproducible run; random when omitted.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LayoutMode {
    Linear,
    Striped,
}

impl From<LayoutMode> for Layout {
    fn from(mode: LayoutMode) -> Self {
        match mode {
            LayoutMode::Linear => Self::Linear,
            LayoutMode::Striped => Self::Striped,
        }
    }
}
