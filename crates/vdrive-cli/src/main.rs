mod cli;
mod demo;
mod io_tally;
mod xor_check;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::io_tally::IoTally;

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let tally = if cli.metrics { IoTally::install() } else { None };

    let res = match cli.command {
        Command::Demo(args) => demo::run(&args),
        Command::XorCheck(args) => xor_check::run(&args),
    };
    if let Some(tally) = tally {
        tally.log_summary();
    }
    res
}
