use anyhow::{Result, bail};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, info};
use vdrive_rs::layout::parity::{recover_lost, xor_bytes};

use crate::cli::XorCheckArgs;

pub fn run(args: &XorCheckArgs) -> Result<()> {
    if args.drives < 2 {
        bail!("xor check needs at least 2 drives, got {}", args.drives);
    }
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut failures = 0u64;
    for i in 0..args.iterations {
        let values: Vec<u8> = (0..args.drives).map(|_| rng.random()).collect();
        let parity = xor_bytes(values.iter().copied().map(Some));
        let lost = rng.random_range(0..args.drives);
        let recovered = recover_lost(&values, parity, lost);

        debug!(
            iteration = i,
            ?values,
            parity,
            lost,
            expected = values[lost],
            recovered,
            "xor check"
        );
        if recovered != values[lost] {
            failures += 1;
        }
    }

    info!(
        drives = args.drives,
        iterations = args.iterations,
        failures,
        "xor check finished"
    );
    if failures > 0 {
        bail!("{failures} of {} recoveries were wrong", args.iterations);
    }
    Ok(())
}
