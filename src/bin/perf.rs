use log::{error, info};
use rand::{prelude::random, rngs::SmallRng, seq::SliceRandom, Rng, SeedableRng};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use structopt::StructOpt;

use std::{collections::BTreeMap, process, time};

use llrbt::Llrb;

/// Command line options.
#[derive(Clone, StructOpt)]
pub struct Opt {
    #[structopt(long = "seed")]
    seed: Option<u64>,

    #[structopt(long = "loads", default_value = "1000000")] // default 1M
    loads: usize,

    #[structopt(long = "validate")]
    validate: bool,

    #[structopt(long = "log-level", default_value = "info")]
    log_level: LevelFilter,
}

fn main() {
    let opts = Opt::from_args();
    let (level, mode) = (opts.log_level, TerminalMode::Mixed);
    if let Err(err) = TermLogger::init(level, Config::default(), mode, ColorChoice::Auto) {
        eprintln!("perf: logger {}", err);
    }

    let seed = opts.seed.unwrap_or_else(random);
    info!("perf seed {}", seed);
    let mut rng = SmallRng::seed_from_u64(seed);

    let mut keys: Vec<u64> = (0..opts.loads)
        .map(|_| rng.gen_range(0..1_000_000_000))
        .collect();
    keys.sort_unstable();
    keys.dedup();
    keys.shuffle(&mut rng);

    let mut index: Llrb<u64, u64> = Llrb::new();
    let mut btmap: BTreeMap<u64, u64> = BTreeMap::new();

    let start = time::Instant::now();
    for key in keys.iter() {
        index.insert(*key, 0);
    }
    info!("llrb insert {} keys took {:?}", keys.len(), start.elapsed());

    let start = time::Instant::now();
    for key in keys.iter() {
        btmap.insert(*key, 0);
    }
    info!("btree insert {} keys took {:?}", keys.len(), start.elapsed());

    if opts.validate {
        match index.validate() {
            Ok(()) => info!("llrb validated {} entries", index.len()),
            Err(err) => {
                error!("{}", err);
                process::exit(1);
            }
        }
    }
    if index.len() != btmap.len() {
        error!("mismatch in count {} != {}", index.len(), btmap.len());
        process::exit(1);
    }

    keys.shuffle(&mut rng);

    let start = time::Instant::now();
    for key in keys.iter() {
        index.remove(key);
    }
    info!("llrb remove {} keys took {:?}", keys.len(), start.elapsed());

    let start = time::Instant::now();
    for key in keys.iter() {
        btmap.remove(key);
    }
    info!("btree remove {} keys took {:?}", keys.len(), start.elapsed());

    if !index.is_empty() || !btmap.is_empty() {
        error!("left over entries {}/{}", index.len(), btmap.len());
        process::exit(1);
    }
}
