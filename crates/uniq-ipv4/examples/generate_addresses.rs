//! Generate a newline-delimited file of random IPv4 addresses
//!
//! Draws `lines` addresses from a pool of `distinct` random addresses, so the
//! expected distinct count is known up front (at most `distinct`).
//!
//! Usage:
//!   cargo run --example generate_addresses -p uniq-ipv4 --release -- \
//!       <output> <lines> <distinct> [seed]
//!
//! Example:
//!   cargo run --example generate_addresses -p uniq-ipv4 --release -- \
//!       ips.txt 100000000 1000000

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::Instant;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 4 || args.len() > 5 {
        eprintln!("Usage: {} <output> <lines> <distinct> [seed]", args[0]);
        eprintln!("  lines: number of lines to write");
        eprintln!("  distinct: size of the address pool lines are drawn from");
        eprintln!();
        eprintln!("Example: {} ips.txt 100000000 1000000", args[0]);
        std::process::exit(1);
    }

    let output = &args[1];
    let lines: u64 = args[2].parse().expect("Invalid lines");
    let distinct: usize = args[3].parse().expect("Invalid distinct");
    let seed: u64 = args.get(4).map_or(0, |s| s.parse().expect("Invalid seed"));

    if distinct == 0 {
        eprintln!("Error: distinct must be > 0");
        std::process::exit(1);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let pool: Vec<u32> = (0..distinct).map(|_| rng.r#gen()).collect();

    let file = File::create(output).expect("Failed to create output file");
    let mut writer = BufWriter::with_capacity(1 << 20, file);
    let start = Instant::now();

    for i in 0..lines {
        let [a, b, c, d] = pool[rng.gen_range(0..pool.len())].to_be_bytes();
        writeln!(writer, "{}.{}.{}.{}", a, b, c, d).expect("Failed to write");

        if (i + 1) % 10_000_000 == 0 {
            println!("  {} lines written", i + 1);
        }
    }
    writer.flush().expect("Failed to flush");

    println!(
        "Wrote {} lines ({} pool addresses) to {} in {:.2}s",
        lines,
        distinct,
        output,
        start.elapsed().as_secs_f64()
    );
}
