//! Distinct IPv4 address counter CLI
//!
//! Usage: uniq_ipv4_count [-i|--input] <PATH> [options]
//!
//! Options:
//!   -w, --workers <N>       Number of parsing workers (default: 6)
//!   -b, --buffer-size <B>   Read buffer size in bytes (default: 1048576)
//!   -q, --queue <N>         Reader -> worker queue capacity (default: 32)
//!   --skip-malformed        Skip malformed lines instead of failing
//!   --wrap-octets           Accept octets > 255 (wrapping, no range check)
//!   --mmap                  Use the memory-mapped reader
//!   --help, -h              Show help
//!
//! Example: uniq_ipv4_count -i ip_addresses.txt -w 8
//!
//! Log verbosity is controlled with RUST_LOG (e.g. RUST_LOG=uniq_ipv4=debug).

use std::env;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use uniq_ipv4::constants::{DEFAULT_BUFFER_SIZE, DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKER_COUNT};
use uniq_ipv4::{CountError, CountOptions, CountSummary, MalformedPolicy, OctetMode};

struct Args {
    input: PathBuf,
    options: CountOptions,
    mmap: bool,
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [-i|--input] <PATH> [options]", program);
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <PATH>                 File with one IPv4 address per line");
    eprintln!();
    eprintln!("Options:");
    eprintln!(
        "  -w, --workers <N>      Number of parsing workers (default: {})",
        DEFAULT_WORKER_COUNT
    );
    eprintln!(
        "  -b, --buffer-size <B>  Read buffer size in bytes (default: {})",
        DEFAULT_BUFFER_SIZE
    );
    eprintln!(
        "  -q, --queue <N>        Reader -> worker queue capacity (default: {})",
        DEFAULT_QUEUE_CAPACITY
    );
    eprintln!("  --skip-malformed       Skip malformed lines instead of failing");
    eprintln!("  --wrap-octets          Accept octets > 255 (wrapping, no range check)");
    #[cfg(feature = "mmap")]
    eprintln!("  --mmap                 Use the memory-mapped reader");
    eprintln!("  --help, -h             Show this help message");
}

fn parse_value(flag: &str, value: Option<&String>) -> Result<usize, String> {
    let value = value.ok_or_else(|| format!("Missing value for {}", flag))?;
    let parsed: usize = value
        .parse()
        .map_err(|_| format!("Invalid value for {}: {}", flag, value))?;
    if parsed == 0 {
        return Err(format!("{} must be greater than 0", flag));
    }
    Ok(parsed)
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().collect();

    let mut input: Option<PathBuf> = None;
    let mut options = CountOptions::default();
    let mut mmap = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-i" | "--input" => {
                i += 1;
                let path = args.get(i).ok_or("Missing value for --input")?;
                input = Some(PathBuf::from(path));
            }
            "-w" | "--workers" => {
                i += 1;
                options = options.with_workers(parse_value("--workers", args.get(i))?);
            }
            "-b" | "--buffer-size" => {
                i += 1;
                options = options.with_buffer_size(parse_value("--buffer-size", args.get(i))?);
            }
            "-q" | "--queue" => {
                i += 1;
                options = options.with_queue_capacity(parse_value("--queue", args.get(i))?);
            }
            "--skip-malformed" => {
                options = options.with_malformed_policy(MalformedPolicy::Skip);
            }
            "--wrap-octets" => {
                options = options.with_octet_mode(OctetMode::Wrapping);
            }
            #[cfg(feature = "mmap")]
            "--mmap" => mmap = true,
            "--help" | "-h" => {
                print_usage(&args[0]);
                std::process::exit(0);
            }
            arg if !arg.starts_with('-') => {
                if input.is_some() {
                    return Err(format!("Unexpected argument: {}", arg));
                }
                input = Some(PathBuf::from(arg));
            }
            _ => return Err(format!("Unknown option: {}", args[i])),
        }
        i += 1;
    }

    let input = input.ok_or("Missing input path")?;

    Ok(Args {
        input,
        options,
        mmap,
    })
}

fn run(args: &Args) -> Result<CountSummary, CountError> {
    #[cfg(feature = "mmap")]
    if args.mmap {
        return uniq_ipv4::count_unique_mapped(&args.input, &args.options);
    }

    uniq_ipv4::count_unique_with_summary(&args.input, &args.options)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("uniq_ipv4=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage(&env::args().next().unwrap_or_default());
            std::process::exit(1);
        }
    };

    tracing::debug!(
        input = %args.input.display(),
        workers = args.options.worker_count,
        buffer_size = args.options.buffer_size,
        queue_capacity = args.options.queue_capacity,
        mmap = args.mmap,
        "starting count"
    );

    let start = Instant::now();

    let summary = match run(&args) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let elapsed = start.elapsed();

    println!("Unique IP addresses count: {}", summary.unique);
    if summary.skipped > 0 {
        println!(
            "Skipped {} malformed lines out of {}",
            summary.skipped, summary.lines
        );
    }
    println!("Counted for {:.2} seconds", elapsed.as_secs_f64());
}
