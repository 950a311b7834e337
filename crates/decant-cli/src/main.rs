/// decant command-line tool — stream-decode TLV element files and render
/// them as text, re-encoded binary, or nothing at all.
///
/// # Usage overview
///
/// ```text
/// decant [OPTIONS] <FILE>...
///
/// Arguments:
///   <FILE>...    Input files; `-` reads standard input
///
/// Options:
///   -i, --input-format <FMT>    tlv (default) | hex
///   -o, --output-format <FMT>   text (default) | tlv | null
///   -b, --buffer-size <BYTES>   read chunk size, 1..=16777216 [default: 8192]
///   -n, --iterations <N>        decode each source N times [default: 1]
///   -s, --max-depth <LEVELS>    sequence nesting limit [default: 64]
///   -d, --debug                 more decode logging per repeat (-d, -dd)
///   -h, --help                  Print help
///   -V, --version               Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                    |
/// |------|--------------------------------------------|
/// | 0    | Every source decoded successfully          |
/// | 1    | At least one source failed (others still run) |
/// | 71   | Buffer allocation failure (out of memory)  |
///
/// Decoded output goes to stdout; every diagnostic goes to stderr, so
/// stdout can be piped cleanly.
use std::io;
use std::process;

use clap::{ArgAction, Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

mod convert;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// The decant streaming TLV converter.
#[derive(Parser)]
#[command(name = "decant", version, about = "Streaming TLV decode and conversion")]
struct Cli {
    /// Input files to decode, in order. `-` reads standard input.
    #[arg(required = true)]
    files: Vec<String>,

    /// Input byte format.
    #[arg(short = 'i', long, value_enum, default_value_t = InputFormat::Tlv)]
    input_format: InputFormat,

    /// Output rendering.
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Text)]
    output_format: OutputFormat,

    /// Read chunk size in bytes (1 byte to 16 MiB). Small sizes force the
    /// decoder through the accumulation buffer; useful for testing.
    #[arg(short = 'b', long, value_parser = parse_buffer_size, default_value = "8192")]
    buffer_size: usize,

    /// Decode each source this many times (a crude benchmark mode; output
    /// is emitted only on the first pass).
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..), default_value_t = 1)]
    iterations: u32,

    /// Maximum sequence nesting depth.
    #[arg(short = 's', long)]
    max_depth: Option<usize>,

    /// Increase decode logging on stderr (-d for debug, -dd for trace).
    #[arg(short = 'd', long, action = ArgAction::Count)]
    debug: u8,
}

// ── Flag values ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    /// Raw binary TLV elements.
    Tlv,
    /// Hexadecimal text with optional whitespace.
    Hex,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Indented human-readable dump.
    Text,
    /// Canonical binary re-encoding.
    Tlv,
    /// Decode only; report success per source on stderr.
    Null,
}

/// Parses and bounds the `-b` chunk size.
fn parse_buffer_size(s: &str) -> Result<usize, String> {
    const MAX: usize = 16 * 1024 * 1024;
    let size: usize = s.parse().map_err(|_| format!("{s:?} is not a byte count"))?;
    if (1..=MAX).contains(&size) {
        Ok(size)
    } else {
        Err(format!("buffer size must be between 1 and {MAX} bytes"))
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match convert::run(&cli) {
        Ok(0) => {}
        Ok(_) => process::exit(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(1);
        }
    }
}

/// Installs a stderr subscriber scoped to the decode crates. Without
/// `-d`, `RUST_LOG` still works for ad-hoc filtering.
fn init_tracing(debug: u8) {
    let filter = match debug {
        0 => EnvFilter::from_default_env(),
        1 => EnvFilter::new("decant_buffer=debug,decant_codec=debug,decant_driver=debug"),
        _ => EnvFilter::new("decant_buffer=trace,decant_codec=trace,decant_driver=trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
