/// The conversion pipeline behind the `decant` binary.
///
/// Each input file is opened, streamed through a [`DecodeDriver`] in
/// `-b`-sized chunks, and the decoded value emitted in the selected
/// output format:
///
/// ```text
/// ┌────────┬───────────────────────────────────────────────┐
/// │ Format │ Destination                                   │
/// ├────────┼───────────────────────────────────────────────┤
/// │ text   │ indented dump on stdout                       │
/// │ tlv    │ canonical binary re-encoding on stdout        │
/// │ null   │ nothing; success note per source on stderr    │
/// └────────┴───────────────────────────────────────────────┘
/// ```
///
/// A source that fails to decode is reported on stderr and processing
/// continues with the next source; the failure count becomes the exit
/// status decision in `main`.
use std::io::{self, Write as _};

use anyhow::{Context, Result};
use decant_codec::{
    CodecConfig, DEFAULT_MAX_DEPTH, HexDecoder, StreamDecoder, TlvDecoder, Value, encode,
    render_text,
};
use decant_driver::{DecodeDriver, source::STDIN_TOKEN};

use crate::{Cli, InputFormat, OutputFormat};

/// Run every source through the driver. Returns the number of sources
/// that failed to decode.
///
/// # Errors
///
/// Only output-side failures (stdout gone away) abort the run; decode
/// failures are counted and reported per source instead.
pub fn run(cli: &Cli) -> Result<u32> {
    let config = CodecConfig {
        max_depth: cli.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
    };
    let mut driver = DecodeDriver::new(cli.buffer_size);
    let mut failures = 0u32;

    for spec in &cli.files {
        match decode_repeatedly(&mut driver, spec, cli.input_format, config, cli.iterations) {
            Ok(value) => emit(cli.output_format, spec, &value)?,
            Err(e) => {
                eprintln!("{e}");
                failures += 1;
            }
        }
    }

    Ok(failures)
}

/// Decode one source `iterations` times with a fresh decoder each pass,
/// returning the value from the first pass. Standard input cannot be
/// rewound, so repeats of `-` hit end-of-input and fail.
fn decode_repeatedly(
    driver: &mut DecodeDriver,
    spec: &str,
    format: InputFormat,
    config: CodecConfig,
    iterations: u32,
) -> Result<Value, decant_driver::DriverError> {
    let mut decoder = make_decoder(format, config);
    let value = driver.decode_file(spec, &mut *decoder)?;
    for _ in 1..iterations {
        let mut decoder = make_decoder(format, config);
        driver.decode_file(spec, &mut *decoder)?;
    }
    Ok(value)
}

fn make_decoder(
    format: InputFormat,
    config: CodecConfig,
) -> Box<dyn StreamDecoder<Output = Value>> {
    match format {
        InputFormat::Tlv => Box::new(TlvDecoder::new(config)),
        InputFormat::Hex => Box::new(HexDecoder::new(config)),
    }
}

fn emit(format: OutputFormat, spec: &str, value: &Value) -> Result<()> {
    match format {
        OutputFormat::Text => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(render_text(value).as_bytes())
                .context("cannot write to stdout")?;
        }
        OutputFormat::Tlv => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(&encode(value))
                .context("cannot write to stdout")?;
        }
        OutputFormat::Null => {
            let name = if spec == STDIN_TOKEN { "stdin" } else { spec };
            eprintln!("{name}: decoded successfully");
        }
    }
    Ok(())
}
