use decant_buffer::GrowableBuffer;
use decant_codec::{DecodeOutcome, StreamDecoder};
use tracing::{debug, trace};

use crate::error::DriverError;
use crate::source::{ChunkSource, STDIN_TOKEN};

/// Drives a [`StreamDecoder`] over a chunked byte source.
///
/// The driver reads fixed-size chunks and decides, per chunk, whether the
/// decoder can see the freshly read bytes directly (the zero-copy fast
/// path) or whether they must be accumulated first:
///
/// ```text
///               read chunk
///                   │
///        ┌──────────┴───────────┐
///        │ buffer ever used?    │
///        no                     yes
///        │                      │
///   feed(chunk)            buffer.append(chunk)
///        │                 feed(buffer.window())
///        │                      │
///        └──────────┬───────────┘
///                   ▼
///     Complete → return value
///     NeedMoreInput → advance / flush remainder, read next chunk
///     Failed → error with absolute position
/// ```
///
/// The fast path lasts only until the first chunk the decoder does not
/// fully consume: the remainder is flushed into the buffer and every
/// later chunk goes through `append`, even if the buffer drains empty
/// again. This keeps position accounting unambiguous — once buffering
/// begins, `bytes_shifted_total`, `offset` and `consumed` all refer to
/// buffer-relative positions.
///
/// Bytes the decoder consumed while still on the fast path never enter
/// the buffer, so the driver tracks them in an explicit prefix counter;
/// absolute position = `prefix + bytes_shifted_total + offset +
/// consumed`. Reported failure positions are therefore identical for
/// every chunking of the same stream.
///
/// One driver owns one buffer and one scratch chunk, both reused across
/// sources. It is exclusively owned state: nothing here is shared or
/// process-wide, so callers that want concurrency instantiate one driver
/// per unit of work.
#[derive(Debug)]
pub struct DecodeDriver {
    buffer: GrowableBuffer,
    scratch: Vec<u8>,
}

impl DecodeDriver {
    /// Create a driver reading `chunk_size` bytes per read. The
    /// surrounding system bounds the size (1 byte to 16 MiB); the driver
    /// itself only requires it to be non-zero.
    #[must_use]
    pub fn new(chunk_size: usize) -> Self {
        debug_assert!(chunk_size > 0);
        Self {
            buffer: GrowableBuffer::new(),
            scratch: vec![0; chunk_size],
        }
    }

    /// The configured chunk size in bytes.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.scratch.len()
    }

    /// The accumulation buffer, exposed for diagnostics (reallocation
    /// and shift counters from the last decode).
    #[must_use]
    pub fn buffer(&self) -> &GrowableBuffer {
        &self.buffer
    }

    /// Open `spec` (a path, or [`STDIN_TOKEN`] for standard input) and
    /// decode one value from it.
    ///
    /// # Errors
    ///
    /// [`DriverError::Io`] when the source cannot be opened, plus
    /// everything [`decode_source`](Self::decode_source) returns.
    pub fn decode_file<D>(
        &mut self,
        spec: &str,
        decoder: &mut D,
    ) -> Result<D::Output, DriverError>
    where
        D: StreamDecoder + ?Sized,
    {
        let source = ChunkSource::open(spec).map_err(|source| DriverError::Io {
            name: if spec == STDIN_TOKEN { "stdin" } else { spec }.to_owned(),
            source,
        })?;
        self.decode_source(source, decoder)
    }

    /// Decode one value from an already-open source.
    ///
    /// The source is consumed and closed on every exit path. The buffer
    /// is reset at entry, so one driver decodes any number of sources in
    /// turn.
    ///
    /// An empty source reports [`DriverError::UnexpectedEndOfInput`] at
    /// position 0 without consulting the decoder.
    ///
    /// # Errors
    ///
    /// - [`DriverError::Io`] — a read failed.
    /// - [`DriverError::UnexpectedEndOfInput`] — the source ended while
    ///   the decoder still wanted more bytes.
    /// - [`DriverError::Malformed`] — the decoder rejected the input.
    ///   Any partially built value stays in the decoder's state and is
    ///   released when the caller drops or replaces the decoder.
    pub fn decode_source<D>(
        &mut self,
        mut source: ChunkSource,
        decoder: &mut D,
    ) -> Result<D::Output, DriverError>
    where
        D: StreamDecoder + ?Sized,
    {
        self.buffer.reset();
        let mut buffered = false;
        let mut prefix: u64 = 0;

        debug!(source = %source.name(), chunk_size = self.scratch.len(), "decoding source");

        loop {
            let read = match source.read_chunk(&mut self.scratch) {
                Ok(n) => n,
                Err(e) => {
                    return Err(DriverError::Io {
                        name: source.name().to_owned(),
                        source: e,
                    });
                }
            };

            if read == 0 {
                // End of input with the decoder still hungry. On a source
                // that was empty from the start this reports position 0.
                return Err(DriverError::UnexpectedEndOfInput {
                    name: source.name().to_owned(),
                    position: prefix + self.buffer.stream_position(0),
                });
            }

            let chunk = &self.scratch[..read];
            let outcome = if buffered {
                self.buffer.append(chunk);
                decoder.feed(self.buffer.window())
            } else {
                decoder.feed(chunk)
            };

            match outcome {
                DecodeOutcome::Complete { value, consumed } => {
                    // Unconsumed trailing bytes are legal padding.
                    debug!(source = %source.name(), consumed, "decode complete");
                    return Ok(value);
                }
                DecodeOutcome::NeedMoreInput { consumed } => {
                    trace!(
                        source = %source.name(),
                        consumed,
                        buffered,
                        window = self.buffer.len(),
                        "decoder needs more input",
                    );
                    if buffered {
                        self.buffer.advance(consumed);
                    } else if consumed < read {
                        // Flush the unconsumed remainder; from here on
                        // every chunk goes through the buffer.
                        self.buffer.append(&chunk[consumed..]);
                        prefix += consumed as u64;
                        buffered = true;
                    } else {
                        prefix += consumed as u64;
                    }
                }
                DecodeOutcome::Failed { error, consumed } => {
                    return Err(DriverError::Malformed {
                        name: source.name().to_owned(),
                        position: prefix + self.buffer.stream_position(consumed),
                        reason: error,
                    });
                }
            }
        }
    }
}
