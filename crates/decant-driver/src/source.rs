use std::fmt;
use std::fs::File;
use std::io::{self, ErrorKind, Read};

/// The path token that selects the standard input stream.
pub const STDIN_TOKEN: &str = "-";

/// A named, chunk-oriented byte source: a file or the standard input
/// stream.
///
/// One source is opened, read, and closed entirely within one decode:
/// the driver takes it by value and `Drop` closes the underlying handle
/// on every exit path, success or failure.
pub struct ChunkSource {
    name: String,
    reader: Box<dyn Read>,
}

impl ChunkSource {
    /// Open a source from a path, with [`STDIN_TOKEN`] selecting the
    /// standard input stream (reported under the name `stdin`).
    ///
    /// # Errors
    ///
    /// Propagates the OS error when the file cannot be opened.
    pub fn open(spec: &str) -> io::Result<Self> {
        if spec == STDIN_TOKEN {
            Ok(Self::stdin())
        } else {
            let file = File::open(spec)?;
            Ok(Self::from_reader(spec, file))
        }
    }

    /// The standard input stream.
    #[must_use]
    pub fn stdin() -> Self {
        Self::from_reader("stdin", io::stdin())
    }

    /// Wrap any reader as a named source. Mainly for tests and embedders
    /// that decode from memory or sockets.
    pub fn from_reader(name: impl Into<String>, reader: impl Read + 'static) -> Self {
        Self {
            name: name.into(),
            reader: Box::new(reader),
        }
    }

    /// The name used in diagnostics for this source.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read up to `buf.len()` bytes. Returns 0 only at end-of-input;
    /// interrupted reads are retried.
    pub fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.reader.read(buf) {
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                other => return other,
            }
        }
    }
}

impl fmt::Debug for ChunkSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkSource")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
