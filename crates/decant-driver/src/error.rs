use decant_codec::CodecError;

/// Errors returned by [`DecodeDriver::decode_source`](crate::DecodeDriver::decode_source).
///
/// All three are per-source: they name the failing source and never
/// abort processing of later sources. The only fatal condition in this
/// component — buffer allocation failure — terminates the process inside
/// the buffer crate and has no variant here.
///
/// ```text
///   DriverError
///   ├── Io                    ← source could not be opened or read
///   ├── UnexpectedEndOfInput  ← source ended, decoder still hungry
///   └── Malformed             ← decoder gave up on the bytes
/// ```
///
/// `position` is the absolute byte position in the input stream,
/// assembled once from the fast-path prefix and the buffer's shift
/// accounting at the moment of failure.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// The source could not be opened, or a read failed mid-stream.
    #[error("{name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// End of input reached while the decoder still wanted more bytes.
    #[error("{name}: decode failed past byte {position}: unexpected end of input")]
    UnexpectedEndOfInput { name: String, position: u64 },

    /// The decoder reported the input malformed.
    #[error("{name}: decode failed past byte {position}: {reason}")]
    Malformed {
        name: String,
        position: u64,
        reason: CodecError,
    },
}

impl DriverError {
    /// The absolute failure position, when this error carries one.
    #[must_use]
    pub fn position(&self) -> Option<u64> {
        match self {
            DriverError::Io { .. } => None,
            DriverError::UnexpectedEndOfInput { position, .. }
            | DriverError::Malformed { position, .. } => Some(*position),
        }
    }
}
