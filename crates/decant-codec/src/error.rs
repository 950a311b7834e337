use crate::varint::MAX_VARINT_BYTES;

/// Failure detail reported by a decoder alongside [`DecodeOutcome::Failed`]
/// (see [`crate::decoder::DecodeOutcome`]).
///
/// These describe *why* a byte stream is malformed; *where* it failed is
/// the decode driver's business — it owns the absolute position
/// accounting and attaches the position when it wraps this error.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The element tag byte is not one of the known tags.
    #[error("unknown tag {tag:#04X}")]
    UnknownTag { tag: u8 },

    /// A length varint ran past the 10-byte limit without terminating.
    #[error("length varint exceeded the {MAX_VARINT_BYTES}-byte limit")]
    VarintTooLong,

    /// A declared length does not fit in addressable memory.
    #[error("declared length {declared} does not fit in memory")]
    LengthOverflow { declared: u64 },

    /// An element is larger than the space left in its enclosing sequence.
    #[error("element of {declared} bytes overruns its sequence ({available} bytes left)")]
    Overrun { declared: u64, available: u64 },

    /// An integer payload longer than the 8 bytes an `i64` can hold.
    #[error("integer payload of {len} bytes exceeds 8")]
    OversizedInteger { len: u64 },

    /// A null element declared a non-empty payload.
    #[error("null element carries a {len}-byte payload")]
    NonEmptyNull { len: u64 },

    /// A text payload is not valid UTF-8.
    #[error("text payload is not valid UTF-8")]
    InvalidUtf8,

    /// Sequence nesting exceeded the configured depth limit.
    #[error("nesting deeper than {limit} levels")]
    DepthExceeded { limit: usize },

    /// A character in a hex stream is neither a hex digit nor whitespace.
    #[error("invalid hex digit {byte:#04X}")]
    InvalidHexDigit { byte: u8 },
}
