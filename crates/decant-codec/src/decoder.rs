use crate::error::CodecError;

/// Default nesting depth limit when the caller does not supply one.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Limits handed opaquely to a decoder by the surrounding system.
///
/// The decode driver never inspects this; it is plumbed from the command
/// line straight into whichever decoder the run selected.
#[derive(Clone, Copy, Debug)]
pub struct CodecConfig {
    /// Maximum sequence nesting depth before a decode fails with
    /// [`CodecError::DepthExceeded`]. Bounds decoder stack usage on
    /// adversarial input.
    pub max_depth: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// The result of one decode attempt over a byte span.
///
/// `consumed` is always relative to the span passed to
/// [`StreamDecoder::feed`], never to any larger logical stream — the
/// driver translates it into absolute stream positions.
///
/// ```text
///   Complete       value ready; trailing span bytes are legal padding
///   NeedMoreInput  consumed bytes are absorbed and never re-presented;
///                  the rest of the span must be fed again later
///   Failed         the span is malformed at `consumed` bytes in
/// ```
#[derive(Debug)]
pub enum DecodeOutcome<T> {
    /// A fully decoded value. Ownership transfers to the caller.
    /// `consumed` may be less than the span length; unconsumed trailing
    /// bytes are discarded, not an error.
    Complete { value: T, consumed: usize },
    /// The span ended before the value did. The first `consumed` bytes
    /// were folded into the decoder's resumable state; the caller must
    /// re-present only the remainder, followed by new input.
    NeedMoreInput { consumed: usize },
    /// The input can never decode, no matter what bytes follow.
    Failed { error: CodecError, consumed: usize },
}

/// A resumable decoder for one encoding of the structured value model.
///
/// One implementation exists per supported encoding, selected at runtime
/// by value (the trait is object-safe). A decoder instance carries the
/// partial decode state for exactly one value; after `Complete` or
/// `Failed` it should be dropped or replaced, which also releases any
/// partially built value.
///
/// The driver never calls `feed` with an empty span: an empty input
/// source is reported as end-of-input before the decoder is consulted,
/// so "empty input is a valid encoding" is not expressible through the
/// driver.
pub trait StreamDecoder {
    /// The decoded object type.
    type Output;

    /// Decode as much of `input` as possible, resuming from any state
    /// left by previous calls.
    fn feed(&mut self, input: &[u8]) -> DecodeOutcome<Self::Output>;
}
