use std::mem;

use crate::decoder::{CodecConfig, DecodeOutcome, StreamDecoder};
use crate::error::CodecError;
use crate::value::Value;
use crate::varint::read_varint;

/// Element tags of the TLV wire format.
pub mod tag {
    pub const INTEGER: u8 = 0x01;
    pub const BYTES: u8 = 0x02;
    pub const TEXT: u8 = 0x03;
    pub const NULL: u8 = 0x05;
    pub const SEQUENCE: u8 = 0x30;
}

/// Upper bound on the capacity reserved up front for one payload.
///
/// Declared lengths are untrusted input; the collector grows as bytes
/// actually arrive rather than trusting the header.
const PAYLOAD_RESERVE_LIMIT: usize = 64 * 1024;

/// Where the decoder stands inside the current element.
#[derive(Debug)]
enum Mode {
    /// At an element boundary. A header (tag + complete length varint) is
    /// parsed atomically: if the span ends mid-header, none of the header
    /// bytes are consumed and they must be re-presented next time.
    Header,
    /// Collecting the payload of a primitive element. Collected bytes are
    /// absorbed into `collected` and reported consumed immediately.
    Payload {
        tag: u8,
        remaining: usize,
        collected: Vec<u8>,
    },
}

/// A sequence whose header has been read but whose payload has not yet
/// been fully decoded.
#[derive(Debug)]
struct OpenSequence {
    /// Payload bytes this sequence still owes. Child elements are charged
    /// (header + declared payload) against it when their header is read.
    remaining: usize,
    items: Vec<Value>,
}

/// Incremental decoder for the binary TLV encoding.
///
/// The decoder is a resumable state machine: a stack of open sequences
/// plus a per-element [`Mode`]. It decodes exactly one top-level value.
///
/// ```text
///                    ┌────────────┐  header complete   ┌─────────────┐
///   element boundary │   Header   │───────────────────▶│   Payload   │
///                    └────────────┘   (primitive)      └─────────────┘
///                        │  ▲                                │
///        SEQUENCE header │  │ payload complete, value        │
///        pushes the      │  │ delivered to the open          │
///        open stack      └──┴────────────────────────────────┘
/// ```
///
/// Consumption contract (what makes the driver's buffer work):
///
/// - a split header consumes nothing — those bytes come back next feed;
/// - payload bytes are absorbed greedily and consumed immediately;
/// - declared child sizes are validated against the enclosing sequence's
///   remaining bytes at header time, so a malformed nesting fails at the
///   offending header instead of at end of input.
#[derive(Debug)]
pub struct TlvDecoder {
    config: CodecConfig,
    mode: Mode,
    stack: Vec<OpenSequence>,
}

impl Default for TlvDecoder {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

impl TlvDecoder {
    #[must_use]
    pub fn new(config: CodecConfig) -> Self {
        Self {
            config,
            mode: Mode::Header,
            stack: Vec::new(),
        }
    }

    /// Hand a completed value to the enclosing sequence, or back to the
    /// caller when there is none.
    fn deliver(&mut self, value: Value) -> Option<Value> {
        match self.stack.last_mut() {
            Some(open) => {
                open.items.push(value);
                None
            }
            None => Some(value),
        }
    }

    /// Validate an element header against tag rules, the depth limit, and
    /// the space left in the enclosing sequence.
    fn validate_header(
        &self,
        tag: u8,
        declared: u64,
        header_size: usize,
    ) -> Result<(), CodecError> {
        match tag {
            tag::INTEGER if declared > 8 => {
                return Err(CodecError::OversizedInteger { len: declared });
            }
            tag::NULL if declared != 0 => {
                return Err(CodecError::NonEmptyNull { len: declared });
            }
            tag::SEQUENCE if self.stack.len() >= self.config.max_depth => {
                return Err(CodecError::DepthExceeded {
                    limit: self.config.max_depth,
                });
            }
            tag::INTEGER | tag::BYTES | tag::TEXT | tag::NULL | tag::SEQUENCE => {}
            other => return Err(CodecError::UnknownTag { tag: other }),
        }

        if let Some(open) = self.stack.last() {
            let total = header_size as u64 + declared;
            if total > open.remaining as u64 {
                return Err(CodecError::Overrun {
                    declared: total,
                    available: open.remaining as u64,
                });
            }
        }

        Ok(())
    }
}

impl StreamDecoder for TlvDecoder {
    type Output = Value;

    fn feed(&mut self, input: &[u8]) -> DecodeOutcome<Value> {
        let mut cursor = 0;

        loop {
            // Sequences whose payload is fully accounted for close at the
            // element boundary; closing may cascade upward.
            while matches!(self.mode, Mode::Header)
                && self.stack.last().is_some_and(|open| open.remaining == 0)
            {
                if let Some(open) = self.stack.pop() {
                    if let Some(value) = self.deliver(Value::Sequence(open.items)) {
                        return DecodeOutcome::Complete {
                            value,
                            consumed: cursor,
                        };
                    }
                }
            }

            match mem::replace(&mut self.mode, Mode::Header) {
                Mode::Header => {
                    let span = &input[cursor..];
                    let Some((&tag, after_tag)) = span.split_first() else {
                        return DecodeOutcome::NeedMoreInput { consumed: cursor };
                    };
                    let (declared, varint_size) = match read_varint(after_tag) {
                        Ok(Some(pair)) => pair,
                        Ok(None) => {
                            return DecodeOutcome::NeedMoreInput { consumed: cursor };
                        }
                        Err(error) => {
                            return DecodeOutcome::Failed {
                                error,
                                consumed: cursor,
                            };
                        }
                    };
                    let header_size = 1 + varint_size;

                    if let Err(error) = self.validate_header(tag, declared, header_size) {
                        return DecodeOutcome::Failed {
                            error,
                            consumed: cursor,
                        };
                    }
                    let Ok(payload_len) = usize::try_from(declared) else {
                        return DecodeOutcome::Failed {
                            error: CodecError::LengthOverflow { declared },
                            consumed: cursor,
                        };
                    };

                    cursor += header_size;
                    if let Some(open) = self.stack.last_mut() {
                        // Charge the whole element up front; validate_header
                        // already proved it fits.
                        open.remaining -= header_size + payload_len;
                    }

                    if tag == tag::SEQUENCE {
                        self.stack.push(OpenSequence {
                            remaining: payload_len,
                            items: Vec::new(),
                        });
                    } else {
                        self.mode = Mode::Payload {
                            tag,
                            remaining: payload_len,
                            collected: Vec::with_capacity(
                                payload_len.min(PAYLOAD_RESERVE_LIMIT),
                            ),
                        };
                    }
                }
                Mode::Payload {
                    tag,
                    mut remaining,
                    mut collected,
                } => {
                    if remaining > 0 {
                        let available = input.len() - cursor;
                        if available == 0 {
                            self.mode = Mode::Payload {
                                tag,
                                remaining,
                                collected,
                            };
                            return DecodeOutcome::NeedMoreInput { consumed: cursor };
                        }
                        let take = available.min(remaining);
                        collected.extend_from_slice(&input[cursor..cursor + take]);
                        cursor += take;
                        remaining -= take;
                        if remaining > 0 {
                            self.mode = Mode::Payload {
                                tag,
                                remaining,
                                collected,
                            };
                            return DecodeOutcome::NeedMoreInput { consumed: cursor };
                        }
                    }

                    match finish_primitive(tag, collected) {
                        Ok(value) => {
                            if let Some(value) = self.deliver(value) {
                                return DecodeOutcome::Complete {
                                    value,
                                    consumed: cursor,
                                };
                            }
                        }
                        Err(error) => {
                            return DecodeOutcome::Failed {
                                error,
                                consumed: cursor,
                            };
                        }
                    }
                }
            }
        }
    }
}

/// Build a primitive value from its completed payload.
fn finish_primitive(tag: u8, payload: Vec<u8>) -> Result<Value, CodecError> {
    match tag {
        tag::INTEGER => Ok(Value::Integer(decode_integer(&payload))),
        tag::BYTES => Ok(Value::Bytes(payload)),
        tag::TEXT => String::from_utf8(payload)
            .map(Value::Text)
            .map_err(|_| CodecError::InvalidUtf8),
        tag::NULL => Ok(Value::Null),
        other => Err(CodecError::UnknownTag { tag: other }),
    }
}

/// Decode 0–8 big-endian two's complement bytes, sign-extending from the
/// first payload byte. An empty payload is zero.
fn decode_integer(payload: &[u8]) -> i64 {
    let mut value: i64 = if payload.first().is_some_and(|b| b & 0x80 != 0) {
        -1
    } else {
        0
    };
    for &byte in payload {
        value = (value << 8) | i64::from(byte);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Feed the whole stream in pieces of `chunk` bytes through a fresh
    /// decoder, honoring the consumed contract the way the driver does.
    fn decode_in_pieces(bytes: &[u8], chunk: usize) -> DecodeOutcome<Value> {
        let mut decoder = TlvDecoder::default();
        let mut pending: Vec<u8> = Vec::new();
        for piece in bytes.chunks(chunk) {
            pending.extend_from_slice(piece);
            match decoder.feed(&pending) {
                DecodeOutcome::NeedMoreInput { consumed } => {
                    pending.drain(..consumed);
                }
                done => return done,
            }
        }
        DecodeOutcome::NeedMoreInput { consumed: 0 }
    }

    fn expect_complete(outcome: DecodeOutcome<Value>) -> Value {
        match outcome {
            DecodeOutcome::Complete { value, .. } => value,
            other => panic!("expected Complete, got {other:?}"),
        }
    }

    fn expect_failed(outcome: DecodeOutcome<Value>) -> (CodecError, usize) {
        match outcome {
            DecodeOutcome::Failed { error, consumed } => (error, consumed),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn top_level_integer() {
        let value = expect_complete(TlvDecoder::default().feed(&[0x01, 0x01, 0x2A]));
        assert_eq!(value, Value::Integer(42));
    }

    #[test]
    fn integer_sign_extension() {
        let cases: &[(&[u8], i64)] = &[
            (&[0x01, 0x00], 0),
            (&[0x01, 0x01, 0xFF], -1),
            (&[0x01, 0x01, 0x80], -128),
            (&[0x01, 0x02, 0x01, 0x00], 256),
            (&[0x01, 0x02, 0xFF, 0x00], -256),
            (
                &[0x01, 0x08, 0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
                i64::MAX,
            ),
            (
                &[0x01, 0x08, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
                i64::MIN,
            ),
        ];
        for (bytes, expected) in cases {
            let value = expect_complete(TlvDecoder::default().feed(bytes));
            assert_eq!(value, Value::Integer(*expected), "bytes {bytes:02X?}");
        }
    }

    #[test]
    fn integer_in_sequence() {
        // The minimal nested element: SEQUENCE { INTEGER 5 }
        let value = expect_complete(TlvDecoder::default().feed(&[0x30, 0x03, 0x01, 0x01, 0x05]));
        assert_eq!(value, Value::Sequence(vec![Value::Integer(5)]));
    }

    #[test]
    fn nested_mixed_sequence() {
        let bytes = [
            0x30, 0x0F, // SEQUENCE, 15 payload bytes
            0x03, 0x02, b'h', b'i', // TEXT "hi"
            0x05, 0x00, // NULL
            0x30, 0x05, // inner SEQUENCE, 5 payload bytes
            0x02, 0x03, 0xAA, 0xBB, 0xCC, // BYTES
            0x01, 0x00, // INTEGER 0 (empty payload)
        ];
        let value = expect_complete(TlvDecoder::default().feed(&bytes));
        assert_eq!(
            value,
            Value::Sequence(vec![
                Value::Text("hi".to_owned()),
                Value::Null,
                Value::Sequence(vec![Value::Bytes(vec![0xAA, 0xBB, 0xCC])]),
                Value::Integer(0),
            ])
        );
    }

    #[test]
    fn empty_sequence() {
        let value = expect_complete(TlvDecoder::default().feed(&[0x30, 0x00]));
        assert_eq!(value, Value::Sequence(vec![]));
    }

    #[test]
    fn trailing_bytes_are_not_consumed() {
        let outcome = TlvDecoder::default().feed(&[0x05, 0x00, 0xDE, 0xAD]);
        match outcome {
            DecodeOutcome::Complete { value, consumed } => {
                assert_eq!(value, Value::Null);
                assert_eq!(consumed, 2);
            }
            other => panic!("expected Complete, got {other:?}"),
        }
    }

    #[test]
    fn split_header_is_re_presented() {
        let mut decoder = TlvDecoder::default();
        // Tag arrives without its length varint: nothing is consumed.
        match decoder.feed(&[0x30]) {
            DecodeOutcome::NeedMoreInput { consumed } => assert_eq!(consumed, 0),
            other => panic!("expected NeedMoreInput, got {other:?}"),
        }
        // The caller re-presents the tag together with the rest.
        let value = expect_complete(decoder.feed(&[0x30, 0x03, 0x01, 0x01, 0x05]));
        assert_eq!(value, Value::Sequence(vec![Value::Integer(5)]));
    }

    #[test]
    fn payload_bytes_are_absorbed() {
        let mut decoder = TlvDecoder::default();
        match decoder.feed(&[0x02, 0x04, 0x11, 0x22]) {
            DecodeOutcome::NeedMoreInput { consumed } => assert_eq!(consumed, 4),
            other => panic!("expected NeedMoreInput, got {other:?}"),
        }
        // Only the missing payload bytes are fed; the absorbed prefix is gone.
        let value = expect_complete(decoder.feed(&[0x33, 0x44]));
        assert_eq!(value, Value::Bytes(vec![0x11, 0x22, 0x33, 0x44]));
    }

    #[test]
    fn every_chunking_yields_the_same_value() {
        let bytes = [
            0x30, 0x0A, 0x01, 0x01, 0x07, 0x03, 0x03, b'a', b'b', b'c', 0x05, 0x00,
        ];
        let expected = expect_complete(TlvDecoder::default().feed(&bytes));
        for chunk in 1..=bytes.len() {
            let value = expect_complete(decode_in_pieces(&bytes, chunk));
            assert_eq!(value, expected, "chunk size {chunk}");
        }
    }

    #[test]
    fn unknown_tag_fails_at_the_header() {
        let (error, consumed) = expect_failed(TlvDecoder::default().feed(&[0xEE, 0x00]));
        assert_eq!(error, CodecError::UnknownTag { tag: 0xEE });
        assert_eq!(consumed, 0);
    }

    #[test]
    fn child_overrunning_sequence_fails() {
        // SEQUENCE of 2 payload bytes cannot hold a 2-byte header plus
        // 2 bytes of integer payload.
        let (error, consumed) =
            expect_failed(TlvDecoder::default().feed(&[0x30, 0x02, 0x01, 0x02, 0x00, 0x00]));
        assert_eq!(
            error,
            CodecError::Overrun {
                declared: 4,
                available: 2
            }
        );
        assert_eq!(consumed, 2);
    }

    #[test]
    fn oversized_integer_fails() {
        let (error, _) = expect_failed(TlvDecoder::default().feed(&[0x01, 0x09]));
        assert_eq!(error, CodecError::OversizedInteger { len: 9 });
    }

    #[test]
    fn non_empty_null_fails() {
        let (error, _) = expect_failed(TlvDecoder::default().feed(&[0x05, 0x01, 0x00]));
        assert_eq!(error, CodecError::NonEmptyNull { len: 1 });
    }

    #[test]
    fn invalid_utf8_text_fails_after_the_payload() {
        let (error, consumed) = expect_failed(TlvDecoder::default().feed(&[0x03, 0x01, 0xFF]));
        assert_eq!(error, CodecError::InvalidUtf8);
        assert_eq!(consumed, 3);
    }

    #[test]
    fn overlong_length_varint_fails() {
        let mut bytes = vec![0x01];
        bytes.extend_from_slice(&[0x80; 11]);
        let (error, _) = expect_failed(TlvDecoder::default().feed(&bytes));
        assert_eq!(error, CodecError::VarintTooLong);
    }

    #[test]
    fn depth_limit_is_enforced() {
        let config = CodecConfig { max_depth: 2 };
        // Three nested sequences: the third header trips the limit.
        let bytes = [0x30, 0x06, 0x30, 0x04, 0x30, 0x02, 0x30, 0x00];
        let (error, consumed) = expect_failed(TlvDecoder::new(config).feed(&bytes));
        assert_eq!(error, CodecError::DepthExceeded { limit: 2 });
        assert_eq!(consumed, 4);
    }

    #[test]
    fn depth_within_limit_succeeds() {
        let config = CodecConfig { max_depth: 3 };
        let bytes = [0x30, 0x04, 0x30, 0x02, 0x30, 0x00];
        let value = expect_complete(TlvDecoder::new(config).feed(&bytes));
        assert_eq!(
            value,
            Value::Sequence(vec![Value::Sequence(vec![Value::Sequence(vec![])])])
        );
    }
}
