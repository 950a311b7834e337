use crate::decoder::{CodecConfig, DecodeOutcome, StreamDecoder};
use crate::error::CodecError;
use crate::tlv::TlvDecoder;
use crate::value::Value;

/// Text front-end for the TLV wire: ASCII hex digits, case-insensitive,
/// with whitespace permitted anywhere (including inside a byte pair that
/// spans a chunk boundary).
///
/// ```text
///   "30 03\n01 01 05"  ──▶  [0x30, 0x03, 0x01, 0x01, 0x05]  ──▶  TlvDecoder
/// ```
///
/// Characters are reported consumed only once the inner decoder has
/// retired the bytes they decode to; the unretired tail of a span
/// (including a lone half-byte digit) is re-presented on the next feed
/// and rescanned. Failure positions therefore refer to the hex character
/// stream and are the same for every chunking: an inner decode failure
/// is reported at the first character of the failing element, an invalid
/// character at its exact position.
#[derive(Debug)]
pub struct HexDecoder {
    inner: TlvDecoder,
}

impl Default for HexDecoder {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

impl HexDecoder {
    #[must_use]
    pub fn new(config: CodecConfig) -> Self {
        Self {
            inner: TlvDecoder::new(config),
        }
    }
}

impl StreamDecoder for HexDecoder {
    type Output = Value;

    fn feed(&mut self, input: &[u8]) -> DecodeOutcome<Value> {
        let mut bytes: Vec<u8> = Vec::with_capacity(input.len() / 2);
        // Character span of each decoded byte: (first digit, past second).
        let mut spans: Vec<(usize, usize)> = Vec::with_capacity(input.len() / 2);
        // High nibble of a byte whose second digit has not arrived yet,
        // with the character index of its digit.
        let mut half: Option<(u8, usize)> = None;

        for (i, &byte) in input.iter().enumerate() {
            if byte.is_ascii_whitespace() {
                continue;
            }
            let Some(nibble) = hex_value(byte) else {
                return DecodeOutcome::Failed {
                    error: CodecError::InvalidHexDigit { byte },
                    consumed: i,
                };
            };
            match half.take() {
                Some((high, start)) => {
                    bytes.push(high << 4 | nibble);
                    spans.push((start, i + 1));
                }
                None => half = Some((nibble, i)),
            }
        }

        match self.inner.feed(&bytes) {
            DecodeOutcome::Complete { value, .. } => DecodeOutcome::Complete {
                value,
                consumed: input.len(),
            },
            DecodeOutcome::NeedMoreInput { consumed } => DecodeOutcome::NeedMoreInput {
                // Retire exactly the characters of the retired bytes; the
                // rest of the span comes back next feed.
                consumed: match consumed.checked_sub(1) {
                    Some(last) => spans[last].1,
                    None => 0,
                },
            },
            DecodeOutcome::Failed { error, consumed } => DecodeOutcome::Failed {
                error,
                // The malformation starts at the first unretired byte; when
                // every presented byte was retired it lies just past the
                // last data character.
                consumed: match spans.get(consumed) {
                    Some(&(start, _)) => start,
                    None => spans.last().map_or(0, |&(_, end)| end),
                },
            },
        }
    }
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect_complete(outcome: DecodeOutcome<Value>) -> Value {
        match outcome {
            DecodeOutcome::Complete { value, .. } => value,
            other => panic!("expected Complete, got {other:?}"),
        }
    }

    #[test]
    fn decodes_spaced_hex() {
        let value = expect_complete(HexDecoder::default().feed(b"30 03 01 01 05"));
        assert_eq!(value, Value::Sequence(vec![Value::Integer(5)]));
    }

    #[test]
    fn whitespace_and_case_are_tolerated() {
        let value = expect_complete(HexDecoder::default().feed(b"  30\n03\t01 01 0A  "));
        assert_eq!(value, Value::Sequence(vec![Value::Integer(10)]));
    }

    #[test]
    fn unretired_characters_are_re_presented() {
        let mut decoder = HexDecoder::default();
        // Four complete bytes retire (two headers); the trailing space and
        // half digit do not.
        match decoder.feed(b"3003 0101 0") {
            DecodeOutcome::NeedMoreInput { consumed } => assert_eq!(consumed, 9),
            other => panic!("expected NeedMoreInput, got {other:?}"),
        }
        // The caller re-presents the unretired tail with the new input.
        let value = expect_complete(decoder.feed(b" 05"));
        assert_eq!(value, Value::Sequence(vec![Value::Integer(5)]));
    }

    #[test]
    fn split_header_characters_stay_unconsumed() {
        let mut decoder = HexDecoder::default();
        // One byte decoded but not retired (incomplete element header):
        // no character is consumed.
        match decoder.feed(b"30") {
            DecodeOutcome::NeedMoreInput { consumed } => assert_eq!(consumed, 0),
            other => panic!("expected NeedMoreInput, got {other:?}"),
        }
        let value = expect_complete(decoder.feed(b"30 00"));
        assert_eq!(value, Value::Sequence(vec![]));
    }

    #[test]
    fn invalid_digit_reports_its_position() {
        let outcome = HexDecoder::default().feed(b"30 0g");
        match outcome {
            DecodeOutcome::Failed { error, consumed } => {
                assert_eq!(error, CodecError::InvalidHexDigit { byte: b'g' });
                assert_eq!(consumed, 4);
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn inner_failure_reports_the_failing_element_start() {
        // A null retires cleanly, then the unknown tag 0xEE begins at
        // character 11.
        let outcome = HexDecoder::default().feed(b"30 04 0500 EE00");
        match outcome {
            DecodeOutcome::Failed { error, consumed } => {
                assert_eq!(error, CodecError::UnknownTag { tag: 0xEE });
                assert_eq!(consumed, 11);
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn failure_after_a_fully_retired_payload_points_past_it() {
        // TEXT of one invalid UTF-8 byte: the payload retires before the
        // value is rejected, so the position is past the last data digit.
        let outcome = HexDecoder::default().feed(b"03 01 FF ");
        match outcome {
            DecodeOutcome::Failed { error, consumed } => {
                assert_eq!(error, CodecError::InvalidUtf8);
                assert_eq!(consumed, 8);
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }
}
