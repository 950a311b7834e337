//! One-shot encoder from a [`Value`] tree to the binary TLV wire.
//!
//! The inverse of [`crate::tlv::TlvDecoder`], used by the `-o tlv`
//! output path and as the fixture builder in tests.

use crate::tlv::tag;
use crate::value::Value;
use crate::varint::write_varint;

/// Encode a value tree to TLV bytes.
#[must_use]
pub fn encode(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    write_value(value, &mut out);
    out
}

fn write_value(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Integer(v) => {
            let payload = integer_payload(*v);
            write_header(tag::INTEGER, payload.len() as u64, out);
            out.extend_from_slice(&payload);
        }
        Value::Bytes(bytes) => {
            write_header(tag::BYTES, bytes.len() as u64, out);
            out.extend_from_slice(bytes);
        }
        Value::Text(text) => {
            write_header(tag::TEXT, text.len() as u64, out);
            out.extend_from_slice(text.as_bytes());
        }
        Value::Null => write_header(tag::NULL, 0, out),
        Value::Sequence(items) => {
            let mut body = Vec::new();
            for item in items {
                write_value(item, &mut body);
            }
            write_header(tag::SEQUENCE, body.len() as u64, out);
            out.extend_from_slice(&body);
        }
    }
}

fn write_header(tag: u8, len: u64, out: &mut Vec<u8>) {
    out.push(tag);
    write_varint(len, out);
}

/// Minimal big-endian two's complement: redundant leading `0x00`/`0xFF`
/// bytes are stripped as long as the sign bit survives.
fn integer_payload(value: i64) -> Vec<u8> {
    let be = value.to_be_bytes();
    let mut start = 0;
    while start < be.len() - 1 {
        let byte = be[start];
        let next_msb = be[start + 1] & 0x80;
        if (byte == 0x00 && next_msb == 0) || (byte == 0xFF && next_msb != 0) {
            start += 1;
        } else {
            break;
        }
    }
    be[start..].to_vec()
}
