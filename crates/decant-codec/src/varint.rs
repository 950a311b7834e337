use crate::error::CodecError;

/// Maximum number of bytes a u64 varint can occupy: ceil(64 / 7).
pub const MAX_VARINT_BYTES: usize = 10;

/// Append a `u64` as an unsigned LEB128 varint.
///
/// Seven data bits per byte, least significant group first; the high bit
/// of each byte marks continuation.
///
/// | Value | Encoded bytes  |
/// |-------|----------------|
/// | 0     | `[0x00]`       |
/// | 127   | `[0x7F]`       |
/// | 128   | `[0x80, 0x01]` |
/// | 300   | `[0xAC, 0x02]` |
pub fn write_varint(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Decode an unsigned LEB128 varint from the front of `buf`.
///
/// Returns `Ok(Some((value, bytes_read)))` for a complete varint and
/// `Ok(None)` when `buf` ends mid-varint — the incremental header parser
/// needs "incomplete" to be distinct from "malformed", because incomplete
/// simply means the next chunk has not arrived yet.
///
/// # Errors
///
/// [`CodecError::VarintTooLong`] if the continuation bit is still set
/// after [`MAX_VARINT_BYTES`] bytes.
pub fn read_varint(buf: &[u8]) -> Result<Option<(u64, usize)>, CodecError> {
    let mut value: u64 = 0;
    let mut shift: u32 = 0;

    for (i, &byte) in buf.iter().enumerate() {
        if i >= MAX_VARINT_BYTES {
            return Err(CodecError::VarintTooLong);
        }

        value |= u64::from(byte & 0x7F) << shift;
        shift += 7;

        if byte & 0x80 == 0 {
            return Ok(Some((value, i + 1)));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: u64) -> Vec<u8> {
        let mut out = Vec::new();
        write_varint(value, &mut out);
        out
    }

    #[test]
    fn single_byte_values() {
        assert_eq!(encode(0), vec![0x00]);
        assert_eq!(encode(1), vec![0x01]);
        assert_eq!(encode(127), vec![0x7F]);
    }

    #[test]
    fn multi_byte_values() {
        assert_eq!(encode(128), vec![0x80, 0x01]);
        assert_eq!(encode(300), vec![0xAC, 0x02]);
        assert_eq!(encode(16384), vec![0x80, 0x80, 0x01]);
    }

    #[test]
    fn u64_max_occupies_the_limit() {
        assert_eq!(encode(u64::MAX).len(), MAX_VARINT_BYTES);
    }

    #[test]
    fn roundtrip_boundary_values() {
        for value in [0, 1, 127, 128, 255, 16383, 16384, u64::from(u32::MAX), u64::MAX] {
            let encoded = encode(value);
            let decoded = read_varint(&encoded).unwrap();
            assert_eq!(decoded, Some((value, encoded.len())), "value {value}");
        }
    }

    #[test]
    fn trailing_bytes_left_alone() {
        let decoded = read_varint(&[0xAC, 0x02, 0xFF, 0xFF]).unwrap();
        assert_eq!(decoded, Some((300, 2)));
    }

    #[test]
    fn incomplete_is_not_an_error() {
        assert_eq!(read_varint(&[]).unwrap(), None);
        assert_eq!(read_varint(&[0x80]).unwrap(), None);
        assert_eq!(read_varint(&[0x80, 0x80]).unwrap(), None);
    }

    #[test]
    fn overlong_is_rejected() {
        let result = read_varint(&[0x80; 11]);
        assert_eq!(result, Err(CodecError::VarintTooLong));
    }
}
