//! Component A: the two variable-length integer schemes used by the bundle
//! format (§4.A).
//!
//! Both schemes are little-endian base-128 with the top bit of each byte as
//! a continuation flag. They differ only in how many bits of the *first*
//! byte are available to the integer: object-record headers (varint-A) pack
//! a 3-bit type tag and a 1-bit continuation flag into the first byte
//! alongside the size, leaving 4 bits; delta-payload sizes (varint-B) have
//! no such header byte, so they get the full 7 bits.

use crate::error::{GitError, Result};

const MAX_SHIFT: u32 = 60;

/// Decode a varint-A continuation tail, given the low 4 bits already read
/// from the header byte. `bytes` is the remaining byte stream; returns the
/// assembled size and the number of tail bytes consumed.
pub fn decode_varint_a_tail(initial: u64, bytes: &[u8]) -> Result<(u64, usize)> {
    decode_tail(initial, 4, bytes)
}

/// Decode a full varint-B value (no header byte steals any bits). Returns
/// the value and the number of bytes consumed.
pub fn decode_varint_b(bytes: &[u8]) -> Result<(u64, usize)> {
    decode_tail(0, 0, bytes)
}

fn decode_tail(initial: u64, initial_shift: u32, bytes: &[u8]) -> Result<(u64, usize)> {
    let mut value = initial;
    let mut shift = initial_shift;
    let mut consumed = 0;

    for &byte in bytes {
        consumed += 1;

        if shift > MAX_SHIFT {
            return Err(GitError::VarintOverflow);
        }

        value |= ((byte & 0x7f) as u64) << shift;
        shift += 7;

        if byte & 0x80 == 0 {
            return Ok((value, consumed));
        }
    }

    Err(GitError::CorruptBundle(
        "varint ran off the end of the buffer".into(),
    ))
}

/// Encode a value using the varint-B scheme (no header byte). Used by tests
/// and by anything that needs to construct a well-formed delta payload.
pub fn encode_varint_b(mut value: u64) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varint_b_round_trips() {
        for value in [0u64, 1, 127, 128, 300, 0x10000, u32::MAX as u64] {
            let encoded = encode_varint_b(value);
            let (decoded, consumed) = decode_varint_b(&encoded).unwrap();
            assert_eq!(decoded, value);
            assert_eq!(consumed, encoded.len());
        }
    }

    #[test]
    fn varint_a_tail_ors_into_higher_bits() {
        // header byte contributed low 4 bits = 0b1110 (14); one continuation
        // byte contributes 0b0000001 at shift 4, i.e. bit 4 set -> +16.
        let (value, consumed) = decode_varint_a_tail(0b1110, &[0b0000_0001]).unwrap();
        assert_eq!(value, 14 + 16);
        assert_eq!(consumed, 1);
    }

    #[test]
    fn varint_a_with_no_continuation_returns_initial() {
        // in practice the caller never invokes the tail decoder when the
        // header byte's continuation bit is clear; this just documents that
        // an empty tail is a truncation error, not a no-op.
        assert!(decode_varint_a_tail(5, &[]).is_err());
    }

    #[test]
    fn overflowing_shift_is_rejected() {
        // ten continuation bytes (all high-bit set) overflow 60 bits of shift.
        let bytes = [0x80u8; 10];
        let err = decode_varint_a_tail(0, &bytes).unwrap_err();
        assert!(matches!(err, GitError::VarintOverflow));
    }

    #[test]
    fn truncated_varint_is_corrupt_bundle() {
        // every byte has its continuation bit set, so the stream never terminates.
        let bytes = [0x80u8, 0x80u8];
        let err = decode_varint_b(&bytes).unwrap_err();
        assert!(matches!(err, GitError::CorruptBundle(_)));
    }
}
