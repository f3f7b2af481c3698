//! Hex-rendered signed varints.
//!
//! Values are zigzag-mapped so small negative numbers stay short, then
//! written base-128 with the least significant group first and the high bit
//! of each byte marking continuation (the protobuf `sint64` layout). Each
//! resulting byte is rendered as two lowercase hex characters, so a varint
//! occupies between 2 and 20 characters of the frame.

use crate::Error;

/// Maximum length of a 64-bit varint in bytes.
pub const MAX_VARINT_LEN: usize = 10;

/// Map a signed value onto an unsigned one, interleaving signs.
///
/// `0, -1, 1, -2, 2, ...` map to `0, 1, 2, 3, 4, ...`.
#[inline]
pub fn zigzag_encode(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

/// Inverse of [`zigzag_encode`].
#[inline]
pub fn zigzag_decode(u: u64) -> i64 {
    ((u >> 1) as i64) ^ -((u & 1) as i64)
}

/// Write `v` as a signed varint into `scratch`, returning the bytes used.
pub fn put_varint(scratch: &mut [u8; MAX_VARINT_LEN], v: i64) -> usize {
    let mut ux = zigzag_encode(v);
    let mut i = 0;
    while ux >= 0x80 {
        scratch[i] = (ux as u8) | 0x80;
        ux >>= 7;
        i += 1;
    }
    scratch[i] = ux as u8;
    i + 1
}

/// Append `v` to `out` as a hex-rendered signed varint.
pub fn push_hex_varint(out: &mut String, v: i64) {
    let mut raw = [0u8; MAX_VARINT_LEN];
    let n = put_varint(&mut raw, v);

    let mut hex_buf = [0u8; MAX_VARINT_LEN * 2];
    let hex_len = n * 2;
    hex::encode_to_slice(&raw[..n], &mut hex_buf[..hex_len])
        .expect("hex output is sized to twice the varint length");
    out.extend(hex_buf[..hex_len].iter().copied().map(char::from));
}

/// Read a hex-rendered signed varint from `input` starting at `*pos`.
///
/// On success `*pos` is advanced past the varint.
pub fn read_hex_varint(input: &[u8], pos: &mut usize) -> Result<i64, Error> {
    let start = *pos;
    let mut cursor = start;
    let mut ux: u64 = 0;
    let mut shift = 0u32;

    for i in 0..MAX_VARINT_LEN {
        let pair = input
            .get(cursor..cursor + 2)
            .ok_or(Error::UnexpectedEof { offset: cursor })?;
        // Frames are lowercase only.
        if !pair.iter().all(|&c| matches!(c, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(Error::InvalidHex { offset: cursor });
        }
        let mut byte = [0u8; 1];
        hex::decode_to_slice(pair, &mut byte).map_err(|_| Error::InvalidHex { offset: cursor })?;
        cursor += 2;

        let b = byte[0];
        if b < 0x80 {
            // The tenth byte may only carry the top bit of the value.
            if i == MAX_VARINT_LEN - 1 && b > 1 {
                return Err(Error::VarintOverflow { offset: start });
            }
            ux |= u64::from(b) << shift;
            *pos = cursor;
            return Ok(zigzag_decode(ux));
        }
        ux |= u64::from(b & 0x7f) << shift;
        shift += 7;
    }

    Err(Error::VarintOverflow { offset: start })
}
