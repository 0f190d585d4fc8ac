//! Little-endian field readers and sub-byte sample unpacking.
//!
//! All readers return `None` when the field does not fit in `d`, so header
//! decoders can stop at whatever length the file actually provides.

use alloc::vec::Vec;

/// WORD: unsigned 16-bit little-endian.
#[inline]
pub(crate) fn u16_le(d: &[u8], offset: usize) -> Option<u16> {
    let b = d.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_le_bytes([b[0], b[1]]))
}

/// DWORD: unsigned 32-bit little-endian.
#[inline]
pub(crate) fn u32_le(d: &[u8], offset: usize) -> Option<u32> {
    let b = d.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// LONG: signed 32-bit little-endian.
#[inline]
pub(crate) fn i32_le(d: &[u8], offset: usize) -> Option<i32> {
    u32_le(d, offset).map(|v| v as i32)
}

/// Unsigned 16.16 fixed point (gamma values).
pub(crate) fn fixed_16_16(d: &[u8], offset: usize) -> Option<f64> {
    u32_le(d, offset).map(|v| f64::from(v) / 65536.0)
}

/// Unsigned 2.30 fixed point (CIEXYZ coordinates).
pub(crate) fn fixed_2_30(d: &[u8], offset: usize) -> Option<f64> {
    u32_le(d, offset).map(|v| f64::from(v) / 1_073_741_824.0)
}

/// Unpack the first `width` samples of a row stored at 1, 2 or 4 bits per
/// pixel, most significant bits first.
///
/// Samples past the end of `input` are not produced.
pub(crate) fn unpack_indices(depth: u16, input: &[u8], width: usize) -> Vec<u8> {
    let (per_byte, mask): (usize, u8) = match depth {
        1 => (8, 0x01),
        2 => (4, 0x03),
        4 => (2, 0x0f),
        _ => return Vec::new(),
    };
    let bits = depth as usize;
    let width = width.min(input.len() * per_byte);
    let mut out = Vec::with_capacity(width);

    let mut full = input.iter().take(width / per_byte);
    for in_val in &mut full {
        for pos in 0..per_byte {
            let shift = bits * (per_byte - 1 - pos);
            out.push((in_val >> shift) & mask);
        }
    }

    let rem = width % per_byte;
    if rem > 0 {
        let in_val = input[width / per_byte];
        for pos in 0..rem {
            let shift = bits * (per_byte - 1 - pos);
            out.push((in_val >> shift) & mask);
        }
    }
    out
}
