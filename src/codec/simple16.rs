//! Simple-16: 32-bit words, 4-bit selector over 16 rows. Unlike Simple-9's
//! uniform-width rows, several rows here mix two bit-widths in one word
//! (e.g. one 10-bit value alongside two 9-bit values) to trade a denser
//! selector set for more packing shapes — the "mixed" row table this
//! family is named for. This rewrite's own row table (see DESIGN.md); not
//! a bit-exact port of the original's.

use super::IntegerCodec;
use crate::core::error::{Error, ErrorKind, Result};

/// Each row is a list of `(count, width)` segments, packed in order from
/// the low bits up; segments within a row may use different widths.
const ROWS: [&[(u32, u32)]; 16] = [
    &[(28, 1)],
    &[(14, 2)],
    &[(9, 3)],
    &[(7, 4)],
    &[(5, 5)],
    &[(4, 6)],
    &[(4, 7)],
    &[(3, 9)],
    &[(2, 10), (1, 8)],
    &[(2, 14)],
    &[(1, 16), (1, 12)],
    &[(1, 20), (1, 8)],
    &[(1, 28)],
    &[(1, 18), (1, 10)],
    &[(4, 4), (2, 6)],
    &[(2, 2), (8, 3)],
];

fn row_count(row: &[(u32, u32)]) -> usize {
    row.iter().map(|&(c, _)| c as usize).sum()
}

pub struct Simple16Codec;

impl IntegerCodec for Simple16Codec {
    const NAME: &'static str = "simple16";
    const MAX_VALUE: u32 = (1 << 28) - 1;

    fn encode(dst: &mut [u8], xs: &[u32]) -> usize {
        if xs.is_empty() {
            return 0;
        }
        if xs.iter().any(|&x| x > Self::MAX_VALUE) {
            return 0;
        }
        let mut order: Vec<usize> = (0..ROWS.len()).collect();
        order.sort_by_key(|&r| std::cmp::Reverse(row_count(ROWS[r])));

        let mut pos = 0;
        let mut i = 0;
        while i < xs.len() {
            let chosen = order.iter().copied().find(|&r| {
                let row = ROWS[r];
                let count = row_count(row);
                if i + count > xs.len() {
                    return false;
                }
                let mut off = 0;
                for &(c, w) in row {
                    if !xs[i + off..i + off + c as usize]
                        .iter()
                        .all(|&x| x < (1u64 << w) as u32)
                    {
                        return false;
                    }
                    off += c as usize;
                }
                true
            });
            let selector = chosen.unwrap_or(12); // row [(1,28)] always fits
            let row = ROWS[selector];
            if pos + 4 > dst.len() {
                return 0;
            }
            let mut word: u32 = (selector as u32) << 28;
            let mut bit = 0u32;
            let mut off = 0;
            for &(c, w) in row {
                for j in 0..c as usize {
                    word |= xs[i + off + j] << bit;
                    bit += w;
                }
                off += c as usize;
            }
            dst[pos..pos + 4].copy_from_slice(&word.to_le_bytes());
            pos += 4;
            i += off;
        }
        pos
    }

    fn decode(dst: &mut [u32], src: &[u8]) -> Result<usize> {
        let mut pos = 0;
        let mut i = 0;
        while i < dst.len() {
            if pos + 4 > src.len() {
                return Err(Error::new(ErrorKind::Decode, "simple16: word truncated"));
            }
            let word = u32::from_le_bytes(src[pos..pos + 4].try_into().unwrap());
            pos += 4;
            let selector = (word >> 28) as usize;
            if selector >= ROWS.len() {
                return Err(Error::new(ErrorKind::Decode, "simple16: bad selector"));
            }
            let row = ROWS[selector];
            let mut bit = 0u32;
            'row: for &(c, w) in row {
                let mask = (1u64 << w) as u32 - 1;
                for _ in 0..c as usize {
                    if i >= dst.len() {
                        break 'row;
                    }
                    dst[i] = (word >> bit) & mask;
                    bit += w;
                    i += 1;
                }
            }
        }
        Ok(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(xs: &[u32]) {
        let mut buf = vec![0u8; (xs.len() + 1) * 4];
        let written = Simple16Codec::encode(&mut buf, xs);
        let mut out = vec![0u32; xs.len()];
        let consumed = Simple16Codec::decode(&mut out, &buf[..written]).unwrap();
        assert_eq!(consumed, written);
        assert_eq!(out, xs);
    }

    #[test]
    fn round_trips_mixed_rows() {
        round_trip(&[1, 1, 1, 1]);
        round_trip(&[1000, 500, 300]);
        round_trip(&(0..28).collect::<Vec<_>>());
        round_trip(&[Simple16Codec::MAX_VALUE]);
    }

    #[test]
    fn overflow_fails() {
        let mut buf = [0u8; 8];
        assert_eq!(Simple16Codec::encode(&mut buf, &[Simple16Codec::MAX_VALUE + 1]), 0);
    }
}
