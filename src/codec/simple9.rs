//! Simple-9: 32-bit words, a 4-bit selector (9 rows) naming the uniform
//! bit-width used to pack the following integers into the remaining 28
//! bits. Classic Anh-Moffat row table.

use super::IntegerCodec;
use crate::core::error::{Error, ErrorKind, Result};

/// `(count, width)` per selector row, ordered by descending `count` so the
/// encoder can greedily prefer the densest row that fits.
const ROWS: [(u32, u32); 9] = [
    (28, 1),
    (14, 2),
    (9, 3),
    (7, 4),
    (5, 5),
    (4, 7),
    (3, 9),
    (2, 14),
    (1, 28),
];

pub struct Simple9Codec;

impl IntegerCodec for Simple9Codec {
    const NAME: &'static str = "simple9";
    const MAX_VALUE: u32 = (1 << 28) - 1;

    fn encode(dst: &mut [u8], xs: &[u32]) -> usize {
        if xs.is_empty() {
            return 0;
        }
        if xs.iter().any(|&x| x > Self::MAX_VALUE) {
            return 0;
        }
        let mut pos = 0;
        let mut i = 0;
        while i < xs.len() {
            let Some((selector, count, width)) = ROWS
                .iter()
                .enumerate()
                .filter(|(_, &(count, width))| {
                    i + count as usize <= xs.len()
                        && xs[i..i + count as usize].iter().all(|&x| x < (1u64 << width) as u32)
                })
                .map(|(sel, &(count, width))| (sel as u32, count, width))
                .next()
            else {
                // Fall back to the narrowest row (1x28) sized to whatever's
                // left; this always fits since values are already bounded
                // by MAX_VALUE.
                (8, 1, 28)
            };
            if pos + 4 > dst.len() {
                return 0;
            }
            let mut word: u32 = selector << 28;
            for j in 0..count as usize {
                word |= xs[i + j] << (j as u32 * width);
            }
            dst[pos..pos + 4].copy_from_slice(&word.to_le_bytes());
            pos += 4;
            i += count as usize;
        }
        pos
    }

    fn decode(dst: &mut [u32], src: &[u8]) -> Result<usize> {
        let mut pos = 0;
        let mut i = 0;
        while i < dst.len() {
            if pos + 4 > src.len() {
                return Err(Error::new(ErrorKind::Decode, "simple9: word truncated"));
            }
            let word = u32::from_le_bytes(src[pos..pos + 4].try_into().unwrap());
            pos += 4;
            let selector = (word >> 28) as usize;
            if selector >= ROWS.len() {
                return Err(Error::new(ErrorKind::Decode, "simple9: bad selector"));
            }
            let (count, width) = ROWS[selector];
            let mask = (1u64 << width) as u32 - 1;
            let n = (count as usize).min(dst.len() - i);
            for j in 0..n {
                dst[i + j] = (word >> (j as u32 * width)) & mask;
            }
            i += n;
        }
        Ok(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(xs: &[u32]) {
        let mut buf = vec![0u8; (xs.len() + 1) * 4];
        let written = Simple9Codec::encode(&mut buf, xs);
        let mut out = vec![0u32; xs.len()];
        let consumed = Simple9Codec::decode(&mut out, &buf[..written]).unwrap();
        assert_eq!(consumed, written);
        assert_eq!(out, xs);
    }

    #[test]
    fn round_trips_mixed_widths() {
        round_trip(&[1, 1, 1, 1]);
        round_trip(&[1000, 2000, 3000]);
        round_trip(&(0..28).collect::<Vec<_>>());
        round_trip(&[Simple9Codec::MAX_VALUE]);
    }

    #[test]
    fn overflow_fails() {
        let mut buf = [0u8; 8];
        assert_eq!(Simple9Codec::encode(&mut buf, &[Simple9Codec::MAX_VALUE + 1]), 0);
    }

    #[test]
    fn empty_input_fails() {
        let mut buf = [0u8; 8];
        assert_eq!(Simple9Codec::encode(&mut buf, &[]), 0);
    }
}
