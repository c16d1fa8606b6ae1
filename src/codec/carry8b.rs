//! Carry-8b: 64-bit words. A one-word header (written once per postings
//! list) names a `base` into a 32-entry master width table; each data
//! word's 4-bit selector then indexes a 16-row *window* `[base, base+16)`
//! of that table. A row that leaves >= 4 spare bits in the 60-bit data
//! field forwards the next word's selector into those spare bits, in which
//! case the next word carries no selector of its own and packs the full
//! 64 bits. Modeled after the Anh-Moffat Simple-8b row family named in the
//! original's `compress_integer_carry_8b.h`; this rewrite's own concrete
//! widths (see DESIGN.md).

use super::IntegerCodec;
use crate::core::error::{Error, ErrorKind, Result};

const WINDOW: usize = 16;
const MASTER_WIDTHS: [u32; 32] = [
    1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26,
    27, 28, 29, 30, 31, 32,
];

fn count_for(width: u32, data_bits: u32) -> u32 {
    data_bits / width
}

fn fits(width: u32, xs: &[u32]) -> bool {
    if width >= 32 {
        return true;
    }
    xs.iter().all(|&x| (x as u64) < (1u64 << width))
}

fn required_width(x: u32) -> u32 {
    32 - x.leading_zeros().max(0)
}

pub struct Carry8bCodec;

impl IntegerCodec for Carry8bCodec {
    const NAME: &'static str = "carry8b";
    const MAX_VALUE: u32 = u32::MAX;

    fn encode(dst: &mut [u8], xs: &[u32]) -> usize {
        if xs.is_empty() {
            return 0;
        }
        let max_width = xs.iter().map(|&x| required_width(x).max(1)).max().unwrap();
        // Choose the smallest base whose window's largest width still
        // covers every value in `xs`.
        let base = if max_width as usize <= WINDOW {
            0usize
        } else if (max_width as usize) <= MASTER_WIDTHS.len() {
            MASTER_WIDTHS.len() - WINDOW
        } else {
            return 0; // no 32-bit-representable width covers this value
        };

        if dst.len() < 8 {
            return 0;
        }
        dst[0..8].copy_from_slice(&(base as u64).to_le_bytes());
        let mut pos = 8;

        let mut i = 0;
        let mut carried: Option<usize> = None;
        while i < xs.len() {
            if pos + 8 > dst.len() {
                return 0;
            }
            let data_bits = if carried.is_some() { 64 } else { 60 };

            let r_idx = if let Some(r) = carried.take() {
                r
            } else {
                (0..WINDOW)
                    .filter(|&r| {
                        let width = MASTER_WIDTHS[base + r];
                        let count = count_for(width, data_bits) as usize;
                        i + count.min(xs.len() - i) > 0
                            && fits(width, &xs[i..i + count.min(xs.len() - i)])
                            && count > 0
                    })
                    .max_by_key(|&r| count_for(MASTER_WIDTHS[base + r], data_bits))
                    .unwrap_or(WINDOW - 1)
            };

            let width = MASTER_WIDTHS[base + r_idx];
            let count = (count_for(width, data_bits) as usize).min(xs.len() - i);
            if count == 0 || !fits(width, &xs[i..i + count]) {
                return 0;
            }

            let mut word: u64 = 0;
            let own_selector = data_bits == 60;
            if own_selector {
                word |= (r_idx as u64) << 60;
            }
            for (j, &x) in xs[i..i + count].iter().enumerate() {
                word |= (x as u64) << (j as u32 * width);
            }
            i += count;

            if own_selector {
                let spare = 60 - count as u32 * width;
                if spare >= 4 && i < xs.len() {
                    if let Some(next_r) = (0..WINDOW).find(|&r| {
                        let w = MASTER_WIDTHS[base + r];
                        let c = (count_for(w, 64) as usize).min(xs.len() - i);
                        c > 0 && fits(w, &xs[i..i + c])
                    }) {
                        let shift = 60 - spare;
                        word |= (next_r as u64) << shift;
                        carried = Some(next_r);
                    }
                }
            }

            dst[pos..pos + 8].copy_from_slice(&word.to_le_bytes());
            pos += 8;
        }
        pos
    }

    fn decode(dst: &mut [u32], src: &[u8]) -> Result<usize> {
        if src.len() < 8 {
            return Err(Error::new(ErrorKind::Decode, "carry8b: missing header"));
        }
        let base = u64::from_le_bytes(src[0..8].try_into().unwrap()) as usize;
        if base + WINDOW > MASTER_WIDTHS.len() {
            return Err(Error::new(ErrorKind::Decode, "carry8b: bad header base"));
        }
        let mut pos = 8;
        let mut i = 0;
        let mut carried: Option<usize> = None;

        while i < dst.len() {
            if pos + 8 > src.len() {
                return Err(Error::new(ErrorKind::Decode, "carry8b: word truncated"));
            }
            let word = u64::from_le_bytes(src[pos..pos + 8].try_into().unwrap());
            pos += 8;

            let (r_idx, data_bits) = match carried.take() {
                Some(r) => (r, 64u32),
                None => ((word >> 60) as usize, 60u32),
            };
            if r_idx >= WINDOW {
                return Err(Error::new(ErrorKind::Decode, "carry8b: bad selector"));
            }
            let width = MASTER_WIDTHS[base + r_idx];
            let mask = if width >= 64 { u64::MAX } else { (1u64 << width) - 1 };
            let count = (count_for(width, data_bits) as usize).min(dst.len() - i);
            for j in 0..count {
                dst[i + j] = ((word >> (j as u32 * width)) & mask) as u32;
            }
            i += count;

            if data_bits == 60 {
                let spare = 60 - count as u32 * width;
                if spare >= 4 && i < dst.len() {
                    let shift = 60 - spare;
                    carried = Some(((word >> shift) & 0xF) as usize);
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
        let mut buf = vec![0u8; xs.len() * 8 + 16];
        let written = Carry8bCodec::encode(&mut buf, xs);
        assert!(written > 0);
        let mut out = vec![0u32; xs.len()];
        let consumed = Carry8bCodec::decode(&mut out, &buf[..written]).unwrap();
        assert_eq!(consumed, written);
        assert_eq!(out, xs);
    }

    #[test]
    fn round_trips_small_values() {
        round_trip(&[1; 80]);
        round_trip(&[7, 7, 7, 7]);
    }

    #[test]
    fn round_trips_large_values() {
        round_trip(&[u32::MAX, 1 << 20, 12345]);
    }

    #[test]
    fn empty_input_fails() {
        let mut buf = [0u8; 32];
        assert_eq!(Carry8bCodec::encode(&mut buf, &[]), 0);
    }
}
