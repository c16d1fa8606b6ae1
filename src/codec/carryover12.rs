//! Carryover-12: the same forward-selector trick as Relative-10, but the
//! carried selector is 3 bits wide instead of 2, so a larger set of rows
//! survives being forwarded into a carrying word's spare bits (the `12`
//! names the resulting carry-eligible row class, per the original's
//! naming). This rewrite's own row tables (see DESIGN.md).

use super::IntegerCodec;
use crate::core::error::{Error, ErrorKind, Result};

/// Own-selector rows (4-bit selector), packed over a 28-bit data field.
/// Rows 0..=5 leave >= 3 spare bits and are carry-eligible.
const OWN_ROWS: [(u32, u32); 8] = [
    (24, 1),
    (12, 2),
    (8, 3),
    (5, 4),
    (4, 5),
    (3, 6),
    (4, 7),
    (1, 28),
];

const CARRY_ELIGIBLE: [bool; 8] = [true, true, true, true, true, true, false, false];

/// Reduced, 3-bit-addressable row table for a carried word (no selector
/// field of its own; packs the full 32 bits).
const REDUCED_ROWS: [(u32, u32); 8] = [
    (32, 1),
    (16, 2),
    (10, 3),
    (8, 4),
    (6, 5),
    (5, 6),
    (4, 7),
    (4, 8),
];

fn spare_bits(row: (u32, u32)) -> u32 {
    28 - row.0 * row.1
}

fn fits(row: (u32, u32), xs: &[u32]) -> bool {
    xs.iter().all(|&x| x < (1u64 << row.1) as u32)
}

pub struct Carryover12Codec;

impl IntegerCodec for Carryover12Codec {
    const NAME: &'static str = "carryover12";
    const MAX_VALUE: u32 = (1 << 28) - 1;

    fn encode(dst: &mut [u8], xs: &[u32]) -> usize {
        if xs.is_empty() || xs.iter().any(|&x| x > Self::MAX_VALUE) {
            return 0;
        }
        let mut pos = 0;
        let mut i = 0;
        let mut carried: Option<usize> = None;

        while i < xs.len() {
            if pos + 4 > dst.len() {
                return 0;
            }

            if let Some(r_idx) = carried.take() {
                let row = REDUCED_ROWS[r_idx];
                let count = (row.0 as usize).min(xs.len() - i);
                if !fits(row, &xs[i..i + count]) {
                    return 0;
                }
                let mut word = 0u32;
                for (j, &x) in xs[i..i + count].iter().enumerate() {
                    word |= x << (j as u32 * row.1);
                }
                dst[pos..pos + 4].copy_from_slice(&word.to_le_bytes());
                pos += 4;
                i += count;
                continue;
            }

            let chosen = (0..OWN_ROWS.len())
                .filter(|&r| {
                    let row = OWN_ROWS[r];
                    let count = row.0 as usize;
                    i + count <= xs.len() && fits(row, &xs[i..i + count])
                })
                .max_by_key(|&r| OWN_ROWS[r].0)
                .unwrap_or(7);

            let row = OWN_ROWS[chosen];
            let count = (row.0 as usize).min(xs.len() - i);
            let mut word: u32 = (chosen as u32) << 28;
            for (j, &x) in xs[i..i + count].iter().enumerate() {
                word |= x << (j as u32 * row.1);
            }
            i += count;

            if CARRY_ELIGIBLE[chosen] && spare_bits(row) >= 3 && i < xs.len() {
                if let Some(r_idx) = (0..REDUCED_ROWS.len()).find(|&r| {
                    let rr = REDUCED_ROWS[r];
                    let count = (rr.0 as usize).min(xs.len() - i);
                    fits(rr, &xs[i..i + count])
                }) {
                    let shift = 28 - spare_bits(row);
                    word |= (r_idx as u32) << shift;
                    carried = Some(r_idx);
                }
            }

            dst[pos..pos + 4].copy_from_slice(&word.to_le_bytes());
            pos += 4;
        }
        pos
    }

    fn decode(dst: &mut [u32], src: &[u8]) -> Result<usize> {
        let mut pos = 0;
        let mut i = 0;
        let mut carried: Option<usize> = None;

        while i < dst.len() {
            if pos + 4 > src.len() {
                return Err(Error::new(ErrorKind::Decode, "carryover12: word truncated"));
            }
            let word = u32::from_le_bytes(src[pos..pos + 4].try_into().unwrap());
            pos += 4;

            if let Some(r_idx) = carried.take() {
                let row = REDUCED_ROWS[r_idx];
                let mask = (1u64 << row.1) as u32 - 1;
                let n = (row.0 as usize).min(dst.len() - i);
                for j in 0..n {
                    dst[i + j] = (word >> (j as u32 * row.1)) & mask;
                }
                i += n;
                continue;
            }

            let selector = (word >> 28) as usize;
            if selector >= OWN_ROWS.len() {
                return Err(Error::new(ErrorKind::Decode, "carryover12: bad selector"));
            }
            let row = OWN_ROWS[selector];
            let mask = (1u64 << row.1) as u32 - 1;
            let n = (row.0 as usize).min(dst.len() - i);
            for j in 0..n {
                dst[i + j] = (word >> (j as u32 * row.1)) & mask;
            }
            i += n;

            if CARRY_ELIGIBLE[selector] && spare_bits(row) >= 3 && i < dst.len() {
                let shift = 28 - spare_bits(row);
                let r_idx = ((word >> shift) & 0x7) as usize;
                carried = Some(r_idx);
            }
        }
        Ok(pos)
    }
}
