//! Relative-10: 32-bit words sharing Simple-9's "selector + packed data"
//! shape, but a word whose row leaves at least 2 spare data bits forwards
//! the *next* word's selector into those spare bits instead of wasting
//! them. A forwarded-to word then carries no selector of its own — all 32
//! bits are data, read back per the reduced 2-bit row table below. When a
//! word's row has no spare room, the next word falls back to carrying its
//! own inline 4-bit selector (tagged by using one of the two non-carryable
//! own-rows). This rewrite's own row tables (see DESIGN.md); not a
//! bit-exact port of the original.

use super::IntegerCodec;
use crate::core::error::{Error, ErrorKind, Result};

/// Own-selector rows (4-bit selector, values 0..=7), packed over a 28-bit
/// data field. Rows 0..=5 leave >= 2 spare bits and are carry-eligible;
/// rows 6 and 7 fill all 28 bits and never carry.
const OWN_ROWS: [(u32, u32); 8] = [
    (26, 1),
    (13, 2),
    (8, 3),
    (6, 4),
    (5, 5),
    (4, 6),
    (4, 7),
    (1, 28),
];

const CARRY_ELIGIBLE: [bool; 8] = [true, true, true, true, true, true, false, false];

/// The reduced, 2-bit-addressable row table used by a *carried* word,
/// which has no selector field of its own and packs the full 32 bits.
const REDUCED_ROWS: [(u32, u32); 4] = [(32, 1), (16, 2), (10, 3), (6, 5)];

fn spare_bits(row: (u32, u32)) -> u32 {
    28 - row.0 * row.1
}

fn fits(row: (u32, u32), xs: &[u32]) -> bool {
    xs.iter().all(|&x| x < (1u64 << row.1) as u32)
}

pub struct RelativeTenCodec;

impl IntegerCodec for RelativeTenCodec {
    const NAME: &'static str = "relative10";
    const MAX_VALUE: u32 = (1 << 28) - 1;

    fn encode(dst: &mut [u8], xs: &[u32]) -> usize {
        if xs.is_empty() || xs.iter().any(|&x| x > Self::MAX_VALUE) {
            return 0;
        }
        let mut pos = 0;
        let mut i = 0;
        // `carried` holds the reduced-row index the current word must use
        // (no own selector field), set by the previous word's carry.
        let mut carried: Option<usize> = None;

        while i < xs.len() {
            if pos + 4 > dst.len() {
                return 0;
            }

            if let Some(r_idx) = carried.take() {
                let row = REDUCED_ROWS[r_idx];
                let count = (row.0 as usize).min(xs.len() - i);
                if !fits(row, &xs[i..i + count]) {
                    // Can't honor the forwarded selector for this data;
                    // this rewrite requires the encoder to choose rows
                    // consistently, so fall back to an own-selector word.
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

            // Choose an own-selector row for this word: prefer the
            // highest count row that fits.
            let chosen = (0..OWN_ROWS.len())
                .filter(|&r| {
                    let row = OWN_ROWS[r];
                    let count = row.0 as usize;
                    i + count <= xs.len() && fits(row, &xs[i..i + count])
                })
                .max_by_key(|&r| OWN_ROWS[r].0)
                .unwrap_or(7); // (1, 28) always fits a single value

            let row = OWN_ROWS[chosen];
            let count = (row.0 as usize).min(xs.len() - i);
            let mut word: u32 = (chosen as u32) << 28;
            for (j, &x) in xs[i..i + count].iter().enumerate() {
                word |= x << (j as u32 * row.1);
            }
            i += count;

            // If this row leaves >= 2 spare bits and there's a next word,
            // try to forward a reduced selector that fits the remaining
            // data, writing it into the top spare bits of the data field.
            if CARRY_ELIGIBLE[chosen] && spare_bits(row) >= 2 && i < xs.len() {
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
                return Err(Error::new(ErrorKind::Decode, "relative10: word truncated"));
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
                return Err(Error::new(ErrorKind::Decode, "relative10: bad selector"));
            }
            let row = OWN_ROWS[selector];
            let mask = (1u64 << row.1) as u32 - 1;
            let n = (row.0 as usize).min(dst.len() - i);
            for j in 0..n {
                dst[i + j] = (word >> (j as u32 * row.1)) & mask;
            }
            i += n;

            if CARRY_ELIGIBLE[selector] && spare_bits(row) >= 2 && i < dst.len() {
                let shift = 28 - spare_bits(row);
                let r_idx = ((word >> shift) & 0x3) as usize;
                carried = Some(r_idx);
            }
        }
        Ok(pos)
    }
}
