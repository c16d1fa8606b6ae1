//! QMX, modeled minus its SIMD-specific byte layout: a run-length
//! "selector stream" of one bit-width byte per 32-integer block, written
//! up front, followed by the blocks' packed bit data back to back. This
//! differs from [`super::bitpack`] only in *where* the per-block width
//! lives (bundled ahead of the data here, interleaved there) — the
//! essential idea QMX adds over plain bit-packing.

use super::IntegerCodec;
use crate::core::error::{Error, ErrorKind, Result};

const BLOCK_SIZE: usize = 32;

fn bits_needed(block: &[u32]) -> u32 {
    let max = block.iter().copied().max().unwrap_or(0);
    if max == 0 {
        0
    } else {
        32 - max.leading_zeros()
    }
}

pub struct QmxCodec;

impl IntegerCodec for QmxCodec {
    const NAME: &'static str = "qmx";
    const MAX_VALUE: u32 = u32::MAX;

    fn encode(dst: &mut [u8], xs: &[u32]) -> usize {
        if xs.is_empty() {
            return 0;
        }
        let n_blocks = xs.len().div_ceil(BLOCK_SIZE);
        if n_blocks > dst.len() {
            return 0;
        }
        let widths: Vec<u32> = xs.chunks(BLOCK_SIZE).map(bits_needed).collect();
        for (slot, &b) in dst[..n_blocks].iter_mut().zip(&widths) {
            *slot = b as u8;
        }
        let mut pos = n_blocks;

        for (block, &b) in xs.chunks(BLOCK_SIZE).zip(&widths) {
            let total_bits = block.len() as u64 * b as u64;
            let total_bytes = total_bits.div_ceil(8) as usize;
            if pos + total_bytes > dst.len() {
                return 0;
            }
            let mut bit_pos: u64 = 0;
            for &x in block {
                for i in (0..b).rev() {
                    let bit = (x >> i) & 1;
                    if bit != 0 {
                        let byte = pos + (bit_pos / 8) as usize;
                        dst[byte] |= 1 << (7 - bit_pos % 8);
                    }
                    bit_pos += 1;
                }
            }
            pos += total_bytes;
        }
        pos
    }

    fn decode(dst: &mut [u32], src: &[u8]) -> Result<usize> {
        let n_blocks = dst.len().div_ceil(BLOCK_SIZE);
        if n_blocks > src.len() {
            return Err(Error::new(ErrorKind::Decode, "qmx: missing selector stream"));
        }
        let widths = &src[..n_blocks];
        let mut pos = n_blocks;
        let mut i = 0;
        for &b in widths {
            let b = b as u32;
            let block_len = (dst.len() - i).min(BLOCK_SIZE);
            let total_bits = block_len as u64 * b as u64;
            let total_bytes = total_bits.div_ceil(8) as usize;
            if pos + total_bytes > src.len() {
                return Err(Error::new(ErrorKind::Decode, "qmx: block body truncated"));
            }
            let mut bit_pos: u64 = 0;
            for j in 0..block_len {
                let mut value = 0u32;
                for _ in 0..b {
                    let byte = pos + (bit_pos / 8) as usize;
                    let bit = (src[byte] >> (7 - bit_pos % 8)) & 1;
                    value = (value << 1) | bit as u32;
                    bit_pos += 1;
                }
                dst[i + j] = value;
            }
            pos += total_bytes;
            i += block_len;
        }
        Ok(pos)
    }
}
