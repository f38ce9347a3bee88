//! Burst error correction for the DARC (272,190) difference-set cyclic
//! code.
//!
//! A received 272-bit block is a codeword of the cyclic code generated by
//! the CRC-82/DARC polynomial, so its CRC-82 is the error syndrome.
//! Correction precomputes the syndrome of every burst pattern up to 8 bits
//! wide at every starting offset and repairs a block by xor-ing the
//! matching error vector back in. At most one burst is repaired per
//! codeword; an unknown syndrome leaves the block untouched.

use std::collections::HashMap;

use bitvec::prelude::*;
use lazy_static::lazy_static;
use tracing::{debug, warn};

use crate::constants::{BLOCK_LENGTH, DSCC_MAX_BURST_WIDTH};
use crate::error_correction::checksum::crc_82_darc;

lazy_static! {
    static ref BITFLIP_SYNDROME_MAP: HashMap<u128, BitVec<u8, Msb0>> =
        generate_bitflip_syndrome_map(BLOCK_LENGTH, DSCC_MAX_BURST_WIDTH);
}

/// Error vector holding `pattern` with its lowest bit at weight
/// `2^offset` of a `length`-bit MSB-first word.
fn burst_error_vector(
    pattern: u32,
    width: usize,
    offset: usize,
    length: usize,
) -> BitVec<u8, Msb0> {
    let mut vector = bitvec![u8, Msb0; 0; length];
    for bit in 0..width {
        if pattern >> bit & 1 != 0 {
            vector.set(length - 1 - offset - bit, true);
        }
    }
    vector
}

/// Syndrome map over every burst of `1..=error_width` bits.
///
/// A burst's first and last bits are set by definition; the interior bits
/// enumerate freely.
fn generate_bitflip_syndrome_map(
    length: usize,
    error_width: usize,
) -> HashMap<u128, BitVec<u8, Msb0>> {
    let mut map = HashMap::new();
    for width in 1..=error_width {
        let error_base: u32 = 1 << (width - 1) | 1;
        let counter_max: u32 = if width > 2 { 1 << (width - 2) } else { 1 };
        for counter in 0..counter_max {
            let pattern = error_base | counter << 1;
            for offset in 0..length - width {
                let error_vector = burst_error_vector(pattern, width, offset, length);
                map.insert(crc_82_darc(&error_vector), error_vector);
            }
        }
    }
    map
}

/// Correct up to one burst of at most 8 bits in a 272-bit block.
///
/// Returns the corrected buffer (unchanged when the syndrome is already
/// zero), or `None` when the syndrome has no known error vector; the
/// caller keeps the original in that case.
pub fn correct_error_dscc_272_190(buffer: &BitSlice<u8, Msb0>) -> Option<BitVec<u8, Msb0>> {
    assert_eq!(buffer.len(), BLOCK_LENGTH, "buffer length must be 272");

    let syndrome = crc_82_darc(buffer);
    if syndrome == 0 {
        return Some(buffer.to_bitvec());
    }

    debug!("syndrome is not zero, trying burst correction: syndrome={syndrome:#x}");
    match BITFLIP_SYNDROME_MAP.get(&syndrome) {
        Some(error_vector) => {
            let mut corrected = buffer.to_bitvec();
            for index in error_vector.iter_ones() {
                let bit = !corrected[index];
                corrected.set(index, bit);
            }
            Some(corrected)
        }
        None => {
            warn!("error vector not found, cannot correct error");
            None
        }
    }
}
