//! Streaming bit-to-block decoder.

use bitvec::prelude::*;
use tracing::debug;

use crate::constants::{
    BLOCK_LENGTH, DEFAULT_ALLOWABLE_BIC_ERRORS, LFSR_POLYNOMIAL, LFSR_SEED,
};
use crate::l2::block::{Bic, Block};
use crate::lfsr::Lfsr;

/// Decodes a demodulated bit stream into L2 blocks.
///
/// While unlocked, every bit shifts through a 16-bit register compared
/// against the four BICs with a Hamming-distance tolerance. Once a BIC is
/// detected, the following 272 bits are descrambled and collected, the
/// block is emitted, and the search restarts.
#[derive(Debug)]
pub struct BlockDecoder {
    current_bic: u16,
    detected_bic: Option<Bic>,
    data_buffer: BitVec<u8, Msb0>,
    lfsr: Lfsr,
    /// Hamming-distance tolerance for BIC detection.
    pub allowable_bic_errors: u32,
}

impl Default for BlockDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockDecoder {
    pub fn new() -> Self {
        Self {
            current_bic: 0x0000,
            detected_bic: None,
            data_buffer: BitVec::with_capacity(BLOCK_LENGTH),
            lfsr: Lfsr::new(LFSR_SEED, LFSR_POLYNOMIAL),
            allowable_bic_errors: DEFAULT_ALLOWABLE_BIC_ERRORS,
        }
    }

    /// Discard the search register, any partial payload and the
    /// descrambler state.
    pub fn reset(&mut self) {
        self.current_bic = 0x0000;
        self.detected_bic = None;
        self.data_buffer.clear();
        self.lfsr = Lfsr::new(LFSR_SEED, LFSR_POLYNOMIAL);
    }

    /// Closest BIC within the tolerance, earliest code winning ties.
    fn detect_bic(&self) -> Option<Bic> {
        let mut best: Option<(Bic, u32)> = None;
        for bic in Bic::ALL {
            let distance = bic.hamming_distance(self.current_bic);
            if best.map_or(true, |(_, best_distance)| distance < best_distance) {
                best = Some((bic, distance));
            }
        }
        best.filter(|&(_, distance)| distance <= self.allowable_bic_errors)
            .map(|(bic, _)| bic)
    }

    /// Feed one bit; emits a block when the 272nd payload bit lands.
    pub fn push_bit(&mut self, bit: bool) -> Option<Block> {
        let Some(block_id) = self.detected_bic else {
            self.current_bic = (self.current_bic << 1) | bit as u16;
            self.detected_bic = self.detect_bic();
            return None;
        };

        let descrambled = bit ^ self.lfsr.next_bit();
        self.data_buffer.push(descrambled);
        if self.data_buffer.len() < BLOCK_LENGTH {
            return None;
        }

        debug!("272 bits collected: block_id={block_id:?}");
        let block = Block::from_buffer(block_id, &self.data_buffer);
        self.reset();
        match block {
            Ok(block) => Some(block),
            Err(error) => {
                debug!("discarding undecodable block: {error}");
                None
            }
        }
    }
}
