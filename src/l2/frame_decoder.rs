//! Streaming block-to-frame decoder.

use tracing::debug;

use crate::constants::FRAME_BLOCK_COUNT;
use crate::l2::block::{Bic, Block, Frame};

/// BIC required at the 1-based frame position `block_number`.
fn required_bic(block_number: usize) -> Bic {
    match block_number {
        1..=13 => Bic::Bic1,
        137..=149 => Bic::Bic2,
        14..=136 => {
            if block_number % 3 == 1 {
                Bic::Bic4
            } else {
                Bic::Bic3
            }
        }
        150..=272 => {
            if block_number % 3 == 2 {
                Bic::Bic4
            } else {
                Bic::Bic3
            }
        }
        _ => unreachable!("frame positions are 1..=272"),
    }
}

/// Collects 272 consecutive blocks whose BICs follow the frame structure,
/// then runs the vertical parity pass and emits the frame. A block out of
/// sequence wipes the whole buffer; resynchronization starts from the next
/// position-1 block.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    block_buffer: Vec<Block>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.block_buffer.clear();
    }

    /// Feed one block; emits a frame when the 272nd valid block lands.
    pub fn push_block(&mut self, block: Block) -> Option<Frame> {
        let block_number = self.block_buffer.len() + 1;
        if block.block_id() != required_bic(block_number) {
            debug!(
                "invalid block sequence: position={block_number} block_id={:?}",
                block.block_id()
            );
            self.block_buffer.clear();
            return None;
        }

        self.block_buffer.push(block);
        if self.block_buffer.len() < FRAME_BLOCK_COUNT {
            return None;
        }

        debug!("272 blocks collected");
        Some(Frame::from_block_buffer(std::mem::take(
            &mut self.block_buffer,
        )))
    }
}
