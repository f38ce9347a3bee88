//! L2 block and frame data types.

use bitvec::prelude::*;
use snafu::Snafu;

use crate::constants::{
    BLOCK_LENGTH, BLOCK_PAYLOAD_LENGTH, DATA_PACKET_LENGTH, FRAME_BLOCK_COUNT,
};
use crate::error_correction::checksum::crc_14_darc;
use crate::error_correction::dscc::correct_error_dscc_272_190;
use crate::util::bitvec_utils::{FromBitSlice, PackBitvecFieldType};

/// Block Identification Code: the 16-bit marker opening every L2 block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bic {
    Bic1 = 0x135E,
    Bic2 = 0x74A6,
    Bic3 = 0xA791,
    Bic4 = 0xC875,
}

impl Bic {
    /// Detection order; ties in Hamming distance resolve to the earliest.
    pub const ALL: [Bic; 4] = [Bic::Bic1, Bic::Bic2, Bic::Bic3, Bic::Bic4];

    pub fn value(self) -> u16 {
        self as u16
    }

    /// Number of bits differing between `word` and this code.
    pub fn hamming_distance(self, word: u16) -> u32 {
        (self.value() ^ word).count_ones()
    }

    /// BIC 1 through 3 open information blocks; BIC 4 opens parity blocks.
    pub fn is_information(self) -> bool {
        !matches!(self, Bic::Bic4)
    }
}

#[derive(Debug, Snafu)]
pub enum BlockError {
    /// Payload buffer has a length other than 190 or 272 bits
    #[snafu(display("block buffer length must be 190 or 272, got {length}"))]
    InvalidBufferLength { length: usize },
}

/// Validate a payload buffer, running the burst corrector over full
/// 272-bit codewords (kept raw when uncorrectable). Returns the leading
/// 190 meaningful bits.
fn checked_payload(buffer: &BitSlice<u8, Msb0>) -> Result<BitVec<u8, Msb0>, BlockError> {
    match buffer.len() {
        BLOCK_PAYLOAD_LENGTH => Ok(buffer.to_bitvec()),
        BLOCK_LENGTH => {
            let corrected =
                correct_error_dscc_272_190(buffer).unwrap_or_else(|| buffer.to_bitvec());
            Ok(corrected[..BLOCK_PAYLOAD_LENGTH].to_bitvec())
        }
        length => InvalidBufferLengthSnafu { length }.fail(),
    }
}

/// Information block: a 176-bit data packet plus its CRC-14.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InformationBlock {
    pub block_id: Bic,
    pub data_packet: BitVec<u8, Msb0>,
    pub crc: u16,
}

impl InformationBlock {
    pub fn from_buffer(block_id: Bic, buffer: &BitSlice<u8, Msb0>) -> Result<Self, BlockError> {
        let payload = checked_payload(buffer)?;
        let data_packet = payload[..DATA_PACKET_LENGTH].to_bitvec();
        let crc = u16::from_bitslice(&payload[DATA_PACKET_LENGTH..]);
        Ok(Self {
            block_id,
            data_packet,
            crc,
        })
    }

    pub fn is_crc_valid(&self) -> bool {
        crc_14_darc(&self.data_packet) == self.crc
    }

    /// The 190-bit payload row this block contributes to the frame matrix.
    pub fn to_buffer(&self) -> BitVec<u8, Msb0> {
        let mut buffer = self.data_packet.clone();
        self.crc.pack_into_bitvec(&mut buffer, 14);
        buffer
    }
}

/// Parity block: one 190-bit row of the frame's vertical parity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParityBlock {
    pub block_id: Bic,
    pub vertical_parity: BitVec<u8, Msb0>,
}

impl ParityBlock {
    pub fn from_buffer(block_id: Bic, buffer: &BitSlice<u8, Msb0>) -> Result<Self, BlockError> {
        let vertical_parity = checked_payload(buffer)?;
        Ok(Self {
            block_id,
            vertical_parity,
        })
    }

    pub fn to_buffer(&self) -> BitVec<u8, Msb0> {
        self.vertical_parity.clone()
    }
}

/// Either kind of L2 block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Information(InformationBlock),
    Parity(ParityBlock),
}

impl Block {
    /// Build the block variant selected by the BIC.
    pub fn from_buffer(block_id: Bic, buffer: &BitSlice<u8, Msb0>) -> Result<Self, BlockError> {
        if block_id.is_information() {
            Ok(Block::Information(InformationBlock::from_buffer(
                block_id, buffer,
            )?))
        } else {
            Ok(Block::Parity(ParityBlock::from_buffer(block_id, buffer)?))
        }
    }

    pub fn block_id(&self) -> Bic {
        match self {
            Block::Information(block) => block.block_id,
            Block::Parity(block) => block.block_id,
        }
    }

    pub fn to_buffer(&self) -> BitVec<u8, Msb0> {
        match self {
            Block::Information(block) => block.to_buffer(),
            Block::Parity(block) => block.to_buffer(),
        }
    }

    fn is_information(&self) -> bool {
        matches!(self, Block::Information(_))
    }
}

/// A decoded L2 frame: the 190 information blocks that survive the
/// vertical parity pass, in their original relative order.
#[derive(Debug, Clone)]
pub struct Frame {
    pub blocks: Vec<InformationBlock>,
}

impl Frame {
    /// Assemble a frame from the 272 collected blocks.
    ///
    /// Rows are reordered information-first, each of the 190 columns of
    /// the resulting 272x190 matrix is run through the burst corrector
    /// (column bit r is row r's payload bit), and the information blocks
    /// are re-parsed from the corrected rows.
    pub fn from_block_buffer(block_buffer: Vec<Block>) -> Self {
        assert_eq!(
            block_buffer.len(),
            FRAME_BLOCK_COUNT,
            "block buffer must contain exactly 272 blocks"
        );

        let (information, parity): (Vec<Block>, Vec<Block>) =
            block_buffer.into_iter().partition(Block::is_information);
        let information_count = information.len();
        let mut blocks = information;
        blocks.extend(parity);

        let mut rows: Vec<BitVec<u8, Msb0>> = blocks.iter().map(Block::to_buffer).collect();
        for column in 0..BLOCK_PAYLOAD_LENGTH {
            let mut vertical = bitvec![u8, Msb0; 0; FRAME_BLOCK_COUNT];
            for (row, bits) in rows.iter().enumerate() {
                vertical.set(row, bits[column]);
            }
            if let Some(corrected) = correct_error_dscc_272_190(&vertical) {
                for (row, bits) in rows.iter_mut().enumerate() {
                    bits.set(column, corrected[row]);
                }
            }
        }

        let blocks = rows
            .iter()
            .take(information_count)
            .zip(&blocks)
            .map(|(row, block)| InformationBlock {
                block_id: block.block_id(),
                data_packet: row[..DATA_PACKET_LENGTH].to_bitvec(),
                crc: u16::from_bitslice(&row[DATA_PACKET_LENGTH..]),
            })
            .collect();
        Frame { blocks }
    }
}
