// ARIB STD-B3 wire constants. Values are bit-exact; do not alter.

/// L2 block length on the wire, in bits
pub const BLOCK_LENGTH: usize = 272;

/// Meaningful bits per block once the horizontal parity is consumed
pub const BLOCK_PAYLOAD_LENGTH: usize = 190;

/// L3 data packet carried by an information block, in bits
pub const DATA_PACKET_LENGTH: usize = 176;

/// Blocks per L2 frame
pub const FRAME_BLOCK_COUNT: usize = 272;

/// Descrambler seed (9-bit Galois register)
pub const LFSR_SEED: u32 = 0x155;

/// Descrambler feedback taps
pub const LFSR_POLYNOMIAL: u32 = 0x110;

// CRC generator polynomials without the leading (MSB) 1.
// All three run MSB-first with zero init and no final xor.
pub const CRC_14_DARC_POLYNOMIAL: u16 = 0x0805;
pub const CRC_16_DARC_POLYNOMIAL: u16 = 0x1021;
pub const CRC_82_DARC_POLYNOMIAL: u128 = 0x0308C0111011401440411;

/// Widest burst the (272,190) difference-set cyclic code repairs
pub const DSCC_MAX_BURST_WIDTH: usize = 8;

/// Default Hamming-distance tolerance for BIC detection
pub const DEFAULT_ALLOWABLE_BIC_ERRORS: u32 = 2;
