//! DARC checksums: CRC-14, CRC-16 and the 82-bit generator shared with the
//! (272,190) difference-set cyclic code.
//!
//! Byte-multiple messages go through the table-driven `crc` crate path;
//! other lengths take the bit-by-bit path. Both paths agree wherever both
//! apply.

use bitvec::prelude::*;
use crc::{Algorithm, Crc};

use crate::constants::{
    CRC_14_DARC_POLYNOMIAL, CRC_16_DARC_POLYNOMIAL, CRC_82_DARC_POLYNOMIAL,
};
use crate::util::bitvec_utils::bits_to_bytes;

const CRC_14_DARC: Algorithm<u16> = Algorithm {
    width: 14,
    poly: CRC_14_DARC_POLYNOMIAL,
    init: 0x0,
    refin: false,
    refout: false,
    xorout: 0x0,
    check: 0x0,
    residue: 0x0,
};

const CRC_16_DARC: Algorithm<u16> = Algorithm {
    width: 16,
    poly: CRC_16_DARC_POLYNOMIAL,
    init: 0x0,
    refin: false,
    refout: false,
    xorout: 0x0,
    check: 0x0,
    residue: 0x0,
};

const CRC_82_DARC: Algorithm<u128> = Algorithm {
    width: 82,
    poly: CRC_82_DARC_POLYNOMIAL,
    init: 0x0,
    refin: false,
    refout: false,
    xorout: 0x0,
    check: 0x0,
    residue: 0x0,
};

pub const CRC14: Crc<u16> = Crc::<u16>::new(&CRC_14_DARC);
pub const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_DARC);
pub const CRC82: Crc<u128> = Crc::<u128>::new(&CRC_82_DARC);

/// MSB-first shift-and-subtract over an arbitrary bit length.
fn crc_bit_by_bit(message: &BitSlice<u8, Msb0>, polynomial: u128, width: u32) -> u128 {
    let top = 1u128 << (width - 1);
    let mask = (top << 1) - 1;
    let mut crc = 0u128;
    for bit in message {
        let feedback = (crc & top != 0) ^ *bit;
        crc <<= 1;
        if feedback {
            crc ^= polynomial;
        }
    }
    crc & mask
}

/// CRC-14/DARC of an MSB-first message.
pub fn crc_14_darc(message: &BitSlice<u8, Msb0>) -> u16 {
    if message.len() % 8 == 0 {
        CRC14.checksum(&bits_to_bytes(message))
    } else {
        crc_bit_by_bit(message, CRC_14_DARC_POLYNOMIAL as u128, 14) as u16
    }
}

/// CRC-16/DARC of an MSB-first message.
pub fn crc_16_darc(message: &BitSlice<u8, Msb0>) -> u16 {
    if message.len() % 8 == 0 {
        CRC16.checksum(&bits_to_bytes(message))
    } else {
        crc_bit_by_bit(message, CRC_16_DARC_POLYNOMIAL as u128, 16) as u16
    }
}

/// CRC-82/DARC of an MSB-first message. The value doubles as the syndrome
/// of a (272,190) codeword.
pub fn crc_82_darc(message: &BitSlice<u8, Msb0>) -> u128 {
    if message.len() % 8 == 0 {
        CRC82.checksum(&bits_to_bytes(message))
    } else {
        crc_bit_by_bit(message, CRC_82_DARC_POLYNOMIAL, 82)
    }
}
