//! L3 data packet fields.

use bitvec::prelude::*;
use snafu::Snafu;

use crate::constants::DATA_PACKET_LENGTH;
use crate::util::bitvec_utils::FromBitSlice;

/// 4-bit service identification codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceId {
    Undefined0 = 0x0,
    Transmission1Mode = 0x1,
    Transmission2Mode = 0x2,
    Transmission3Mode = 0x3,
    Transmission4Mode = 0x4,
    Transmission5Mode = 0x5,
    Transmission6Mode = 0x6,
    Transmission7Mode = 0x7,
    Transmission8Mode = 0x8,
    Transmission9Mode = 0x9,
    UndefinedA = 0xA,
    UndefinedB = 0xB,
    UndefinedC = 0xC,
    AdditionalInformation = 0xD,
    AuxiliarySignal = 0xE,
    OperationalSignal = 0xF,
}

impl ServiceId {
    /// Decode the low four bits of `code`.
    pub fn from_code(code: u8) -> ServiceId {
        match code & 0xF {
            0x0 => ServiceId::Undefined0,
            0x1 => ServiceId::Transmission1Mode,
            0x2 => ServiceId::Transmission2Mode,
            0x3 => ServiceId::Transmission3Mode,
            0x4 => ServiceId::Transmission4Mode,
            0x5 => ServiceId::Transmission5Mode,
            0x6 => ServiceId::Transmission6Mode,
            0x7 => ServiceId::Transmission7Mode,
            0x8 => ServiceId::Transmission8Mode,
            0x9 => ServiceId::Transmission9Mode,
            0xA => ServiceId::UndefinedA,
            0xB => ServiceId::UndefinedB,
            0xC => ServiceId::UndefinedC,
            0xD => ServiceId::AdditionalInformation,
            0xE => ServiceId::AuxiliarySignal,
            _ => ServiceId::OperationalSignal,
        }
    }

    pub fn value(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Snafu)]
pub enum DataPacketError {
    /// Packet buffer is not exactly 176 bits
    #[snafu(display("data packet buffer must be 176 bits, got {length}"))]
    InvalidBufferLength { length: usize },
}

/// A parsed 176-bit data packet.
///
/// The additional-information service uses Composition 2 (4-bit group and
/// packet numbers, 160-bit data block); every other service uses
/// Composition 1 (14-bit group number, 10-bit packet number, 144-bit data
/// block). Multi-bit header fields arrive least significant bit first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPacket {
    pub service_id: ServiceId,
    pub decode_id_flag: bool,
    pub end_of_information_flag: bool,
    pub update_flag: u8,
    pub data_group_number: u16,
    pub data_packet_number: u16,
    pub data_block: BitVec<u8, Msb0>,
}

impl DataPacket {
    pub fn from_buffer(buffer: &BitSlice<u8, Msb0>) -> Result<Self, DataPacketError> {
        if buffer.len() != DATA_PACKET_LENGTH {
            return InvalidBufferLengthSnafu {
                length: buffer.len(),
            }
            .fail();
        }

        let service_id = ServiceId::from_code(u8::from_bitslice_rev(&buffer[0..4]));
        let decode_id_flag = buffer[4];
        let end_of_information_flag = buffer[5];
        let update_flag = u8::from_bitslice_rev(&buffer[6..8]);

        let (data_group_number, data_packet_number, data_block) =
            if service_id == ServiceId::AdditionalInformation {
                (
                    u16::from_bitslice_rev(&buffer[8..12]),
                    u16::from_bitslice_rev(&buffer[12..16]),
                    buffer[16..].to_bitvec(),
                )
            } else {
                (
                    u16::from_bitslice_rev(&buffer[8..22]),
                    u16::from_bitslice_rev(&buffer[22..32]),
                    buffer[32..].to_bitvec(),
                )
            };

        Ok(Self {
            service_id,
            decode_id_flag,
            end_of_information_flag,
            update_flag,
            data_group_number,
            data_packet_number,
            data_block,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack_reversed(bits: &mut BitVec<u8, Msb0>, value: u32, width: usize) {
        for i in 0..width {
            bits.push((value >> i) & 1 != 0);
        }
    }

    #[test]
    fn test_parse_composition_1() {
        let mut buffer: BitVec<u8, Msb0> = BitVec::new();
        pack_reversed(&mut buffer, 0x2, 4);
        buffer.push(true);
        buffer.push(false);
        pack_reversed(&mut buffer, 0x3, 2);
        pack_reversed(&mut buffer, 0x1234, 14);
        pack_reversed(&mut buffer, 0x21A, 10);
        buffer.resize(DATA_PACKET_LENGTH, false);
        buffer.set(32, true);

        let packet = DataPacket::from_buffer(&buffer).unwrap();
        assert_eq!(packet.service_id, ServiceId::Transmission2Mode);
        assert!(packet.decode_id_flag);
        assert!(!packet.end_of_information_flag);
        assert_eq!(packet.update_flag, 0x3);
        assert_eq!(packet.data_group_number, 0x1234);
        assert_eq!(packet.data_packet_number, 0x21A);
        assert_eq!(packet.data_block.len(), 144);
        assert!(packet.data_block[0]);
        assert_eq!(packet.data_block.count_ones(), 1);
    }

    #[test]
    fn test_parse_composition_2() {
        let mut buffer: BitVec<u8, Msb0> = BitVec::new();
        pack_reversed(&mut buffer, 0xD, 4);
        buffer.push(false);
        buffer.push(true);
        pack_reversed(&mut buffer, 0x0, 2);
        pack_reversed(&mut buffer, 0x9, 4);
        pack_reversed(&mut buffer, 0x5, 4);
        buffer.resize(DATA_PACKET_LENGTH, false);

        let packet = DataPacket::from_buffer(&buffer).unwrap();
        assert_eq!(packet.service_id, ServiceId::AdditionalInformation);
        assert!(!packet.decode_id_flag);
        assert!(packet.end_of_information_flag);
        assert_eq!(packet.data_group_number, 0x9);
        assert_eq!(packet.data_packet_number, 0x5);
        assert_eq!(packet.data_block.len(), 160);
    }

    #[test]
    fn test_wrong_length_is_rejected() {
        let buffer = bitvec![u8, Msb0; 0; 100];
        assert!(DataPacket::from_buffer(&buffer).is_err());
    }

    #[test]
    fn test_service_id_codes() {
        assert_eq!(ServiceId::from_code(0x0), ServiceId::Undefined0);
        assert_eq!(ServiceId::from_code(0xD), ServiceId::AdditionalInformation);
        assert_eq!(ServiceId::from_code(0xF), ServiceId::OperationalSignal);
        assert_eq!(ServiceId::from_code(0x2).value(), 0x2);
    }
}
