//! L4 data group types.
//!
//! Composition 1 frames a heading byte, a size field, the payload, an end
//! mark and a CRC-16. Composition 2 (additional-information service)
//! carries raw segment data with a CRC-16 only when the payload exceeds
//! 160 bits. Byte-oriented fields arrive least significant bit first
//! within each byte.

use std::fmt;

use bitvec::prelude::*;
use snafu::Snafu;
use tracing::warn;

use crate::error_correction::checksum::crc_16_darc;
use crate::l3::data_packet::ServiceId;
use crate::util::bit_ops::{reverse_bits, reverse_range};
use crate::util::bitvec_utils::{bits_to_bytes, FromBitSlice, PackBitvecFieldType};

/// Composition 1 framing occupies 6 bytes: heading, two size bytes, end
/// mark and CRC.
const GROUP_1_FRAMING_BYTES: usize = 6;
const GROUP_1_MIN_LENGTH: usize = 48;
/// Composition 1 pads to an 18-byte boundary, Composition 2 to 20 bytes.
const GROUP_1_UNIT_BYTES: usize = 18;
const GROUP_2_UNIT_BYTES: usize = 20;
/// Composition 2 payloads above this bit count carry a trailing CRC-16.
const GROUP_2_CRC_THRESHOLD: usize = 160;

#[derive(Debug, Snafu)]
pub enum DataGroupError {
    /// Group buffer too short for the Composition 1 framing
    #[snafu(display("data group buffer must be at least 48 bits, got {length}"))]
    BufferTooShort { length: usize },
}

fn hex_string(bits: &BitSlice<u8, Msb0>) -> String {
    bits_to_bytes(bits)
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// Data group Composition 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataGroup1 {
    pub service_id: ServiceId,
    pub data_group_number: u16,
    pub start_of_heading: u8,
    pub data_group_link: u8,
    pub data_group_data: BitVec<u8, Msb0>,
    pub end_of_data_group: u8,
    pub crc: u16,
}

impl DataGroup1 {
    /// Parse an accumulated group buffer.
    ///
    /// A heading other than 0x01 is logged but tolerated; a size field
    /// running past the buffer clamps to what was actually received.
    pub fn from_buffer(
        service_id: ServiceId,
        data_group_number: u16,
        buffer: &BitSlice<u8, Msb0>,
    ) -> Result<Self, DataGroupError> {
        if buffer.len() < GROUP_1_MIN_LENGTH {
            return BufferTooShortSnafu {
                length: buffer.len(),
            }
            .fail();
        }

        let start_of_heading = u8::from_bitslice_rev(&buffer[0..8]);
        if start_of_heading != 0x01 {
            warn!("start_of_heading is not 0x01: start_of_heading={start_of_heading:#x}");
        }

        let data_group_link = buffer[15] as u8;
        let data_group_size = (u16::from_bitslice_rev(&buffer[8..15]) << 8)
            | u16::from_bitslice_rev(&buffer[16..24]);

        let available = buffer.len() - 24;
        let data_bits = (8 * data_group_size as usize).min(available - available % 8);
        let data_group_data =
            BitVec::from_vec(reverse_bits(&bits_to_bytes(&buffer[24..24 + data_bits])));

        let tail = buffer.len() - 24;
        let end_of_data_group = u8::from_bitslice_rev(&buffer[tail..tail + 8]);
        let crc = u16::from_bitslice(&buffer[buffer.len() - 16..]);

        Ok(Self {
            service_id,
            data_group_number,
            start_of_heading,
            data_group_link,
            data_group_data,
            end_of_data_group,
            crc,
        })
    }

    /// Re-encode the wire image; the basis for the CRC check. The heading
    /// byte is always the nominal 0x01, so a corrupted heading shows up as
    /// a failed CRC rather than being re-encoded.
    pub fn to_buffer(&self) -> BitVec<u8, Msb0> {
        let data_bytes = reverse_bits(&bits_to_bytes(&self.data_group_data));
        let data_group_size = data_bytes.len();
        let total_size = GROUP_1_FRAMING_BYTES + data_group_size;
        let padding_length = 8 * (GROUP_1_UNIT_BYTES - total_size % GROUP_1_UNIT_BYTES);

        let mut buffer: BitVec<u8, Msb0> = BitVec::new();
        0x01u8.pack_into_bitvec(&mut buffer, 8);
        self.data_group_link.pack_into_bitvec(&mut buffer, 1);
        (data_group_size as u16).pack_into_bitvec(&mut buffer, 15);
        buffer.extend_from_bitslice(&BitVec::<u8, Msb0>::from_vec(data_bytes));
        buffer.resize(buffer.len() + padding_length, false);
        self.end_of_data_group.pack_into_bitvec(&mut buffer, 8);
        self.crc.pack_into_bitvec(&mut buffer, 16);

        reverse_range(&mut buffer[0..8]);
        reverse_range(&mut buffer[8..16]);
        reverse_range(&mut buffer[16..24]);
        let tail = buffer.len() - 24;
        reverse_range(&mut buffer[tail..tail + 8]);
        buffer
    }

    pub fn is_crc_valid(&self) -> bool {
        let buffer = self.to_buffer();
        crc_16_darc(&buffer[..buffer.len() - 16]) == self.crc
    }
}

impl fmt::Display for DataGroup1 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "is_crc_valid={} service_id={:#x} data_group_number={:#x} \
             start_of_heading={:#x} data_group_link={:#x} data_group_data={} \
             end_of_data_group={:#x} crc={:#x}",
            self.is_crc_valid(),
            self.service_id.value(),
            self.data_group_number,
            self.start_of_heading,
            self.data_group_link,
            hex_string(&self.data_group_data),
            self.end_of_data_group,
            self.crc,
        )
    }
}

/// Data group Composition 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataGroup2 {
    pub service_id: ServiceId,
    pub data_group_number: u16,
    pub segments_data: BitVec<u8, Msb0>,
    pub crc: Option<u16>,
}

impl DataGroup2 {
    pub fn from_buffer(
        service_id: ServiceId,
        data_group_number: u16,
        buffer: &BitSlice<u8, Msb0>,
    ) -> Self {
        let (segments_data, crc) = if buffer.len() > GROUP_2_CRC_THRESHOLD {
            (
                BitVec::from_vec(reverse_bits(&bits_to_bytes(&buffer[..buffer.len() - 16]))),
                Some(u16::from_bitslice(&buffer[buffer.len() - 16..])),
            )
        } else {
            (BitVec::from_vec(reverse_bits(&bits_to_bytes(buffer))), None)
        };
        Self {
            service_id,
            data_group_number,
            segments_data,
            crc,
        }
    }

    pub fn has_crc(&self) -> bool {
        self.segments_data.len() > GROUP_2_CRC_THRESHOLD
    }

    /// Re-encode the wire image; the basis for the CRC check.
    pub fn to_buffer(&self) -> BitVec<u8, Msb0> {
        let segment_bytes = reverse_bits(&bits_to_bytes(&self.segments_data));
        let total_size = if self.has_crc() {
            segment_bytes.len() + 2
        } else {
            segment_bytes.len()
        };
        let padding_length = 8 * (GROUP_2_UNIT_BYTES - total_size % GROUP_2_UNIT_BYTES);

        let mut buffer = BitVec::<u8, Msb0>::from_vec(segment_bytes);
        buffer.resize(buffer.len() + padding_length, false);
        if let Some(crc) = self.crc {
            crc.pack_into_bitvec(&mut buffer, 16);
        }
        buffer
    }

    pub fn is_crc_valid(&self) -> bool {
        match self.crc {
            Some(crc) => {
                let buffer = self.to_buffer();
                crc_16_darc(&buffer[..buffer.len() - 16]) == crc
            }
            None => true,
        }
    }
}

impl fmt::Display for DataGroup2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let crc_string = match self.crc {
            Some(crc) => format!("{crc:#x}"),
            None => "None".to_string(),
        };
        write!(
            f,
            "is_crc_valid={} service_id={:#x} data_group_number={:#x} \
             segments_data={} crc={}",
            self.is_crc_valid(),
            self.service_id.value(),
            self.data_group_number,
            hex_string(&self.segments_data),
            crc_string,
        )
    }
}

/// Either data group composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataGroup {
    Group1(DataGroup1),
    Group2(DataGroup2),
}

impl DataGroup {
    pub fn service_id(&self) -> ServiceId {
        match self {
            DataGroup::Group1(group) => group.service_id,
            DataGroup::Group2(group) => group.service_id,
        }
    }

    pub fn data_group_number(&self) -> u16 {
        match self {
            DataGroup::Group1(group) => group.data_group_number,
            DataGroup::Group2(group) => group.data_group_number,
        }
    }

    pub fn is_crc_valid(&self) -> bool {
        match self {
            DataGroup::Group1(group) => group.is_crc_valid(),
            DataGroup::Group2(group) => group.is_crc_valid(),
        }
    }
}

impl fmt::Display for DataGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataGroup::Group1(group) => group.fmt(f),
            DataGroup::Group2(group) => group.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Composition 1 group over `data` with a matching CRC.
    fn sealed_group_1(data: Vec<u8>) -> DataGroup1 {
        let mut group = DataGroup1 {
            service_id: ServiceId::Transmission2Mode,
            data_group_number: 0x21,
            start_of_heading: 0x01,
            data_group_link: 0,
            data_group_data: BitVec::from_vec(data),
            end_of_data_group: 0x1D,
            crc: 0,
        };
        let image = group.to_buffer();
        group.crc = crc_16_darc(&image[..image.len() - 16]);
        group
    }

    #[test]
    fn test_group_1_wire_round_trip() {
        let data: Vec<u8> = (0..42u8).collect();
        let group = sealed_group_1(data);
        assert!(group.is_crc_valid());

        let wire = group.to_buffer();
        assert_eq!(wire.len(), 8 * 54);
        let parsed =
            DataGroup1::from_buffer(group.service_id, group.data_group_number, &wire).unwrap();
        assert_eq!(parsed, group);
        assert!(parsed.is_crc_valid());
    }

    #[test]
    fn test_group_1_detects_a_bad_crc() {
        let mut group = sealed_group_1((0..12u8).collect());
        group.crc ^= 0x0001;
        assert!(!group.is_crc_valid());
    }

    #[test]
    fn test_group_1_rejects_short_buffers() {
        let buffer = bitvec![u8, Msb0; 0; 40];
        assert!(DataGroup1::from_buffer(ServiceId::Transmission1Mode, 0, &buffer).is_err());
    }

    #[test]
    fn test_group_1_clamps_an_oversized_size_field() {
        let group = sealed_group_1((0..12u8).collect());
        let mut wire = group.to_buffer();
        // Inflate the size field (bits 16..24 hold the reversed low byte).
        for index in 16..24 {
            wire.set(index, true);
        }
        let parsed =
            DataGroup1::from_buffer(group.service_id, group.data_group_number, &wire).unwrap();
        assert!(parsed.data_group_data.len() <= wire.len() - 24);
    }

    #[test]
    fn test_group_2_without_crc() {
        let buffer = BitVec::from_vec(vec![0x80u8; 20]);
        let group = DataGroup2::from_buffer(ServiceId::AdditionalInformation, 0x9, &buffer);
        assert_eq!(group.crc, None);
        assert!(!group.has_crc());
        assert!(group.is_crc_valid());
        assert_eq!(bits_to_bytes(&group.segments_data), vec![0x01u8; 20]);
    }

    #[test]
    fn test_group_2_with_crc() {
        let mut buffer = BitVec::from_vec(vec![0xC0u8; 38]);
        0xBEEFu16.pack_into_bitvec(&mut buffer, 16);
        let group = DataGroup2::from_buffer(ServiceId::AdditionalInformation, 0x3, &buffer);
        assert_eq!(group.crc, Some(0xBEEF));
        assert!(group.has_crc());
        assert_eq!(group.segments_data.len(), 8 * 38);
        assert_eq!(bits_to_bytes(&group.segments_data), vec![0x03u8; 38]);
    }

    #[test]
    fn test_group_2_crc_check_follows_the_wire_image() {
        let segments = BitVec::from_vec(vec![0x5Au8; 38]);
        let mut group = DataGroup2 {
            service_id: ServiceId::AdditionalInformation,
            data_group_number: 0x1,
            segments_data: segments,
            crc: Some(0),
        };
        let image = group.to_buffer();
        group.crc = Some(crc_16_darc(&image[..image.len() - 16]));
        assert!(group.is_crc_valid());
        group.crc = Some(group.crc.unwrap() ^ 0x8000);
        assert!(!group.is_crc_valid());
    }

    #[test]
    fn test_display_formats() {
        let group = sealed_group_1((0..12u8).collect());
        let line = group.to_string();
        assert!(line.starts_with("is_crc_valid=true service_id=0x2"));
        assert!(line.contains("data_group_number=0x21"));
        assert!(line.contains("start_of_heading=0x1"));

        let buffer = BitVec::from_vec(vec![0u8; 20]);
        let group = DataGroup2::from_buffer(ServiceId::AdditionalInformation, 0x9, &buffer);
        let line = DataGroup::Group2(group).to_string();
        assert!(line.contains("crc=None"));
        assert!(line.contains("service_id=0xd"));
    }
}
