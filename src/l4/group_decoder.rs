//! Packet-to-group reassembly.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use bitvec::prelude::*;
use tracing::{debug, warn};

use crate::l3::data_packet::{DataPacket, ServiceId};
use crate::l4::data_group::{DataGroup, DataGroup1, DataGroup2};

/// Reassembles data packets into data groups.
///
/// Buffers are keyed by (service, group number). A buffer opens on packet
/// number 0 — packets for an unopened group are dropped — and every later
/// packet of the key appends in arrival order. The end-of-information flag
/// closes the buffer and emits the group.
#[derive(Debug, Default)]
pub struct DataGroupDecoder {
    data_group_buffers: HashMap<(ServiceId, u16), BitVec<u8, Msb0>>,
}

impl DataGroupDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.data_group_buffers.clear();
    }

    pub fn push_data_packets(&mut self, data_packets: Vec<DataPacket>) -> Vec<DataGroup> {
        let mut data_groups = Vec::new();

        for data_packet in data_packets {
            let key = (data_packet.service_id, data_packet.data_group_number);
            match self.data_group_buffers.entry(key) {
                Entry::Vacant(entry) => {
                    if data_packet.data_packet_number != 0 {
                        debug!(
                            "first data packet not found: service_id={:#x} \
                             data_group_number={:#x} data_packet_number={:#x}",
                            data_packet.service_id.value(),
                            data_packet.data_group_number,
                            data_packet.data_packet_number,
                        );
                        continue;
                    }
                    entry.insert(data_packet.data_block.clone());
                }
                Entry::Occupied(mut entry) => {
                    entry.get_mut().extend_from_bitslice(&data_packet.data_block);
                }
            }

            if data_packet.end_of_information_flag {
                let Some(buffer) = self.data_group_buffers.remove(&key) else {
                    continue;
                };
                if data_packet.service_id == ServiceId::AdditionalInformation {
                    data_groups.push(DataGroup::Group2(DataGroup2::from_buffer(
                        data_packet.service_id,
                        data_packet.data_group_number,
                        &buffer,
                    )));
                } else {
                    match DataGroup1::from_buffer(
                        data_packet.service_id,
                        data_packet.data_group_number,
                        &buffer,
                    ) {
                        Ok(group) => data_groups.push(DataGroup::Group1(group)),
                        Err(error) => warn!("dropping malformed data group: {error}"),
                    }
                }
            }
        }

        data_groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_correction::checksum::crc_16_darc;
    use crate::l4::data_group::DataGroup1;
    use crate::util::bitvec_utils::bits_to_bytes;

    fn packet(
        service_id: ServiceId,
        group: u16,
        number: u16,
        end: bool,
        data_block: BitVec<u8, Msb0>,
    ) -> DataPacket {
        DataPacket {
            service_id,
            decode_id_flag: false,
            end_of_information_flag: end,
            update_flag: 0,
            data_group_number: group,
            data_packet_number: number,
            data_block,
        }
    }

    /// Wire image of a Composition 1 group sized to fill `packets` 144-bit
    /// data blocks exactly.
    fn group_1_wire(data_bytes: usize, packets: usize) -> BitVec<u8, Msb0> {
        let mut group = DataGroup1 {
            service_id: ServiceId::Transmission3Mode,
            data_group_number: 0x7,
            start_of_heading: 0x01,
            data_group_link: 0,
            data_group_data: BitVec::from_vec((0..data_bytes as u8).collect()),
            end_of_data_group: 0x2A,
            crc: 0,
        };
        let image = group.to_buffer();
        group.crc = crc_16_darc(&image[..image.len() - 16]);
        let wire = group.to_buffer();
        assert_eq!(wire.len(), 144 * packets);
        wire
    }

    #[test]
    fn test_group_1_assembly_across_three_packets() {
        // 42 data bytes give a 54-byte image, three 144-bit blocks.
        let wire = group_1_wire(42, 3);
        let service = ServiceId::Transmission3Mode;

        let mut decoder = DataGroupDecoder::new();
        let groups = decoder.push_data_packets(vec![
            packet(service, 0x7, 0, false, wire[0..144].to_bitvec()),
            packet(service, 0x7, 1, false, wire[144..288].to_bitvec()),
            packet(service, 0x7, 2, true, wire[288..432].to_bitvec()),
        ]);

        assert_eq!(groups.len(), 1);
        let DataGroup::Group1(group) = &groups[0] else {
            panic!("expected Composition 1");
        };
        assert_eq!(group.service_id, service);
        assert_eq!(group.data_group_number, 0x7);
        assert!(group.is_crc_valid());
        assert_eq!(
            bits_to_bytes(&group.data_group_data),
            (0..42u8).collect::<Vec<u8>>()
        );
    }

    #[test]
    fn test_missing_first_packet_drops_the_group() {
        let wire = group_1_wire(42, 3);
        let service = ServiceId::Transmission3Mode;

        let mut decoder = DataGroupDecoder::new();
        let groups = decoder.push_data_packets(vec![
            packet(service, 0x7, 1, false, wire[144..288].to_bitvec()),
            packet(service, 0x7, 2, true, wire[288..432].to_bitvec()),
        ]);
        assert!(groups.is_empty());

        // A fresh packet number 0 reopens the group.
        let groups = decoder.push_data_packets(vec![
            packet(service, 0x7, 0, false, wire[0..144].to_bitvec()),
            packet(service, 0x7, 1, false, wire[144..288].to_bitvec()),
            packet(service, 0x7, 2, true, wire[288..432].to_bitvec()),
        ]);
        assert_eq!(groups.len(), 1);
        assert!(groups[0].is_crc_valid());
    }

    #[test]
    fn test_composition_2_group_without_crc() {
        let mut decoder = DataGroupDecoder::new();
        let data_block = BitVec::from_vec(vec![0x80u8; 20]);
        let groups = decoder.push_data_packets(vec![packet(
            ServiceId::AdditionalInformation,
            0x9,
            0,
            true,
            data_block,
        )]);

        assert_eq!(groups.len(), 1);
        let DataGroup::Group2(group) = &groups[0] else {
            panic!("expected Composition 2");
        };
        assert_eq!(group.crc, None);
        assert!(group.is_crc_valid());
        assert_eq!(group.service_id, ServiceId::AdditionalInformation);
        assert_eq!(group.data_group_number, 0x9);
    }

    #[test]
    fn test_interleaved_groups_keep_separate_buffers() {
        let wire = group_1_wire(42, 3);
        let first = ServiceId::Transmission3Mode;
        let second = ServiceId::Transmission5Mode;

        let mut decoder = DataGroupDecoder::new();
        let groups = decoder.push_data_packets(vec![
            packet(first, 0x7, 0, false, wire[0..144].to_bitvec()),
            packet(second, 0x7, 0, false, wire[0..144].to_bitvec()),
            packet(first, 0x7, 1, false, wire[144..288].to_bitvec()),
            packet(second, 0x7, 1, false, wire[144..288].to_bitvec()),
            packet(first, 0x7, 2, true, wire[288..432].to_bitvec()),
            packet(second, 0x7, 2, true, wire[288..432].to_bitvec()),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].service_id(), first);
        assert_eq!(groups[1].service_id(), second);
        assert!(groups.iter().all(DataGroup::is_crc_valid));
    }

    #[test]
    fn test_reset_discards_open_buffers() {
        let wire = group_1_wire(42, 3);
        let service = ServiceId::Transmission3Mode;

        let mut decoder = DataGroupDecoder::new();
        decoder.push_data_packets(vec![packet(service, 0x7, 0, false, wire[0..144].to_bitvec())]);
        decoder.reset();

        // Continuation after the reset has no first packet to attach to.
        let groups = decoder.push_data_packets(vec![packet(
            service,
            0x7,
            2,
            true,
            wire[288..432].to_bitvec(),
        )]);
        assert!(groups.is_empty());
    }
}
