//! Frame-to-packet transducer.

use tracing::debug;

use crate::l2::block::Frame;
use crate::l3::data_packet::DataPacket;

/// Parses every information block of a frame into a data packet.
/// Stateless; packets come out in frame order.
#[derive(Debug, Default)]
pub struct DataPacketDecoder;

impl DataPacketDecoder {
    pub fn new() -> Self {
        Self
    }

    pub fn push_frame(&self, frame: &Frame) -> Vec<DataPacket> {
        frame
            .blocks
            .iter()
            .filter_map(|block| match DataPacket::from_buffer(&block.data_packet) {
                Ok(packet) => Some(packet),
                Err(error) => {
                    debug!("skipping unparsable data packet: {error}");
                    None
                }
            })
            .collect()
    }
}
