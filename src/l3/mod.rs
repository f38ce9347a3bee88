//! L3: data packet parsing.

pub mod data_packet;
pub mod packet_decoder;

pub use data_packet::{DataPacket, DataPacketError, ServiceId};
pub use packet_decoder::DataPacketDecoder;
