//! Streaming decoder core for the DARC (Data Radio Channel) FM-subcarrier
//! broadcast data system, ARIB STD-B3.

pub mod constants;
pub mod error_correction;
pub mod l2;
pub mod l3;
pub mod l4;
pub mod lfsr;
pub mod tracing_init;
pub mod util;

pub use l2::{BlockDecoder, FrameDecoder};
pub use l3::DataPacketDecoder;
pub use l4::DataGroupDecoder;
