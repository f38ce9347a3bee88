//! L2: block framing and frame assembly.

pub mod block;
pub mod block_decoder;
pub mod frame_decoder;

pub use block::{Bic, Block, BlockError, Frame, InformationBlock, ParityBlock};
pub use block_decoder::BlockDecoder;
pub use frame_decoder::FrameDecoder;
