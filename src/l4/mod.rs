//! L4: data group reassembly.

pub mod data_group;
pub mod group_decoder;

pub use data_group::{DataGroup, DataGroup1, DataGroup2, DataGroupError};
pub use group_decoder::DataGroupDecoder;
