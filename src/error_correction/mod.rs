//! Error-detecting and error-correcting codes from ARIB STD-B3.

pub mod checksum;
pub mod dscc;

pub use checksum::{crc_14_darc, crc_16_darc, crc_82_darc};
pub use dscc::correct_error_dscc_272_190;
