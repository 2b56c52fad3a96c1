//! Core wire-format types.

pub mod address;

pub use address::{verify_address, Address, ChainId, ADDRESS_SIZE, ADDRESS_VERSION};
