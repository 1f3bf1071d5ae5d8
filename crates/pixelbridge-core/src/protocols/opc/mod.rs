//! Open Pixel Control framing for the serial link.
//!
//! Each message is a 4-byte header (channel, command, big-endian length)
//! followed by RGB triples. Only "set pixels" on channel 0 is produced.

pub mod encoder;
pub mod error;
pub mod layout;

pub use encoder::{OpcHeader, encode_set_pixels, parse_header};
pub use error::OpcError;
